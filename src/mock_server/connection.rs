use log::debug;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio::sync::Notify;

/// Raised by a request handler that wants its connection killed.
///
/// The connection task waits on [`AbortSignal::triggered`] next to the hyper connection and
/// drops the latter as soon as the signal fires. The permit stored by `Notify::notify_one`
/// makes sure a signal raised before anybody waits on it is not lost.
#[derive(Debug, Default)]
pub(super) struct AbortSignal {
    notify: Notify,
    triggered: AtomicBool,
}

impl AbortSignal {
    pub(super) fn trigger(&self) {
        self.triggered.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    pub(super) fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    pub(super) async fn triggered(&self) {
        self.notify.notified().await
    }
}

/// A `TcpStream` that resets, instead of closing, the connection when dropped after its
/// [`AbortSignal`] fired.
///
/// A zero linger timeout makes the kernel discard unsent data and answer with an RST on close,
/// so the peer observes a connection-level failure and never a status line.
pub(super) struct AbortableStream {
    stream: TcpStream,
    abort: Arc<AbortSignal>,
}

impl AbortableStream {
    pub(super) fn new(stream: TcpStream, abort: Arc<AbortSignal>) -> Self {
        Self { stream, abort }
    }
}

impl Drop for AbortableStream {
    fn drop(&mut self) {
        if self.abort.is_triggered() {
            if let Err(e) = socket2::SockRef::from(&self.stream).set_linger(Some(Duration::ZERO)) {
                debug!("Failed to set a zero linger timeout before resetting: {}", e);
            }
        }
    }
}

impl AsyncRead for AbortableStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().stream).poll_read(cx, buf)
    }
}

impl AsyncWrite for AbortableStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().stream).poll_write(cx, buf)
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().stream).poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.stream.is_write_vectored()
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().stream).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().stream).poll_shutdown(cx)
    }
}
