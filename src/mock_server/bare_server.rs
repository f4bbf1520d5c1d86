use crate::error::Error;
use crate::mock_server::hyper::serve;
use crate::store::ConfigurationStore;
use log::error;
use std::net::{SocketAddr, TcpListener};

/// A flaky HTTP server running in the background, on a dedicated thread with its own
/// single-threaded tokio runtime.
///
/// Running on its own thread lets `BareMockServer` outlive (and be used from) whatever async
/// runtime the caller happens to be on.
pub(crate) struct BareMockServer {
    store: ConfigurationStore,
    server_address: SocketAddr,
    // When `_shutdown_trigger` gets dropped the listening server terminates.
    _shutdown_trigger: tokio::sync::oneshot::Sender<()>,
}

impl BareMockServer {
    /// Start serving on `listener`, which must already be bound: incoming connections queue up
    /// in its backlog until the background runtime picks them up.
    pub(crate) fn start(listener: TcpListener, store: ConfigurationStore) -> Result<Self, Error> {
        let (shutdown_trigger, shutdown_receiver) = tokio::sync::oneshot::channel::<()>();
        let server_address = listener.local_addr().map_err(Error::Listener)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::Runtime)?;

        let server_store = store.clone();
        std::thread::spawn(move || {
            let shutdown = async {
                // This future resolves when either:
                // - the sender half of the channel gets dropped (i.e. MockServer is dropped)
                // - the sender is used, therefore sending a poison pill willingly as a shutdown signal
                let _ = shutdown_receiver.await;
            };
            if let Err(e) = runtime.block_on(serve(listener, server_store, shutdown)) {
                error!("Mock server on {} failed: {}", server_address, e);
            }
        });

        Ok(Self {
            store,
            server_address,
            _shutdown_trigger: shutdown_trigger,
        })
    }

    pub(crate) fn configuration(&self) -> &ConfigurationStore {
        &self.store
    }

    /// Return the base uri of this running instance of `BareMockServer`, e.g. `http://127.0.0.1:4372`.
    pub(crate) fn uri(&self) -> String {
        format!("http://{}", self.server_address)
    }

    /// Return the socket address of this running instance of `BareMockServer`, e.g. `127.0.0.1:4372`.
    pub(crate) fn address(&self) -> &SocketAddr {
        &self.server_address
    }
}
