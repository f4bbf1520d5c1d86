use crate::error::Error;
use crate::mock_server::connection::{AbortSignal, AbortableStream};
use crate::mock_server::routes::Router;
use crate::store::ConfigurationStore;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use log::{debug, warn};
use std::convert::Infallible;
use std::future::Future;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

/// The actual HTTP server responding to incoming requests according to the configuration in
/// `store`, until `shutdown` resolves.
///
/// Every connection is served on its own task: a delayed or hanging request never holds up
/// another one. In-flight connections are dropped together with the runtime they run on.
pub async fn serve<F>(
    listener: TcpListener,
    store: ConfigurationStore,
    shutdown: F,
) -> Result<(), Error>
where
    F: Future<Output = ()>,
{
    listener.set_nonblocking(true).map_err(Error::Listener)?;
    let listener = tokio::net::TcpListener::from_std(listener).map_err(Error::Listener)?;
    let router = Router::new(store);

    tokio::pin!(shutdown);
    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("Failed to accept a connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    continue;
                }
            },
            _ = &mut shutdown => {
                debug!("Shutting down the mock server");
                return Ok(());
            }
        };

        tokio::spawn(serve_connection(stream, peer, router.clone()));
    }
}

async fn serve_connection(stream: TcpStream, peer: SocketAddr, router: Router) {
    let abort = Arc::new(AbortSignal::default());
    let io = TokioIo::new(AbortableStream::new(stream, abort.clone()));

    let service = {
        let abort = abort.clone();
        service_fn(move |request: hyper::Request<Incoming>| {
            let router = router.clone();
            let abort = abort.clone();
            async move { Ok::<_, Infallible>(router.handle(request, Some(peer), &abort).await) }
        })
    };

    let mut builder = auto::Builder::new(TokioExecutor::new());
    // A peer that hangs up mid-request closes the connection, releasing parked requests.
    builder.http1().half_close(false);
    let connection = builder.serve_connection(io, service);

    tokio::select! {
        outcome = connection => {
            if let Err(e) = outcome {
                debug!("Error while serving the connection from {}: {}", peer, e);
            }
        }
        _ = abort.triggered() => {
            // Dropping the connection drops the `AbortableStream`, which resets the socket.
            debug!("Resetting the connection from {}", peer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::{Configuration, NetworkFault};
    use tokio::io::AsyncWriteExt;

    /// Send a request for `/api` to a connection served with `configuration`, then hang up
    /// while the request is still in flight.
    async fn hang_up_on_a_parked_request(configuration: Configuration) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut client = TcpStream::connect(listener.local_addr().unwrap())
            .await
            .unwrap();
        let (stream, peer) = listener.accept().await.unwrap();
        let router = Router::new(ConfigurationStore::new(configuration));
        let connection = tokio::spawn(serve_connection(stream, peer, router));

        client
            .write_all(b"GET /api HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!connection.is_finished(), "the request was answered");

        drop(client);

        tokio::time::timeout(Duration::from_secs(2), connection)
            .await
            .expect("the parked request outlived its connection")
            .unwrap();
    }

    #[tokio::test]
    async fn timeouts_are_released_when_the_client_hangs_up() {
        hang_up_on_a_parked_request(Configuration {
            network_fault: NetworkFault::Timeout,
            ..Configuration::default()
        })
        .await;
    }

    #[tokio::test]
    async fn delays_are_released_when_the_client_hangs_up() {
        hang_up_on_a_parked_request(Configuration {
            delay_millis: 60_000,
            ..Configuration::default()
        })
        .await;
    }
}
