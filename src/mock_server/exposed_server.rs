use crate::mock_server::bare_server::BareMockServer;
use crate::mock_server::MockServerBuilder;
use crate::store::ConfigurationStore;
use std::net::SocketAddr;

/// An HTTP server running in the background whose `/api` endpoint fails on demand.
///
/// Each instance of `MockServer` is fully isolated: [`MockServer::start`] takes care of finding
/// a random port available on your local machine and gives the new server its own
/// [`ConfigurationStore`].
///
/// The behaviour of `/api` can be changed at any time, either over HTTP through `POST /config`
/// or in-process through [`MockServer::configuration`].
///
/// When a `MockServer` goes out of scope the background server is shut down and every
/// connection it still holds, hanging ones included, is closed.
pub struct MockServer(BareMockServer);

impl MockServer {
    pub(super) fn new(server: BareMockServer) -> Self {
        Self(server)
    }

    /// You can use `MockServer::builder` if you need to specify custom configuration - e.g.
    /// run on a specific port or start with a fault already in place.
    ///
    /// If this is not your case, use [`MockServer::start`].
    pub fn builder() -> MockServerBuilder {
        MockServerBuilder::new()
    }

    /// Start a new instance of a `MockServer` listening on a random port, with the default
    /// configuration.
    ///
    /// ### Example:
    /// ```rust
    /// use flakymock::MockServer;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     // Arrange
    ///     let mock_server_one = MockServer::start().await;
    ///     let mock_server_two = MockServer::start().await;
    ///
    ///     // Assert
    ///     assert!(mock_server_one.address() != mock_server_two.address());
    /// }
    /// ```
    pub async fn start() -> Self {
        Self::builder().start().await
    }

    /// The configuration store backing this server.
    ///
    /// ### Example:
    /// ```rust
    /// use flakymock::{ConfigurationUpdate, MockServer, NetworkFault};
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     // Arrange
    ///     let mock_server = MockServer::start().await;
    ///
    ///     // Act
    ///     mock_server
    ///         .configuration()
    ///         .update(ConfigurationUpdate::default().network_fault(NetworkFault::Reset));
    ///
    ///     // Assert
    ///     let outcome = reqwest::get(format!("{}/api", mock_server.uri())).await;
    ///     assert!(outcome.is_err());
    /// }
    /// ```
    pub fn configuration(&self) -> &ConfigurationStore {
        self.0.configuration()
    }

    /// Return the base uri of this running instance of `MockServer`, e.g. `http://127.0.0.1:4372`.
    ///
    /// Use this method to compose uris when interacting with this instance of `MockServer` via
    /// an HTTP client.
    pub fn uri(&self) -> String {
        self.0.uri()
    }

    /// Return the socket address of this running instance of `MockServer`, e.g. `127.0.0.1:4372`.
    ///
    /// Use this method to interact with the `MockServer` using `TcpStream`s.
    ///
    /// ### Example:
    /// ```rust
    /// use flakymock::MockServer;
    /// use std::net::TcpStream;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     // Act - the server is started
    ///     let mock_server = MockServer::start().await;
    ///
    ///     // Assert - we can connect to it
    ///     assert!(TcpStream::connect(mock_server.address()).is_ok());
    /// }
    /// ```
    pub fn address(&self) -> &SocketAddr {
        self.0.address()
    }
}
