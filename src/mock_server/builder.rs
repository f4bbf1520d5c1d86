use crate::configuration::Configuration;
use crate::error::Error;
use crate::mock_server::bare_server::BareMockServer;
use crate::store::ConfigurationStore;
use crate::MockServer;
use std::net::{SocketAddr, TcpListener};

/// A builder providing a fluent API to assemble a [`MockServer`] step-by-step.
/// Use [`MockServer::builder`] to get started.
pub struct MockServerBuilder {
    listener: Option<TcpListener>,
    configuration: Configuration,
}

impl MockServerBuilder {
    pub(super) fn new() -> Self {
        Self {
            listener: None,
            configuration: Configuration::default(),
        }
    }

    /// Each instance of [`MockServer`] is, by default, running on a random
    /// port available on your local machine.
    /// With `MockServerBuilder::listener` you can choose to start the `MockServer`
    /// instance on a specific port you have already bound.
    ///
    /// ### Example:
    /// ```rust
    /// use flakymock::MockServer;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     // Arrange
    ///     let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    ///     let expected_server_address = listener
    ///         .local_addr()
    ///         .expect("Failed to get server address.");
    ///
    ///     // Act
    ///     let mock_server = MockServer::builder().listener(listener).start().await;
    ///
    ///     // Assert
    ///     assert_eq!(&expected_server_address, mock_server.address());
    /// }
    /// ```
    pub fn listener(mut self, listener: TcpListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// The configuration the server starts with. Defaults to [`Configuration::default`]:
    /// a `200` without delay nor network fault.
    ///
    /// ### Example:
    /// ```rust
    /// use flakymock::{Configuration, MockServer};
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let configuration = Configuration {
    ///         status_code: 503,
    ///         ..Configuration::default()
    ///     };
    ///
    ///     let mock_server = MockServer::builder()
    ///         .configuration(configuration)
    ///         .start()
    ///         .await;
    ///
    ///     assert_eq!(mock_server.configuration().get().status_code, 503);
    /// }
    /// ```
    pub fn configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }

    /// Finalise the builder to get an instance of a [`BareMockServer`].
    pub(super) fn build_bare(self) -> Result<BareMockServer, Error> {
        let listener = match self.listener {
            Some(listener) => listener,
            None => {
                let address = SocketAddr::from(([127, 0, 0, 1], 0));
                TcpListener::bind(address).map_err(|source| Error::Bind { address, source })?
            }
        };
        BareMockServer::start(listener, ConfigurationStore::new(self.configuration))
    }

    /// Finalise the builder and launch the [`MockServer`] instance, reporting failures to
    /// bind a port or to start the background runtime.
    pub async fn try_start(self) -> Result<MockServer, Error> {
        Ok(MockServer::new(self.build_bare()?))
    }

    /// Finalise the builder and launch the [`MockServer`] instance!
    ///
    /// Panics if the server cannot be started: use [`MockServerBuilder::try_start`] to handle
    /// the failure instead.
    pub async fn start(self) -> MockServer {
        self.try_start()
            .await
            .unwrap_or_else(|e| panic!("Failed to start a mock server: {}", e))
    }
}
