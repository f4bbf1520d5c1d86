use clap::Parser;
use flakymock::{Configuration, ConfigurationStore, NetworkFault};
use log::info;
use std::net::{IpAddr, SocketAddr, TcpListener};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Serve an HTTP endpoint, `/api`, whose status code, latency and network faults are
/// configured at runtime through `/config`.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "FLAKYMOCK_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on.
    #[arg(long, short, env = "FLAKYMOCK_PORT", default_value_t = 3000)]
    port: u16,

    /// Initial status code of `/api`.
    #[arg(long, env = "FLAKYMOCK_STATUS_CODE", default_value_t = 200, allow_negative_numbers = true)]
    status_code: i64,

    /// Initial delay of `/api`, in milliseconds.
    #[arg(long, env = "FLAKYMOCK_DELAY", default_value_t = 0)]
    delay: u64,

    /// Initial network fault of `/api`: none, timeout, reset or refuse.
    #[arg(long, env = "FLAKYMOCK_NETWORK_ERROR", default_value = "none")]
    network_error: NetworkFault,
}

impl Args {
    fn configuration(&self) -> Configuration {
        Configuration {
            status_code: self.status_code,
            delay_millis: self.delay,
            network_fault: self.network_error,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", DisplayChain(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), flakymock::Error> {
    let address = SocketAddr::new(args.host, args.port);
    let listener =
        TcpListener::bind(address).map_err(|source| flakymock::Error::Bind { address, source })?;
    let store = ConfigurationStore::new(args.configuration());

    info!("Mock API server listening on http://{}", address);
    info!("API endpoint:  http://{}/api", address);
    info!("Configuration: http://{}/config", address);
    info!("Starting with {}", store.get());

    flakymock::serve(listener, store, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl-C, shutting down");
    })
    .await
}

/// Prints an error followed by its chain of sources.
struct DisplayChain<'a>(&'a dyn std::error::Error);

impl std::fmt::Display for DisplayChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(cause) = source {
            write!(f, ": {}", cause)?;
            source = cause.source();
        }
        Ok(())
    }
}
