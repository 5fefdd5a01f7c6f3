use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use xmpp_alt_connections::{AltConnectionResolver, Config, Server, Sources};

#[derive(Parser, Debug)]
#[command(name = "xmpp-alt-connections")]
#[command(version, about = "Discover XMPP alternative connection methods for a domain")]
struct Cli {
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info", env = "ALTCONN_LOG_LEVEL")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve discovery requests over HTTP.
    Serve {
        /// Address to listen on.
        #[arg(long, default_value = "127.0.0.1:8080", env = "ALTCONN_LISTEN")]
        listen: SocketAddr,

        #[command(flatten)]
        network: NetworkArgs,
    },
    /// Resolve one domain and print the JSON result.
    Lookup {
        /// Domain to resolve.
        domain: String,

        /// Comma-separated sources (srv, txt, host-meta). Defaults to all.
        #[arg(long)]
        sources: Option<String>,

        #[command(flatten)]
        network: NetworkArgs,
    },
}

#[derive(Args, Debug)]
struct NetworkArgs {
    /// Timeout in seconds for each DNS query and host-meta fetch.
    #[arg(long, default_value_t = 5, env = "ALTCONN_TIMEOUT")]
    timeout: u64,

    /// DNS attempts per query.
    #[arg(long, default_value_t = 2, env = "ALTCONN_DNS_ATTEMPTS")]
    dns_attempts: usize,

    /// Use built-in upstream resolvers instead of the system DNS configuration.
    #[arg(long, env = "ALTCONN_NO_SYSTEM_DNS")]
    no_system_dns: bool,

    /// Largest host-meta document accepted, in bytes.
    #[arg(long, default_value_t = 64 * 1024, env = "ALTCONN_MAX_DOCUMENT_BYTES")]
    max_document_bytes: usize,

    /// User-Agent sent with host-meta fetches.
    #[arg(long, env = "ALTCONN_USER_AGENT")]
    user_agent: Option<String>,
}

impl NetworkArgs {
    fn apply(self, config: Config) -> Config {
        let config = config
            .timeout(Duration::from_secs(self.timeout))
            .dns_attempts(self.dns_attempts)
            .system_dns(!self.no_system_dns)
            .max_document_bytes(self.max_document_bytes);
        match self.user_agent {
            Some(agent) => config.user_agent(agent),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { listen, network } => {
            let config = network.apply(Config::default().listen_addr(listen));
            let resolver =
                AltConnectionResolver::from_config(&config).context("failed to build resolver")?;
            let guard = Server::new(resolver)
                .bind(config.listen_addr)
                .await
                .with_context(|| format!("failed to bind {}", config.listen_addr))?;

            shutdown_signal().await;
            info!("Shutting down...");
            guard.shutdown().await?;
        }
        Command::Lookup {
            domain,
            sources,
            network,
        } => {
            let config = network.apply(Config::default());
            let resolver =
                AltConnectionResolver::from_config(&config).context("failed to build resolver")?;
            let methods = resolver
                .resolve(Some(&domain), Sources::from_param(sources.as_deref()))
                .await;
            println!("{}", serde_json::to_string(&methods)?);
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
