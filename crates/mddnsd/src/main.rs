// # mddnsd - Multi-provider DDNS Daemon
//
// Thin integration layer: reads configuration, builds the updater set from
// the registry, initialises it once and serves `GET /update`. All update
// logic lives in mddns-core and the provider crates.
//
// ## Configuration
//
// Daemon settings come from environment variables:
//
// - `MDDNS_PORT`: Listen port (default 0, an ephemeral port). A trailing
//   numeric command line argument takes precedence: `mddnsd 8080`
// - `MDDNS_UPDATERS`: Comma-separated updater names (default `netcup,bytecamp`)
// - `MDDNS_LOG_LEVEL`: trace, debug, info, warn or error (default info)
//
// Provider credentials are read by each updater at startup, from the
// variable itself or from the file named by its `_FILE` variant:
//
// - netcup: `NETCUP_CUSTOMER_NUMBER`, `NETCUP_API_PASSWORD`, `NETCUP_API_KEY`
// - ionos: `IONOS_API_KEY`
// - bytecamp: `BYTECAMP_USER`, `BYTECAMP_PASS`
//
// ## Example
//
// ```bash
// export MDDNS_UPDATERS=netcup,ionos
// export NETCUP_CUSTOMER_NUMBER=123456
// export NETCUP_API_KEY=your_key
// export NETCUP_API_PASSWORD_FILE=/run/secrets/netcup_password
// export IONOS_API_KEY=your_key
//
// mddnsd 8080
// ```

mod routes;
mod validate;

use anyhow::Result;
use mddns_core::{EnvCredentials, MultiUpdater, MultiUpdaterConfig, UpdaterRegistry};
use std::env;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

/// How long in-flight requests may take to finish after a shutdown signal
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MddnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error, unknown updater or failed updater init
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<MddnsExitCode> for ExitCode {
    fn from(code: MddnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    port: u16,
    updaters: MultiUpdaterConfig,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables and arguments
    fn from_env() -> Result<Self> {
        let args: Vec<String> = env::args().skip(1).collect();
        Self::from_sources(|name| env::var(name).ok(), &args)
    }

    fn from_sources<F>(var: F, args: &[String]) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match args.last().and_then(|arg| arg.parse::<u16>().ok()) {
            Some(port) => port,
            None => match var("MDDNS_PORT") {
                Some(port) => port.trim().parse().map_err(|_| {
                    anyhow::anyhow!("MDDNS_PORT must be a port number (0-65535). Got: {}", port)
                })?,
                None => 0,
            },
        };

        let updaters = var("MDDNS_UPDATERS")
            .map(|list| MultiUpdaterConfig::from_list(&list))
            .unwrap_or_default();

        Ok(Self {
            port,
            updaters,
            log_level: var("MDDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.updaters.validate().map_err(|e| {
            anyhow::anyhow!(
                "MDDNS_UPDATERS is invalid: {}. \
                Set it via: export MDDNS_UPDATERS=netcup,bytecamp",
                e
            )
        })?;

        self.level()?;
        Ok(())
    }

    fn level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "MDDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return MddnsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return MddnsExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level().unwrap_or(Level::INFO))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return MddnsExitCode::ConfigError.into();
    }

    info!("Starting mddnsd daemon");
    info!("Configured updaters: {}", config.updaters.updaters.join(", "));

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return MddnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let updater = match build_updater(&config).await {
            Ok(updater) => updater,
            Err(e) => {
                error!("Startup failed:\n{}", e);
                return MddnsExitCode::ConfigError;
            }
        };

        if let Err(e) = run_daemon(config, updater).await {
            error!("Daemon error: {}", e);
            MddnsExitCode::RuntimeError
        } else {
            MddnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Registry of every updater compiled into this binary
fn registry() -> UpdaterRegistry {
    #[allow(unused_mut)]
    let mut registry = UpdaterRegistry::new();

    #[cfg(feature = "netcup")]
    mddns_provider_netcup::register(&mut registry);

    #[cfg(feature = "ionos")]
    mddns_provider_ionos::register(&mut registry);

    #[cfg(feature = "bytecamp")]
    mddns_provider_bytecamp::register(&mut registry);

    registry
}

/// Build the configured updaters and initialise them
///
/// Fails on an unknown updater name or if any updater is missing its
/// credentials; every init problem is reported at once.
async fn build_updater(config: &Config) -> Result<MultiUpdater> {
    let registry = registry();
    info!("Available updaters: {}", registry.list_updaters().join(", "));

    let updater = MultiUpdater::from_registry(
        &registry,
        &config.updaters,
        Arc::new(EnvCredentials::new()),
    )?;

    updater.init().await?;
    Ok(updater)
}

/// Serve `/update` until a shutdown signal arrives
async fn run_daemon(config: Config, updater: MultiUpdater) -> Result<()> {
    let shutdown = ShutdownSignal::install()?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server is listening on port {}", listener.local_addr()?.port());

    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel();
    let app = routes::router(updater);

    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let signal = shutdown.recv().await;
                info!("Received shutdown signal: {}", signal);
                let _ = signalled_tx.send(());
            })
            .await
    });

    tokio::select! {
        served = &mut server => {
            served??;
            return Ok(());
        }
        _ = signalled_rx => {}
    }

    info!("Shutting down daemon");
    match tokio::time::timeout(SHUTDOWN_TIMEOUT, server).await {
        Ok(served) => {
            served??;
            Ok(())
        }
        Err(_) => Err(anyhow::anyhow!(
            "Shutdown timeout after {:?}",
            SHUTDOWN_TIMEOUT
        )),
    }
}

/// SIGTERM/SIGINT listener, installed before the server starts
#[cfg(unix)]
struct ShutdownSignal {
    sigterm: Signal,
    sigint: Signal,
}

#[cfg(unix)]
impl ShutdownSignal {
    fn install() -> Result<Self> {
        Ok(Self {
            sigterm: signal(SignalKind::terminate())
                .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?,
            sigint: signal(SignalKind::interrupt())
                .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?,
        })
    }

    async fn recv(mut self) -> &'static str {
        tokio::select! {
            _ = self.sigterm.recv() => "SIGTERM",
            _ = self.sigint.recv() => "SIGINT",
        }
    }
}

/// CTRL-C listener for non-Unix platforms
#[cfg(not(unix))]
struct ShutdownSignal;

#[cfg(not(unix))]
impl ShutdownSignal {
    fn install() -> Result<Self> {
        Ok(Self)
    }

    async fn recv(self) -> &'static str {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to wait for CTRL-C: {}", e);
            std::future::pending::<()>().await;
        }
        "SIGINT"
    }
}
