//! fc-api - Fit-and-competent application API
//!
//! Allocates application numbers and accepts the one-time submission of
//! each application's details.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use fc_common::config::{ApiConfig, ConfigOverrides};
use fc_common::db::{init_database, SqliteApplicationStore};
use fc_api::{build_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for fc-api
///
/// Every setting can also come from the environment or a TOML config file;
/// the command line wins over both.
#[derive(Parser, Debug)]
#[command(name = "fc-api")]
#[command(about = "Fit-and-competent application API")]
#[command(version)]
struct Args {
    /// Optional TOML config file
    #[arg(short, long, env = "FC_API_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on [default: 3005]
    #[arg(short, long, env = "FC_API_PORT")]
    port: Option<u16>,

    /// Address to bind [default: 0.0.0.0]
    #[arg(long, env = "FC_API_HOST")]
    host: Option<String>,

    /// Path prefix for all routes [default: fit-and-competent-api]
    #[arg(long, env = "FC_API_PATH_PREFIX")]
    path_prefix: Option<String>,

    /// SQLite database file [default: ./.development.db]
    #[arg(short, long, env = "FC_API_DATABASE")]
    database: Option<PathBuf>,

    /// Upper bound on each database call, in milliseconds [default: 5000]
    #[arg(long, env = "FC_API_STORE_TIMEOUT_MS")]
    store_timeout_ms: Option<u64>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            port: self.port,
            host: self.host.clone(),
            path_prefix: self.path_prefix.clone(),
            database: self.database.clone(),
            store_timeout_ms: self.store_timeout_ms,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fc_api=info,fc_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification before anything that can block
    info!(
        "Starting fit-and-competent API (fc-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = ApiConfig::resolve(args.overrides(), args.config.as_deref())
        .context("Failed to load configuration")?;

    info!("Database path: {}", config.database.display());
    let pool = init_database(&config.database, config.store_timeout)
        .await
        .context("Failed to initialize database")?;
    info!("✓ Database ready");

    let store = Arc::new(SqliteApplicationStore::new(pool, config.store_timeout));
    let state = AppState::new(store, config.path_prefix.clone());
    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("fc-api listening on http://{}{}", addr, config.path_prefix);
    info!("Health check: http://{}{}/health", addr, config.path_prefix);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const ENV_VARS: [&str; 6] = [
        "FC_API_CONFIG",
        "FC_API_PORT",
        "FC_API_HOST",
        "FC_API_PATH_PREFIX",
        "FC_API_DATABASE",
        "FC_API_STORE_TIMEOUT_MS",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_no_arguments_resolves_to_defaults() {
        clear_env();
        let args = Args::try_parse_from(["fc-api"]).unwrap();
        let config = ApiConfig::resolve(args.overrides(), None).unwrap();

        assert_eq!(config, ApiConfig::default());
    }

    #[test]
    #[serial]
    fn test_environment_is_used_when_no_argument() {
        clear_env();
        env::set_var("FC_API_PORT", "4100");
        env::set_var("FC_API_PATH_PREFIX", "licensing-api");

        let args = Args::try_parse_from(["fc-api"]).unwrap();
        let config = ApiConfig::resolve(args.overrides(), None).unwrap();
        clear_env();

        assert_eq!(config.port, 4100);
        assert_eq!(config.path_prefix, "/licensing-api");
    }

    #[test]
    #[serial]
    fn test_argument_beats_environment() {
        clear_env();
        env::set_var("FC_API_PORT", "4100");

        let args = Args::try_parse_from(["fc-api", "--port", "4200"]).unwrap();
        clear_env();

        assert_eq!(args.overrides().port, Some(4200));
    }
}
