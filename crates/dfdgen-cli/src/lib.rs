//! CLI logic for the dfdgen web front end.
//!
//! This module loads configuration, builds the HTTP router, and serves it
//! until the process receives Ctrl-C.

pub mod config;
pub mod error_adapter;
pub mod server;

mod args;

pub use args::Args;

use log::{info, warn};
use tokio::net::TcpListener;

use dfdgen::{DfdError, config::AppConfig};

use server::AppState;

/// Run the dfdgen CLI application
///
/// Builds a multi-threaded runtime and serves the front end on the address
/// given by `args` until shutdown.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `DfdError` for:
/// - Configuration loading errors
/// - Runtime or listener set-up errors
/// - Server errors
pub fn run(args: &Args) -> Result<(), DfdError> {
    let config = resolve_config(args)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(serve(args, &config))
}

/// Loads the configuration and applies command-line overrides.
///
/// # Errors
///
/// Returns `DfdError::Config` when the configuration cannot be loaded.
pub fn resolve_config(args: &Args) -> Result<AppConfig, DfdError> {
    let config = config::load_config(args.config.as_ref())?;
    Ok(match &args.tool {
        Some(tool) => config.with_program(tool),
        None => config,
    })
}

/// Serve the front end described by `config` on the address from `args`.
///
/// # Errors
///
/// Returns `DfdError::Bind` if the address cannot be bound and
/// `DfdError::Server` if serving fails.
pub async fn serve(args: &Args, config: &AppConfig) -> Result<(), DfdError> {
    let addr = args.listen_addr();
    let listener = TcpListener::bind(addr.as_str())
        .await
        .map_err(|err| DfdError::new_bind_error(addr.as_str(), err))?;

    let router = server::router(AppState::from_config(config));

    info!(addr = addr.as_str(); "Serving DFD generator");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| DfdError::Server(err.to_string()))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(err:%; "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
