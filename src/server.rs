//! Web server

use crate::cli;
use crate::error::DashboardError;

use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use axum::ServiceExt;
use axum_server::{tls_rustls::RustlsConfig, Handle};
use expanduser::expanduser;
use tokio::signal;
use tracing::{error, info};

/// Serve the dashboard service
///
/// Returns once the server has shut down.
///
/// # Arguments
///
/// * `args`: Command line arguments
/// * `service`: The [crate::app::Service] to serve
pub async fn serve(
    args: &cli::CommandLineArgs,
    service: crate::app::Service,
) -> Result<(), DashboardError> {
    let addr = SocketAddr::from_str(&format!("{}:{}", args.host, args.port)).map_err(|err| {
        DashboardError::Configuration {
            message: format!("invalid host name, IP address or port number: {err}"),
        }
    })?;

    // Catch ctrl+c and try to shutdown gracefully
    let handle = Handle::new();
    tokio::spawn(shutdown_signal(
        handle.clone(),
        args.graceful_shutdown_timeout,
    ));

    info!("listening on {addr}");
    if args.https {
        let abs_cert_file = tls_file(&args.cert_file, "certificate")?;
        let abs_key_file = tls_file(&args.key_file, "key")?;
        // Set up TLS config
        let tls_config = RustlsConfig::from_pem_file(abs_cert_file, abs_key_file)
            .await
            .map_err(|err| DashboardError::Configuration {
                message: format!("failed to load TLS certificate files: {err}"),
            })?;
        // run HTTPS server with hyper
        axum_server::bind_rustls(addr, tls_config)
            .handle(handle)
            .serve(service.into_make_service())
            .await
            .map_err(DashboardError::Server)
    } else {
        // run HTTP server with hyper
        axum_server::bind(addr)
            .handle(handle)
            .serve(service.into_make_service())
            .await
            .map_err(DashboardError::Server)
    }
}

/// Returns the absolute path of a TLS file, checking that it exists.
fn tls_file(path: &str, kind: &str) -> Result<PathBuf, DashboardError> {
    let expanded = expanduser(path).map_err(|err| DashboardError::Configuration {
        message: format!("failed to expand ~ in TLS {kind} file path {path}: {err}"),
    })?;
    expanded
        .canonicalize()
        .map_err(|_| DashboardError::Configuration {
            message: format!(
                "TLS {kind} file expected at '{}' but not found",
                expanded.display()
            ),
        })
}

/// Graceful shutdown handler
///
/// Installs signal handlers to catch Ctrl-C or SIGTERM and trigger a graceful shutdown.
async fn shutdown_signal(handle: Handle, timeout: u64) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("failed to install SIGTERM handler: {err}");
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

    info!("signal received, starting graceful shutdown");
    // Force shutdown if graceful shutdown takes longer than the timeout
    handle.graceful_shutdown(Some(Duration::from_secs(timeout)));
}
