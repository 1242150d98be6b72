//! This file defines the desa-dashboard binary entry point.

use desa_dashboard::app;
use desa_dashboard::cli;
use desa_dashboard::metrics;
use desa_dashboard::server;
use desa_dashboard::tracing;

use std::process::exit;

/// Application entry point
#[tokio::main]
async fn main() {
    let args = cli::parse();
    if let Err(err) = tracing::init_tracing(&args) {
        eprintln!("{err}");
        exit(1)
    }
    metrics::register_metrics();
    app::init(&args);
    let service = match app::service(&args) {
        Ok(service) => service,
        Err(err) => {
            ::tracing::error!("{err}");
            exit(1)
        }
    };
    if let Err(err) = server::serve(&args, service).await {
        ::tracing::error!("{err}");
    }
    tracing::shutdown_tracing();
}
