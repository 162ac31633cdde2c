//! vitalproxy gateway binary.
//!
//! - Config: `VITALPROXY_CONFIG` / `vitalproxy.yaml` / defaults, then env overrides
//! - Logging: `RUST_LOG` (default `info`)

use tracing_subscriber::{fmt, EnvFilter};

use vitalproxy_gateway::{config, server};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let result = match config::load() {
        Ok(cfg) => server::run(cfg).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "vitalproxy-gateway failed");
        std::process::exit(1);
    }
}
