//! Listener lifecycle: bind, serve, drain on shutdown signal.

use std::future::Future;

use tokio::net::TcpListener;

use vitalproxy_core::error::{Result, VitalError};

use crate::{app_state::AppState, config::GatewayConfig, router};

/// Build state from config and serve until Ctrl-C / SIGTERM.
pub async fn run(cfg: GatewayConfig) -> Result<()> {
    let listen = cfg.server.listen_addr()?;
    let state = AppState::new(cfg).await?;

    let listener = TcpListener::bind(listen)
        .await
        .map_err(|e| VitalError::Config(format!("failed to bind {listen}: {e}")))?;

    tracing::info!(%listen, "vitalproxy-gateway starting");
    serve(listener, state, shutdown_signal()).await
}

/// Serve on an already-bound listener. In-flight requests finish after
/// `shutdown` resolves; readiness flips to draining first.
pub async fn serve<S>(listener: TcpListener, state: AppState, shutdown: S) -> Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let metrics = state.metrics();
    let app = router::build_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            metrics.set_draining();
            tracing::info!("shutdown requested; draining");
        })
        .await
        .map_err(|e| VitalError::Internal(format!("server failed: {e}")))
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
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
