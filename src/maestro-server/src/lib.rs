//! Maestro server - HTTP listener for the slash command handler.
//!
//! Routes:
//! - `POST /slack/commands` - slash command webhook
//! - `GET /health` - liveness check

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use maestro_slack::{CommandHandler, MaestroConfig};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Run the listener until `shutdown` resolves.
pub async fn run_with_shutdown<F>(
    config: &MaestroConfig,
    listen_addr: &str,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let handler = Arc::new(CommandHandler::new(config)?);
    let app = create_router(handler);

    let addr: SocketAddr = listen_addr.parse()?;
    info!("Starting maestro on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Listener shut down");
    Ok(())
}

/// Create the application router.
pub fn create_router(handler: Arc<CommandHandler>) -> Router {
    routes::routes()
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}
