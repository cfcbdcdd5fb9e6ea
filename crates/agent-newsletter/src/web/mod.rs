//! Web UI: a sidebar form that runs the crew and shows the newsletter

mod error;
mod handlers;
mod markdown;
mod templates;

pub use error::AppError;
pub use markdown::render_markdown;
pub use templates::Templates;

use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::crew::Research;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub research: Arc<dyn Research>,
    pub templates: Arc<Templates>,
}

impl AppState {
    pub fn new(research: Arc<dyn Research>) -> Result<Self, minijinja::Error> {
        Ok(Self {
            research,
            templates: Arc::new(Templates::new()?),
        })
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/research", post(handlers::research_form))
        .route("/api/research", post(handlers::research_json))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the UI until the process is stopped
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Newsletter UI listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}
