//! Request handlers

use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info, warn};

use super::AppState;
use super::error::AppError;
use super::markdown::render_markdown;
use crate::newsletter::Newsletter;
use crate::ticker::Ticker;

/// Form and JSON body of a research request
#[derive(Debug, Deserialize)]
pub struct ResearchRequest {
    #[serde(default)]
    pub ticker: String,
}

/// Render the page or fall back to a plain 500
fn render_page(
    state: &AppState,
    status: StatusCode,
    ticker: &str,
    error: Option<&str>,
    result_html: Option<&str>,
) -> Response {
    match state.templates.page(ticker, error, result_html) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!("Template render error: {}", e);
            AppError::from(e).into_response()
        }
    }
}

/// GET / - Research form
pub async fn index(State(state): State<AppState>) -> Response {
    render_page(&state, StatusCode::OK, "", None, None)
}

/// POST /research - Form submission
pub async fn research_form(
    State(state): State<AppState>,
    Form(form): Form<ResearchRequest>,
) -> Response {
    let ticker = match Ticker::parse(&form.ticker) {
        Ok(ticker) => ticker,
        Err(e) => {
            warn!(input = %form.ticker, "Rejected ticker: {}", e);
            let err = AppError::from(e);
            return render_page(&state, err.status(), &form.ticker, Some(err.message()), None);
        }
    };

    info!(%ticker, "POST /research");
    match state.research.research(&ticker).await {
        Ok(newsletter) => {
            let html = render_markdown(&newsletter.markdown);
            render_page(&state, StatusCode::OK, ticker.as_str(), None, Some(&html))
        }
        Err(e) => {
            error!(%ticker, "Research failed: {}", e);
            let err = AppError::from(e);
            render_page(&state, err.status(), ticker.as_str(), Some(err.message()), None)
        }
    }
}

/// POST /api/research - JSON variant returning the whole newsletter
pub async fn research_json(
    State(state): State<AppState>,
    Json(request): Json<ResearchRequest>,
) -> Result<Json<Newsletter>, AppError> {
    let ticker = Ticker::parse(&request.ticker)?;
    info!(%ticker, "POST /api/research");
    Ok(Json(state.research.research(&ticker).await?))
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
