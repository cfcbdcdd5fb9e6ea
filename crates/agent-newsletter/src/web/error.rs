//! Web-layer error type

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::NewsletterError;

/// Error returned by the web handlers
#[derive(Debug)]
pub enum AppError {
    /// 422 - The ticker was rejected
    InvalidInput(String),

    /// 502 - A data service or the model API failed
    Upstream(String),

    /// 500 - Anything else
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::InvalidInput(msg) | AppError::Upstream(msg) | AppError::Internal(msg) => msg,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Upstream(_) => "upstream_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.kind(),
            message: self.message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<NewsletterError> for AppError {
    fn from(err: NewsletterError) -> Self {
        match err {
            e if e.is_user_error() => AppError::InvalidInput(e.to_string()),
            e @ (NewsletterError::DataUnavailable { .. }
            | NewsletterError::YahooFinance(_)
            | NewsletterError::Search(_)
            | NewsletterError::Network(_)
            | NewsletterError::Workflow(_)
            | NewsletterError::Agent(_)
            | NewsletterError::Llm(_)) => AppError::Upstream(e.to_string()),
            e => AppError::Internal(e.to_string()),
        }
    }
}

impl From<minijinja::Error> for AppError {
    fn from(err: minijinja::Error) -> Self {
        AppError::Internal(format!("Template error: {err}"))
    }
}
