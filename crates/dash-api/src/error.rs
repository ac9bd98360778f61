//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("report error: {0}")]
  Report(#[from] dash_core::Error),

  #[error("report task failed: {0}")]
  Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Report(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    let message = match self {
      ApiError::BadRequest(m) => m,
      other => other.to_string(),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
