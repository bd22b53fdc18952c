//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body is a JSON object with a `message` field. Validation
//! failures add a per-field `errors` map.

use std::error::Error as StdError;

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::validate::ValidationError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  /// The store's own `Display` is the caller-facing message; anything below
  /// it in the source chain is only logged.
  #[error(transparent)]
  Store(Box<dyn StdError + Send + Sync>),
}

impl ApiError {
  pub fn store<E>(e: E) -> Self
  where
    E: StdError + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Validation(v) => (StatusCode::BAD_REQUEST, Json(v)).into_response(),
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "message": m }))).into_response()
      }
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "message": m }))).into_response()
      }
      ApiError::Store(e) => {
        tracing::error!(error = %error_chain(e.as_ref()), "store operation failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "message": e.to_string() })),
        )
          .into_response()
      }
    }
  }
}

/// Render an error and all of its sources as `outer: inner: ...`.
pub fn error_chain(e: &(dyn StdError + 'static)) -> String {
  let mut out = e.to_string();
  let mut source = e.source();
  while let Some(inner) = source {
    out.push_str(": ");
    out.push_str(&inner.to_string());
    source = inner.source();
  }
  out
}
