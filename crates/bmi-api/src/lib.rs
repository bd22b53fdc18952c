//! JSON REST API for the BMI tracker.
//!
//! Exposes an axum [`Router`] backed by any [`bmi_core::store::RecordStore`].
//! CORS, request logging, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", bmi_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod records;
pub mod validate;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post},
};
use bmi_core::store::RecordStore;
use serde_json::{Value, json};

pub use error::ApiError;
pub use validate::ValidationError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: RecordStore + 'static,
{
  Router::new()
    .route("/bmi", get(records::history::<S>).post(records::create::<S>))
    .route("/bmi/latest", get(records::latest::<S>))
    .route("/bmi/calculate", post(records::calculate))
    .route("/heartbeat", get(heartbeat))
    .with_state(store)
}

/// `GET /heartbeat`, the liveness probe.
async fn heartbeat() -> Json<Value> { Json(json!({ "message": "OK" })) }
