//! Handlers for `/bmi` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/bmi` | Body: [`CreateBody`]; returns 201 + stored record |
//! | `GET`  | `/bmi` | Optional `?user_id`, `?limit` (default 10) |
//! | `GET`  | `/bmi/latest` | Optional `?user_id`; 404 if the subject has no records |
//! | `POST` | `/bmi/calculate` | Body: [`CalculateBody`]; nothing is stored |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use bmi_core::{
  Bmi, compute,
  record::BmiRecord,
  store::RecordStore,
};
use serde::Serialize;

use crate::{
  error::ApiError,
  validate::{CalculateBody, CreateBody, HistoryParams, LatestParams},
};

/// Success body shared by every endpoint: `{message, data[, count]}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
  pub message: &'static str,
  pub data:    T,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub count:   Option<usize>,
}

impl<T> Envelope<T> {
  pub fn new(message: &'static str, data: T) -> Self {
    Self { message, data, count: None }
  }
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
  body
    .map(|Json(b)| b)
    .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /bmi`: returns 201 + the stored [`BmiRecord`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
{
  let measurement = json_body(body)?.validate()?;

  let record = store.insert(measurement).await.map_err(ApiError::store)?;
  tracing::info!(
    id = record.id,
    user_id = %record.subject_id,
    bmi = record.bmi_value,
    category = %record.bmi_category,
    "BMI record saved"
  );

  Ok((
    StatusCode::CREATED,
    Json(Envelope::new("BMI calculated and saved successfully", record)),
  ))
}

// ─── History ──────────────────────────────────────────────────────────────────

/// `GET /bmi[?user_id=<id>][&limit=<n>]`
pub async fn history<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<HistoryParams>,
) -> Result<Json<Envelope<Vec<BmiRecord>>>, ApiError>
where
  S: RecordStore,
{
  let subject = params.subject();
  let records = store
    .list_by_subject(&subject, params.limit())
    .await
    .map_err(ApiError::store)?;

  Ok(Json(Envelope {
    message: "BMI records fetched successfully",
    count:   Some(records.len()),
    data:    records,
  }))
}

// ─── Latest ───────────────────────────────────────────────────────────────────

/// `GET /bmi/latest[?user_id=<id>]`
pub async fn latest<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<LatestParams>,
) -> Result<Json<Envelope<BmiRecord>>, ApiError>
where
  S: RecordStore,
{
  let subject = params.subject();
  let record = store
    .latest_by_subject(&subject)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("No BMI records found".to_owned()))?;

  Ok(Json(Envelope::new("Latest BMI record fetched successfully", record)))
}

// ─── Calculate ────────────────────────────────────────────────────────────────

/// `POST /bmi/calculate`: pure calculation, never touches the store.
pub async fn calculate(
  body: Result<Json<CalculateBody>, JsonRejection>,
) -> Result<Json<Envelope<Bmi>>, ApiError> {
  let (height, weight) = json_body(body)?.validate()?;
  Ok(Json(Envelope::new("BMI calculated successfully", compute(height, weight))))
}
