//! Async HTTP client wrapping the BMI JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use bmi_core::{Bmi, record::BmiRecord};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Connection settings for the BMI API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub timeout:  Duration,
}

/// Body of `POST /api/bmi`.
#[derive(Debug, Clone, Serialize)]
pub struct SaveRequest {
  pub height:  f64,
  pub weight:  f64,
  pub age:     u32,
  pub user_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notes:   Option<String>,
}

/// The `{message, data}` success wrapper used by every endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
  data: T,
}

/// The `{message}` body of an error response.
#[derive(Debug, Deserialize)]
struct ErrorBody {
  message: String,
}

/// Async HTTP client for the BMI JSON REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  /// `POST /api/bmi`
  pub async fn save(&self, request: &SaveRequest) -> Result<BmiRecord> {
    let resp = self
      .client
      .post(self.url("/bmi"))
      .json(request)
      .send()
      .await
      .context("POST /bmi failed")?;
    data_of(resp, "POST /bmi").await
  }

  /// `POST /api/bmi/calculate`
  pub async fn calculate(&self, height: f64, weight: f64) -> Result<Bmi> {
    let resp = self
      .client
      .post(self.url("/bmi/calculate"))
      .json(&serde_json::json!({ "height": height, "weight": weight }))
      .send()
      .await
      .context("POST /bmi/calculate failed")?;
    data_of(resp, "POST /bmi/calculate").await
  }

  /// `GET /api/bmi?user_id=<id>[&limit=<n>]`
  pub async fn history(&self, user_id: &str, limit: Option<usize>) -> Result<Vec<BmiRecord>> {
    let mut query = vec![("user_id", user_id.to_owned())];
    if let Some(limit) = limit {
      query.push(("limit", limit.to_string()));
    }
    let resp = self
      .client
      .get(self.url("/bmi"))
      .query(&query)
      .send()
      .await
      .context("GET /bmi failed")?;
    data_of(resp, "GET /bmi").await
  }

  /// `GET /api/bmi/latest?user_id=<id>`; `None` when the subject has no
  /// records.
  pub async fn latest(&self, user_id: &str) -> Result<Option<BmiRecord>> {
    let resp = self
      .client
      .get(self.url("/bmi/latest"))
      .query(&[("user_id", user_id)])
      .send()
      .await
      .context("GET /bmi/latest failed")?;

    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    data_of(resp, "GET /bmi/latest").await.map(Some)
  }
}

/// Unwrap the `data` field of a success response, or turn an error response
/// into an error carrying the server's message.
async fn data_of<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
  let status = resp.status();
  if !status.is_success() {
    let message = resp
      .json::<ErrorBody>()
      .await
      .map(|b| b.message)
      .unwrap_or_else(|_| "no details".to_owned());
    return Err(anyhow!("{what} → {status}: {message}"));
  }
  let envelope: Envelope<T> = resp
    .json()
    .await
    .with_context(|| format!("deserialising {what} response"))?;
  Ok(envelope.data)
}
