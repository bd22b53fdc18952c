//! HTTP front for the BMI tracker.
//!
//! Mounts the [`bmi_api`] router under `/api` and wraps it with the
//! cross-cutting layers: request tracing, panic recovery, CORS, and a JSON
//! 404 for unknown endpoints.

pub mod settings;

use std::{any::Any, sync::Arc};

use axum::{
  Json, Router,
  http::{HeaderValue, Method, StatusCode, header},
  response::{IntoResponse, Response},
};
use bmi_core::store::RecordStore;
use serde_json::json;
use tower_http::{
  catch_panic::CatchPanicLayer,
  cors::{AllowOrigin, CorsLayer},
  trace::TraceLayer,
};

pub use settings::ServerConfig;

/// Prefix under which the JSON API is mounted.
pub const API_PREFIX: &str = "/api";

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router for `store`.
pub fn router<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: RecordStore + 'static,
{
  let routes = Router::new()
    .nest(API_PREFIX, bmi_api::api_router(store))
    .fallback(not_found);
  with_middleware(routes, config)
}

/// Apply the cross-cutting layers. Outermost first: tracing, panic recovery,
/// CORS.
pub fn with_middleware(routes: Router, config: &ServerConfig) -> Router {
  let production = config.production;
  routes
    .layer(cors(&config.cors_origins))
    .layer(CatchPanicLayer::custom(
      move |err: Box<dyn Any + Send + 'static>| panic_response(production, err),
    ))
    .layer(TraceLayer::new_for_http())
}

async fn not_found() -> impl IntoResponse {
  (
    StatusCode::NOT_FOUND,
    Json(json!({ "message": "Endpoint not Found" })),
  )
}

// ─── CORS ─────────────────────────────────────────────────────────────────────

/// CORS for the browser front-end. A `*` entry allows any origin (without
/// credentials); otherwise only the listed origins, with credentials. With no
/// usable origin, cross-origin requests get no CORS headers.
pub fn cors(origins: &[String]) -> CorsLayer {
  let base = CorsLayer::new()
    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
    .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

  let list: Vec<HeaderValue> = origins
    .iter()
    .map(|o| o.trim())
    .filter(|o| !o.is_empty() && *o != "*")
    .filter_map(|o| HeaderValue::from_str(o).ok())
    .collect();

  if origins.iter().any(|o| o.trim() == "*") {
    base.allow_origin(AllowOrigin::any())
  } else if list.is_empty() {
    tracing::warn!("no usable CORS origins configured, cross-origin requests are refused");
    base
  } else {
    base.allow_origin(AllowOrigin::list(list)).allow_credentials(true)
  }
}

// ─── Unhandled errors ─────────────────────────────────────────────────────────

/// Turn a handler panic into a 500. In production the panic text is replaced
/// by a generic message since it may contain internal detail.
fn panic_response(production: bool, err: Box<dyn Any + Send + 'static>) -> Response {
  let detail = if let Some(s) = err.downcast_ref::<String>() {
    s.clone()
  } else if let Some(s) = err.downcast_ref::<&str>() {
    (*s).to_owned()
  } else {
    "unknown panic".to_owned()
  };
  tracing::error!(panic = %detail, "request handler panicked");

  let message = if production { "Internal error".to_owned() } else { detail };
  (
    StatusCode::INTERNAL_SERVER_ERROR,
    Json(json!({ "message": message })),
  )
    .into_response()
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use axum::{body::Body, http::Request, routing::get};
  use bmi_store_sqlite::SqliteStore;
  use serde_json::Value;
  use tower::ServiceExt as _;

  use super::*;

  fn test_config(production: bool) -> ServerConfig {
    ServerConfig {
      host: "127.0.0.1".to_string(),
      port: 5000,
      store_path: PathBuf::from(":memory:"),
      production,
      cors_origins: vec!["http://localhost:3000".to_string()],
    }
  }

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    router(Arc::new(store), &test_config(false))
  }

  async fn json_of(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  #[tokio::test]
  async fn api_is_mounted_under_prefix() {
    let req = Request::builder()
      .method("POST")
      .uri("/api/bmi/calculate")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(r#"{"height":175,"weight":70}"#))
      .unwrap();
    let resp = app().await.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_of(resp).await["data"]["bmi"], 22.86);
  }

  #[tokio::test]
  async fn unknown_endpoint_is_json_404() {
    for uri in ["/nope", "/api/nope"] {
      let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
      let resp = app().await.oneshot(req).await.unwrap();
      assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
      assert_eq!(json_of(resp).await["message"], "Endpoint not Found");
    }
  }

  #[tokio::test]
  async fn cors_allows_configured_origin() {
    let req = Request::builder()
      .method("OPTIONS")
      .uri("/api/bmi")
      .header(header::ORIGIN, "http://localhost:3000")
      .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
      .body(Body::empty())
      .unwrap();
    let resp = app().await.oneshot(req).await.unwrap();
    assert_eq!(
      resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
      "http://localhost:3000"
    );
    assert_eq!(
      resp.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
      "true"
    );
  }

  #[tokio::test]
  async fn cors_wildcard_allows_any_origin() {
    let layer = cors(&["*".to_string()]);
    let app = Router::new().route("/x", get(|| async { "ok" })).layer(layer);
    let req = Request::builder()
      .uri("/x")
      .header(header::ORIGIN, "https://elsewhere.example")
      .body(Body::empty())
      .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
  }

  #[tokio::test]
  async fn cors_without_usable_origins_allows_none() {
    for origins in [vec![], vec!["bad\norigin".to_string()]] {
      let app = Router::new().route("/x", get(|| async { "ok" })).layer(cors(&origins));
      let req = Request::builder()
        .uri("/x")
        .header(header::ORIGIN, "https://evil.example")
        .body(Body::empty())
        .unwrap();
      let resp = app.oneshot(req).await.unwrap();
      assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none(), "{origins:?}");
    }
  }

  async fn boom() -> &'static str { panic!("database password is hunter2") }

  async fn panic_body(production: bool) -> (StatusCode, Value) {
    let routes = Router::new().route("/boom", get(boom));
    let app = with_middleware(routes, &test_config(production));
    let req = Request::builder().uri("/boom").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    (resp.status(), json_of(resp).await)
  }

  #[tokio::test]
  async fn panic_message_is_shown_in_development() {
    let (status, body) = panic_body(false).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "database password is hunter2");
  }

  #[tokio::test]
  async fn panic_message_is_hidden_in_production() {
    let (status, body) = panic_body(true).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal error");
  }
}
