//! Error type for `bmi-store-sqlite`.
//!
//! Every variant displays a generic, caller-safe message. The underlying
//! driver or decoding failure is only reachable through
//! [`std::error::Error::source`], so it can be logged without being echoed
//! back to API clients.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to open BMI record store")]
  Open(#[source] tokio_rusqlite::Error),

  #[error("failed to save BMI record")]
  Save(#[source] tokio_rusqlite::Error),

  #[error("failed to fetch BMI records")]
  FetchHistory(#[source] tokio_rusqlite::Error),

  #[error("failed to fetch latest BMI record")]
  FetchLatest(#[source] tokio_rusqlite::Error),

  #[error("failed to read stored BMI record")]
  Decode(#[from] DecodeError),
}

/// A row that could not be turned back into a
/// [`BmiRecord`](bmi_core::record::BmiRecord).
#[derive(Debug, Error)]
pub enum DecodeError {
  #[error("row {id}: bad timestamp {value:?}: {source}")]
  Timestamp {
    id:     i64,
    value:  String,
    source: chrono::ParseError,
  },

  #[error("row {id}: {source}")]
  Category {
    id:     i64,
    source: bmi_core::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
