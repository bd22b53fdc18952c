//! Error types for `bmi-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{field} must be a positive number, got {value}")]
  NonPositive { field: &'static str, value: f64 },

  #[error("age must be a positive whole number")]
  NonPositiveAge,

  #[error("unknown BMI category: {0:?}")]
  UnknownCategory(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
