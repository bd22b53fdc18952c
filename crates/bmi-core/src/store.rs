//! The `RecordStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `bmi-store-sqlite`).
//! Higher layers (`bmi-api`, `bmi-server`) depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use crate::record::{BmiRecord, Measurement, SubjectId};

/// Number of records returned by a history query when the caller gives no
/// usable limit.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Abstraction over a BMI record store backend.
///
/// Records are append-only: there is no update or delete.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  /// Backend error. Its `Display` must be a generic message that is safe to
  /// show to API callers; driver detail belongs in `source()`.
  type Error: std::error::Error + Send + Sync + 'static;

  /// Compute the BMI for `measurement`, persist it and return the stored
  /// record including its assigned id and timestamps.
  fn insert(
    &self,
    measurement: Measurement,
  ) -> impl Future<Output = Result<BmiRecord, Self::Error>> + Send + '_;

  /// Return up to `limit` records for `subject`, most recently created first.
  /// An unknown subject yields an empty vector.
  fn list_by_subject<'a>(
    &'a self,
    subject: &'a SubjectId,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<BmiRecord>, Self::Error>> + Send + 'a;

  /// Return the most recently created record for `subject`, or `None`.
  fn latest_by_subject<'a>(
    &'a self,
    subject: &'a SubjectId,
  ) -> impl Future<Output = Result<Option<BmiRecord>, Self::Error>> + Send + 'a;
}
