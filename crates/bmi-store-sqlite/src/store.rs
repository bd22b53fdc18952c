//! [`SqliteStore`], the SQLite implementation of [`RecordStore`].

use std::path::Path;

use bmi_core::{
  record::{BmiRecord, Measurement, SubjectId},
  store::RecordStore,
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{RawRecord, encode_category, encode_dt, now},
  schema::{RECORD_COLUMNS, SCHEMA},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A BMI record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(Error::Open)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(Error::Open)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(Error::Open)?;
    tracing::debug!("schema initialised");
    Ok(())
  }

  /// Total number of stored records across all subjects.
  pub async fn count(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM bmi_records", [], |r| r.get(0))?)
      })
      .await
      .map_err(Error::FetchHistory)?;
    Ok(n.unsigned_abs())
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  async fn insert(&self, measurement: Measurement) -> Result<BmiRecord> {
    let at  = now();
    let bmi = measurement.bmi();

    let user_id    = measurement.subject_id().as_str().to_owned();
    let height     = measurement.height_cm();
    let weight     = measurement.weight_kg();
    let age        = measurement.age_years();
    let category   = encode_category(bmi.category);
    let notes      = measurement.notes().map(str::to_owned);
    let at_str     = encode_dt(at);

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO bmi_records (
             user_id, height, weight, age, bmi_value, bmi_category,
             notes, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
          rusqlite::params![
            user_id, height, weight, age, bmi.bmi, category, notes, at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(Error::Save)?;
    tracing::debug!(id, "inserted BMI record");

    Ok(measurement.into_record(id, at))
  }

  async fn list_by_subject(
    &self,
    subject: &SubjectId,
    limit:   usize,
  ) -> Result<Vec<BmiRecord>> {
    let user_id   = subject.as_str().to_owned();
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RECORD_COLUMNS}
           FROM bmi_records
           WHERE user_id = ?1
           ORDER BY created_at DESC, id DESC
           LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_id, limit_val], RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::FetchHistory)?;

    Ok(
      raws
        .into_iter()
        .map(RawRecord::into_record)
        .collect::<Result<_, _>>()?,
    )
  }

  async fn latest_by_subject(&self, subject: &SubjectId) -> Result<Option<BmiRecord>> {
    let user_id = subject.as_str().to_owned();

    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {RECORD_COLUMNS}
               FROM bmi_records
               WHERE user_id = ?1
               ORDER BY created_at DESC, id DESC
               LIMIT 1"
            ),
            rusqlite::params![user_id],
            RawRecord::from_row,
          )
          .optional()?)
      })
      .await
      .map_err(Error::FetchLatest)?;

    Ok(raw.map(RawRecord::into_record).transpose()?)
  }
}
