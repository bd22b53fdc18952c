//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that lexical order in SQL matches chronological
//! order. Categories are stored as their display label.

use bmi_core::{
  BmiCategory,
  record::{BmiRecord, SubjectId},
};
use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};

use crate::error::DecodeError;

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time, truncated to the precision that survives a round trip
/// through [`encode_dt`].
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(id: i64, s: &str) -> Result<DateTime<Utc>, DecodeError> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|source| DecodeError::Timestamp { id, value: s.to_owned(), source })
}

// ─── BmiCategory ─────────────────────────────────────────────────────────────

pub fn encode_category(c: BmiCategory) -> &'static str { c.as_str() }

pub fn decode_category(id: i64, s: &str) -> Result<BmiCategory, DecodeError> {
  s.parse().map_err(|source| DecodeError::Category { id, source })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `bmi_records` row, in
/// [`crate::schema::RECORD_COLUMNS`] order.
pub struct RawRecord {
  pub id:           i64,
  pub user_id:      String,
  pub height:       f64,
  pub weight:       f64,
  pub age:          u32,
  pub bmi_value:    f64,
  pub bmi_category: String,
  pub notes:        Option<String>,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      user_id:      row.get(1)?,
      height:       row.get(2)?,
      weight:       row.get(3)?,
      age:          row.get(4)?,
      bmi_value:    row.get(5)?,
      bmi_category: row.get(6)?,
      notes:        row.get(7)?,
      created_at:   row.get(8)?,
      updated_at:   row.get(9)?,
    })
  }

  pub fn into_record(self) -> Result<BmiRecord, DecodeError> {
    Ok(BmiRecord {
      id:           self.id,
      subject_id:   SubjectId::new(self.user_id),
      height:       self.height,
      weight:       self.weight,
      age:          self.age,
      bmi_value:    self.bmi_value,
      bmi_category: decode_category(self.id, &self.bmi_category)?,
      notes:        self.notes,
      created_at:   decode_dt(self.id, &self.created_at)?,
      updated_at:   decode_dt(self.id, &self.updated_at)?,
    })
  }
}
