//! Record types: the persisted [`BmiRecord`] and its validated input,
//! [`Measurement`].
//!
//! Records are immutable: once written, no field is ever updated and no
//! record is ever deleted.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  calc::{Bmi, BmiCategory, compute},
};

// ─── Subject ─────────────────────────────────────────────────────────────────

/// Free-text identifier of the person a record belongs to.
///
/// Not tied to any account; callers that omit it are grouped under
/// [`SubjectId::ANONYMOUS`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
  pub const ANONYMOUS: &'static str = "anonymous";

  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  /// Resolve an optional caller-supplied id, treating absent or empty values
  /// as [`SubjectId::ANONYMOUS`].
  pub fn from_optional(id: Option<&str>) -> Self {
    match id {
      Some(id) if !id.is_empty() => Self::new(id),
      _ => Self::default(),
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn is_anonymous(&self) -> bool { self.0 == Self::ANONYMOUS }
}

impl Default for SubjectId {
  fn default() -> Self { Self(Self::ANONYMOUS.to_owned()) }
}

impl fmt::Display for SubjectId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Measurement ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::RecordStore::insert`].
///
/// Construction enforces that height, weight and age are positive, so the
/// calculator is never asked to work on invalid input. `bmi_value` and the
/// timestamps are always derived by the store; they are not accepted from
/// callers.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
  subject_id: SubjectId,
  height_cm:  f64,
  weight_kg:  f64,
  age_years:  u32,
  notes:      Option<String>,
}

impl Measurement {
  pub fn new(
    subject_id: SubjectId,
    height_cm: f64,
    weight_kg: f64,
    age_years: u32,
  ) -> Result<Self> {
    ensure_positive("height", height_cm)?;
    ensure_positive("weight", weight_kg)?;
    if age_years == 0 {
      return Err(Error::NonPositiveAge);
    }
    Ok(Self { subject_id, height_cm, weight_kg, age_years, notes: None })
  }

  pub fn with_notes(mut self, notes: Option<String>) -> Self {
    self.notes = notes.filter(|n| !n.trim().is_empty());
    self
  }

  pub fn subject_id(&self) -> &SubjectId { &self.subject_id }

  pub fn height_cm(&self) -> f64 { self.height_cm }

  pub fn weight_kg(&self) -> f64 { self.weight_kg }

  pub fn age_years(&self) -> u32 { self.age_years }

  pub fn notes(&self) -> Option<&str> { self.notes.as_deref() }

  /// Run the calculator over this measurement.
  pub fn bmi(&self) -> Bmi { compute(self.height_cm, self.weight_kg) }

  /// Build the record that results from storing this measurement under `id`
  /// at `at`.
  pub fn into_record(self, id: i64, at: DateTime<Utc>) -> BmiRecord {
    let Bmi { bmi, category } = self.bmi();
    BmiRecord {
      id,
      subject_id: self.subject_id,
      height: self.height_cm,
      weight: self.weight_kg,
      age: self.age_years,
      bmi_value: bmi,
      bmi_category: category,
      notes: self.notes,
      created_at: at,
      updated_at: at,
    }
  }
}

fn ensure_positive(field: &'static str, value: f64) -> Result<()> {
  if value.is_finite() && value > 0.0 {
    Ok(())
  } else {
    Err(Error::NonPositive { field, value })
  }
}

// ─── BmiRecord ───────────────────────────────────────────────────────────────

/// A stored BMI measurement. `bmi_value` and `bmi_category` are always
/// derived from `height` and `weight` at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiRecord {
  /// Server-assigned, sequential.
  pub id:           i64,
  #[serde(rename = "user_id")]
  pub subject_id:   SubjectId,
  /// Centimetres.
  pub height:       f64,
  /// Kilograms.
  pub weight:       f64,
  /// Years.
  pub age:          u32,
  pub bmi_value:    f64,
  pub bmi_category: BmiCategory,
  pub notes:        Option<String>,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_or_empty_subject_is_anonymous() {
    assert!(SubjectId::from_optional(None).is_anonymous());
    assert!(SubjectId::from_optional(Some("")).is_anonymous());
    assert_eq!(SubjectId::from_optional(Some("alice")).as_str(), "alice");
  }

  #[test]
  fn measurement_rejects_non_positive_values() {
    let anon = SubjectId::default;
    assert!(matches!(
      Measurement::new(anon(), -5.0, 70.0, 25),
      Err(Error::NonPositive { field: "height", .. })
    ));
    assert!(matches!(
      Measurement::new(anon(), 175.0, 0.0, 25),
      Err(Error::NonPositive { field: "weight", .. })
    ));
    assert!(matches!(
      Measurement::new(anon(), 175.0, f64::NAN, 25),
      Err(Error::NonPositive { field: "weight", .. })
    ));
    assert!(matches!(
      Measurement::new(anon(), 175.0, 70.0, 0),
      Err(Error::NonPositiveAge)
    ));
  }

  #[test]
  fn record_derives_bmi_from_measurement() {
    let at = Utc::now();
    let record = Measurement::new(SubjectId::new("bob"), 180.0, 80.0, 40)
      .unwrap()
      .with_notes(Some("after holidays".into()))
      .into_record(7, at);

    assert_eq!(record.id, 7);
    assert_eq!(record.bmi_value, 24.69);
    assert_eq!(record.bmi_category, BmiCategory::NormalWeight);
    assert_eq!(record.notes.as_deref(), Some("after holidays"));
    assert_eq!(record.created_at, record.updated_at);
  }

  #[test]
  fn blank_notes_are_dropped() {
    let m = Measurement::new(SubjectId::default(), 170.0, 65.0, 30)
      .unwrap()
      .with_notes(Some("   ".into()));
    assert_eq!(m.notes(), None);
  }

  #[test]
  fn record_serialises_subject_as_user_id() {
    let record = Measurement::new(SubjectId::default(), 175.0, 70.0, 25)
      .unwrap()
      .into_record(1, Utc::now());
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["user_id"], "anonymous");
    assert_eq!(json["bmi_category"], "Normal weight");
    assert_eq!(json["bmi_value"], 22.86);
  }
}
