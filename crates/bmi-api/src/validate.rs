//! Request bodies and the parse-and-validate step that turns them into domain
//! input.
//!
//! Bodies are deserialised with every numeric field as an untyped
//! [`serde_json::Value`] so that one malformed field doesn't hide the others.
//! Validation then runs in three passes, stopping at the first that fails:
//!
//! 1. presence: absent, `null` or empty-string fields are reported by name;
//! 2. parsing: values must be JSON numbers or numeric strings (and `age` a
//!    whole number), again reported by name;
//! 3. positivity: any value `<= 0` produces one combined message.

use std::collections::BTreeMap;

use bmi_core::{
  compute,
  record::{Measurement, SubjectId},
  store::DEFAULT_HISTORY_LIMIT,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ─── Error ───────────────────────────────────────────────────────────────────

/// A client-caused input problem. Serialises directly as the 400 body.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct ValidationError {
  pub message: String,
  /// One entry per validated field: the problem, or `null` if the field was
  /// fine.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub errors:  Option<BTreeMap<&'static str, Option<String>>>,
}

impl ValidationError {
  pub fn message(message: impl Into<String>) -> Self {
    Self { message: message.into(), errors: None }
  }
}

// ─── Bodies ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /bmi`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateBody {
  pub height:  Option<Value>,
  pub weight:  Option<Value>,
  pub age:     Option<Value>,
  /// Any scalar is accepted and kept as text.
  pub user_id: Option<Value>,
  pub notes:   Option<String>,
}

impl CreateBody {
  pub fn validate(self) -> Result<Measurement, ValidationError> {
    let [height, weight, age] = parse_fields(
      "Height, weight, and age",
      [
        Field::decimal("height", "Height", self.height.as_ref()),
        Field::decimal("weight", "Weight", self.weight.as_ref()),
        Field::whole("age", "Age", self.age.as_ref()),
      ],
    )?;
    check_bmi("Height, weight, and age", height, weight)?;

    let user_id = subject_text(self.user_id.as_ref())?;
    let subject = SubjectId::from_optional(user_id.as_deref());
    // `age` is a whole number in 1..=u32::MAX at this point.
    Measurement::new(subject, height, weight, age as u32)
      .map(|m| m.with_notes(self.notes))
      .map_err(|e| ValidationError::message(e.to_string()))
  }
}

/// JSON body accepted by `POST /bmi/calculate`.
#[derive(Debug, Default, Deserialize)]
pub struct CalculateBody {
  pub height: Option<Value>,
  pub weight: Option<Value>,
}

impl CalculateBody {
  /// Returns `(height_cm, weight_kg)`.
  pub fn validate(self) -> Result<(f64, f64), ValidationError> {
    let [height, weight] = parse_fields(
      "Height and weight",
      [
        Field::decimal("height", "Height", self.height.as_ref()),
        Field::decimal("weight", "Weight", self.weight.as_ref()),
      ],
    )?;
    check_bmi("Height and weight", height, weight)?;
    Ok((height, weight))
  }
}

// ─── Query parameters ────────────────────────────────────────────────────────

/// Query string for `GET /bmi`.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
  pub user_id: Option<String>,
  /// Kept as text so a malformed value falls back to the default instead of
  /// rejecting the request.
  pub limit:   Option<String>,
}

impl HistoryParams {
  pub fn subject(&self) -> SubjectId { SubjectId::from_optional(self.user_id.as_deref()) }

  pub fn limit(&self) -> usize {
    self
      .limit
      .as_deref()
      .and_then(|l| l.trim().parse::<usize>().ok())
      .filter(|&n| n > 0)
      .unwrap_or(DEFAULT_HISTORY_LIMIT)
  }
}

/// Query string for `GET /bmi/latest`.
#[derive(Debug, Default, Deserialize)]
pub struct LatestParams {
  pub user_id: Option<String>,
}

impl LatestParams {
  pub fn subject(&self) -> SubjectId { SubjectId::from_optional(self.user_id.as_deref()) }
}

// ─── Field parsing ───────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum Kind {
  Decimal,
  Whole,
}

struct Field<'a> {
  name:  &'static str,
  label: &'static str,
  kind:  Kind,
  value: Option<&'a Value>,
}

impl<'a> Field<'a> {
  fn decimal(name: &'static str, label: &'static str, value: Option<&'a Value>) -> Self {
    Self { name, label, kind: Kind::Decimal, value }
  }

  fn whole(name: &'static str, label: &'static str, value: Option<&'a Value>) -> Self {
    Self { name, label, kind: Kind::Whole, value }
  }

  fn is_missing(&self) -> bool {
    match self.value {
      None | Some(Value::Null) => true,
      Some(Value::String(s)) => s.trim().is_empty(),
      Some(_) => false,
    }
  }

  /// Parse a present value. Errors carry the per-field message.
  fn parse(&self) -> Result<f64, String> {
    let n = match self.value {
      Some(Value::Number(n)) => n.as_f64(),
      Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
      _ => None,
    }
    .filter(|n| n.is_finite())
    .ok_or_else(|| format!("{} must be a number", self.label))?;

    match self.kind {
      Kind::Decimal => Ok(n),
      Kind::Whole if n.fract() == 0.0 && n <= f64::from(u32::MAX) => Ok(n),
      Kind::Whole => Err(format!("{} must be a whole number", self.label)),
    }
  }
}

fn parse_fields<const N: usize>(
  noun: &str,
  fields: [Field<'_>; N],
) -> Result<[f64; N], ValidationError> {
  if fields.iter().any(Field::is_missing) {
    let errors = fields
      .iter()
      .map(|f| (f.name, f.is_missing().then(|| format!("{} is required", f.label))))
      .collect();
    return Err(ValidationError {
      message: format!("{noun} are required"),
      errors:  Some(errors),
    });
  }

  let parsed = fields.each_ref().map(Field::parse);
  if parsed.iter().any(Result::is_err) {
    let errors = fields
      .iter()
      .zip(&parsed)
      .map(|(f, p)| (f.name, p.as_ref().err().cloned()))
      .collect();
    return Err(ValidationError {
      message: format!("{noun} must be valid numbers"),
      errors:  Some(errors),
    });
  }

  let values = parsed.map(|p| p.unwrap_or_default());
  if values.iter().any(|&v| v <= 0.0) {
    return Err(ValidationError::message(format!("{noun} must be positive numbers")));
  }

  Ok(values)
}

/// Inputs that pass individually can still be so extreme that the BMI
/// overflows or rounds to zero.
fn check_bmi(noun: &str, height: f64, weight: f64) -> Result<(), ValidationError> {
  let bmi = compute(height, weight).bmi;
  if bmi.is_finite() && bmi > 0.0 {
    Ok(())
  } else {
    Err(ValidationError::message(format!("{noun} must be positive numbers")))
  }
}

/// `user_id` as text. `null`, `false` and `""` mean "not given".
fn subject_text(value: Option<&Value>) -> Result<Option<String>, ValidationError> {
  match value {
    None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
    Some(Value::String(s)) => Ok(Some(s.clone())),
    Some(Value::Number(n)) => Ok(Some(n.to_string())),
    Some(Value::Bool(true)) => Ok(Some("true".to_owned())),
    Some(Value::Array(_) | Value::Object(_)) => Err(ValidationError {
      message: "User id must be text".to_owned(),
      errors:  Some([("user_id", Some("User id must be text".to_owned()))].into()),
    }),
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn create(body: Value) -> Result<Measurement, ValidationError> {
    serde_json::from_value::<CreateBody>(body).unwrap().validate()
  }

  #[test]
  fn valid_body_becomes_measurement() {
    let m = create(json!({ "height": 175, "weight": 70.5, "age": 25, "user_id": "alice" }))
      .unwrap();
    assert_eq!(m.subject_id().as_str(), "alice");
    assert_eq!(m.height_cm(), 175.0);
    assert_eq!(m.weight_kg(), 70.5);
    assert_eq!(m.age_years(), 25);
  }

  #[test]
  fn numeric_strings_are_accepted() {
    let m = create(json!({ "height": "180", "weight": " 80.2 ", "age": "40" })).unwrap();
    assert_eq!(m.height_cm(), 180.0);
    assert_eq!(m.weight_kg(), 80.2);
    assert!(m.subject_id().is_anonymous());
  }

  #[test]
  fn missing_fields_are_named() {
    let err = create(json!({ "height": 175, "weight": null })).unwrap_err();
    assert_eq!(err.message, "Height, weight, and age are required");
    let errors = err.errors.unwrap();
    assert_eq!(errors["height"], None);
    assert_eq!(errors["weight"].as_deref(), Some("Weight is required"));
    assert_eq!(errors["age"].as_deref(), Some("Age is required"));
  }

  #[test]
  fn empty_string_counts_as_missing() {
    let err = create(json!({ "height": "", "weight": 70, "age": 25 })).unwrap_err();
    assert_eq!(err.errors.unwrap()["height"].as_deref(), Some("Height is required"));
  }

  #[test]
  fn presence_is_checked_before_positivity() {
    let err = create(json!({ "height": -5, "age": 25 })).unwrap_err();
    assert_eq!(err.message, "Height, weight, and age are required");
  }

  #[test]
  fn negative_value_gets_combined_message() {
    let err = create(json!({ "height": -5, "weight": 70, "age": 25 })).unwrap_err();
    assert_eq!(err.message, "Height, weight, and age must be positive numbers");
    assert!(err.errors.is_none());
  }

  #[test]
  fn zero_is_not_positive() {
    let err = create(json!({ "height": 175, "weight": 70, "age": 0 })).unwrap_err();
    assert_eq!(err.message, "Height, weight, and age must be positive numbers");
  }

  #[test]
  fn extreme_values_that_break_the_bmi_are_rejected() {
    for body in [
      json!({ "height": 1e-200, "weight": 1e200, "age": 25 }),
      json!({ "height": 1e200, "weight": 1, "age": 25 }),
    ] {
      let err = create(body).unwrap_err();
      assert_eq!(err.message, "Height, weight, and age must be positive numbers");
    }

    let body: CalculateBody =
      serde_json::from_value(json!({ "height": "1e-200", "weight": 1e200 })).unwrap();
    assert_eq!(body.validate().unwrap_err().message, "Height and weight must be positive numbers");
  }

  #[test]
  fn scalar_user_ids_become_text() {
    let m = create(json!({ "height": 175, "weight": 70, "age": 25, "user_id": 42 })).unwrap();
    assert_eq!(m.subject_id().as_str(), "42");

    let m = create(json!({ "height": 175, "weight": 70, "age": 25, "user_id": null })).unwrap();
    assert!(m.subject_id().is_anonymous());

    let err = create(json!({ "height": 175, "weight": 70, "age": 25, "user_id": ["a"] }))
      .unwrap_err();
    assert_eq!(err.errors.unwrap()["user_id"].as_deref(), Some("User id must be text"));
  }

  #[test]
  fn non_numeric_values_are_named() {
    let err = create(json!({ "height": "tall", "weight": true, "age": 25.5 })).unwrap_err();
    assert_eq!(err.message, "Height, weight, and age must be valid numbers");
    let errors = err.errors.unwrap();
    assert_eq!(errors["height"].as_deref(), Some("Height must be a number"));
    assert_eq!(errors["weight"].as_deref(), Some("Weight must be a number"));
    assert_eq!(errors["age"].as_deref(), Some("Age must be a whole number"));
  }

  #[test]
  fn non_finite_strings_are_rejected() {
    let err = create(json!({ "height": "inf", "weight": "NaN", "age": 25 })).unwrap_err();
    assert_eq!(err.message, "Height, weight, and age must be valid numbers");
  }

  #[test]
  fn calculate_needs_only_height_and_weight() {
    let body: CalculateBody =
      serde_json::from_value(json!({ "height": 160, "weight": 55 })).unwrap();
    assert_eq!(body.validate().unwrap(), (160.0, 55.0));

    let body: CalculateBody = serde_json::from_value(json!({ "height": 160 })).unwrap();
    let err = body.validate().unwrap_err();
    assert_eq!(err.message, "Height and weight are required");
    assert!(!err.errors.unwrap().contains_key("age"));
  }

  #[test]
  fn history_limit_defaults() {
    let params = |limit: Option<&str>| HistoryParams {
      user_id: None,
      limit:   limit.map(str::to_owned),
    };
    assert_eq!(params(None).limit(), DEFAULT_HISTORY_LIMIT);
    assert_eq!(params(Some("3")).limit(), 3);
    assert_eq!(params(Some("0")).limit(), DEFAULT_HISTORY_LIMIT);
    assert_eq!(params(Some("-4")).limit(), DEFAULT_HISTORY_LIMIT);
    assert_eq!(params(Some("lots")).limit(), DEFAULT_HISTORY_LIMIT);
    assert!(params(None).subject().is_anonymous());
  }

  #[test]
  fn validation_error_serialises_nulls_for_valid_fields() {
    let err = create(json!({ "weight": 70, "age": 25 })).unwrap_err();
    let body = serde_json::to_value(&err).unwrap();
    assert_eq!(
      body,
      json!({
        "message": "Height, weight, and age are required",
        "errors": { "age": null, "height": "Height is required", "weight": null }
      })
    );
  }
}
