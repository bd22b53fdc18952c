//! The BMI calculator, a pure function from height and weight to a rounded
//! BMI value and its category.
//!
//! Callers are responsible for rejecting non-positive inputs first; the
//! validated [`Measurement`](crate::record::Measurement) type does this.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Category ────────────────────────────────────────────────────────────────

/// WHO weight classification for an adult BMI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
  Underweight,
  #[serde(rename = "Normal weight")]
  NormalWeight,
  Overweight,
  Obese,
}

impl BmiCategory {
  /// Classify an already-rounded BMI value. Lower bounds are inclusive, so
  /// 18.5, 25 and 30 each fall into the higher band.
  pub fn classify(bmi: f64) -> Self {
    if bmi < 18.5 {
      Self::Underweight
    } else if bmi < 25.0 {
      Self::NormalWeight
    } else if bmi < 30.0 {
      Self::Overweight
    } else {
      Self::Obese
    }
  }

  /// The display label, also used as the stored column value.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Underweight => "Underweight",
      Self::NormalWeight => "Normal weight",
      Self::Overweight => "Overweight",
      Self::Obese => "Obese",
    }
  }
}

impl fmt::Display for BmiCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for BmiCategory {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "Underweight" => Ok(Self::Underweight),
      "Normal weight" => Ok(Self::NormalWeight),
      "Overweight" => Ok(Self::Overweight),
      "Obese" => Ok(Self::Obese),
      other => Err(Error::UnknownCategory(other.to_owned())),
    }
  }
}

// ─── Calculation ─────────────────────────────────────────────────────────────

/// The result of a BMI calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bmi {
  /// kg/m², rounded to two decimal places.
  pub bmi:      f64,
  pub category: BmiCategory,
}

/// Round to two decimal places, halves away from zero.
pub fn round2(value: f64) -> f64 { (value * 100.0).round() / 100.0 }

/// Compute the BMI for a height in centimetres and a weight in kilograms.
pub fn compute(height_cm: f64, weight_kg: f64) -> Bmi {
  let height_m = height_cm / 100.0;
  let bmi = round2(weight_kg / (height_m * height_m));
  Bmi { bmi, category: BmiCategory::classify(bmi) }
}
