//! Client-side BMI calculation and form checks, used when the server cannot
//! be reached.
//!
//! This is a separate implementation from the server's calculator on purpose:
//! the client must keep working without it. Both are held to the same
//! reference values in tests.

use thiserror::Error;

/// Result of a local calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalBmi {
  pub bmi:      f64,
  pub category: &'static str,
}

/// Compute BMI from centimetres and kilograms, rounded to two decimals.
pub fn calculate_locally(height_cm: f64, weight_kg: f64) -> LocalBmi {
  let height_m = height_cm / 100.0;
  let bmi = (weight_kg / height_m.powi(2) * 100.0).round() / 100.0;

  let category = match bmi {
    b if b < 18.5 => "Underweight",
    b if b < 25.0 => "Normal weight",
    b if b < 30.0 => "Overweight",
    _ => "Obese",
  };

  LocalBmi { bmi, category }
}

/// A form value that the client refuses to submit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
  #[error("Please enter valid positive numbers")]
  NotPositive,
  #[error("Height should be between 50-300 cm")]
  HeightOutOfRange,
  #[error("Weight should be between 10-500 kg")]
  WeightOutOfRange,
  #[error("Age should be between 1-120 years")]
  AgeOutOfRange,
}

/// Plausibility checks applied before anything is sent or computed.
pub fn check_form(height_cm: f64, weight_kg: f64, age: Option<u32>) -> Result<(), FormError> {
  let age_ok = age.is_none_or(|a| a > 0);
  if !(height_cm > 0.0 && weight_kg > 0.0 && age_ok) {
    return Err(FormError::NotPositive);
  }
  if !(50.0..=300.0).contains(&height_cm) {
    return Err(FormError::HeightOutOfRange);
  }
  if !(10.0..=500.0).contains(&weight_kg) {
    return Err(FormError::WeightOutOfRange);
  }
  if age.is_some_and(|a| !(1..=120).contains(&a)) {
    return Err(FormError::AgeOutOfRange);
  }
  Ok(())
}
