//! Command execution: form checks, backend calls, and the local fallback.

use std::fmt::{self, Write};

use anyhow::Result;
use bmi_core::record::BmiRecord;

use crate::{
  client::{ApiClient, SaveRequest},
  local::{self, FormError},
};

/// Status line shown when a result was computed without the server.
pub const FALLBACK_NOTICE: &str = "Using local calculation (backend unavailable)";

/// What a command produced, ready to be printed.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
  Saved(BmiRecord),
  Calculated {
    bmi:      f64,
    category: String,
    local:    bool,
  },
  History(Vec<BmiRecord>),
  Latest(Option<BmiRecord>),
}

pub struct App {
  client:  ApiClient,
  user_id: String,
}

impl App {
  pub fn new(client: ApiClient, user_id: String) -> Self { Self { client, user_id } }

  fn subject<'a>(&'a self, user: Option<&'a str>) -> &'a str {
    user.unwrap_or(&self.user_id)
  }

  /// Save a measurement. When the backend cannot be used, the BMI is
  /// computed locally and nothing is stored.
  pub async fn record(
    &self,
    height: f64,
    weight: f64,
    age: u32,
    user: Option<&str>,
    notes: Option<String>,
  ) -> Result<Outcome, FormError> {
    local::check_form(height, weight, Some(age))?;

    let request = SaveRequest {
      height,
      weight,
      age,
      user_id: self.subject(user).to_owned(),
      notes,
    };
    match self.client.save(&request).await {
      Ok(record) => Ok(Outcome::Saved(record)),
      Err(e) => {
        tracing::warn!("saving record failed, falling back: {e:#}");
        Ok(fallback(height, weight))
      }
    }
  }

  /// Compute without storing, preferring the server's calculator.
  pub async fn calculate(&self, height: f64, weight: f64) -> Result<Outcome, FormError> {
    local::check_form(height, weight, None)?;

    match self.client.calculate(height, weight).await {
      Ok(bmi) => Ok(Outcome::Calculated {
        bmi:      bmi.bmi,
        category: bmi.category.to_string(),
        local:    false,
      }),
      Err(e) => {
        tracing::warn!("calculation request failed, falling back: {e:#}");
        Ok(fallback(height, weight))
      }
    }
  }

  pub async fn history(&self, user: Option<&str>, limit: Option<usize>) -> Result<Outcome> {
    let records = self.client.history(self.subject(user), limit).await?;
    Ok(Outcome::History(records))
  }

  pub async fn latest(&self, user: Option<&str>) -> Result<Outcome> {
    let record = self.client.latest(self.subject(user)).await?;
    Ok(Outcome::Latest(record))
  }
}

fn fallback(height: f64, weight: f64) -> Outcome {
  let result = local::calculate_locally(height, weight);
  Outcome::Calculated {
    bmi:      result.bmi,
    category: result.category.to_owned(),
    local:    true,
  }
}

// ─── Rendering ────────────────────────────────────────────────────────────────

fn write_record(f: &mut impl Write, r: &BmiRecord) -> fmt::Result {
  write!(
    f,
    "#{:<5} {}  {:>6.1} cm  {:>6.1} kg  age {:>3}  BMI {:>5.2}  {}",
    r.id,
    r.created_at.format("%Y-%m-%d %H:%M"),
    r.height,
    r.weight,
    r.age,
    r.bmi_value,
    r.bmi_category,
  )?;
  if let Some(notes) = &r.notes {
    write!(f, "  ({notes})")?;
  }
  Ok(())
}

impl fmt::Display for Outcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Outcome::Saved(r) => {
        writeln!(f, "BMI record saved successfully")?;
        write_record(f, r)
      }
      Outcome::Calculated { bmi, category, local } => {
        if *local {
          writeln!(f, "{FALLBACK_NOTICE}")?;
        }
        write!(f, "BMI {bmi:.2}: {category}")
      }
      Outcome::History(records) if records.is_empty() => write!(f, "No BMI records found"),
      Outcome::History(records) => {
        writeln!(f, "{} record(s)", records.len())?;
        for (i, r) in records.iter().enumerate() {
          if i > 0 {
            writeln!(f)?;
          }
          write_record(f, r)?;
        }
        Ok(())
      }
      Outcome::Latest(None) => write!(f, "No BMI records found"),
      Outcome::Latest(Some(r)) => write_record(f, r),
    }
  }
}
