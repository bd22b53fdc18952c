//! `bmi`: command-line client for the BMI tracker.
//!
//! # Usage
//!
//! ```sh
//! bmi record --height 175 --weight 70 --age 25 --user alice
//! bmi --url http://localhost:5000 history --user alice --limit 5
//! bmi --config ~/.config/bmi/config.toml latest
//! ```

mod app;
mod client;
mod local;

use std::{path::PathBuf, process::ExitCode, time::Duration};

use anyhow::{Context, Result};
use app::App;
use bmi_core::record::SubjectId;
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:5000";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "bmi", about = "Command-line client for the BMI tracker")]
struct Args {
  /// Path to a TOML config file (url, user_id).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the BMI server (default: http://localhost:5000).
  #[arg(long, env = "BMI_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Compute and store a measurement.
  Record {
    /// Height in centimetres.
    #[arg(long)]
    height: f64,
    /// Weight in kilograms.
    #[arg(long)]
    weight: f64,
    /// Age in years.
    #[arg(long)]
    age:    u32,
    #[arg(long)]
    user:   Option<String>,
    #[arg(long)]
    notes:  Option<String>,
  },
  /// Compute a BMI without storing it.
  Calculate {
    #[arg(long)]
    height: f64,
    #[arg(long)]
    weight: f64,
  },
  /// List recent measurements, newest first.
  History {
    #[arg(long)]
    user:  Option<String>,
    #[arg(long)]
    limit: Option<usize>,
  },
  /// Show the most recent measurement.
  Latest {
    #[arg(long)]
    user: Option<String>,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:     String,
  #[serde(default)]
  user_id: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
    timeout:  REQUEST_TIMEOUT,
  };
  let user_id = SubjectId::from_optional(Some(file_cfg.user_id.as_str())).to_string();

  let client = ApiClient::new(api_config)?;
  let app = App::new(client, user_id);

  let outcome = match args.command {
    Command::Record { height, weight, age, user, notes } => {
      match app.record(height, weight, age, user.as_deref(), notes).await {
        Ok(outcome) => outcome,
        Err(e) => {
          eprintln!("{e}");
          return Ok(ExitCode::FAILURE);
        }
      }
    }
    Command::Calculate { height, weight } => match app.calculate(height, weight).await {
      Ok(outcome) => outcome,
      Err(e) => {
        eprintln!("{e}");
        return Ok(ExitCode::FAILURE);
      }
    },
    Command::History { user, limit } => app.history(user.as_deref(), limit).await?,
    Command::Latest { user } => app.latest(user.as_deref()).await?,
  };

  println!("{outcome}");
  Ok(ExitCode::SUCCESS)
}
