//! Runtime server configuration.
//!
//! Layered from built-in defaults, an optional TOML file, and `BMI_*`
//! environment variables (highest precedence).

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Origins allowed by default: the local development front-ends.
pub const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:3001"];

/// Runtime server configuration, deserialised from `config.toml` and the
/// environment.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:         String,
  pub port:         u16,
  /// SQLite file; `:memory:` keeps everything in RAM.
  pub store_path:   PathBuf,
  /// When set, messages of unexpected errors are replaced by a generic one.
  pub production:   bool,
  /// Browser origins allowed by CORS; a single `*` allows any origin.
  pub cors_origins: Vec<String>,
}

impl ServerConfig {
  /// Load configuration from `file` (if it exists) and `BMI_*` variables.
  pub fn load(file: &Path) -> Result<Self, config::ConfigError> {
    Self::load_with_env(file, None)
  }

  /// As [`load`](Self::load), reading `BMI_*` variables from `env` instead of
  /// the process environment when given.
  pub fn load_with_env(
    file: &Path,
    env: Option<config::Map<String, String>>,
  ) -> Result<Self, config::ConfigError> {
    Self::builder()?
      .add_source(config::File::from(file).required(false))
      .add_source(
        config::Environment::with_prefix("BMI")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("cors_origins")
          .source(env),
      )
      .build()?
      .try_deserialize()
  }

  fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
  {
    config::Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", 5000)?
      .set_default("store_path", "bmi.sqlite3")?
      .set_default("production", false)?
      .set_default("cors_origins", DEFAULT_CORS_ORIGINS.to_vec())
  }

  /// Whether the store should be opened in memory instead of on disk.
  pub fn in_memory(&self) -> bool { self.store_path == Path::new(":memory:") }

  /// `host:port`, ready for binding.
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_apply_without_a_file() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/bmi-config.toml")).unwrap();
    assert_eq!(cfg.port, 5000);
    assert_eq!(cfg.host, "0.0.0.0");
    assert!(!cfg.production);
    assert_eq!(cfg.cors_origins, DEFAULT_CORS_ORIGINS);
    assert_eq!(cfg.store_path, PathBuf::from("bmi.sqlite3"));
  }

  #[test]
  fn file_overrides_defaults() {
    let dir = std::env::temp_dir().join(format!("bmi-settings-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    std::fs::write(
      &path,
      "port = 8080\nproduction = true\nstore_path = \":memory:\"\ncors_origins = [\"*\"]\n",
    )
    .unwrap();

    let cfg = ServerConfig::load(&path).unwrap();
    assert_eq!(cfg.port, 8080);
    assert!(cfg.production);
    assert!(cfg.in_memory());
    assert_eq!(cfg.cors_origins, vec!["*".to_string()]);
    assert_eq!(cfg.address(), "0.0.0.0:8080");

    let _ = std::fs::remove_dir_all(&dir);
  }

  #[test]
  fn environment_overrides_file_and_splits_origins() {
    let env = [
      ("BMI_PORT", "6000"),
      ("BMI_PRODUCTION", "true"),
      ("BMI_CORS_ORIGINS", "http://a.example,http://b.example"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let missing = Path::new("/nonexistent/bmi-config.toml");
    let cfg = ServerConfig::load_with_env(missing, Some(env)).unwrap();
    assert_eq!(cfg.port, 6000);
    assert!(cfg.production);
    assert_eq!(cfg.cors_origins, vec!["http://a.example", "http://b.example"]);
    assert_eq!(cfg.host, "0.0.0.0");
  }

  #[test]
  fn tilde_is_expanded_against_home() {
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(expand_tilde(Path::new("~/bmi.db")), PathBuf::from(home).join("bmi.db"));
    }
    assert_eq!(expand_tilde(Path::new("/var/bmi.db")), PathBuf::from("/var/bmi.db"));
  }
}
