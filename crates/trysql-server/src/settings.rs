//! Server configuration: an optional TOML file overlaid by `TRYSQL_*`
//! environment variables, falling back to built-in defaults.

use std::path::{Path, PathBuf};

use chrono::{TimeDelta, Utc};
use serde::Deserialize;
use trysql_core::store::DEFAULT_RETENTION;

/// Runtime server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  /// Holds `master.sqlite` and every `user_<id>.sqlite`.
  pub data_dir:       PathBuf,
  /// Seconds without a query before a tenant is swept.
  pub retention_secs: i64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:           "0.0.0.0".to_string(),
      port:           8080,
      data_dir:       PathBuf::from("./databases"),
      retention_secs: DEFAULT_RETENTION.num_seconds(),
    }
  }
}

impl ServerConfig {
  /// Read `path` (if present) and the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    let cfg: Self = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("TRYSQL").try_parsing(true))
      .build()?
      .try_deserialize()?;
    cfg.validate()?;
    Ok(cfg)
  }

  /// Retention must be positive and leave a representable cutoff.
  fn validate(&self) -> Result<(), config::ConfigError> {
    let in_range = TimeDelta::try_seconds(self.retention_secs)
      .filter(|r| *r > TimeDelta::zero())
      .is_some_and(|r| Utc::now().checked_sub_signed(r).is_some());
    if !in_range {
      return Err(config::ConfigError::Message(format!(
        "retention_secs must be a positive number of seconds, got {}",
        self.retention_secs
      )));
    }
    Ok(())
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// Falls back to the default only for values [`ServerConfig::load`] rejects.
  pub fn retention(&self) -> TimeDelta {
    TimeDelta::try_seconds(self.retention_secs).unwrap_or(DEFAULT_RETENTION)
  }

  /// `data_dir` with a leading `~` expanded to the user's home directory.
  pub fn data_dir(&self) -> PathBuf { expand_tilde(&self.data_dir) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
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
  fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = ServerConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.data_dir, PathBuf::from("./databases"));
    assert_eq!(cfg.retention(), TimeDelta::days(1));
  }

  #[test]
  fn file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = 9999\ndata_dir = \"/srv/trysql\"\nretention_secs = 60\n")
      .unwrap();

    let cfg = ServerConfig::load(&path).unwrap();
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.address(), "0.0.0.0:9999");
    assert_eq!(cfg.data_dir(), PathBuf::from("/srv/trysql"));
    assert_eq!(cfg.retention(), TimeDelta::minutes(1));
  }

  #[test]
  fn retention_must_be_positive_and_in_range() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let huge = i64::MAX.to_string();
    for bad in ["0", "-60", huge.as_str()] {
      std::fs::write(&path, format!("retention_secs = {bad}\n")).unwrap();
      let err = ServerConfig::load(&path).unwrap_err();
      assert!(err.to_string().contains("retention_secs"), "{bad}: {err}");
    }
  }

  #[test]
  fn tilde_expands_against_home() {
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(expand_tilde(Path::new("~/db")), PathBuf::from(home).join("db"));
    }
    assert_eq!(expand_tilde(Path::new("rel/db")), PathBuf::from("rel/db"));
  }
}
