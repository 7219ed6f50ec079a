//! Runtime configuration, layered from `config.toml` and `ADVISORY_*`
//! environment variables.

use std::path::{Path, PathBuf};

use config::{
  Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState,
};
use serde::Deserialize;

/// Runtime server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  /// Shared HS256 secret used by the upstream gateway to sign service tokens.
  pub service_jwt_secret: String,
  pub service_jwt_issuer: Option<String>,
}

impl ServerConfig {
  /// Read `path` (if it exists), then let the environment override it.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    builder()?
      .add_source(File::from(path).required(false))
      .add_source(Environment::with_prefix("ADVISORY"))
      .build()?
      .try_deserialize()
  }
}

/// A builder pre-populated with defaults for every optional key.
fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
  Config::builder()
    .set_default("host", "0.0.0.0")?
    .set_default("port", 4002)?
    .set_default("store_path", "advisories.db")
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
