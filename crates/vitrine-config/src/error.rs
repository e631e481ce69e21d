use std::io;

use thiserror::Error;

/// Error type for vitrine-config operations
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Template error: {0}")]
  Template(String),

  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  #[error("Serde error: {0}")]
  Serde(#[from] serde_json::Error),

  #[error("TOML error: {0}")]
  Toml(#[from] toml::de::Error),
}

impl ConfigError {
  pub(crate) fn invalid_value(key: &str, value: &str, expected: &str) -> Self {
    Self::Config(format!(
      "Invalid value for '{key}': '{value}'. Expected {expected}"
    ))
  }

  pub(crate) fn unknown_key(key: &str) -> Self {
    Self::Config(format!(
      "Unknown configuration key: '{key}'. See `vitrine init` for supported \
       keys."
    ))
  }
}

/// Parse a boolean override value.
pub(crate) fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
  match value.to_lowercase().as_str() {
    "true" | "yes" | "1" => Ok(true),
    "false" | "no" | "0" => Ok(false),
    _ => {
      Err(ConfigError::invalid_value(
        key,
        value,
        "true/false, yes/no, or 1/0",
      ))
    },
  }
}

/// Parse an unsigned integer override value.
pub(crate) fn parse_usize(
  key: &str,
  value: &str,
) -> Result<usize, ConfigError> {
  value
    .parse()
    .map_err(|_| ConfigError::invalid_value(key, value, "a positive integer"))
}

/// Parse an optional string, treating the empty string as unset.
pub(crate) fn parse_optional(value: &str) -> Option<String> {
  if value.is_empty() {
    None
  } else {
    Some(value.to_string())
  }
}

/// Split a comma separated list, dropping blank entries.
pub(crate) fn parse_list(value: &str) -> Vec<String> {
  value
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(ToString::to_string)
    .collect()
}
