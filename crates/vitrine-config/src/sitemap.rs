use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, parse_bool, parse_usize};

/// Sitemap generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
  /// Write `sitemap-all.xml` combining every language.
  pub combined: bool,

  /// The combined sitemap is skipped once the URL count reaches this limit.
  pub max_urls: usize,
}

impl Default for SitemapConfig {
  fn default() -> Self {
    Self {
      combined: true,
      max_urls: 50_000,
    }
  }
}

impl SitemapConfig {
  /// Apply a configuration override by key.
  ///
  /// # Errors
  ///
  /// Returns an error if the key is unknown or the value cannot be parsed.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    match key {
      "combined" => self.combined = parse_bool(key, value)?,
      "max_urls" => self.max_urls = parse_usize(key, value)?,
      _ => return Err(ConfigError::unknown_key(&format!("sitemap.{key}"))),
    }
    Ok(())
  }
}
