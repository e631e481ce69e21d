use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, parse_bool};

/// Configuration for HTML postprocessing
///
/// Controls minification of generated pages through `minify-html`. Pages are
/// written unminified by default so that later runs can still locate regions
/// in them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostprocessConfig {
  /// Whether to minify HTML output
  pub minify_html: bool,

  /// Remove HTML comments while minifying
  pub remove_comments: bool,
}

impl Default for PostprocessConfig {
  fn default() -> Self {
    Self {
      minify_html:     false,
      remove_comments: true,
    }
  }
}

impl PostprocessConfig {
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
      "minify_html" => self.minify_html = parse_bool(key, value)?,
      "remove_comments" => self.remove_comments = parse_bool(key, value)?,
      _ => return Err(ConfigError::unknown_key(&format!("postprocess.{key}"))),
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;

  #[test]
  fn test_postprocess_defaults() {
    let config = PostprocessConfig::default();
    assert!(!config.minify_html);
    assert!(config.remove_comments);
  }

  #[test]
  fn test_postprocess_override() {
    let mut config = PostprocessConfig::default();
    config.apply_override("minify_html", "yes").unwrap();
    config.apply_override("remove_comments", "0").unwrap();
    assert!(config.minify_html);
    assert!(!config.remove_comments);

    assert!(config.apply_override("minify_css", "true").is_err());
  }

  #[test]
  fn test_postprocess_toml() {
    let config: PostprocessConfig =
      toml::from_str("minify_html = true").unwrap();
    assert!(config.minify_html);
    assert!(config.remove_comments);
  }
}
