use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, parse_optional, parse_usize};

/// Settings for the YouTube video upload automation.
///
/// The OAuth consent flow is out of scope: an access token with the
/// `youtube.upload` scope must be provided, either here or through the
/// `YOUTUBE_ACCESS_TOKEN` environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeConfig {
  /// OAuth access token.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub access_token: Option<String>,

  /// Maximum number of uploads per calendar day. Unlimited when unset.
  pub daily_quota: Option<usize>,

  /// Privacy status for uploaded videos (`public`, `unlisted`, `private`).
  pub privacy_status: String,

  /// Upload tracking file, relative to the site root.
  pub tracking_file: PathBuf,

  /// Size of each resumable upload chunk in bytes. Must be a multiple of
  /// 256 KiB.
  pub chunk_size: usize,

  /// Attempts per chunk on retriable server errors.
  pub max_retries: u32,

  /// Request timeout in seconds.
  pub timeout_secs: u64,

  /// Base URL of the YouTube Data API upload endpoint.
  pub upload_url: String,
}

impl Default for YoutubeConfig {
  fn default() -> Self {
    Self {
      access_token:   None,
      daily_quota:    None,
      privacy_status: "public".to_string(),
      tracking_file:  PathBuf::from("upload youtube/upload_tracking.json"),
      chunk_size:     8 * 1024 * 1024,
      max_retries:    5,
      timeout_secs:   300,
      upload_url:     "https://www.googleapis.com/upload/youtube/v3/videos"
        .to_string(),
    }
  }
}

impl YoutubeConfig {
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
      "access_token" => self.access_token = parse_optional(value),
      "daily_quota" => {
        self.daily_quota = if value.is_empty() {
          None
        } else {
          Some(parse_usize(key, value)?)
        };
      },
      "privacy_status" => {
        if !matches!(value, "public" | "unlisted" | "private") {
          return Err(ConfigError::invalid_value(
            key,
            value,
            "one of public, unlisted, private",
          ));
        }
        self.privacy_status = value.to_string();
      },
      "tracking_file" => self.tracking_file = PathBuf::from(value),
      "chunk_size" => {
        let size = parse_usize(key, value)?;
        if size == 0 || size % (256 * 1024) != 0 {
          return Err(ConfigError::invalid_value(
            key,
            value,
            "a non-zero multiple of 262144",
          ));
        }
        self.chunk_size = size;
      },
      "max_retries" => {
        self.max_retries = value.parse().map_err(|_| {
          ConfigError::invalid_value(key, value, "a positive integer")
        })?;
      },
      "timeout_secs" => {
        self.timeout_secs = value.parse().map_err(|_| {
          ConfigError::invalid_value(key, value, "a number of seconds")
        })?;
      },
      "upload_url" => self.upload_url = value.to_string(),
      _ => return Err(ConfigError::unknown_key(&format!("youtube.{key}"))),
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;

  #[test]
  fn test_chunk_size_must_be_aligned() {
    let mut config = YoutubeConfig::default();
    assert!(config.apply_override("chunk_size", "1000").is_err());
    config.apply_override("chunk_size", "524288").unwrap();
    assert_eq!(config.chunk_size, 524_288);
  }

  #[test]
  fn test_daily_quota_can_be_cleared() {
    let mut config = YoutubeConfig::default();
    config.apply_override("daily_quota", "6").unwrap();
    assert_eq!(config.daily_quota, Some(6));
    config.apply_override("daily_quota", "").unwrap();
    assert_eq!(config.daily_quota, None);
  }

  #[test]
  fn test_privacy_status_is_validated() {
    let mut config = YoutubeConfig::default();
    assert!(config.apply_override("privacy_status", "secret").is_err());
    config.apply_override("privacy_status", "unlisted").unwrap();
    assert_eq!(config.privacy_status, "unlisted");
  }
}
