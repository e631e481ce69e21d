//! Upload tracking: which product videos were uploaded, and how many uploads
//! happened on each day.

use std::{
  collections::{BTreeMap, HashMap},
  env,
  fs,
  path::Path,
};

use jiff::Zoned;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use vitrine_config::youtube::YoutubeConfig;

use crate::error::UploadError;

/// Environment variable consulted when no quota is configured.
pub const QUOTA_ENV: &str = "YOUTUBE_DAILY_QUOTA";

/// One uploaded video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRecord {
  pub lang:            String,
  pub product_id:      String,
  pub youtube_url:     String,
  pub upload_date:     String,
  pub upload_datetime: String,
}

/// Contents of the tracking file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tracking {
  pub daily_uploads: BTreeMap<String, usize>,
  /// Keyed by `{lang}_{product_id}`.
  pub uploads:       BTreeMap<String, UploadRecord>,
}

fn upload_key(lang: &str, product_id: &str) -> String {
  format!("{lang}_{product_id}")
}

fn day(now: &Zoned) -> String {
  now.strftime("%Y-%m-%d").to_string()
}

impl Tracking {
  /// Read the tracking file. A missing file is an empty history.
  ///
  /// # Errors
  ///
  /// Returns an error if the file exists but cannot be read or parsed.
  pub fn load(path: &Path) -> Result<Self, UploadError> {
    if !path.is_file() {
      debug!("No tracking file at {}, starting fresh", path.display());
      return Ok(Self::default());
    }
    let content =
      fs::read_to_string(path).map_err(|e| UploadError::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
  }

  /// Write the tracking file, creating its directory.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be written.
  pub fn save(&self, path: &Path) -> Result<(), UploadError> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).map_err(|e| UploadError::io(parent, e))?;
    }
    let content = serde_json::to_string_pretty(self)?;
    fs::write(path, content).map_err(|e| UploadError::io(path, e))
  }

  #[must_use]
  pub fn is_uploaded(&self, lang: &str, product_id: &str) -> bool {
    self.uploads.contains_key(&upload_key(lang, product_id))
  }

  #[must_use]
  pub fn uploads_on(&self, now: &Zoned) -> usize {
    self.daily_uploads.get(&day(now)).copied().unwrap_or(0)
  }

  /// Uploads left today, `None` when unlimited.
  #[must_use]
  pub fn remaining(&self, quota: Option<usize>, now: &Zoned) -> Option<usize> {
    quota.map(|quota| quota.saturating_sub(self.uploads_on(now)))
  }

  #[must_use]
  pub fn can_upload(&self, quota: Option<usize>, now: &Zoned) -> bool {
    self.remaining(quota, now).is_none_or(|left| left > 0)
  }

  /// Record a successful upload and count it against today's quota.
  pub fn record(
    &mut self,
    lang: &str,
    product_id: &str,
    youtube_url: &str,
    now: &Zoned,
  ) {
    let date = day(now);
    *self.daily_uploads.entry(date.clone()).or_default() += 1;
    self.uploads.insert(upload_key(lang, product_id), UploadRecord {
      lang:            lang.to_string(),
      product_id:      product_id.to_string(),
      youtube_url:     youtube_url.to_string(),
      upload_date:     date,
      upload_datetime: now.strftime("%Y-%m-%dT%H:%M:%S").to_string(),
    });
  }

  /// Tracked video URLs of one language, by product id.
  #[must_use]
  pub fn urls_for(&self, lang: &str) -> HashMap<String, String> {
    self
      .uploads
      .values()
      .filter(|record| record.lang == lang && !record.youtube_url.is_empty())
      .map(|record| (record.product_id.clone(), record.youtube_url.clone()))
      .collect()
  }
}

/// Daily upload quota: `youtube.daily_quota`, then `YOUTUBE_DAILY_QUOTA`.
#[must_use]
pub fn daily_quota(config: &YoutubeConfig) -> Option<usize> {
  config.daily_quota.or_else(|| {
    let value = env::var(QUOTA_ENV).ok()?;
    value
      .trim()
      .parse()
      .inspect_err(|_| warn!("Ignoring invalid {QUOTA_ENV}={value}"))
      .ok()
  })
}
