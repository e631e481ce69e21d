use std::{io, path::PathBuf};

use thiserror::Error;
use vitrine_data::DataError;

/// Error type for video uploads and upload tracking.
#[derive(Debug, Error)]
pub enum UploadError {
  #[error("I/O error on {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error(transparent)]
  Data(#[from] DataError),

  #[error("YouTube API returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("Giving up after {attempts} attempt(s), last status {status}")]
  RetriesExhausted { attempts: u32, status: u16 },

  #[error("Upload stuck at byte {offset} after {responses} response(s)")]
  Stalled { offset: u64, responses: u32 },

  #[error("Video file is empty: {0}")]
  EmptyVideo(PathBuf),

  #[error("Upload session response had no {0}")]
  MissingField(&'static str),

  #[error(
    "No YouTube access token: set youtube.access_token or \
     YOUTUBE_ACCESS_TOKEN"
  )]
  MissingToken,
}

impl UploadError {
  pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
    Self::Io {
      path: path.into(),
      source,
    }
  }
}
