//! Upload of product videos to YouTube, with a local tracking file that
//! records what was uploaded and enforces a daily quota.

pub mod client;
pub mod error;
pub mod metadata;
pub mod tracking;
pub mod videos;

pub use client::{VideoHost, YoutubeClient};
pub use error::UploadError;
pub use metadata::VideoMetadata;
pub use tracking::Tracking;
pub use videos::{
  PendingUpload,
  PruneReport,
  UploadJob,
  UploadSummary,
  pending_uploads,
  prune_videos,
  sync_csv,
  upload_pending,
};
