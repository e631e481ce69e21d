//! Finding product videos on disk, uploading them, and cleaning them up.

use std::{
  fs,
  path::{Path, PathBuf},
};

use jiff::Zoned;
use log::{debug, error, info, warn};
use vitrine_data::{
  LanguageSite,
  ProductTable,
  layout::images_dir,
  products::{set_youtube_url, set_youtube_urls},
};
use walkdir::WalkDir;

use crate::{
  client::{VideoHost, video_url},
  error::UploadError,
  metadata::{VideoMetadata, product_url},
  tracking::Tracking,
};

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "avi", "mkv"];

#[must_use]
pub fn is_video(path: &Path) -> bool {
  path.extension().is_some_and(|ext| {
    let ext = ext.to_string_lossy();
    VIDEO_EXTENSIONS
      .iter()
      .any(|known| ext.eq_ignore_ascii_case(known))
  })
}

/// `images/products/{id}` under the site root.
#[must_use]
pub fn product_media_dir(site_root: &Path, product_id: &str) -> PathBuf {
  images_dir(site_root).join("products").join(product_id)
}

/// First video file in `dir`, by file name.
#[must_use]
pub fn find_video(dir: &Path) -> Option<PathBuf> {
  let mut videos: Vec<PathBuf> = fs::read_dir(dir)
    .ok()?
    .filter_map(Result::ok)
    .map(|entry| entry.path())
    .filter(|path| path.is_file() && is_video(path))
    .collect();
  videos.sort();
  videos.into_iter().next()
}

/// A product video waiting to be uploaded.
#[derive(Debug, Clone)]
pub struct PendingUpload {
  pub product_id: String,
  pub video:      PathBuf,
  pub metadata:   VideoMetadata,
}

/// Products of one language that have a local video and no tracked upload.
#[must_use]
pub fn pending_uploads(
  site_root: &Path,
  lang: &str,
  products: &ProductTable,
  tracking: &Tracking,
  base_url: &str,
  privacy_status: &str,
) -> Vec<PendingUpload> {
  products
    .iter()
    .filter(|product| !tracking.is_uploaded(lang, &product.id))
    .filter_map(|product| {
      let video = find_video(&product_media_dir(site_root, &product.id))?;
      let url = product_url(base_url, &product.id);
      let Some(metadata) =
        VideoMetadata::for_product(product, &url, privacy_status)
      else {
        warn!("[{lang}] Product {} has no title, skipping", product.id);
        return None;
      };
      Some(PendingUpload {
        product_id: product.id.clone(),
        video,
        metadata,
      })
    })
    .collect()
}

/// Where and how one language's uploads are recorded.
#[derive(Debug, Clone)]
pub struct UploadJob<'a> {
  pub lang:          &'a str,
  pub products_csv:  &'a Path,
  pub tracking_file: &'a Path,
  pub quota:         Option<usize>,
  pub dry_run:       bool,
}

/// Counters of an upload run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UploadSummary {
  pub uploaded: usize,
  /// Listed but not uploaded because of `--dry-run`.
  pub planned:  usize,
  pub failed:   usize,
  /// Left for another day by the quota.
  pub deferred: usize,
}

impl UploadSummary {
  #[must_use]
  pub const fn is_success(&self) -> bool {
    self.failed == 0
  }
}

/// Upload `pending` videos within today's quota.
///
/// Only successful uploads (or, with `--dry-run`, planned ones) use up the
/// quota, so a failed video does not keep the next one from being tried.
/// Each success is recorded in the tracking file and written back to the
/// language's product CSV right away, so an interrupted run loses nothing.
/// `on_item` is called before each video is handled.
///
/// # Errors
///
/// Returns an error only if the tracking file cannot be saved; failed
/// uploads are logged and counted.
pub fn upload_pending<H: VideoHost>(
  host: &H,
  job: &UploadJob<'_>,
  pending: &[PendingUpload],
  tracking: &mut Tracking,
  mut on_item: impl FnMut(&PendingUpload),
) -> Result<UploadSummary, UploadError> {
  let mut summary = UploadSummary::default();
  let budget = tracking
    .remaining(job.quota, &Zoned::now())
    .unwrap_or(usize::MAX);

  for (handled, item) in pending.iter().enumerate() {
    if summary.uploaded + summary.planned >= budget {
      summary.deferred = pending.len() - handled;
      info!(
        "[{}] Daily quota of {budget} reached, {} upload(s) left for later",
        job.lang, summary.deferred
      );
      break;
    }

    on_item(item);
    if job.dry_run {
      info!(
        "[{}] Would upload {} as \"{}\"",
        job.lang,
        item.video.display(),
        item.metadata.title
      );
      summary.planned += 1;
      continue;
    }

    let id = match host.upload(&item.video, &item.metadata) {
      Ok(id) => id,
      Err(e) => {
        error!("[{}] Product {}: {e}", job.lang, item.product_id);
        summary.failed += 1;
        continue;
      },
    };

    let url = video_url(&id);
    tracking.record(job.lang, &item.product_id, &url, &Zoned::now());
    tracking.save(job.tracking_file)?;
    summary.uploaded += 1;

    if let Err(e) = set_youtube_url(job.products_csv, &item.product_id, &url)
    {
      warn!(
        "[{}] Uploaded {} but could not update the CSV: {e}",
        job.lang, item.product_id
      );
    }
  }
  Ok(summary)
}

/// Write every tracked URL of `site`'s language into its product CSV.
/// Returns the number of rows changed.
///
/// # Errors
///
/// Returns an error if the CSV cannot be rewritten.
pub fn sync_csv(
  site: &LanguageSite,
  tracking: &Tracking,
) -> Result<usize, UploadError> {
  let urls = tracking.urls_for(&site.code);
  if urls.is_empty() {
    debug!("[{}] No tracked uploads", site.code);
    return Ok(0);
  }
  Ok(set_youtube_urls(&site.products_csv(), &urls)?)
}

/// Video files found (and deleted unless dry-running) by a prune.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PruneReport {
  pub files: Vec<PathBuf>,
  pub bytes: u64,
}

impl PruneReport {
  #[must_use]
  #[allow(
    clippy::cast_precision_loss,
    reason = "Only used for a human-readable size"
  )]
  pub fn megabytes(&self) -> f64 {
    self.bytes as f64 / (1024.0 * 1024.0)
  }
}

/// Remove video files from the `images/products/*/` folders.
///
/// # Errors
///
/// Returns an error if a file cannot be inspected or deleted.
pub fn prune_videos(
  site_root: &Path,
  dry_run: bool,
) -> Result<PruneReport, UploadError> {
  let products = images_dir(site_root).join("products");
  let mut report = PruneReport::default();
  let videos = WalkDir::new(&products)
    .min_depth(2)
    .max_depth(2)
    .sort_by_file_name()
    .into_iter()
    .filter_map(Result::ok)
    .filter(|entry| entry.file_type().is_file() && is_video(entry.path()));

  for entry in videos {
    let path = entry.into_path();
    let size = fs::metadata(&path)
      .map_err(|e| UploadError::io(&path, e))?
      .len();
    if dry_run {
      info!("Would delete {}", path.display());
    } else {
      fs::remove_file(&path).map_err(|e| UploadError::io(&path, e))?;
      debug!("Deleted {}", path.display());
    }
    report.bytes += size;
    report.files.push(path);
  }
  Ok(report)
}
