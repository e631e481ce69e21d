//! `vitrine videos` subcommands.

use std::path::Path;

use color_eyre::eyre::{Context, Result, bail};
use log::{info, warn};
use vitrine_config::Config;
use vitrine_data::{LanguageSite, ProductTable};
use vitrine_youtube::{
  Tracking,
  UploadError,
  UploadJob,
  UploadSummary,
  VideoHost,
  VideoMetadata,
  YoutubeClient,
  pending_uploads,
  prune_videos,
  sync_csv,
  tracking::daily_quota,
  upload_pending,
};

use crate::{pipeline, progress};

/// Host used for `--dry-run`; never reached because nothing is uploaded.
struct NoUpload;

impl VideoHost for NoUpload {
  fn upload(
    &self,
    _video: &Path,
    _metadata: &VideoMetadata,
  ) -> Result<String, UploadError> {
    Err(UploadError::MissingToken)
  }
}

fn upload_language<H: VideoHost>(
  host: &H,
  config: &Config,
  site: &LanguageSite,
  tracking: &mut Tracking,
  dry_run: bool,
) -> Result<UploadSummary> {
  let settings = config.youtube_config();
  let csv = site.products_csv();
  if !csv.is_file() {
    warn!("[{}] No product table at {}", site.code, csv.display());
    return Ok(UploadSummary::default());
  }
  let products = ProductTable::load(&csv, &site.code)
    .wrap_err_with(|| format!("Failed to load {}", csv.display()))?;

  let pending = pending_uploads(
    &config.site_root,
    &site.code,
    &products,
    tracking,
    &pipeline::base_url(config, site),
    &settings.privacy_status,
  );
  info!("[{}] {} video(s) to upload", site.code, pending.len());
  if pending.is_empty() {
    return Ok(UploadSummary::default());
  }

  let tracking_file = config.site_root.join(&settings.tracking_file);
  let job = UploadJob {
    lang: &site.code,
    products_csv: &csv,
    tracking_file: &tracking_file,
    quota: daily_quota(&settings),
    dry_run,
  };

  let bar = progress::bar(pending.len(), "videos")?;
  let summary = upload_pending(host, &job, &pending, tracking, |item| {
    bar.set_message(item.product_id.clone());
    bar.inc(1);
  })?;
  bar.finish_and_clear();
  Ok(summary)
}

/// Upload the pending product videos of the selected languages.
///
/// # Errors
///
/// Returns an error if no access token is configured (outside `--dry-run`),
/// the tracking file is unreadable, or any upload failed.
pub fn upload(
  config: &Config,
  selected: &[&LanguageSite],
  dry_run: bool,
) -> Result<()> {
  let settings = config.youtube_config();
  let tracking_file = config.site_root.join(&settings.tracking_file);
  let mut tracking = Tracking::load(&tracking_file).wrap_err_with(|| {
    format!("Failed to read {}", tracking_file.display())
  })?;

  let mut total = UploadSummary::default();
  let client = if dry_run {
    None
  } else {
    Some(YoutubeClient::new(&settings)?)
  };
  for site in selected {
    let summary = match &client {
      Some(client) => {
        upload_language(client, config, site, &mut tracking, dry_run)?
      },
      None => {
        upload_language(&NoUpload, config, site, &mut tracking, dry_run)?
      },
    };
    total.uploaded += summary.uploaded;
    total.planned += summary.planned;
    total.failed += summary.failed;
    total.deferred += summary.deferred;
  }

  info!(
    "Videos: {} uploaded, {} planned, {} failed, {} left for later",
    total.uploaded, total.planned, total.failed, total.deferred
  );
  if !total.is_success() {
    bail!("{} upload(s) failed", total.failed);
  }
  Ok(())
}

/// Write tracked video URLs into the product tables of the selected
/// languages.
///
/// # Errors
///
/// Returns an error if the tracking file or a product table cannot be read or
/// written.
pub fn sync(config: &Config, selected: &[&LanguageSite]) -> Result<()> {
  let tracking_file =
    config.site_root.join(config.youtube_config().tracking_file);
  let tracking = Tracking::load(&tracking_file).wrap_err_with(|| {
    format!("Failed to read {}", tracking_file.display())
  })?;

  for site in selected {
    if !site.products_csv().is_file() {
      warn!("[{}] No product table, skipping", site.code);
      continue;
    }
    let changed = sync_csv(site, &tracking)
      .wrap_err_with(|| format!("Failed to update {}", site.code))?;
    info!("[{}] {changed} youtube_url value(s) updated", site.code);
  }
  Ok(())
}

/// Delete local product videos.
///
/// # Errors
///
/// Returns an error if a video cannot be deleted.
pub fn prune(config: &Config, dry_run: bool) -> Result<()> {
  let report = prune_videos(&config.site_root, dry_run)?;
  let verb = if dry_run { "Would delete" } else { "Deleted" };
  info!(
    "{verb} {} video file(s), {:.1} MB",
    report.files.len(),
    report.megabytes()
  );
  Ok(())
}
