#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Fine in tests")]

use std::{
  cell::RefCell,
  fs,
  path::{Path, PathBuf},
};

use vitrine_config::Config;
use vitrine_data::{LanguageSite, ProductTable};
use vitrine_youtube::{
  PendingUpload,
  Tracking,
  UploadError,
  UploadJob,
  VideoHost,
  VideoMetadata,
  pending_uploads,
  sync_csv,
  upload_pending,
  videos::product_media_dir,
};

const PRODUCTS: &str = "\
product_id,name,titre,description_short,youtube_url
'1005001,Tent,Dome tent,<p>Light</p>,
1005002,Lamp,,Bright,
1005003,,,,
1005004,Stove,,Hot,
";

#[derive(Default)]
struct FakeHost {
  uploaded: RefCell<Vec<String>>,
  fail_on:  Option<&'static str>,
}

impl VideoHost for FakeHost {
  fn upload(
    &self,
    video: &Path,
    metadata: &VideoMetadata,
  ) -> Result<String, UploadError> {
    if self.fail_on.is_some_and(|title| title == metadata.title) {
      return Err(UploadError::Status {
        status: 403,
        body:   "quotaExceeded".to_string(),
      });
    }
    let mut uploaded = self.uploaded.borrow_mut();
    uploaded.push(metadata.title.clone());
    assert!(video.is_file());
    Ok(format!("vid{}", uploaded.len()))
  }
}

struct Fixture {
  _dir:     tempfile::TempDir,
  config:   Config,
  site:     LanguageSite,
  tracking: PathBuf,
}

fn fixture() -> Fixture {
  let dir = tempfile::tempdir().expect("Failed to create temp dir in test");
  let config = Config {
    site_root: dir.path().to_path_buf(),
    ..Config::default()
  };
  let site = LanguageSite::new(&config, "fr");
  fs::create_dir_all(site.dir.join("CSV")).unwrap();
  fs::write(site.products_csv(), PRODUCTS).unwrap();

  for (id, file) in [
    ("1005001", "demo.mp4"),
    ("1005003", "clip.webm"),
    ("1005004", "stove.MOV"),
  ] {
    let media = product_media_dir(dir.path(), id);
    fs::create_dir_all(&media).unwrap();
    fs::write(media.join(file), b"video bytes").unwrap();
  }
  let tracking =
    dir.path().join("upload youtube").join("upload_tracking.json");
  Fixture {
    _dir: dir,
    config,
    site,
    tracking,
  }
}

fn pending(fixture: &Fixture, tracking: &Tracking) -> Vec<PendingUpload> {
  let products =
    ProductTable::load(&fixture.site.products_csv(), "fr").unwrap();
  pending_uploads(
    &fixture.config.site_root,
    "fr",
    &products,
    tracking,
    "https://shop.test/fr",
    "public",
  )
}

#[test]
fn test_pending_uploads_skip_untitled_and_videoless() {
  let fixture = fixture();
  let pending = pending(&fixture, &Tracking::default());
  let ids: Vec<&str> =
    pending.iter().map(|item| item.product_id.as_str()).collect();
  assert_eq!(ids, ["1005001", "1005004"]);
  assert_eq!(pending[0].metadata.title, "Dome tent");
  assert!(pending[0].metadata.description.starts_with(
    "Visit our website for more details: \
     https://shop.test/fr/page_html/products/produit-1005001.html\n\nLight"
  ));
}

#[test]
fn test_upload_records_and_writes_back() {
  let fixture = fixture();
  let mut tracking = Tracking::default();
  let items = pending(&fixture, &tracking);
  let host = FakeHost::default();
  let job = UploadJob {
    lang:          "fr",
    products_csv:  &fixture.site.products_csv(),
    tracking_file: &fixture.tracking,
    quota:         None,
    dry_run:       false,
  };

  let mut seen = 0;
  let summary =
    upload_pending(&host, &job, &items, &mut tracking, |_| seen += 1).unwrap();
  assert_eq!(summary.uploaded, 2);
  assert!(summary.is_success());
  assert_eq!(seen, 2);

  let saved = Tracking::load(&fixture.tracking).unwrap();
  assert!(saved.is_uploaded("fr", "1005001"));
  assert_eq!(
    saved.uploads["fr_1005004"].youtube_url,
    "https://www.youtube.com/watch?v=vid2"
  );

  let csv = fs::read_to_string(fixture.site.products_csv()).unwrap();
  assert!(csv.contains("https://www.youtube.com/watch?v=vid1"));
  assert!(
    fixture
      .site
      .products_csv()
      .with_extension("csv.backup_youtube")
      .is_file()
  );

  assert!(pending(&fixture, &saved).is_empty());
}

#[test]
fn test_quota_and_dry_run() {
  let fixture = fixture();
  let mut tracking = Tracking::default();
  let items = pending(&fixture, &tracking);
  let host = FakeHost::default();
  let mut job = UploadJob {
    lang:          "fr",
    products_csv:  &fixture.site.products_csv(),
    tracking_file: &fixture.tracking,
    quota:         Some(1),
    dry_run:       true,
  };

  let summary =
    upload_pending(&host, &job, &items, &mut tracking, |_| {}).unwrap();
  assert_eq!(summary.planned, 1);
  assert_eq!(summary.deferred, 1);
  assert!(host.uploaded.borrow().is_empty());
  assert!(!fixture.tracking.exists());

  job.dry_run = false;
  let summary =
    upload_pending(&host, &job, &items, &mut tracking, |_| {}).unwrap();
  assert_eq!(summary.uploaded, 1);

  let summary =
    upload_pending(&host, &job, &items[1..], &mut tracking, |_| {}).unwrap();
  assert_eq!(summary.uploaded, 0);
  assert_eq!(summary.deferred, 1);
}

#[test]
fn test_failed_upload_continues() {
  let fixture = fixture();
  let mut tracking = Tracking::default();
  let items = pending(&fixture, &tracking);
  let host = FakeHost {
    fail_on: Some("Dome tent"),
    ..FakeHost::default()
  };
  let job = UploadJob {
    lang:          "fr",
    products_csv:  &fixture.site.products_csv(),
    tracking_file: &fixture.tracking,
    quota:         None,
    dry_run:       false,
  };

  let summary =
    upload_pending(&host, &job, &items, &mut tracking, |_| {}).unwrap();
  assert_eq!(summary.failed, 1);
  assert_eq!(summary.uploaded, 1);
  assert!(!summary.is_success());
  assert!(!tracking.is_uploaded("fr", "1005001"));
  assert!(tracking.is_uploaded("fr", "1005004"));
}

#[test]
fn test_failed_upload_does_not_use_quota() {
  let fixture = fixture();
  let mut tracking = Tracking::default();
  let items = pending(&fixture, &tracking);
  let host = FakeHost {
    fail_on: Some("Dome tent"),
    ..FakeHost::default()
  };
  let job = UploadJob {
    lang:          "fr",
    products_csv:  &fixture.site.products_csv(),
    tracking_file: &fixture.tracking,
    quota:         Some(1),
    dry_run:       false,
  };

  let summary =
    upload_pending(&host, &job, &items, &mut tracking, |_| {}).unwrap();
  assert_eq!(summary.failed, 1);
  assert_eq!(summary.uploaded, 1);
  assert_eq!(summary.deferred, 0);
  assert!(tracking.is_uploaded("fr", "1005004"));
}

#[test]
fn test_sync_csv() {
  let fixture = fixture();
  let mut tracking = Tracking::default();
  assert_eq!(sync_csv(&fixture.site, &tracking).unwrap(), 0);

  let now = jiff::Zoned::now();
  tracking.record("fr", "1005002", "https://www.youtube.com/watch?v=x", &now);
  tracking.record("de", "1005001", "https://www.youtube.com/watch?v=y", &now);
  assert_eq!(sync_csv(&fixture.site, &tracking).unwrap(), 1);
  assert_eq!(sync_csv(&fixture.site, &tracking).unwrap(), 0);

  let products =
    ProductTable::load(&fixture.site.products_csv(), "fr").unwrap();
  assert_eq!(products.find("1005002").unwrap().youtube_id(), Some("x"));
  assert_eq!(products.find("1005001").unwrap().youtube_id(), None);
}
