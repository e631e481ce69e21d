//! YouTube Data API v3 resumable upload client.

use std::{
  env,
  fs::File,
  io::{Read, Seek, SeekFrom},
  path::Path,
  thread,
  time::Duration,
};

use log::{debug, info, warn};
use reqwest::{
  StatusCode,
  blocking::{Client, RequestBuilder, Response},
  header::{CONTENT_RANGE, CONTENT_TYPE, LOCATION, RANGE},
  redirect,
};
use serde::Deserialize;
use vitrine_config::youtube::YoutubeConfig;

use crate::{error::UploadError, metadata::VideoMetadata};

/// Environment variable consulted when no token is configured.
pub const TOKEN_ENV: &str = "YOUTUBE_ACCESS_TOKEN";

const RETRIABLE_STATUS: [u16; 4] = [500, 502, 503, 504];

/// Somewhere a product video can be uploaded to.
pub trait VideoHost {
  /// Upload `video` and return the id of the created video.
  ///
  /// # Errors
  ///
  /// Returns an error if the upload fails.
  fn upload(
    &self,
    video: &Path,
    metadata: &VideoMetadata,
  ) -> Result<String, UploadError>;
}

/// Watch URL of a video id.
#[must_use]
pub fn video_url(id: &str) -> String {
  format!("https://www.youtube.com/watch?v={id}")
}

/// OAuth token: `youtube.access_token`, then `YOUTUBE_ACCESS_TOKEN`.
///
/// # Errors
///
/// Returns [`UploadError::MissingToken`] when neither is set.
pub fn access_token(config: &YoutubeConfig) -> Result<String, UploadError> {
  config
    .access_token
    .clone()
    .or_else(|| env::var(TOKEN_ENV).ok())
    .map(|token| token.trim().to_string())
    .filter(|token| !token.is_empty())
    .ok_or(UploadError::MissingToken)
}

/// MIME type announced for a video file.
#[must_use]
pub fn mime_type(path: &Path) -> &'static str {
  let extension = path
    .extension()
    .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
  match extension.as_deref() {
    Some("mp4") => "video/mp4",
    Some("webm") => "video/webm",
    Some("mov") => "video/quicktime",
    Some("avi") => "video/x-msvideo",
    Some("mkv") => "video/x-matroska",
    _ => "video/*",
  }
}

#[must_use]
pub fn is_retriable(status: u16) -> bool {
  RETRIABLE_STATUS.contains(&status)
}

/// Exponential backoff: 1s, 2s, 4s, ... capped at 64s.
#[must_use]
pub fn retry_delay(attempt: u32) -> Duration {
  Duration::from_secs(1_u64 << attempt.saturating_sub(1).min(6))
}

/// Offset to resume from after a `308 Resume Incomplete`, from its `Range`
/// header (`bytes=0-N`).
#[must_use]
pub fn next_offset(range: Option<&str>) -> Option<u64> {
  let (_, last) = range?.trim().strip_prefix("bytes=")?.split_once('-')?;
  last.trim().parse::<u64>().ok().map(|last| last + 1)
}

/// Resume position of a chunked upload. Gives up once the server answers
/// `limit` times in a row without accepting more bytes.
#[derive(Debug)]
struct ChunkProgress {
  offset: u64,
  stalls: u32,
  limit:  u32,
}

impl ChunkProgress {
  const fn new(limit: u32) -> Self {
    Self {
      offset: 0,
      stalls: 0,
      limit,
    }
  }

  fn advance(&mut self, next: u64) -> Result<u64, UploadError> {
    if next > self.offset {
      self.stalls = 0;
    } else {
      self.stalls += 1;
      if self.stalls >= self.limit {
        return Err(UploadError::Stalled {
          offset:    self.offset,
          responses: self.stalls,
        });
      }
      warn!("Upload did not advance past byte {next}, resending");
    }
    self.offset = next;
    Ok(next)
  }
}

#[derive(Deserialize)]
struct InsertedVideo {
  id: String,
}

/// Blocking client for the resumable `videos.insert` endpoint.
#[derive(Debug)]
pub struct YoutubeClient {
  http:        Client,
  token:       String,
  upload_url:  String,
  chunk_size:  usize,
  max_retries: u32,
}

impl YoutubeClient {
  /// Build a client from the YouTube settings.
  ///
  /// # Errors
  ///
  /// Returns an error if no access token is available or the HTTP client
  /// cannot be built.
  pub fn new(config: &YoutubeConfig) -> Result<Self, UploadError> {
    let token = access_token(config)?;
    let http = Client::builder()
      .connect_timeout(Duration::from_secs(30))
      .timeout(Duration::from_secs(config.timeout_secs))
      .redirect(redirect::Policy::none())
      .build()?;

    Ok(Self {
      http,
      token,
      upload_url: config.upload_url.clone(),
      chunk_size: config.chunk_size.max(256 * 1024),
      max_retries: config.max_retries.max(1),
    })
  }

  /// Send the request built by `request`, retrying on 5xx gateway errors.
  fn send(
    &self,
    request: impl Fn() -> RequestBuilder,
  ) -> Result<Response, UploadError> {
    let mut attempt = 0_u32;
    loop {
      attempt = attempt.saturating_add(1);
      let response = request().bearer_auth(&self.token).send()?;
      let status = response.status().as_u16();
      if !is_retriable(status) {
        return Ok(response);
      }
      if attempt >= self.max_retries {
        return Err(UploadError::RetriesExhausted {
          attempts: attempt,
          status,
        });
      }
      let delay = retry_delay(attempt);
      warn!(
        "YouTube returned {status}, retrying in {}s (attempt {attempt}/{})",
        delay.as_secs(),
        self.max_retries
      );
      thread::sleep(delay);
    }
  }

  fn start_session(
    &self,
    metadata: &VideoMetadata,
    length: u64,
    mime: &str,
  ) -> Result<String, UploadError> {
    let body = metadata.to_json()?;
    let response = self.send(|| {
      self
        .http
        .post(&self.upload_url)
        .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
        .header(CONTENT_TYPE, "application/json; charset=UTF-8")
        .header("X-Upload-Content-Length", length)
        .header("X-Upload-Content-Type", mime)
        .body(body.clone())
    })?;

    let status = response.status();
    if !status.is_success() {
      return Err(UploadError::Status {
        status: status.as_u16(),
        body:   response.text().unwrap_or_default(),
      });
    }
    response
      .headers()
      .get(LOCATION)
      .and_then(|value| value.to_str().ok())
      .map(ToString::to_string)
      .ok_or(UploadError::MissingField("Location header"))
  }

  fn read_chunk(
    file: &mut File,
    path: &Path,
    offset: u64,
    len: usize,
  ) -> Result<Vec<u8>, UploadError> {
    let mut buffer = vec![0; len];
    file
      .seek(SeekFrom::Start(offset))
      .and_then(|_| file.read_exact(&mut buffer))
      .map_err(|e| UploadError::io(path, e))?;
    Ok(buffer)
  }

  fn send_chunks(
    &self,
    session: &str,
    path: &Path,
    length: u64,
  ) -> Result<String, UploadError> {
    let mut file = File::open(path).map_err(|e| UploadError::io(path, e))?;
    let mut progress = ChunkProgress::new(self.max_retries);
    let mut offset = 0_u64;
    loop {
      let end = offset.saturating_add(self.chunk_size as u64).min(length);
      #[allow(
        clippy::cast_possible_truncation,
        reason = "A chunk is at most chunk_size bytes"
      )]
      let len = (end - offset) as usize;
      let chunk = Self::read_chunk(&mut file, path, offset, len)?;
      let range = format!("bytes {offset}-{}/{length}", end - 1);
      debug!("{}: sending {range}", path.display());

      let response = self.send(|| {
        self
          .http
          .put(session)
          .header(CONTENT_RANGE, range.as_str())
          .body(chunk.clone())
      })?;

      match response.status() {
        StatusCode::PERMANENT_REDIRECT => {
          let range = response
            .headers()
            .get(RANGE)
            .and_then(|value| value.to_str().ok());
          offset = progress.advance(next_offset(range).unwrap_or(0))?;
        },
        status if status.is_success() => {
          let video: InsertedVideo = response.json()?;
          return Ok(video.id);
        },
        status => {
          return Err(UploadError::Status {
            status: status.as_u16(),
            body:   response.text().unwrap_or_default(),
          });
        },
      }
    }
  }
}

impl VideoHost for YoutubeClient {
  fn upload(
    &self,
    video: &Path,
    metadata: &VideoMetadata,
  ) -> Result<String, UploadError> {
    let length = video
      .metadata()
      .map_err(|e| UploadError::io(video, e))?
      .len();
    if length == 0 {
      return Err(UploadError::EmptyVideo(video.to_path_buf()));
    }

    let session = self.start_session(metadata, length, mime_type(video))?;
    debug!("Upload session for {}: {session}", video.display());
    let id = self.send_chunks(&session, video, length)?;
    info!("Uploaded {} as {}", video.display(), video_url(&id));
    Ok(id)
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use super::*;

  #[test]
  fn test_retry_policy() {
    for status in [500, 502, 503, 504] {
      assert!(is_retriable(status));
    }
    for status in [200, 308, 400, 401, 403, 404, 501] {
      assert!(!is_retriable(status));
    }
    assert_eq!(retry_delay(1), Duration::from_secs(1));
    assert_eq!(retry_delay(3), Duration::from_secs(4));
    assert_eq!(retry_delay(20), Duration::from_secs(64));
  }

  #[test]
  fn test_next_offset() {
    assert_eq!(next_offset(Some("bytes=0-262143")), Some(262_144));
    assert_eq!(next_offset(Some("bytes=0-0")), Some(1));
    assert_eq!(next_offset(Some("garbage")), None);
    assert_eq!(next_offset(None), None);
  }

  #[test]
  fn test_chunk_progress_gives_up_when_stuck() {
    let mut progress = ChunkProgress::new(3);
    assert_eq!(progress.advance(100).unwrap(), 100);
    assert_eq!(progress.advance(100).unwrap(), 100);
    assert_eq!(progress.advance(200).unwrap(), 200);
    assert!(progress.advance(200).is_ok());
    assert!(progress.advance(200).is_ok());
    assert!(matches!(
      progress.advance(200),
      Err(UploadError::Stalled {
        offset:    200,
        responses: 3,
      })
    ));
  }

  #[test]
  fn test_mime_type() {
    assert_eq!(mime_type(Path::new("a/demo.MP4")), "video/mp4");
    assert_eq!(mime_type(Path::new("demo.mov")), "video/quicktime");
    assert_eq!(mime_type(Path::new("demo.bin")), "video/*");
  }

  #[test]
  fn test_access_token_from_config() {
    let config = YoutubeConfig {
      access_token: Some(" ya29.token \n".to_string()),
      ..YoutubeConfig::default()
    };
    assert!(matches!(access_token(&config).as_deref(), Ok("ya29.token")));
  }

  #[test]
  fn test_video_url() {
    assert_eq!(video_url("abc123"), "https://www.youtube.com/watch?v=abc123");
  }
}
