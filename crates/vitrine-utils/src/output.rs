use std::{
  collections::HashSet,
  fs,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result};
use log::{debug, info};
use vitrine_config::postprocess::PostprocessConfig;

/// Apply HTML minification if enabled
///
/// # Arguments
///
/// * `content` - HTML content to process
/// * `config` - Postprocessing configuration controlling minification behavior
///
/// # Returns
///
/// The original content when `config.minify_html` is `false`, otherwise the
/// minified HTML.
#[must_use]
pub fn process_html(content: &str, config: &PostprocessConfig) -> String {
  if !config.minify_html {
    return content.to_string();
  }

  let cfg = minify_html::Cfg {
    keep_comments: !config.remove_comments,
    ..minify_html::Cfg::default()
  };

  let minified = minify_html::minify(content.as_bytes(), &cfg);
  String::from_utf8_lossy(&minified).into_owned()
}

/// Write `content` to `path` unless the file already holds exactly that.
///
/// Parent directories are created as needed. Returns whether the file was
/// written.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn write_if_changed(path: &Path, content: &str) -> Result<bool> {
  if fs::read_to_string(path).is_ok_and(|existing| existing == content) {
    debug!("Unchanged: {}", path.display());
    return Ok(false);
  }
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create directory: {}", parent.display())
    })?;
  }
  fs::write(path, content)
    .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
  debug!("Wrote {}", path.display());
  Ok(true)
}

/// Postprocess a generated page and write it if it changed.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_page(
  path: &Path,
  html: &str,
  config: &PostprocessConfig,
) -> Result<bool> {
  write_if_changed(path, &process_html(html, config))
}

/// Delete `{prefix}{id}.html` files in `dir` whose id is not in `keep`.
///
/// Returns the deleted paths. A missing directory is treated as empty.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed or a file cannot be
/// removed.
pub fn remove_orphans(
  dir: &Path,
  prefix: &str,
  keep: &HashSet<String>,
) -> Result<Vec<PathBuf>> {
  if !dir.is_dir() {
    return Ok(Vec::new());
  }

  let mut removed = Vec::new();
  let entries = fs::read_dir(dir)
    .wrap_err_with(|| format!("Failed to read directory: {}", dir.display()))?;
  for entry in entries {
    let path = entry?.path();
    let Some(id) = path
      .file_name()
      .and_then(|name| name.to_str())
      .and_then(|name| name.strip_prefix(prefix))
      .and_then(|name| name.strip_suffix(".html"))
    else {
      continue;
    };
    if keep.contains(id) {
      continue;
    }
    fs::remove_file(&path)
      .wrap_err_with(|| format!("Failed to remove {}", path.display()))?;
    info!("Removed orphaned page {}", path.display());
    removed.push(path);
  }
  removed.sort();
  Ok(removed)
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Fine in tests")]
  use super::*;

  #[test]
  fn test_process_html_respects_config() {
    let html = "<html>\n  <body>\n    <!-- note -->\n    <p>Hi</p>\n  </body>\n</html>";
    let off = PostprocessConfig::default();
    assert_eq!(process_html(html, &off), html);

    let on = PostprocessConfig {
      minify_html:     true,
      remove_comments: true,
    };
    let minified = process_html(html, &on);
    assert!(minified.len() < html.len());
    assert!(!minified.contains("note"));
  }

  #[test]
  fn test_write_if_changed() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir in test");
    let path = dir.path().join("nested/page.html");
    assert!(write_if_changed(&path, "<p>a</p>").unwrap());
    assert!(!write_if_changed(&path, "<p>a</p>").unwrap());
    assert!(write_if_changed(&path, "<p>b</p>").unwrap());
    assert_eq!(fs::read_to_string(&path).unwrap(), "<p>b</p>");
  }

  #[test]
  fn test_remove_orphans() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir in test");
    for name in ["produit-1.html", "produit-2.html", "other.html"] {
      fs::write(dir.path().join(name), "").unwrap();
    }
    let keep: HashSet<String> = ["1".to_string()].into_iter().collect();
    let removed = remove_orphans(dir.path(), "produit-", &keep).unwrap();
    assert_eq!(removed, vec![dir.path().join("produit-2.html")]);
    assert!(dir.path().join("produit-1.html").exists());
    assert!(dir.path().join("other.html").exists());

    assert!(
      remove_orphans(&dir.path().join("missing"), "produit-", &keep)
        .unwrap()
        .is_empty()
    );
  }
}
