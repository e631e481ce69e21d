//! Cleanup of SEO tags left behind by a previous domain.

use std::{fs, path::Path};

use color_eyre::eyre::{Context, Result};
use log::{debug, info};
use serde_json::Value;
use vitrine_data::LanguageSite;
use vitrine_utils::{domain::join_base, output::write_if_changed};
use walkdir::WalkDir;

use crate::{StageReport, dom::Page};

/// Whether `url` lives on one of the legacy domains.
fn on_legacy_domain(url: &str, legacy: &[String]) -> bool {
  legacy.iter().any(|domain| {
    let host = url
      .split_once("://")
      .map_or(url, |(_, rest)| rest)
      .trim_start_matches("www.");
    host == domain || host.starts_with(&format!("{domain}/"))
  })
}

fn rewrite_url(url: &str, legacy: &[String], base_url: &str) -> Option<String> {
  if !on_legacy_domain(url, legacy) {
    return None;
  }
  let (_, rest) = url.split_once("://")?;
  let path = rest.find('/').map_or("", |i| &rest[i..]);
  Some(join_base(base_url, path))
}

/// Replace legacy `"url"` values anywhere in a JSON-LD document.
fn rewrite_json_urls(
  value: &mut Value,
  legacy: &[String],
  base_url: &str,
) -> bool {
  match value {
    Value::Object(map) => {
      let mut changed = false;
      for (key, entry) in map.iter_mut() {
        if key == "url"
          && let Some(url) = entry.as_str()
          && let Some(rewritten) = rewrite_url(url, legacy, base_url)
        {
          *entry = Value::String(rewritten);
          changed = true;
        } else {
          changed |= rewrite_json_urls(entry, legacy, base_url);
        }
      }
      changed
    },
    Value::Array(items) => {
      items
        .iter_mut()
        .fold(false, |changed, item| {
          rewrite_json_urls(item, legacy, base_url) | changed
        })
    },
    _ => false,
  }
}

/// Strip legacy-domain Open Graph, Twitter and canonical tags from a page and
/// point its JSON-LD URLs at `base_url`.
///
/// Returns `None` when the page has nothing to fix.
///
/// # Errors
///
/// Returns an error if the page cannot be serialized.
pub fn fix_legacy_tags(
  html: &str,
  legacy: &[String],
  base_url: &str,
) -> Result<Option<String>> {
  if legacy.is_empty()
    || !legacy.iter().any(|domain| html.contains(domain.as_str()))
  {
    return Ok(None);
  }

  let page = Page::parse(html);
  let is_legacy = |url: &str| on_legacy_domain(url, legacy);
  let mut fixed =
    page.remove_where(r#"meta[property^="og:"]"#, "content", is_legacy);
  fixed += page.remove_where(r#"meta[name^="twitter:"]"#, "content", is_legacy);
  fixed += page.remove_where(r#"link[rel="canonical"]"#, "href", is_legacy);
  fixed += page.update_text(r#"script[type="application/ld+json"]"#, |text| {
    let mut data: Value = serde_json::from_str(text).ok()?;
    if !rewrite_json_urls(&mut data, legacy, base_url) {
      return None;
    }
    let json = serde_json::to_string_pretty(&data).ok()?;
    Some(format!("\n{json}\n"))
  });

  if fixed == 0 {
    return Ok(None);
  }
  debug!("Fixed {fixed} legacy SEO tag(s)");
  page.to_html().map(Some)
}

/// Apply [`fix_legacy_tags`] to the index and every generated page of a
/// language.
#[must_use]
pub fn fix_language(
  site: &LanguageSite,
  legacy: &[String],
  base_url: &str,
) -> StageReport {
  let mut report = StageReport::default();
  let mut files = vec![site.index_path()];
  for dir in [site.products_dir(), site.categories_dir(), site.legal_dir()] {
    files.extend(
      WalkDir::new(&dir)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .map(walkdir::DirEntry::into_path)
        .filter(|path| path.extension().is_some_and(|ext| ext == "html")),
    );
  }

  for path in files.iter().filter(|path| path.is_file()) {
    report.record(path, fix_file(path, legacy, base_url));
  }
  info!("[{}] legacy SEO fix: {report}", site.code);
  report
}

fn fix_file(path: &Path, legacy: &[String], base_url: &str) -> Result<bool> {
  let html = fs::read_to_string(path)
    .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
  match fix_legacy_tags(&html, legacy, base_url)? {
    Some(fixed) => write_if_changed(path, &fixed),
    None => Ok(false),
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Fine in tests")]
  use super::*;

  const PAGE: &str = r#"<!DOCTYPE html><html><head>
<link rel="canonical" href="https://shop.test/fr/">
<meta property="og:title" content="Boutique">
<meta property="og:url" content="https://uni-ion.com/fr/">
<meta name="twitter:image" content="https://www.uni-ion.com/img.png">
<link rel="canonical" href="https://uni-ion.com/fr/">
<script type="application/ld+json">{"@type": "Organization", "url": "https://uni-ion.com/fr", "logo": {"url": "https://cdn.test/logo.png"}}</script>
</head><body></body></html>"#;

  fn legacy() -> Vec<String> {
    vec!["uni-ion.com".to_string()]
  }

  #[test]
  fn test_fix_legacy_tags() {
    let fixed = fix_legacy_tags(PAGE, &legacy(), "https://shop.test/fr")
      .unwrap()
      .unwrap();
    let page = Page::parse(&fixed);
    assert_eq!(page.count(r#"link[rel="canonical"]"#), 1);
    assert_eq!(
      page.attr(r#"link[rel="canonical"]"#, "href").as_deref(),
      Some("https://shop.test/fr/")
    );
    assert!(page.exists(r#"meta[property="og:title"]"#));
    assert!(!page.exists(r#"meta[property="og:url"]"#));
    assert!(!page.exists(r#"meta[name^="twitter:"]"#));

    let json: Value =
      serde_json::from_str(&page.text("script").unwrap()).unwrap();
    assert_eq!(json["url"], "https://shop.test/fr");
    assert_eq!(json["logo"]["url"], "https://cdn.test/logo.png");
  }

  #[test]
  fn test_json_ld_language_segment_is_not_doubled() {
    let html = r#"<html><head><script type="application/ld+json">{"url": "https://uni-ion.com/fr", "item": [{"url": "https://uni-ion.com/fr/page_html/legal/privacy.html"}]}</script></head></html>"#;
    let fixed = fix_legacy_tags(html, &legacy(), "https://shop.test/fr")
      .unwrap()
      .unwrap();
    assert!(!fixed.contains("/fr/fr"));
    let page = Page::parse(&fixed);
    let json: Value =
      serde_json::from_str(&page.text("script").unwrap()).unwrap();
    assert_eq!(json["url"], "https://shop.test/fr");
    assert_eq!(
      json["item"][0]["url"],
      "https://shop.test/fr/page_html/legal/privacy.html"
    );
  }

  #[test]
  fn test_clean_page_is_untouched() {
    let clean = r#"<html><head><link rel="canonical" href="https://shop.test/"></head></html>"#;
    assert!(fix_legacy_tags(clean, &legacy(), "https://shop.test").unwrap().is_none());
    assert!(fix_legacy_tags(PAGE, &[], "https://shop.test").unwrap().is_none());
  }

  #[test]
  fn test_fix_language_writes_changed_files() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir in test");
    let site = LanguageSite {
      code:    "fr".to_string(),
      dir:     dir.path().to_path_buf(),
      is_root: false,
    };
    fs::create_dir_all(site.products_dir()).unwrap();
    fs::write(site.index_path(), PAGE).unwrap();
    fs::write(site.products_dir().join("produit-1.html"), PAGE).unwrap();
    fs::write(site.products_dir().join("notes.txt"), PAGE).unwrap();

    let report = fix_language(&site, &legacy(), "https://shop.test/fr");
    assert_eq!(report.written, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(fs::read_to_string(site.products_dir().join("notes.txt")).unwrap(), PAGE);

    let again = fix_language(&site, &legacy(), "https://shop.test/fr");
    assert_eq!(again.written, 0);
  }
}
