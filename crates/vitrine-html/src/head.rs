//! SEO `<head>` maintenance shared by every generated page.

use color_eyre::eyre::Result;
use log::debug;

use crate::{context::LanguageContext, dom::Page, fragments::Alternate};

pub const FAVICON_URL: &str = "/images/favicon/favicon.ico";
pub const APPLE_TOUCH_ICON_URL: &str = "/images/favicon/apple-touch-icon.png";

/// Canonical URL of a page and its `hreflang` alternates as
/// `(language, url)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternates {
  pub canonical:  String,
  pub alternates: Vec<(String, String)>,
}

/// Head values that differ per page.
#[derive(Debug, Clone, Copy)]
pub struct PageMeta<'a> {
  pub title:       &'a str,
  pub description: &'a str,
  /// Path relative to the language root, empty for the index.
  pub path:        &'a str,
}

/// Apply language, title, description, canonical links and analytics.
///
/// # Errors
///
/// Returns an error if a head partial fails to render.
pub fn apply(
  page: &Page,
  context: &LanguageContext,
  meta: &PageMeta,
) -> Result<()> {
  page.set_attr("html", "lang", &context.site.code);
  set_title(page, meta.title);
  set_description(page, meta.description);
  set_alternates(page, context, meta.path)?;
  if let Some(id) = context.config.analytics_id.as_deref() {
    add_analytics(page, context, id)?;
  }
  Ok(())
}

/// Set `<title>`, creating it when the page has none.
pub fn set_title(page: &Page, title: &str) {
  if !page.exists("head title") {
    page.append_to("head", "<title></title>");
  }
  page.set_text("head title", title);
}

/// Set `meta[name=description]`, creating it when missing.
pub fn set_description(page: &Page, description: &str) {
  if !page.exists(r#"meta[name="description"]"#) {
    page.append_to("head", r#"<meta name="description" content="">"#);
  }
  page.set_attr(r#"meta[name="description"]"#, "content", description);
}

/// Replace canonical and `hreflang` links with fresh ones at the top of
/// `<head>`.
///
/// # Errors
///
/// Returns an error if the partial fails to render.
pub fn set_alternates(
  page: &Page,
  context: &LanguageContext,
  path: &str,
) -> Result<()> {
  let removed = page.remove(r#"link[rel="canonical"]"#)
    + page.remove(r#"link[rel="alternate"][hreflang]"#);
  debug!("Removed {removed} stale canonical/alternate link(s)");

  let links = context.alternates(path);
  let alternates: Vec<Alternate> = links
    .alternates
    .into_iter()
    .map(|(lang, url)| Alternate { lang, url })
    .collect();
  let html = context.fragments.head_links(&links.canonical, &alternates)?;
  page.prepend_to("head", &html);
  Ok(())
}

/// Insert the Google tag unless the page already loads it.
///
/// # Errors
///
/// Returns an error if the partial fails to render.
pub fn add_analytics(
  page: &Page,
  context: &LanguageContext,
  id: &str,
) -> Result<()> {
  if id.is_empty() || page.exists(&format!(r#"script[src*="{id}"]"#)) {
    return Ok(());
  }
  let html = context.fragments.analytics(id)?;
  page.prepend_to("head", &html);
  Ok(())
}

/// Point every icon link at the shared favicon and add an Apple touch icon.
pub fn fix_favicon(page: &Page) {
  if !page.set_attr(r#"link[rel~="icon"]"#, "href", FAVICON_URL) {
    page.append_to(
      "head",
      &format!(r#"<link rel="icon" type="image/x-icon" href="{FAVICON_URL}">"#),
    );
  }
  if !page.exists(r#"link[rel="apple-touch-icon"]"#) {
    page.append_to(
      "head",
      &format!(r#"<link rel="apple-touch-icon" href="{APPLE_TOUCH_ICON_URL}">"#),
    );
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Fine in tests")]
  use std::path::PathBuf;

  use vitrine_config::Config;
  use vitrine_data::{LanguageSite, ProductTable, TranslationTable};

  use super::*;
  use crate::fragments::Fragments;

  const PAGE: &str = r#"<!DOCTYPE html><html lang="en"><head>
<meta charset="UTF-8">
<link rel="canonical" href="https://old.test/">
<link rel="alternate" hreflang="de" href="https://old.test/de/">
<link rel="shortcut icon" href="../../../images/favicon.png">
</head><body></body></html>"#;

  fn with_context(
    analytics: Option<&str>,
    check: impl FnOnce(&LanguageContext),
  ) {
    let config = Config {
      site_root: PathBuf::from("/site"),
      analytics_id: analytics.map(ToString::to_string),
      ..Default::default()
    };
    let languages = vec![
      LanguageSite::new(&config, "en"),
      LanguageSite::new(&config, "fr"),
    ];
    let context = LanguageContext {
      config:       &config,
      site:         &languages[1],
      languages:    &languages,
      translations: TranslationTable::default(),
      products:     ProductTable::default(),
      domain:       "https://shop.test".to_string(),
      fragments:    Fragments::new(&config).unwrap(),
    };
    check(&context);
  }

  #[test]
  fn test_apply_sets_head() {
    with_context(None, |context| {
      let page = Page::parse(PAGE);
      apply(&page, context, &PageMeta {
        title:       "Tentes & abris",
        description: "Nos tentes",
        path:        "page_html/categories/1.html",
      })
      .unwrap();

      assert_eq!(page.attr("html", "lang").as_deref(), Some("fr"));
      assert_eq!(page.text("title").as_deref(), Some("Tentes & abris"));
      assert_eq!(
        page.attr(r#"meta[name="description"]"#, "content").as_deref(),
        Some("Nos tentes")
      );
      assert_eq!(page.count(r#"link[rel="canonical"]"#), 1);
      assert_eq!(
        page.attr(r#"link[rel="canonical"]"#, "href").as_deref(),
        Some("https://shop.test/fr/page_html/categories/1.html")
      );
      assert_eq!(page.count("link[hreflang]"), 3);
      assert!(!page.exists(r#"link[hreflang="de"]"#));
      assert_eq!(
        page.attr(r#"link[hreflang="x-default"]"#, "href").as_deref(),
        Some("https://shop.test/page_html/categories/1.html")
      );
    });
  }

  #[test]
  fn test_analytics_inserted_once() {
    with_context(Some("G-TEST123"), |context| {
      let page = Page::parse(PAGE);
      let meta = PageMeta {
        title:       "t",
        description: "d",
        path:        "",
      };
      apply(&page, context, &meta).unwrap();
      apply(&page, context, &meta).unwrap();
      assert_eq!(page.count(r#"script[src*="G-TEST123"]"#), 1);
      assert_eq!(page.count(r#"link[rel="canonical"]"#), 1);
    });
  }

  #[test]
  fn test_fix_favicon() {
    let page = Page::parse(PAGE);
    fix_favicon(&page);
    fix_favicon(&page);
    assert_eq!(
      page.attr(r#"link[rel~="icon"]"#, "href").as_deref(),
      Some(FAVICON_URL)
    );
    assert_eq!(page.count(r#"link[rel="apple-touch-icon"]"#), 1);

    let bare = Page::parse("<html><head></head><body></body></html>");
    fix_favicon(&bare);
    assert!(bare.exists(r#"link[rel="icon"]"#));
  }
}
