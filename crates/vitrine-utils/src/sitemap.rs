//! XML sitemaps for every language plus the root sitemap index.

use std::{
  fs,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result};
use html_escape::encode_text;
use log::{debug, info, warn};
use vitrine_config::Config;
use vitrine_data::{
  LanguageSite,
  translations::{PLACEHOLDER_DOMAIN, normalize_domain, raw_domain_values},
};
use walkdir::WalkDir;

use crate::output::write_if_changed;

const XMLNS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// One `<url>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapUrl {
  pub loc:        String,
  pub lastmod:    String,
  pub changefreq: &'static str,
  pub priority:   &'static str,
}

/// What a sitemap run produced.
#[derive(Debug, Default)]
pub struct SitemapReport {
  pub domain:    String,
  /// Language code and URL count of every language sitemap.
  pub languages: Vec<(String, usize)>,
  pub combined:  bool,
  pub removed:   usize,
}

impl SitemapReport {
  #[must_use]
  pub fn total_urls(&self) -> usize {
    self.languages.iter().map(|(_, count)| count).sum()
  }
}

/// Domain used in sitemap URLs.
///
/// The root translations win, then any language's `site.domain`, then the
/// configured domain. The template placeholder is the last resort.
#[must_use]
pub fn resolve_sitemap_domain(
  config: &Config,
  languages: &[LanguageSite],
) -> String {
  let root = config.site_root.join("translations.csv");
  let mut candidates = vec![root];
  candidates.extend(languages.iter().map(LanguageSite::translations_path));

  let from_translations = candidates
    .iter()
    .filter(|path| path.is_file())
    .find_map(|path| {
      match raw_domain_values(path) {
        Ok(values) => values.iter().find_map(|value| normalize_domain(value)),
        Err(e) => {
          warn!("Could not read {}: {e}", path.display());
          None
        },
      }
    });

  from_translations
    .or_else(|| config.domain.as_deref().and_then(normalize_domain))
    .unwrap_or_else(|| {
      warn!("No domain found for sitemaps, using {PLACEHOLDER_DOMAIN}");
      PLACEHOLDER_DOMAIN.to_string()
    })
}

/// Modification date of a file as `YYYY-MM-DD`, today when unavailable.
fn lastmod(path: &Path) -> String {
  let timestamp = fs::metadata(path)
    .and_then(|meta| meta.modified())
    .ok()
    .and_then(|modified| jiff::Timestamp::try_from(modified).ok());
  match timestamp {
    Some(ts) => {
      ts.to_zoned(jiff::tz::TimeZone::system())
        .strftime("%Y-%m-%d")
        .to_string()
    },
    None => today(),
  }
}

fn today() -> String {
  jiff::Zoned::now().strftime("%Y-%m-%d").to_string()
}

/// Sorted `.html` files directly inside `dir` whose name starts with `prefix`.
fn html_files(dir: &Path, prefix: &str) -> Vec<PathBuf> {
  let mut files: Vec<PathBuf> = WalkDir::new(dir)
    .min_depth(1)
    .max_depth(1)
    .into_iter()
    .filter_map(Result::ok)
    .filter(|entry| entry.file_type().is_file())
    .map(walkdir::DirEntry::into_path)
    .filter(|path| {
      path.file_name().and_then(|n| n.to_str()).is_some_and(|name| {
        name.starts_with(prefix)
          && name.ends_with(".html")
          && name != "index.html"
      })
    })
    .collect();
  files.sort();
  files
}

/// Every sitemap entry of one language.
#[must_use]
pub fn collect_urls(site: &LanguageSite, domain: &str) -> Vec<SitemapUrl> {
  let base = site.base_url(domain);
  let mut urls = Vec::new();

  let index = site.index_path();
  if index.is_file() {
    urls.push(SitemapUrl {
      loc:        format!("{base}/"),
      lastmod:    lastmod(&index),
      changefreq: "daily",
      priority:   "1.0",
    });
  }

  let sections = [
    (site.categories_dir(), "categories", "", "weekly", "0.8"),
    (site.products_dir(), "products", "produit-", "monthly", "0.7"),
    (site.legal_dir(), "legal", "", "monthly", "0.5"),
  ];
  for (dir, section, prefix, changefreq, priority) in sections {
    for file in html_files(&dir, prefix) {
      let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
        continue;
      };
      urls.push(SitemapUrl {
        loc: format!("{base}/page_html/{section}/{name}"),
        lastmod: lastmod(&file),
        changefreq,
        priority,
      });
    }
  }
  urls
}

/// Render a `<urlset>` document.
#[must_use]
pub fn render_urlset(urls: &[SitemapUrl]) -> String {
  let mut xml = String::new();
  xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
  xml.push_str(&format!("<urlset xmlns=\"{XMLNS}\">\n"));
  for url in urls {
    xml.push_str(&format!(
      "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    \
       <changefreq>{}</changefreq>\n    <priority>{}</priority>\n  </url>\n",
      encode_text(&url.loc),
      url.lastmod,
      url.changefreq,
      url.priority
    ));
  }
  xml.push_str("</urlset>\n");
  xml
}

/// Render the `<sitemapindex>` listing each language sitemap, `en` first.
#[must_use]
pub fn render_index(domain: &str, codes: &[String], lastmod: &str) -> String {
  let mut codes: Vec<&String> = codes.iter().collect();
  codes.sort_by_key(|code| (code.as_str() != "en", code.as_str()));

  let domain = domain.trim_end_matches('/');
  let mut xml = String::new();
  xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
  xml.push_str(&format!("<sitemapindex xmlns=\"{XMLNS}\">\n"));
  for code in codes {
    xml.push_str(&format!(
      "  <sitemap>\n    <loc>{domain}/sitemap-{code}.xml</loc>\n    \
       <lastmod>{lastmod}</lastmod>\n  </sitemap>\n"
    ));
  }
  xml.push_str("</sitemapindex>\n");
  xml
}

/// Delete `sitemap*.xml` at the site root and in the language directories.
///
/// # Errors
///
/// Returns an error if a sitemap cannot be removed.
pub fn remove_old_sitemaps(
  config: &Config,
  languages: &[LanguageSite],
) -> Result<usize> {
  let mut dirs = vec![config.site_root.clone()];
  dirs.extend(
    languages
      .iter()
      .filter(|site| !site.is_root)
      .map(|site| site.dir.clone()),
  );

  let mut removed = 0;
  for dir in dirs {
    for entry in WalkDir::new(&dir)
      .min_depth(1)
      .max_depth(1)
      .into_iter()
      .filter_map(Result::ok)
    {
      let name = entry.file_name().to_string_lossy();
      if entry.file_type().is_file()
        && name.starts_with("sitemap")
        && name.ends_with(".xml")
      {
        fs::remove_file(entry.path()).wrap_err_with(|| {
          format!("Failed to remove {}", entry.path().display())
        })?;
        debug!("Removed {}", entry.path().display());
        removed += 1;
      }
    }
  }
  Ok(removed)
}

/// Regenerate every sitemap of the site.
///
/// # Errors
///
/// Returns an error if old sitemaps cannot be removed or a new one cannot be
/// written.
pub fn generate_sitemaps(
  config: &Config,
  languages: &[LanguageSite],
) -> Result<SitemapReport> {
  let settings = config.sitemap_config();
  let domain = resolve_sitemap_domain(config, languages);
  info!("Generating sitemaps for {domain}");

  let mut report = SitemapReport {
    removed: remove_old_sitemaps(config, languages)?,
    domain: domain.clone(),
    ..SitemapReport::default()
  };

  let mut all_urls = Vec::new();
  let mut codes = Vec::new();
  for site in languages {
    let urls = collect_urls(site, &domain);
    if urls.is_empty() {
      warn!("No pages found for {}, skipping its sitemap", site.code);
      continue;
    }
    let path = config.site_root.join(format!("sitemap-{}.xml", site.code));
    write_if_changed(&path, &render_urlset(&urls))?;
    info!("sitemap-{}.xml: {} URLs", site.code, urls.len());

    report.languages.push((site.code.clone(), urls.len()));
    codes.push(site.code.clone());
    all_urls.extend(urls);
  }

  let index = render_index(&domain, &codes, &today());
  write_if_changed(&config.site_root.join("sitemap.xml"), &index)?;

  if settings.combined && !all_urls.is_empty() {
    if all_urls.len() < settings.max_urls {
      let path = config.site_root.join("sitemap-all.xml");
      write_if_changed(&path, &render_urlset(&all_urls))?;
      report.combined = true;
    } else {
      info!(
        "Skipping sitemap-all.xml: {} URLs exceed the limit of {}",
        all_urls.len(),
        settings.max_urls
      );
    }
  }

  Ok(report)
}
