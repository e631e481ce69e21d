//! Rewriting of absolute URLs from an old domain to the configured one, and
//! the cross-language `site.domain` consistency check.

use std::{
  collections::BTreeMap,
  fs,
  path::{Path, PathBuf},
  sync::LazyLock,
};

use color_eyre::eyre::{Context, Result};
use log::{debug, info, warn};
use regex::{Captures, Regex};
use vitrine_config::Config;
use vitrine_data::{
  LanguageSite,
  translations::{normalize_domain, raw_domain_values},
};
use walkdir::WalkDir;

use crate::output::write_if_changed;

static PLACEHOLDERS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
  #[allow(
    clippy::expect_used,
    reason = "Hardcoded regex pattern is known to be valid"
  )]
  [
    r"https?://(?:www\.)?votresite\.com",
    r"https?://localhost:\d+",
    r"https?://[\w-]+\.pages\.dev",
  ]
  .map(|pattern| Regex::new(pattern).expect("Invalid placeholder regex"))
});

static ABSOLUTE_URL: LazyLock<Regex> = LazyLock::new(|| {
  #[allow(
    clippy::expect_used,
    reason = "Hardcoded regex pattern is known to be valid"
  )]
  Regex::new(r#"https?://[^\s"'<>/]+"#).expect("Invalid URL regex")
});

/// Hosts that are never the site's own domain.
const EXTERNAL_HOSTS: &[&str] = &[
  "aliexpress",
  "google",
  "gstatic",
  "youtube",
  "youtu.be",
  "schema.org",
  "sitemaps.org",
  "w3.org",
  "cdnjs",
];

fn is_external(origin: &str) -> bool {
  EXTERNAL_HOSTS.iter().any(|host| origin.contains(host))
}

/// Scheme and host of the site domain a page currently points at.
///
/// Known placeholders are preferred; otherwise the first absolute URL that
/// does not belong to a third-party service.
#[must_use]
pub fn detect_old_domain(content: &str) -> Option<String> {
  PLACEHOLDERS
    .iter()
    .find_map(|pattern| pattern.find(content))
    .map(|m| m.as_str().to_string())
    .or_else(|| {
      ABSOLUTE_URL
        .find_iter(content)
        .map(|m| m.as_str())
        .find(|origin| !is_external(origin))
        .map(ToString::to_string)
    })
}

fn host(origin: &str) -> &str {
  origin.split_once("://").map_or(origin, |(_, host)| host)
}

/// Replace every URL on the host of `old` with `new_base`.
///
/// When `new_base` ends in a language segment that the old URL already
/// carries, the segment is not doubled.
#[must_use]
pub fn rewrite_urls(content: &str, old: &str, new_base: &str) -> String {
  let new_base = new_base.trim_end_matches('/');
  let old_host = regex::escape(host(old.trim_end_matches('/')));
  let pattern =
    format!(r#"https?://{old_host}(?P<path>/[^\s"'<>]*)?(?P<end>[^\w.\-:]|$)"#);
  let Ok(regex) = Regex::new(&pattern) else {
    warn!("Cannot build a pattern for domain {old}");
    return content.to_string();
  };

  regex
    .replace_all(content, |caps: &Captures| {
      let path = caps.name("path").map_or("", |m| m.as_str());
      let end = caps.name("end").map_or("", |m| m.as_str());
      format!("{}{end}", join_base(new_base, path))
    })
    .into_owned()
}

/// Append `path` to `base`, dropping a leading language segment that `base`
/// already ends with.
#[must_use]
pub fn join_base(base: &str, path: &str) -> String {
  let base = base.trim_end_matches('/');
  let language = base
    .split_once("://")
    .and_then(|(_, rest)| rest.split_once('/'))
    .map(|(_, segment)| format!("/{segment}"));

  let mut path = path;
  if let Some(language) = &language {
    if path == language.as_str() {
      path = "";
    } else if let Some(rest) = path
      .strip_prefix(language.as_str())
      .filter(|rest| rest.starts_with('/'))
    {
      path = rest;
    }
  }
  format!("{base}{path}")
}

/// Rewrite the URLs of one file to `new_base`. Returns whether it was
/// written.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written.
pub fn update_file(path: &Path, new_base: &str) -> Result<bool> {
  let content = fs::read_to_string(path)
    .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
  let Some(old) = detect_old_domain(&content) else {
    debug!("No domain to replace in {}", path.display());
    return Ok(false);
  };
  debug!("{}: {old} -> {new_base}", path.display());
  write_if_changed(path, &rewrite_urls(&content, &old, new_base))
}

/// Counters of a domain rewrite.
#[derive(Debug, Default, Clone, Copy)]
pub struct DomainReport {
  pub updated:   usize,
  pub unchanged: usize,
  pub failed:    usize,
}

impl DomainReport {
  fn record(&mut self, path: &Path, result: Result<bool>) {
    match result {
      Ok(true) => self.updated += 1,
      Ok(false) => self.unchanged += 1,
      Err(e) => {
        warn!("{}: {e:#}", path.display());
        self.failed += 1;
      },
    }
  }
}

fn language_files(site: &LanguageSite) -> Vec<PathBuf> {
  let mut files = vec![site.index_path()];
  for dir in [site.categories_dir(), site.products_dir(), site.legal_dir()] {
    let mut pages: Vec<PathBuf> = WalkDir::new(dir)
      .into_iter()
      .filter_map(Result::ok)
      .filter(|entry| entry.file_type().is_file())
      .map(walkdir::DirEntry::into_path)
      .filter(|path| path.extension().is_some_and(|ext| ext == "html"))
      .collect();
    pages.sort();
    files.extend(pages);
  }
  files
}

/// Point every page of a language at `domain`.
///
/// Page URLs use the language base; the root `sitemap.xml` and
/// `sitemap.html` of a language directory use the bare domain.
#[must_use]
pub fn update_language(site: &LanguageSite, domain: &str) -> DomainReport {
  let mut report = DomainReport::default();
  let base = site.base_url(domain);
  for path in language_files(site).iter().filter(|p| p.is_file()) {
    report.record(path, update_file(path, &base));
  }
  for name in ["sitemap.xml", "sitemap.html"] {
    let path = site.dir.join(name);
    if path.is_file() {
      report.record(&path, update_file(&path, domain));
    }
  }
  info!(
    "[{}] domain update: {} updated, {} unchanged, {} failed",
    site.code, report.updated, report.unchanged, report.failed
  );
  report
}

/// `site.domain` of every language, as found in its translations.
#[derive(Debug, Default)]
pub struct DomainCheck {
  pub domains: BTreeMap<String, String>,
  pub missing: Vec<String>,
}

impl DomainCheck {
  /// Whether every language declares the same domain.
  #[must_use]
  pub fn is_consistent(&self) -> bool {
    let mut values = self.domains.values();
    let Some(first) = values.next() else {
      return false;
    };
    self.missing.is_empty() && values.all(|domain| domain == first)
  }

  /// The shared domain, when consistent.
  #[must_use]
  pub fn domain(&self) -> Option<&str> {
    if self.is_consistent() {
      self.domains.values().next().map(String::as_str)
    } else {
      None
    }
  }
}

/// Collect `site.domain` from every language's translations.
///
/// # Errors
///
/// Returns an error if a translations file exists but cannot be parsed.
pub fn check_domains(languages: &[LanguageSite]) -> Result<DomainCheck> {
  let mut check = DomainCheck::default();
  for site in languages {
    let path = site.translations_path();
    let domain = if path.is_file() {
      raw_domain_values(&path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?
        .iter()
        .find_map(|value| normalize_domain(value))
    } else {
      None
    };
    match domain {
      Some(domain) => {
        check.domains.insert(site.code.clone(), domain);
      },
      None => check.missing.push(site.code.clone()),
    }
  }
  Ok(check)
}

/// Domain used by a language when rewriting: its own `site.domain`, then the
/// configured domain.
#[must_use]
pub fn target_domain(config: &Config, site: &LanguageSite) -> Option<String> {
  raw_domain_values(&site.translations_path())
    .ok()
    .and_then(|values| values.iter().find_map(|v| normalize_domain(v)))
    .or_else(|| config.domain.as_deref().and_then(normalize_domain))
}
