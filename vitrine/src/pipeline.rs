//! Site-wide commands: language selection, the parallel build, and the
//! post-processing steps that run over every language.

use color_eyre::eyre::{Context, Result, bail};
use indicatif::ParallelProgressIterator;
use log::{error, info, warn};
use rayon::prelude::*;
use vitrine_config::Config;
use vitrine_data::{
  LanguageSite,
  TranslationTable,
  discover_languages,
  translations::normalize_domain,
};
use vitrine_html::{
  LanguageContext,
  PLACEHOLDER_DOMAIN,
  Stage,
  StageReport,
  context::resolve_domain,
  generate_language,
  seo,
};
use vitrine_utils::{
  check_domains,
  domain::{DomainReport, target_domain},
  generate_sitemaps,
  sitemap::SitemapReport,
  update_language,
};

use crate::progress;

/// Every language of the site, default language first.
///
/// # Errors
///
/// Returns an error if the site root cannot be read or has no language.
pub fn discover(config: &Config) -> Result<Vec<LanguageSite>> {
  let languages = discover_languages(config).wrap_err_with(|| {
    format!("Failed to scan {}", config.site_root.display())
  })?;
  if languages.is_empty() {
    bail!(
      "No language with an index.html found under {}",
      config.site_root.display()
    );
  }
  Ok(languages)
}

/// The languages named in `requested`, or all of them when it is empty.
///
/// # Errors
///
/// Returns an error if a requested language does not exist.
pub fn select<'a>(
  languages: &'a [LanguageSite],
  requested: &[String],
) -> Result<Vec<&'a LanguageSite>> {
  if requested.is_empty() {
    return Ok(languages.iter().collect());
  }
  requested
    .iter()
    .map(|code| {
      languages
        .iter()
        .find(|site| site.code.eq_ignore_ascii_case(code))
        .ok_or_else(|| {
          let available: Vec<&str> =
            languages.iter().map(|site| site.code.as_str()).collect();
          color_eyre::eyre::eyre!(
            "Unknown language '{code}' (available: {})",
            available.join(", ")
          )
        })
    })
    .collect()
}

/// Result of building one language.
#[derive(Debug)]
pub struct LanguageBuild {
  pub code:   String,
  pub pages:  StageReport,
  pub domain: Option<DomainReport>,
  /// Set when the language could not be loaded at all.
  pub error:  Option<String>,
}

impl LanguageBuild {
  #[must_use]
  pub fn is_success(&self) -> bool {
    self.error.is_none()
      && self.pages.is_success()
      && self.domain.is_none_or(|report| report.failed == 0)
  }
}

/// Outcome of a build over several languages.
#[derive(Debug, Default)]
pub struct BuildSummary {
  pub languages: Vec<LanguageBuild>,
}

impl BuildSummary {
  #[must_use]
  pub fn failed(&self) -> Vec<&str> {
    self
      .languages
      .iter()
      .filter(|build| !build.is_success())
      .map(|build| build.code.as_str())
      .collect()
  }

  #[must_use]
  pub fn is_success(&self) -> bool {
    self.failed().is_empty()
  }

  #[must_use]
  pub fn pages(&self) -> StageReport {
    let mut total = StageReport::default();
    for build in &self.languages {
      total.merge(build.pages);
    }
    total
  }
}

fn build_language(
  config: &Config,
  site: &LanguageSite,
  languages: &[LanguageSite],
  stages: &[Stage],
  rewrite_domain: bool,
) -> LanguageBuild {
  let context = match LanguageContext::load(config, site, languages) {
    Ok(context) => context,
    Err(e) => {
      error!("[{}] {e:#}", site.code);
      return LanguageBuild {
        code:   site.code.clone(),
        pages:  StageReport::default(),
        domain: None,
        error:  Some(format!("{e:#}")),
      };
    },
  };

  let pages = generate_language(&context, stages);
  info!("[{}] pages: {pages}", site.code);

  let domain = if !rewrite_domain {
    None
  } else if context.domain == PLACEHOLDER_DOMAIN {
    warn!(
      "[{}] No domain configured, leaving page URLs unchanged",
      site.code
    );
    None
  } else {
    Some(update_language(site, &context.domain))
  };

  LanguageBuild {
    code: site.code.clone(),
    pages,
    domain,
    error: None,
  }
}

/// Build the `selected` languages in parallel.
///
/// `languages` is every language of the site, used for `hreflang`
/// alternates. An empty `stages` runs every stage followed by the domain
/// rewrite; otherwise only the given stages run.
///
/// # Errors
///
/// Returns an error if the progress bar cannot be set up. Per-language
/// failures are reported in the summary.
pub fn build(
  config: &Config,
  languages: &[LanguageSite],
  selected: &[&LanguageSite],
  stages: &[Stage],
) -> Result<BuildSummary> {
  let (stages, rewrite_domain) = if stages.is_empty() {
    (Stage::ALL.as_slice(), true)
  } else {
    (stages, false)
  };
  info!(
    "Building {} language(s): {}",
    selected.len(),
    stages
      .iter()
      .map(ToString::to_string)
      .collect::<Vec<_>>()
      .join(", ")
  );

  let bar = progress::bar(selected.len(), "languages")?;
  let mut builds: Vec<LanguageBuild> = selected
    .par_iter()
    .progress_with(bar.clone())
    .map(|site| build_language(config, site, languages, stages, rewrite_domain))
    .collect();
  bar.finish_and_clear();

  builds.sort_by_key(|build| {
    languages
      .iter()
      .position(|site| site.code == build.code)
      .unwrap_or(usize::MAX)
  });
  let summary = BuildSummary { languages: builds };
  info!("Build finished: {}", summary.pages());
  Ok(summary)
}

/// Fail with the list of languages whose build had errors.
///
/// # Errors
///
/// Returns an error when any language failed.
pub fn ensure_success(summary: &BuildSummary) -> Result<()> {
  let failed = summary.failed();
  if !failed.is_empty() {
    bail!("Build failed for: {}", failed.join(", "));
  }
  Ok(())
}

/// Regenerate the sitemaps of every language.
///
/// # Errors
///
/// Returns an error if the sitemaps cannot be written.
pub fn sitemaps(
  config: &Config,
  languages: &[LanguageSite],
) -> Result<SitemapReport> {
  let report = generate_sitemaps(config, languages)?;
  info!(
    "Sitemaps for {}: {} URL(s) in {} language(s){}, {} old file(s) removed",
    report.domain,
    report.total_urls(),
    report.languages.len(),
    if report.combined {
      " plus sitemap-all.xml"
    } else {
      ""
    },
    report.removed
  );
  Ok(report)
}

/// Build, then regenerate the sitemaps.
///
/// # Errors
///
/// Returns an error if any language failed or the sitemaps cannot be
/// written.
pub fn all(
  config: &Config,
  languages: &[LanguageSite],
  selected: &[&LanguageSite],
) -> Result<()> {
  let summary = build(config, languages, selected, &[])?;
  sitemaps(config, languages)?;
  ensure_success(&summary)
}

/// Public base URL of a language, from its `site.domain` or the configured
/// domain.
#[must_use]
pub fn base_url(config: &Config, site: &LanguageSite) -> String {
  let translations =
    TranslationTable::load(&site.translations_path(), &site.code)
      .unwrap_or_else(|e| {
        warn!("[{}] {e}", site.code);
        TranslationTable::from_entries::<_, String, String>(&site.code, [])
      });
  site.base_url(&resolve_domain(config, &translations))
}

/// Rewrite the URLs of the selected languages to `domain`, or to each
/// language's own domain.
///
/// # Errors
///
/// Returns an error if any file could not be rewritten.
pub fn update_domains(
  config: &Config,
  selected: &[&LanguageSite],
  domain: Option<&str>,
) -> Result<DomainReport> {
  let mut total = DomainReport::default();
  for site in selected {
    let Some(domain) = domain
      .and_then(normalize_domain)
      .or_else(|| target_domain(config, site))
    else {
      warn!(
        "[{}] No site.domain and no configured domain, skipping",
        site.code
      );
      continue;
    };
    let report = update_language(site, &domain);
    total.updated += report.updated;
    total.unchanged += report.unchanged;
    total.failed += report.failed;
  }
  info!(
    "Domain update: {} updated, {} unchanged, {} failed",
    total.updated, total.unchanged, total.failed
  );
  if total.failed > 0 {
    bail!("{} file(s) could not be updated", total.failed);
  }
  Ok(total)
}

/// Strip legacy-domain SEO tags from the selected languages.
///
/// # Errors
///
/// Returns an error if any page could not be fixed.
pub fn fix_seo(config: &Config, selected: &[&LanguageSite]) -> Result<()> {
  if config.legacy_domains.is_empty() {
    warn!("No legacy_domains configured, nothing to fix");
    return Ok(());
  }

  let mut total = StageReport::default();
  for site in selected {
    let base_url = base_url(config, site);
    total.merge(seo::fix_language(site, &config.legacy_domains, &base_url));
  }
  info!("Legacy SEO fix: {total}");
  if !total.is_success() {
    bail!("{} page(s) could not be fixed", total.failed);
  }
  Ok(())
}

/// Report the `site.domain` of every language.
///
/// # Errors
///
/// Returns an error if a translations file cannot be read or the languages
/// disagree.
pub fn check(languages: &[LanguageSite]) -> Result<String> {
  let check = check_domains(languages)?;
  for (code, domain) in &check.domains {
    info!("{code}: {domain}");
  }
  for code in &check.missing {
    warn!("{code}: no site.domain");
  }
  match check.domain() {
    Some(domain) => {
      info!("All {} language(s) use {domain}", check.domains.len());
      Ok(domain.to_string())
    },
    None => {
      bail!("site.domain is missing or differs between languages")
    },
  }
}
