//! Creation of a new language directory from an existing language.

use std::{
  fs,
  path::{Path, PathBuf},
  sync::LazyLock,
};

use color_eyre::eyre::{Context, Result, bail};
use fs_extra::{dir, file};
use log::{debug, info, warn};
use regex::Regex;
use vitrine_config::Config;
use vitrine_data::{
  LanguageSite,
  columns::{add_product_columns, add_translation_column},
  layout::is_language_code,
};
use walkdir::WalkDir;

use crate::output::write_if_changed;

/// Files copied from the source language when present.
pub const SCAFFOLD_FILES: &[&str] = &[
  "index.html",
  "_redirects",
  "robots.txt",
  "sitemap.xml",
  "sitemap.html",
  "translations.csv",
  "custom.css",
];

/// Directories copied from the source language when present.
pub const SCAFFOLD_DIRS: &[&str] = &["CSV", "page_html"];

static IMAGE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
  #[allow(
    clippy::expect_used,
    reason = "Hardcoded regex pattern is known to be valid"
  )]
  Regex::new(r#"(?P<attr>href|src)=(?P<quote>["'])images/"#)
    .expect("Invalid image attribute regex")
});

static IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
  #[allow(
    clippy::expect_used,
    reason = "Hardcoded regex pattern is known to be valid"
  )]
  Regex::new(r#"url\((?P<quote>["']?)images/"#).expect("Invalid CSS url regex")
});

static HOME_LINK: LazyLock<Regex> = LazyLock::new(|| {
  #[allow(
    clippy::expect_used,
    reason = "Hardcoded regex pattern is known to be valid"
  )]
  Regex::new(r#"<a(?P<before>[^>]*?) href="/"(?P<after>[^>]*)>"#)
    .expect("Invalid home link regex")
});

/// What a scaffold run created.
#[derive(Debug)]
pub struct ScaffoldReport {
  pub dir:         PathBuf,
  pub copied:      Vec<String>,
  pub fixed_pages: usize,
}

/// Point root-relative `images/` references at the shared image directory,
/// `depth` levels up, and the home link `/` at the language root.
#[must_use]
pub fn fix_relative_paths(html: &str, depth: usize) -> String {
  let images = format!("{}images/", "../".repeat(depth + 1));
  let home = if depth == 0 {
    "./".to_string()
  } else {
    "../".repeat(depth)
  };

  let html = IMAGE_ATTR.replace_all(html, |caps: &regex::Captures| {
    format!("{}={}{images}", &caps["attr"], &caps["quote"])
  });
  let html = IMAGE_URL.replace_all(&html, |caps: &regex::Captures| {
    format!("url({}{images}", &caps["quote"])
  });
  HOME_LINK
    .replace_all(&html, |caps: &regex::Captures| {
      format!("<a{} href=\"{home}\"{}>", &caps["before"], &caps["after"])
    })
    .into_owned()
}

fn copy_sources(source: &Path, target: &Path) -> Result<Vec<String>> {
  let mut copied = Vec::new();
  let file_options = file::CopyOptions::new().overwrite(true);
  for name in SCAFFOLD_FILES {
    let from = source.join(name);
    if !from.is_file() {
      debug!("{name} not found in {}", source.display());
      continue;
    }
    file::copy(&from, target.join(name), &file_options)
      .wrap_err_with(|| format!("Failed to copy {}", from.display()))?;
    copied.push((*name).to_string());
  }

  let dir_options = dir::CopyOptions::new().overwrite(true);
  for name in SCAFFOLD_DIRS {
    let from = source.join(name);
    if !from.is_dir() {
      warn!("{name}/ not found in {}", source.display());
      continue;
    }
    dir::copy(&from, target, &dir_options)
      .wrap_err_with(|| format!("Failed to copy {}", from.display()))?;
    copied.push(format!("{name}/"));
  }
  Ok(copied)
}

fn fix_pages(target: &Path) -> Result<usize> {
  let pages = WalkDir::new(target)
    .into_iter()
    .filter_map(Result::ok)
    .filter(|entry| entry.file_type().is_file())
    .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "html"));

  let mut fixed = 0;
  for entry in pages {
    let path = entry.path();
    let depth = path
      .strip_prefix(target)
      .map_or(0, |relative| relative.components().count().saturating_sub(1));
    let html = fs::read_to_string(path)
      .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    if write_if_changed(path, &fix_relative_paths(&html, depth))? {
      fixed += 1;
    }
  }
  Ok(fixed)
}

/// Create `{site_root}/{code}` from the `source` language.
///
/// # Errors
///
/// Returns an error if the code is invalid, the directory exists and `force`
/// is not set, or copying and CSV updates fail.
pub fn create_language(
  config: &Config,
  code: &str,
  source: &str,
  force: bool,
) -> Result<ScaffoldReport> {
  let code = code.to_ascii_lowercase();
  if !is_language_code(&code) {
    bail!("'{code}' is not a two-letter language code");
  }
  if code == config.default_language {
    bail!("'{code}' is the default language and lives at the site root");
  }

  let source_site = LanguageSite::new(config, source);
  if !source_site.index_path().is_file() {
    bail!(
      "Source language '{source}' has no index.html at {}",
      source_site.dir.display()
    );
  }

  let target = config.site_root.join(&code);
  if target.exists() {
    if !force {
      bail!(
        "{} already exists, pass --force to overwrite it",
        target.display()
      );
    }
    fs::remove_dir_all(&target)
      .wrap_err_with(|| format!("Failed to remove {}", target.display()))?;
  }
  fs::create_dir_all(&target)
    .wrap_err_with(|| format!("Failed to create {}", target.display()))?;

  let copied = copy_sources(&source_site.dir, &target)?;
  let site = LanguageSite::new(config, &code);

  let translations = site.translations_path();
  if translations.is_file() {
    add_translation_column(&translations, source, &code)?;
  }
  let products = site.products_csv();
  if products.is_file() {
    add_product_columns(&products, &products, source, &code)?;
  }

  let fixed_pages = fix_pages(&target)?;
  info!(
    "Created {} from {source}: {} item(s) copied, {fixed_pages} page(s) \
     relinked",
    target.display(),
    copied.len()
  );

  Ok(ScaffoldReport {
    dir: target,
    copied,
    fixed_pages,
  })
}
