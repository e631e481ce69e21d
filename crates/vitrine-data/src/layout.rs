use std::{
  fs,
  path::{Path, PathBuf},
};

use log::debug;
use vitrine_config::Config;

use crate::error::DataError;

/// One language's slice of the site tree.
///
/// The default language lives at the site root; every other language has its
/// own two-letter directory with the same layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSite {
  pub code:    String,
  pub dir:     PathBuf,
  pub is_root: bool,
}

impl LanguageSite {
  #[must_use]
  pub fn new(config: &Config, code: &str) -> Self {
    let is_root = code == config.default_language;
    let dir = if is_root {
      config.site_root.clone()
    } else {
      config.site_root.join(code)
    };
    Self {
      code: code.to_string(),
      dir,
      is_root,
    }
  }

  #[must_use]
  pub fn index_path(&self) -> PathBuf {
    self.dir.join("index.html")
  }

  #[must_use]
  pub fn translations_path(&self) -> PathBuf {
    self.dir.join("translations.csv")
  }

  #[must_use]
  pub fn products_csv(&self) -> PathBuf {
    self.dir.join("CSV").join("all_products.csv")
  }

  #[must_use]
  pub fn page_html_dir(&self) -> PathBuf {
    self.dir.join("page_html")
  }

  #[must_use]
  pub fn templates_dir(&self) -> PathBuf {
    self.page_html_dir().join("templates")
  }

  #[must_use]
  pub fn category_template(&self) -> PathBuf {
    self.templates_dir().join("category.html")
  }

  #[must_use]
  pub fn product_template(&self) -> PathBuf {
    self.templates_dir().join("produit.html")
  }

  #[must_use]
  pub fn categories_dir(&self) -> PathBuf {
    self.page_html_dir().join("categories")
  }

  #[must_use]
  pub fn products_dir(&self) -> PathBuf {
    self.page_html_dir().join("products")
  }

  #[must_use]
  pub fn legal_dir(&self) -> PathBuf {
    self.page_html_dir().join("legal")
  }

  /// Directory levels between this language's root and the site root.
  #[must_use]
  pub const fn depth(&self) -> usize {
    if self.is_root { 0 } else { 1 }
  }

  /// Public base URL of this language for a given domain.
  #[must_use]
  pub fn base_url(&self, domain: &str) -> String {
    language_base_url(domain, &self.code, self.is_root)
  }
}

/// `{domain}` for the root language, `{domain}/{code}` otherwise.
#[must_use]
pub fn language_base_url(domain: &str, code: &str, is_root: bool) -> String {
  let domain = domain.trim_end_matches('/');
  if is_root {
    domain.to_string()
  } else {
    format!("{domain}/{code}")
  }
}

/// Whether a directory name looks like a language code.
#[must_use]
pub fn is_language_code(name: &str) -> bool {
  name.len() == 2 && name.chars().all(|c| c.is_ascii_alphabetic())
}

/// Find every language with an `index.html`, default language first.
///
/// When `config.languages` is not empty only those languages are returned.
///
/// # Errors
///
/// Returns an error if the site root cannot be read.
pub fn discover_languages(
  config: &Config,
) -> Result<Vec<LanguageSite>, DataError> {
  let root = &config.site_root;
  let mut found = Vec::new();

  let root_site = LanguageSite::new(config, &config.default_language);
  if root_site.index_path().is_file() {
    found.push(root_site);
  }

  let entries = fs::read_dir(root).map_err(|e| DataError::io(root, e))?;
  let mut codes = Vec::new();
  for entry in entries {
    let entry = entry.map_err(|e| DataError::io(root, e))?;
    let name = entry.file_name().to_string_lossy().to_string();
    if name.starts_with('.')
      || config.is_excluded_dir(&name)
      || !is_language_code(&name)
      || name == config.default_language
      || !entry.path().join("index.html").is_file()
    {
      continue;
    }
    codes.push(name);
  }
  codes.sort();
  found.extend(codes.iter().map(|code| LanguageSite::new(config, code)));

  if !config.languages.is_empty() {
    found.retain(|site| config.languages.contains(&site.code));
  }

  debug!(
    "Discovered languages: {}",
    found
      .iter()
      .map(|s| s.code.as_str())
      .collect::<Vec<_>>()
      .join(", ")
  );
  Ok(found)
}

/// Shared `images/` directory at the site root.
#[must_use]
pub fn images_dir(site_root: &Path) -> PathBuf {
  site_root.join("images")
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Fine in tests")]
  use super::*;

  fn touch_index(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("index.html"), "<html></html>").unwrap();
  }

  #[test]
  fn test_discover_languages() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir in test");
    let root = dir.path();
    touch_index(root);
    touch_index(&root.join("fr"));
    touch_index(&root.join("de"));
    // Not languages
    touch_index(&root.join("images"));
    touch_index(&root.join("abc"));
    fs::create_dir_all(root.join("es")).unwrap();

    let config = Config {
      site_root: root.to_path_buf(),
      ..Default::default()
    };
    let codes: Vec<_> = discover_languages(&config)
      .unwrap()
      .into_iter()
      .map(|s| s.code)
      .collect();
    assert_eq!(codes, vec!["en", "de", "fr"]);
  }

  #[test]
  fn test_discover_languages_respects_filter_and_exclusions() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir in test");
    let root = dir.path();
    touch_index(root);
    touch_index(&root.join("fr"));
    touch_index(&root.join("it"));

    let config = Config {
      site_root: root.to_path_buf(),
      languages: vec!["fr".to_string(), "it".to_string()],
      excluded_dirs: vec!["it".to_string()],
      ..Default::default()
    };
    let sites = discover_languages(&config).unwrap();
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].code, "fr");
    assert!(!sites[0].is_root);
    assert_eq!(sites[0].depth(), 1);
  }

  #[test]
  fn test_paths_and_urls() {
    let config = Config {
      site_root: PathBuf::from("/site"),
      ..Default::default()
    };
    let fr = LanguageSite::new(&config, "fr");
    assert_eq!(
      fr.products_csv(),
      PathBuf::from("/site/fr/CSV/all_products.csv")
    );
    assert_eq!(
      fr.category_template(),
      PathBuf::from("/site/fr/page_html/templates/category.html")
    );
    assert_eq!(fr.base_url("https://shop.test/"), "https://shop.test/fr");

    let en = LanguageSite::new(&config, "en");
    assert_eq!(en.dir, PathBuf::from("/site"));
    assert_eq!(en.base_url("https://shop.test"), "https://shop.test");
  }
}
