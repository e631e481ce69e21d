use std::path::Path;

use color_eyre::eyre::{Context, Result};
use log::{debug, warn};
use vitrine_config::{Config, postprocess::PostprocessConfig};
use vitrine_data::{
  LanguageSite,
  ProductTable,
  TranslationTable,
  layout::language_base_url,
  translations::normalize_domain,
};

use crate::{fragments::Fragments, head::Alternates};

pub use vitrine_data::translations::PLACEHOLDER_DOMAIN;

/// Everything needed to generate the pages of one language.
pub struct LanguageContext<'a> {
  pub config:       &'a Config,
  pub site:         &'a LanguageSite,
  /// Every language of the site, used for `hreflang` alternates.
  pub languages:    &'a [LanguageSite],
  pub translations: TranslationTable,
  pub products:     ProductTable,
  pub domain:       String,
  pub fragments:    Fragments,
}

impl<'a> LanguageContext<'a> {
  /// Load the translation and product tables of `site`.
  ///
  /// A missing product CSV yields an empty table so that the index and legal
  /// pages can still be built.
  ///
  /// # Errors
  ///
  /// Returns an error if the translations cannot be read, the product CSV is
  /// malformed, or a template override is invalid.
  pub fn load(
    config: &'a Config,
    site: &'a LanguageSite,
    languages: &'a [LanguageSite],
  ) -> Result<Self> {
    let translations_path = site.translations_path();
    let translations = TranslationTable::load(&translations_path, &site.code)
      .wrap_err_with(|| {
        format!(
          "Failed to load translations: {}",
          translations_path.display()
        )
      })?;

    let products = load_products(&site.products_csv(), &site.code)?;
    let domain = resolve_domain(config, &translations);
    debug!("Language {} uses domain {domain}", site.code);

    Ok(Self {
      config,
      site,
      languages,
      translations,
      products,
      domain,
      fragments: Fragments::new(config)?,
    })
  }

  /// Minification settings for written pages.
  #[must_use]
  pub fn postprocess(&self) -> PostprocessConfig {
    self.config.postprocess.clone().unwrap_or_default()
  }

  /// Public base URL of this language.
  #[must_use]
  pub fn base_url(&self) -> String {
    self.site.base_url(&self.domain)
  }

  /// Absolute URL of a page, given its path relative to the language root.
  #[must_use]
  pub fn url(&self, path: &str) -> String {
    format!("{}/{path}", self.base_url())
  }

  /// Canonical URL and `hreflang` alternates for a page path.
  #[must_use]
  pub fn alternates(&self, path: &str) -> Alternates {
    let mut alternates: Vec<(String, String)> = self
      .languages
      .iter()
      .map(|site| {
        let url = format!("{}/{path}", site.base_url(&self.domain));
        (site.code.clone(), url)
      })
      .collect();
    if !self.languages.iter().any(|site| site.code == self.site.code) {
      alternates.push((self.site.code.clone(), self.url(path)));
    }

    let default_url = format!(
      "{}/{path}",
      language_base_url(&self.domain, &self.config.default_language, true)
    );
    alternates.push(("x-default".to_string(), default_url));

    Alternates {
      canonical: self.url(path),
      alternates,
    }
  }
}

fn load_products(path: &Path, language: &str) -> Result<ProductTable> {
  if !path.is_file() {
    warn!("No product table at {}", path.display());
    return Ok(ProductTable::default());
  }
  ProductTable::load(path, language).wrap_err_with(|| {
    format!("Failed to load products: {}", path.display())
  })
}

/// The language's `site.domain`, then the configured domain, then the
/// template placeholder.
#[must_use]
pub fn resolve_domain(
  config: &Config,
  translations: &TranslationTable,
) -> String {
  translations
    .domain()
    .or_else(|| config.domain.as_deref().and_then(normalize_domain))
    .unwrap_or_else(|| {
      warn!(
        "No site.domain for {} and no configured domain, using \
         {PLACEHOLDER_DOMAIN}",
        translations.language()
      );
      PLACEHOLDER_DOMAIN.to_string()
    })
}
