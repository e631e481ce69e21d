use std::{
  collections::HashMap,
  fs,
  path::{Path, PathBuf},
  sync::OnceLock,
};

use serde::{Deserialize, Serialize};

use crate::{
  error::{ConfigError, parse_list, parse_optional, parse_usize},
  postprocess,
  sitemap,
  youtube,
};

/// Directories under the site root that are never language directories.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
  "APPLI:SCRIPT aliexpress",
  "scripts",
  "config",
  "images",
  "page_html",
  "upload_cloudflare",
  "sauv",
  "CSV",
  "__pycache__",
  ".git",
  "node_modules",
  "upload youtube",
];

/// Configuration for the vitrine site generator.
///
/// [`Config`] describes where the site lives, which languages to process and
/// how optional stages (sitemaps, uploads, minification) behave. Fields are
/// typically loaded from a TOML or JSON config file and adjusted with
/// `--config KEY=VALUE` overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Root directory of the site. Holds the default-language pages.
  pub site_root: PathBuf,

  /// Language served from the site root.
  pub default_language: String,

  /// Languages to process. Empty means every discovered language.
  pub languages: Vec<String>,

  /// Additional directory names skipped during language discovery.
  pub excluded_dirs: Vec<String>,

  /// Fallback domain used when no translation table provides `site.domain`.
  pub domain: Option<String>,

  /// Directory containing template overrides.
  pub template_dir: Option<PathBuf>,

  /// Google Analytics measurement id.
  pub analytics_id: Option<String>,

  /// Domains whose stale SEO tags are removed by `fix-seo`.
  pub legacy_domains: Vec<String>,

  /// Number of best sellers listed on the home page.
  pub best_sellers: usize,

  /// Number of threads to use for parallel processing.
  pub jobs: Option<usize>,

  /// Sitemap configuration.
  pub sitemap: Option<sitemap::SitemapConfig>,

  /// YouTube upload configuration.
  pub youtube: Option<youtube::YoutubeConfig>,

  /// Postprocessing configuration for HTML minification.
  pub postprocess: Option<postprocess::PostprocessConfig>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      site_root:        PathBuf::from("."),
      default_language: "en".to_string(),
      languages:        Vec::new(),
      excluded_dirs:    Vec::new(),
      domain:           None,
      template_dir:     None,
      analytics_id:     None,
      legacy_domains:   Vec::new(),
      best_sellers:     5,
      jobs:             None,
      sitemap:          None,
      youtube:          None,
      postprocess:      None,
    }
  }
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to read config file: {}: {}",
        path.display(),
        e
      ))
    })?;

    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
      return Err(ConfigError::Config(format!(
        "Config file has no extension: {}",
        path.display()
      )));
    };

    match ext.to_lowercase().as_str() {
      "json" => {
        serde_json::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse JSON config from {}: {}",
            path.display(),
            e
          ))
        })
      },
      "toml" => {
        toml::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse TOML config from {}: {}",
            path.display(),
            e
          ))
        })
      },
      _ => {
        Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )))
      },
    }
  }

  /// Load configuration from files and overrides, merging them.
  ///
  /// Explicit config files are merged in order. Without any, a config file is
  /// discovered in the standard locations, and the defaults are used when none
  /// exists. `KEY=VALUE` overrides are applied last.
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be loaded or an override is invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if let Some((first, rest)) = config_files.split_first() {
      let mut merged_config = Self::from_file(first).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to load config from {}: {}",
          first.display(),
          e
        ))
      })?;

      for config_path in rest {
        let additional_config = Self::from_file(config_path).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to load config from {}: {}",
            config_path.display(),
            e
          ))
        })?;
        merged_config.merge(additional_config);
      }

      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }

      merged_config
    } else if let Some(discovered_config) = Self::find_config_file() {
      log::info!(
        "Using discovered config file: {}",
        discovered_config.display()
      );
      Self::from_file(&discovered_config).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to load discovered config from {}: {}",
          discovered_config.display(),
          e
        ))
      })?
    } else {
      Self::default()
    };

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    Ok(config)
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// Nested sections use dotted keys, e.g. `youtube.daily_quota=6`. List
  /// fields take comma separated values.
  ///
  /// # Errors
  ///
  /// Returns an error if:
  ///
  /// - An override string is not in KEY=VALUE format
  /// - A key is not recognized
  /// - A value cannot be parsed as the expected type
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  /// Apply a single override by key.
  ///
  /// # Errors
  ///
  /// Returns an error if the key is unknown or the value cannot be parsed.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    if let Some((section, subkey)) = key.split_once('.') {
      return match section {
        "sitemap" => {
          self
            .sitemap
            .get_or_insert_with(Default::default)
            .apply_override(subkey, value)
        },
        "youtube" => {
          self
            .youtube
            .get_or_insert_with(Default::default)
            .apply_override(subkey, value)
        },
        "postprocess" => {
          self
            .postprocess
            .get_or_insert_with(Default::default)
            .apply_override(subkey, value)
        },
        _ => Err(ConfigError::unknown_key(key)),
      };
    }

    match key {
      "site_root" => self.site_root = PathBuf::from(value),
      "default_language" => {
        if value.is_empty() {
          return Err(ConfigError::invalid_value(
            key,
            value,
            "a language code",
          ));
        }
        self.default_language = value.to_lowercase();
      },
      "languages" => {
        self.languages = parse_list(value)
          .into_iter()
          .map(|lang| lang.to_lowercase())
          .collect();
      },
      "excluded_dirs" => self.excluded_dirs = parse_list(value),
      "domain" => self.domain = parse_optional(value),
      "template_dir" => {
        self.template_dir = parse_optional(value).map(PathBuf::from);
      },
      "analytics_id" => self.analytics_id = parse_optional(value),
      "legacy_domains" => self.legacy_domains = parse_list(value),
      "best_sellers" => self.best_sellers = parse_usize(key, value)?,
      "jobs" => {
        self.jobs = if value.is_empty() {
          None
        } else {
          Some(parse_usize(key, value)?)
        };
      },
      _ => return Err(ConfigError::unknown_key(key)),
    }

    Ok(())
  }

  /// Merge another config into this one, with the other config's values taking
  /// precedence.
  ///
  /// # Merge Rules
  ///
  /// - [`Option<T>`] fields: Other's [`Some`] value replaces this config's
  ///   value
  /// - [`Vec<T>`] fields: Other's vec is appended to this config's vec
  /// - Plain fields (String, usize, etc.): Other's value always replaces
  pub fn merge(&mut self, other: Self) {
    self.site_root = other.site_root;
    self.default_language = other.default_language;
    self.best_sellers = other.best_sellers;

    self.languages.extend(other.languages);
    self.excluded_dirs.extend(other.excluded_dirs);
    self.legacy_domains.extend(other.legacy_domains);

    if other.domain.is_some() {
      self.domain = other.domain;
    }
    if other.template_dir.is_some() {
      self.template_dir = other.template_dir;
    }
    if other.analytics_id.is_some() {
      self.analytics_id = other.analytics_id;
    }
    if other.jobs.is_some() {
      self.jobs = other.jobs;
    }
    if other.sitemap.is_some() {
      self.sitemap = other.sitemap;
    }
    if other.youtube.is_some() {
      self.youtube = other.youtube;
    }
    if other.postprocess.is_some() {
      self.postprocess = other.postprocess;
    }
  }

  /// Whether a directory name is excluded from language discovery.
  #[must_use]
  pub fn is_excluded_dir(&self, name: &str) -> bool {
    DEFAULT_EXCLUDED_DIRS.contains(&name)
      || self.excluded_dirs.iter().any(|dir| dir == name)
  }

  /// Sitemap settings, falling back to the defaults.
  #[must_use]
  pub fn sitemap_config(&self) -> sitemap::SitemapConfig {
    self.sitemap.clone().unwrap_or_default()
  }

  /// YouTube settings, falling back to the defaults.
  #[must_use]
  pub fn youtube_config(&self) -> youtube::YoutubeConfig {
    self.youtube.clone().unwrap_or_default()
  }

  /// Get the path to a specific template file by name.
  ///
  /// Returns the path inside the configured template directory. This method
  /// does not check if the returned path exists.
  #[must_use]
  pub fn get_template_file(&self, name: &str) -> Option<PathBuf> {
    self.template_dir.as_ref().map(|dir| dir.join(name))
  }

  /// Search for config files in common locations
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    static RESULT: OnceLock<Option<PathBuf>> = OnceLock::new();
    RESULT
      .get_or_init(|| {
        let config_filenames = [
          "vitrine.toml",
          "vitrine.json",
          ".vitrine.toml",
          ".vitrine.json",
          ".config/vitrine.toml",
          ".config/vitrine.json",
        ];

        let current_dir = std::env::current_dir().ok()?;
        for filename in &config_filenames {
          let config_path = current_dir.join(filename);
          if config_path.exists() {
            return Some(config_path);
          }
        }

        if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
          let xdg_config_dir = PathBuf::from(xdg_config_home);
          for filename in &["vitrine.toml", "vitrine.json"] {
            let config_path = xdg_config_dir.join(filename);
            if config_path.exists() {
              return Some(config_path);
            }
          }
        }

        if let Ok(home) = std::env::var("HOME") {
          let home_config_dir =
            PathBuf::from(home).join(".config").join("vitrine");
          for filename in &["config.toml", "config.json"] {
            let config_path = home_config_dir.join(filename);
            if config_path.exists() {
              return Some(config_path);
            }
          }
        }

        None
      })
      .clone()
  }

  /// Validate all paths specified in the configuration
  ///
  /// # Errors
  ///
  /// Returns an error if any configured path does not exist or is invalid.
  pub fn validate_paths(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if !self.site_root.exists() {
      errors.push(format!(
        "Site root does not exist: {}",
        self.site_root.display()
      ));
    } else if !self.site_root.is_dir() {
      errors.push(format!(
        "Site root is not a directory: {}",
        self.site_root.display()
      ));
    }

    if let Some(ref template_dir) = self.template_dir {
      if !template_dir.exists() {
        errors.push(format!(
          "Template directory does not exist: {}",
          template_dir.display()
        ));
      } else if !template_dir.is_dir() {
        errors.push(format!(
          "Template directory path is not a directory: {}",
          template_dir.display()
        ));
      }
    }

    for (index, lang) in self.languages.iter().enumerate() {
      if lang.len() != 2 || !lang.chars().all(|c| c.is_ascii_alphabetic()) {
        errors.push(format!(
          "Language {} is not a two-letter code: {lang}",
          index + 1
        ));
      }
    }

    if !errors.is_empty() {
      let error_message = errors.join("\n");
      return Err(ConfigError::Config(format!(
        "Configuration path validation errors:\n{error_message}"
      )));
    }

    Ok(())
  }

  /// Generate a default configuration file with commented explanations
  ///
  /// # Errors
  ///
  /// Returns an error if the template cannot be retrieved or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let config_content = crate::templates::get_template(format)
      .map_err(|e| ConfigError::Template(e.to_string()))?;

    fs::write(path, config_content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {}",
        path.display(),
        e
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }

  /// Export embedded templates to a directory for customization
  ///
  /// `templates` filters by file extension (`html`, `js`) or `all`.
  ///
  /// # Errors
  ///
  /// Returns an error if the output directory cannot be created or a template
  /// cannot be written.
  pub fn export_templates(
    output_dir: &Path,
    force: bool,
    templates: Option<Vec<String>>,
  ) -> Result<(), ConfigError> {
    fs::create_dir_all(output_dir).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to create template directory: {}: {}",
        output_dir.display(),
        e
      ))
    })?;

    let all_templates = Self::get_template_sources();
    let templates_to_export: HashMap<&str, &str> = match templates {
      Some(specified) if !specified.is_empty() => {
        all_templates
          .into_iter()
          .filter(|(name, _)| {
            specified
              .iter()
              .any(|t| name.ends_with(&format!(".{t}")) || t == "all")
          })
          .collect()
      },
      _ => all_templates,
    };

    for (filename, content) in templates_to_export {
      let file_path = output_dir.join(filename);

      if file_path.exists() && !force {
        log::warn!(
          "File {} already exists. Use --force to overwrite.",
          file_path.display()
        );
        continue;
      }

      fs::write(&file_path, content).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to write template file: {}: {}",
          file_path.display(),
          e
        ))
      })?;
      log::info!("Exported template: {}", file_path.display());
    }

    Ok(())
  }

  /// Get mapping of template filenames to their embedded content
  fn get_template_sources() -> HashMap<&'static str, &'static str> {
    vitrine_templates::all_templates()
  }
}

#[cfg(test)]
mod tests {
  #![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::field_reassign_with_default,
    reason = "Fine in tests"
  )]

  use tempfile::tempdir;

  use super::*;

  #[test]
  fn test_config_merge_option_fields() {
    let mut base = Config::default();
    base.domain = Some("https://base.example".to_string());
    base.analytics_id = None;

    let mut override_config = Config::default();
    override_config.domain = None;
    override_config.analytics_id = Some("G-TEST".to_string());

    base.merge(override_config);

    assert_eq!(base.domain.as_deref(), Some("https://base.example"));
    assert_eq!(base.analytics_id.as_deref(), Some("G-TEST"));
  }

  #[test]
  fn test_config_merge_vec_fields_append() {
    let mut base = Config::default();
    base.languages = vec!["fr".to_string()];

    let mut override_config = Config::default();
    override_config.languages = vec!["de".to_string()];
    override_config.best_sellers = 8;

    base.merge(override_config);

    assert_eq!(base.languages, vec!["fr", "de"]);
    assert_eq!(base.best_sellers, 8);
  }

  #[test]
  fn test_apply_overrides_nested() {
    let mut config = Config::default();

    config
      .apply_overrides(&[
        "youtube.daily_quota=6".to_string(),
        "sitemap.combined=false".to_string(),
        "postprocess.minify_html=true".to_string(),
      ])
      .unwrap();

    assert_eq!(config.youtube_config().daily_quota, Some(6));
    assert!(!config.sitemap_config().combined);
    assert!(config.postprocess.is_some_and(|p| p.minify_html));
  }

  #[test]
  fn test_apply_overrides_lists_and_strings() {
    let mut config = Config::default();

    config
      .apply_overrides(&[
        "languages=FR, de".to_string(),
        "domain=https://shop.example".to_string(),
        "template_dir=".to_string(),
      ])
      .unwrap();

    assert_eq!(config.languages, vec!["fr", "de"]);
    assert_eq!(config.domain.as_deref(), Some("https://shop.example"));
    assert!(config.template_dir.is_none());
  }

  #[test]
  fn test_apply_overrides_rejects_bad_input() {
    let mut config = Config::default();

    assert!(config.apply_overrides(&["no_equals".to_string()]).is_err());
    assert!(config.apply_overrides(&["nope=1".to_string()]).is_err());
    assert!(config.apply_overrides(&["unknown.key=1".to_string()]).is_err());
    assert!(config.apply_overrides(&["best_sellers=many".to_string()]).is_err());
  }

  #[test]
  fn test_excluded_dirs() {
    let mut config = Config::default();
    config.excluded_dirs = vec!["drafts".to_string()];

    assert!(config.is_excluded_dir("images"));
    assert!(config.is_excluded_dir("upload youtube"));
    assert!(config.is_excluded_dir("drafts"));
    assert!(!config.is_excluded_dir("fr"));
  }

  #[test]
  fn test_from_file_toml_and_json() {
    let dir = tempdir().expect("Failed to create temp dir in test");

    let toml_path = dir.path().join("vitrine.toml");
    fs::write(
      &toml_path,
      "default_language = \"fr\"\nbest_sellers = 3\n[youtube]\ndaily_quota \
       = 2\n",
    )
    .expect("Failed to write config in test");
    let config = Config::from_file(&toml_path).unwrap();
    assert_eq!(config.default_language, "fr");
    assert_eq!(config.best_sellers, 3);
    assert_eq!(config.youtube_config().daily_quota, Some(2));

    let json_path = dir.path().join("vitrine.json");
    fs::write(&json_path, r#"{"languages": ["de"]}"#)
      .expect("Failed to write config in test");
    let config = Config::from_file(&json_path).unwrap();
    assert_eq!(config.languages, vec!["de"]);

    let yaml_path = dir.path().join("vitrine.yaml");
    fs::write(&yaml_path, "x: 1").expect("Failed to write config in test");
    assert!(Config::from_file(&yaml_path).is_err());
  }

  #[test]
  fn test_load_merges_files_in_order() {
    let dir = tempdir().expect("Failed to create temp dir in test");
    let first = dir.path().join("a.toml");
    let second = dir.path().join("b.toml");
    fs::write(&first, "domain = \"https://a.example\"\nlanguages = [\"fr\"]\n")
      .expect("Failed to write config in test");
    fs::write(&second, "analytics_id = \"G-B\"\nlanguages = [\"de\"]\n")
      .expect("Failed to write config in test");

    let config = Config::load(&[first, second], &["best_sellers=2".to_string()])
      .unwrap();

    assert_eq!(config.domain.as_deref(), Some("https://a.example"));
    assert_eq!(config.analytics_id.as_deref(), Some("G-B"));
    assert_eq!(config.languages, vec!["fr", "de"]);
    assert_eq!(config.best_sellers, 2);
  }

  #[test]
  fn test_validate_paths() {
    let dir = tempdir().expect("Failed to create temp dir in test");
    let mut config = Config::default();
    config.site_root = dir.path().to_path_buf();
    assert!(config.validate_paths().is_ok());

    config.template_dir = Some(dir.path().join("missing"));
    config.languages = vec!["french".to_string()];
    let err = config.validate_paths().unwrap_err().to_string();
    assert!(err.contains("Template directory does not exist"));
    assert!(err.contains("not a two-letter code"));
  }

  #[test]
  fn test_export_templates_respects_force() {
    let dir = tempdir().expect("Failed to create temp dir in test");
    let out = dir.path().join("templates");

    Config::export_templates(&out, false, Some(vec!["js".to_string()]))
      .unwrap();
    let script = out.join("product.js");
    assert!(script.exists());
    assert!(!out.join("category.html").exists());

    fs::write(&script, "custom").expect("Failed to write in test");
    Config::export_templates(&out, false, None).unwrap();
    assert_eq!(fs::read_to_string(&script).unwrap(), "custom");
    assert!(out.join("category.html").exists());

    Config::export_templates(&out, true, None).unwrap();
    assert_ne!(fs::read_to_string(&script).unwrap(), "custom");
  }
}
