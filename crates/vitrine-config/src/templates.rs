use std::fmt;

/// Error type for template operations.
///
/// Represents the various errors that can occur during template
/// operations, providing clear error messages and context for debugging.
#[derive(Debug)]
pub enum TemplateError {
  /// Indicates that the requested configuration format is not supported.
  /// Contains the name of the unsupported format.
  UnsupportedFormat(String),
}

impl fmt::Display for TemplateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnsupportedFormat(format) => {
        write!(f, "Unsupported config format: {format}")
      },
    }
  }
}

impl std::error::Error for TemplateError {}

/// Default configuration template in TOML, commented so that a fresh site
/// owner can see every knob at once.
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# vitrine configuration file

# Root of the site. The default language lives here, other languages live in
# two-letter directories below it (fr/, de/, ...).
site_root = "."

# Language served from the site root
default_language = "en"

# Restrict processing to these languages. Empty means every language
# directory that contains an index.html.
languages = []

# Extra directories to ignore during language discovery
# excluded_dirs = ["drafts"]

# Fallback domain when translations.csv has no site.domain row
# domain = "https://example.com"

# Directory with template overrides (see `vitrine export-templates`)
# template_dir = "templates"

# Google Analytics measurement id inserted into product pages
# analytics_id = "G-XXXXXXXXXX"

# Domains whose OpenGraph/Twitter/canonical tags should be removed by fix-seo
# legacy_domains = ["old-shop.example"]

# Number of best sellers shown on the home page
best_sellers = 5

# Number of threads used to build languages in parallel
# jobs = 4

[sitemap]
# Write sitemap-all.xml combining every language
combined = true

# Skip the combined sitemap once it would reach this many URLs
max_urls = 50000

[youtube]
# Uploaded video visibility: public, unlisted or private
privacy_status = "public"

# Upload bookkeeping, relative to site_root
tracking_file = "upload youtube/upload_tracking.json"

# Uploads allowed per day (unset = unlimited)
# daily_quota = 6

# Resumable upload chunk size, a multiple of 262144 bytes
chunk_size = 8388608

# Attempts per chunk on 5xx responses
max_retries = 5

[postprocess]
# Minify generated HTML pages
minify_html = false

# Strip comments while minifying
remove_comments = true
"#;

/// Default configuration template in JSON.
pub const DEFAULT_JSON_TEMPLATE: &str = r#"{
  "site_root": ".",
  "default_language": "en",
  "languages": [],
  "excluded_dirs": [],
  "legacy_domains": [],
  "best_sellers": 5,
  "sitemap": {
    "combined": true,
    "max_urls": 50000
  },
  "youtube": {
    "privacy_status": "public",
    "tracking_file": "upload youtube/upload_tracking.json",
    "chunk_size": 8388608,
    "max_retries": 5
  },
  "postprocess": {
    "minify_html": false,
    "remove_comments": true
  }
}
"#;

/// Get the correct configuration template based on the requested format.
///
/// # Errors
///
/// Returns an error if the requested format is not supported.
pub fn get_template(format: &str) -> Result<&'static str, TemplateError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    _ => Err(TemplateError::UnsupportedFormat(format.to_string())),
  }
}
