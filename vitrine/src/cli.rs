use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use vitrine_html::Stage;

/// Command line interface for vitrine
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "Vitrine: multilingual storefront generator"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`]). Runs `all` when omitted.
  #[command(subcommand)]
  pub command: Option<Commands>,

  #[command(flatten)]
  pub verbose: Verbosity<InfoLevel>,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times) Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(
    short = 'c',
    long = "config-file",
    global = true,
    action = clap::ArgAction::Append
  )]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times). Nested settings use dotted keys, e.g. `youtube.daily_quota=6`.
  #[arg(long = "config", global = true, action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,

  /// Number of languages to build in parallel.
  #[arg(short = 'p', long = "jobs", global = true)]
  pub jobs: Option<usize>,
}

/// All supported subcommands for the vitrine CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Initialize a new vitrine configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "vitrine.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Export the built-in page templates to a directory for customization.
  ExportTemplates {
    /// Output directory for template files.
    #[arg(short, long, default_value = "templates")]
    output_dir: PathBuf,

    /// Whether to overwrite existing files.
    #[arg(long)]
    force: bool,

    /// Template kinds to export (`html`, `js`). Exports all when omitted.
    #[arg(short, long, action = clap::ArgAction::Append)]
    templates: Vec<String>,
  },

  /// Generate the pages of every selected language, then rewrite their URLs
  /// to the site domain.
  Build {
    /// Languages to build. Builds every discovered language when omitted.
    #[arg(short, long, action = clap::ArgAction::Append)]
    lang: Vec<String>,

    /// Only run these stages (index, categories, legal, products). Skips the
    /// domain rewrite.
    #[arg(long, action = clap::ArgAction::Append)]
    only: Vec<Stage>,
  },

  /// Build every language, then regenerate the sitemaps.
  All {
    /// Languages to build. Builds every discovered language when omitted.
    #[arg(short, long, action = clap::ArgAction::Append)]
    lang: Vec<String>,
  },

  /// Regenerate `sitemap.xml` and the per-language sitemaps.
  Sitemap,

  /// Rewrite absolute URLs in generated pages to the site domain.
  UpdateDomain {
    /// Languages to update. Updates every language when omitted.
    #[arg(short, long, action = clap::ArgAction::Append)]
    lang: Vec<String>,

    /// Domain to use instead of each language's `site.domain`.
    #[arg(short, long)]
    domain: Option<String>,
  },

  /// Remove social and canonical tags that point at a legacy domain.
  FixSeo {
    /// Languages to fix. Fixes every language when omitted.
    #[arg(short, long, action = clap::ArgAction::Append)]
    lang: Vec<String>,
  },

  /// Check that every language declares the same `site.domain`.
  CheckDomains {
    /// Rebuild every language and the sitemaps when the check passes.
    #[arg(long)]
    rebuild: bool,
  },

  /// Create a new language directory from an existing language.
  NewLanguage {
    /// Two-letter code of the new language.
    code: String,

    /// Language to copy pages and tables from.
    #[arg(short, long, default_value = "en")]
    source: String,

    /// Replace the language directory if it already exists.
    #[arg(short, long)]
    force: bool,
  },

  /// List the category map, or look up one category by id or slug.
  Categories {
    /// Category id or slug.
    query: Option<String>,
  },

  /// Product video uploads to YouTube.
  Videos {
    #[command(subcommand)]
    command: VideoCommands,
  },
}

/// Subcommands of `vitrine videos`.
#[derive(Subcommand, Debug)]
pub enum VideoCommands {
  /// Upload product videos that have not been uploaded yet.
  Upload {
    /// Languages to upload for. Uses every language when omitted.
    #[arg(short, long, action = clap::ArgAction::Append)]
    lang: Vec<String>,

    /// List what would be uploaded without uploading.
    #[arg(long)]
    dry_run: bool,
  },

  /// Write tracked video URLs back into the product tables.
  SyncCsv {
    /// Languages to sync. Syncs every language when omitted.
    #[arg(short, long, action = clap::ArgAction::Append)]
    lang: Vec<String>,
  },

  /// Delete local video files from the product image folders.
  Prune {
    /// Only report what would be deleted.
    #[arg(long)]
    dry_run: bool,
  },
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
