use std::{
  fs,
  io::{self, Write},
};

use color_eyre::eyre::{Context, Result, bail};
use log::info;
use vitrine::{
  cli::{Cli, Commands, VideoCommands},
  pipeline,
  videos,
};
use vitrine_config::Config;
use vitrine_data::categories::CategoryMap;
use vitrine_utils::create_language;

fn main() -> Result<()> {
  color_eyre::install()?;

  // Parse command line arguments
  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  env_logger::Builder::new()
    .filter_level(cli.verbose.log_level_filter())
    .write_style(env_logger::WriteStyle::Always)
    .init();

  // Commands that do not need a site
  match &cli.command {
    Some(Commands::Init {
      output,
      format,
      force,
    }) => {
      if output.exists() && !force {
        bail!(
          "Configuration file already exists: {}. Use --force to overwrite.",
          output.display()
        );
      }
      if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
      {
        fs::create_dir_all(parent).wrap_err_with(|| {
          format!("Failed to create directory: {}", parent.display())
        })?;
        info!("Created directory: {}", parent.display());
      }
      Config::generate_default_config(format, output).wrap_err_with(|| {
        format!(
          "Failed to generate configuration file: {}",
          output.display()
        )
      })?;
      info!("Configuration file created. Point site_root at your site.");
      return Ok(());
    },

    Some(Commands::ExportTemplates {
      output_dir,
      force,
      templates,
    }) => {
      Config::export_templates(output_dir, *force, Some(templates.clone()))
        .wrap_err_with(|| {
          format!("Failed to export templates to {}", output_dir.display())
        })?;
      return Ok(());
    },

    _ => {},
  }

  let mut config = Config::load(&cli.config_files, &cli.config_overrides)?;
  if cli.jobs.is_some() {
    config.jobs = cli.jobs;
  }
  config.validate_paths()?;

  // Setup thread pool once for all parallel operations
  let thread_count = config.jobs.unwrap_or_else(num_cpus::get);
  rayon::ThreadPoolBuilder::new()
    .num_threads(thread_count)
    .build_global()?;

  run(&config, cli.command.unwrap_or(Commands::All { lang: Vec::new() }))
}

fn run(config: &Config, command: Commands) -> Result<()> {
  match command {
    Commands::Init { .. } | Commands::ExportTemplates { .. } => Ok(()),

    Commands::Build { lang, only } => {
      let languages = pipeline::discover(config)?;
      let selected = pipeline::select(&languages, &lang)?;
      let summary = pipeline::build(config, &languages, &selected, &only)?;
      pipeline::ensure_success(&summary)
    },

    Commands::All { lang } => {
      let languages = pipeline::discover(config)?;
      let selected = pipeline::select(&languages, &lang)?;
      pipeline::all(config, &languages, &selected)
    },

    Commands::Sitemap => {
      let languages = pipeline::discover(config)?;
      pipeline::sitemaps(config, &languages).map(|_| ())
    },

    Commands::UpdateDomain { lang, domain } => {
      let languages = pipeline::discover(config)?;
      let selected = pipeline::select(&languages, &lang)?;
      pipeline::update_domains(config, &selected, domain.as_deref()).map(|_| ())
    },

    Commands::FixSeo { lang } => {
      let languages = pipeline::discover(config)?;
      let selected = pipeline::select(&languages, &lang)?;
      pipeline::fix_seo(config, &selected)
    },

    Commands::CheckDomains { rebuild } => {
      let languages = pipeline::discover(config)?;
      pipeline::check(&languages)?;
      if rebuild {
        let selected = pipeline::select(&languages, &[])?;
        pipeline::all(config, &languages, &selected)?;
      }
      Ok(())
    },

    Commands::NewLanguage {
      code,
      source,
      force,
    } => {
      let report = create_language(config, &code, &source, force)?;
      info!(
        "Review {} and run `vitrine build --lang {code}` to generate its \
         pages",
        report.dir.join("translations.csv").display()
      );
      Ok(())
    },

    Commands::Categories { query } => list_categories(config, query.as_deref()),

    Commands::Videos { command } => {
      match command {
        VideoCommands::Upload { lang, dry_run } => {
          let languages = pipeline::discover(config)?;
          let selected = pipeline::select(&languages, &lang)?;
          videos::upload(config, &selected, dry_run)
        },
        VideoCommands::SyncCsv { lang } => {
          let languages = pipeline::discover(config)?;
          let selected = pipeline::select(&languages, &lang)?;
          videos::sync(config, &selected)
        },
        VideoCommands::Prune { dry_run } => videos::prune(config, dry_run),
      }
    },
  }
}

fn list_categories(config: &Config, query: Option<&str>) -> Result<()> {
  let path = config.site_root.join("config").join("categories.json");
  let map = CategoryMap::load(&path)
    .wrap_err_with(|| format!("Failed to read {}", path.display()))?;

  let mut out = io::stdout().lock();
  match query {
    Some(query) => {
      let Some(category) = map.lookup(query) else {
        bail!("No category with id or slug '{query}' in {}", path.display());
      };
      writeln!(
        out,
        "{}\t{}\t{}\t{}",
        category.id, category.slug, category.name, category.page
      )?;
    },
    None => {
      if map.categories.is_empty() {
        info!("No categories defined in {}", path.display());
      }
      for category in map.sorted() {
        writeln!(
          out,
          "{:>3}  {:<24} {}",
          category.id, category.slug, category.name
        )?;
      }
    },
  }
  Ok(())
}
