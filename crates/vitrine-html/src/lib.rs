//! Page generation for vitrine.
//!
//! Pages are not rendered from scratch: each stage loads an existing page or
//! a template, splices freshly rendered fragments into the regions it owns,
//! and writes the result only when it changed.

use std::{fmt, path::Path, str::FromStr};

use color_eyre::eyre::Result;
use log::error;

pub mod category;
pub mod context;
pub mod dom;
pub mod fragments;
pub mod head;
pub mod index;
pub mod legal;
pub mod links;
pub mod nav;
pub mod product;
pub mod seo;

pub use context::{LanguageContext, PLACEHOLDER_DOMAIN};
pub use dom::Page;

/// Outcome counters of a generation stage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StageReport {
  pub written:   usize,
  pub unchanged: usize,
  pub failed:    usize,
}

impl StageReport {
  /// Count the result of writing `path`. Failures are logged, not propagated,
  /// so that one broken page does not stop the others.
  pub fn record(&mut self, path: &Path, result: Result<bool>) {
    match result {
      Ok(true) => self.written += 1,
      Ok(false) => self.unchanged += 1,
      Err(e) => {
        error!("{}: {e:#}", path.display());
        self.failed += 1;
      },
    }
  }

  pub const fn merge(&mut self, other: Self) {
    self.written += other.written;
    self.unchanged += other.unchanged;
    self.failed += other.failed;
  }

  #[must_use]
  pub const fn is_success(&self) -> bool {
    self.failed == 0
  }
}

impl fmt::Display for StageReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} written, {} unchanged, {} failed",
      self.written, self.unchanged, self.failed
    )
  }
}

/// A page generation stage of the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Index,
  Categories,
  Legal,
  Products,
}

impl Stage {
  /// Stages in build order.
  pub const ALL: [Self; 4] =
    [Self::Index, Self::Categories, Self::Legal, Self::Products];

  #[must_use]
  pub const fn name(self) -> &'static str {
    match self {
      Self::Index => "index",
      Self::Categories => "categories",
      Self::Legal => "legal",
      Self::Products => "products",
    }
  }

  #[must_use]
  pub fn run(self, context: &LanguageContext) -> StageReport {
    match self {
      Self::Index => index::generate_index(context),
      Self::Categories => category::generate_categories(context),
      Self::Legal => legal::generate_legal_pages(context),
      Self::Products => product::generate_products(context),
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Stage {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|stage| stage.name().eq_ignore_ascii_case(s))
      .ok_or_else(|| {
        format!(
          "unknown stage '{s}', expected one of: index, categories, legal, \
           products"
        )
      })
  }
}

/// Run `stages` for one language, in build order.
#[must_use]
pub fn generate_language(
  context: &LanguageContext,
  stages: &[Stage],
) -> StageReport {
  let mut report = StageReport::default();
  for stage in Stage::ALL.into_iter().filter(|s| stages.contains(s)) {
    report.merge(stage.run(context));
  }
  report
}

#[cfg(test)]
mod tests {
  use color_eyre::eyre::eyre;

  use super::*;

  #[test]
  fn test_stage_report() {
    let mut report = StageReport::default();
    report.record(Path::new("a.html"), Ok(true));
    report.record(Path::new("b.html"), Ok(false));
    report.record(Path::new("c.html"), Ok(false));
    assert!(report.is_success());

    let mut failing = StageReport::default();
    failing.record(Path::new("d.html"), Err(eyre!("boom")));
    report.merge(failing);
    assert!(!report.is_success());
    assert_eq!(report.to_string(), "1 written, 2 unchanged, 1 failed");
  }

  #[test]
  fn test_stage_names() {
    assert_eq!("Legal".parse::<Stage>(), Ok(Stage::Legal));
    assert!("sitemap".parse::<Stage>().is_err());
    for stage in Stage::ALL {
      assert_eq!(stage.to_string().parse::<Stage>(), Ok(stage));
    }
  }
}
