use std::{io, path::PathBuf};

use thiserror::Error;

/// Error type for reading and rewriting the site's data tables.
#[derive(Debug, Error)]
pub enum DataError {
  #[error("I/O error on {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("Missing column '{column}' in {path}")]
  MissingColumn { column: String, path: PathBuf },

  #[error("Product not found: {0}")]
  ProductNotFound(String),
}

impl DataError {
  pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
    Self::Io {
      path: path.into(),
      source,
    }
  }
}
