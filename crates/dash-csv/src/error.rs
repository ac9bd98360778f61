//! Error type for `dash-csv`.

use std::path::PathBuf;

use dash_core::schema::{ColumnKind, SourceId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] dash_core::Error),

  #[error("file not found: {}", .0.display())]
  NotFound(PathBuf),

  #[error("cannot read {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("{dataset}: missing required column {column:?}")]
  MissingColumn { dataset: SourceId, column: String },

  #[error("{dataset}: line {line}, column {column:?}: {value:?} is not a valid {expected}")]
  InvalidValue {
    dataset:  SourceId,
    column:   String,
    line:     usize,
    value:    String,
    expected: ColumnKind,
  },

  /// No file is configured for the dataset.
  #[error("no file configured for {0}")]
  NotConfigured(SourceId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
