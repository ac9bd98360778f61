//! Error types for `dash-core`.

use thiserror::Error;

use crate::schema::SourceId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown column: {0:?}")]
  UnknownColumn(String),

  #[error("unknown metric: {0:?}")]
  UnknownMetric(String),

  #[error("row has {found} values but the table has {expected} columns")]
  RowArity { expected: usize, found: usize },

  #[error("dataset {0} is not available")]
  SourceMissing(SourceId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
