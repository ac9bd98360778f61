//! Error type for `dash-server`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("config error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("unknown dataset {0:?} in [sources]")]
  UnknownSource(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
