//! Configuration and application wiring for the dashboard server.
//!
//! The binary in `main.rs` reads a [`DashboardConfig`], builds a
//! [`DatasetCache`] from it and serves [`app`].

pub mod error;

pub use error::{Error, Result};

use std::{
  collections::{BTreeMap, HashMap},
  path::{Path, PathBuf},
  str::FromStr,
  sync::Arc,
};

use axum::Router;
use dash_core::{schema::SourceId, source::TableSource};
use dash_csv::DatasetCache;
use serde::Deserialize;
use strum::IntoEnumIterator;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration, deserialised from `config.toml` and `DASH_*`
/// environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
  pub host:     String,
  pub port:     u16,
  /// Directory that relative source paths resolve against.
  pub data_dir: PathBuf,
  /// Per-dataset file overrides keyed by dataset id, e.g.
  /// `doordash_marketing = "exports/marketing.csv"`.
  pub sources:  BTreeMap<String, PathBuf>,
}

impl Default for DashboardConfig {
  fn default() -> Self {
    Self {
      host:     "127.0.0.1".into(),
      port:     8501,
      data_dir: PathBuf::from("."),
      sources:  BTreeMap::new(),
    }
  }
}

impl DashboardConfig {
  /// Read `path` (if it exists) layered under `DASH_*` environment variables.
  pub fn load(path: &Path) -> Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("DASH"))
      .build()?;
    Ok(settings.try_deserialize()?)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// The file for every dataset, overrides applied, resolved against
  /// `data_dir`.
  pub fn source_paths(&self) -> Result<HashMap<SourceId, PathBuf>> {
    let mut paths: HashMap<SourceId, PathBuf> =
      SourceId::iter().map(|id| (id, default_path(id))).collect();
    for (key, path) in &self.sources {
      let id = SourceId::from_str(key).map_err(|_| Error::UnknownSource(key.clone()))?;
      paths.insert(id, path.clone());
    }
    for path in paths.values_mut() {
      if path.is_relative() {
        *path = self.data_dir.join(&*path);
      }
    }
    Ok(paths)
  }

  pub fn cache(&self) -> Result<DatasetCache> { Ok(DatasetCache::new(self.source_paths()?)) }
}

/// Where each export lands when downloaded from the platform portals.
pub fn default_path(source: SourceId) -> PathBuf {
  match source {
    SourceId::DoordashMarketing => PathBuf::from(
      "marketing_2025-09-22_2025-10-05_IeW4u_2025-10-07T11-22-22Z/\
       MARKETING_PROMOTION_2025-09-22_2025-10-05_IeW4u_2025-10-07T11-22-22Z.csv",
    ),
    SourceId::DoordashFinancial => PathBuf::from(
      "financial_2025-09-22_2025-10-05_fZY06_2025-10-07T13-11-16Z/\
       FINANCIAL_DETAILED_TRANSACTIONS_2025-09-22_2025-10-05_fZY06_2025-10-07T13-11-16Z.csv",
    ),
    grubhub => {
      let name = grubhub.as_str().trim_start_matches("grubhub_");
      Path::new("grubhub").join(format!("{name}.csv"))
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API router with request tracing.
pub fn app<S>(source: Arc<S>) -> Router
where
  S: TableSource + 'static,
{
  dash_api::api_router(source).layer(TraceLayer::new_for_http())
}
