//! File-backed [`TableSource`] with a per-source outcome cache.

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
  sync::{Arc, PoisonError, RwLock},
};

use dash_core::{schema::SourceId, source::TableSource, table::Table};

use crate::{Error, loader::load_path};

type Entry = Result<Arc<Table>, Arc<Error>>;

/// Loads each configured source on first access and keeps the outcome.
///
/// Failures are cached as well: a missing file is reported the same way on
/// every access until the source is invalidated.
#[derive(Debug, Default)]
pub struct DatasetCache {
  paths:   HashMap<SourceId, PathBuf>,
  entries: RwLock<HashMap<SourceId, Entry>>,
}

impl DatasetCache {
  pub fn new(paths: HashMap<SourceId, PathBuf>) -> Self {
    Self { paths, entries: RwLock::default() }
  }

  /// The file configured for `source`.
  pub fn path(&self, source: SourceId) -> Option<&Path> {
    self.paths.get(&source).map(PathBuf::as_path)
  }

  /// The table for `source`, reading the file if it is not cached.
  ///
  /// The lock is not held while the file is parsed. Two callers racing on
  /// the same cold source may both read it; the first result stored wins.
  pub fn load(&self, source: SourceId) -> Entry {
    if let Some(entry) = self.read_entries().get(&source) {
      tracing::debug!(%source, "dataset cache hit");
      return entry.clone();
    }

    let loaded = match self.path(source) {
      Some(path) => load_path(path, source),
      None => Err(Error::NotConfigured(source)),
    }
    .map(Arc::new)
    .map_err(|e| {
      tracing::warn!(%source, error = %e, "dataset failed to load");
      Arc::new(e)
    });

    self
      .entries
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .entry(source)
      .or_insert(loaded)
      .clone()
  }

  /// Whether `source` has a cached outcome.
  pub fn is_cached(&self, source: SourceId) -> bool {
    self.read_entries().contains_key(&source)
  }

  fn read_entries(
    &self,
  ) -> std::sync::RwLockReadGuard<'_, HashMap<SourceId, Entry>> {
    self.entries.read().unwrap_or_else(PoisonError::into_inner)
  }
}

impl TableSource for DatasetCache {
  type Error = Arc<Error>;

  fn table(&self, source: SourceId) -> Entry { self.load(source) }

  fn invalidate(&self, source: SourceId) {
    let removed = self
      .entries
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .remove(&source);
    if removed.is_some() {
      tracing::info!(%source, "dataset invalidated");
    }
  }

  fn invalidate_all(&self) {
    let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
    let count = entries.len();
    entries.clear();
    tracing::info!(count, "all datasets invalidated");
  }
}
