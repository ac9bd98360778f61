//! The [`TableSource`] trait and an in-memory implementation.
//!
//! Reports depend on this abstraction, not on how tables are loaded. The
//! CSV-backed cache lives in `dash-csv`.

use std::{collections::HashMap, sync::Arc};

use strum::IntoEnumIterator;

use crate::{Error, schema::SourceId, table::Table};

/// Access to loaded, immutable source tables.
///
/// An `Err` from [`TableSource::table`] means the dataset is unavailable;
/// callers degrade the features that depend on it and carry on.
pub trait TableSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The table for `source`, loading it on first access.
  fn table(&self, source: SourceId) -> Result<Arc<Table>, Self::Error>;

  /// Drop the cached result for `source` so the next access reloads it.
  fn invalidate(&self, source: SourceId);

  fn invalidate_all(&self) {
    for source in SourceId::iter() {
      self.invalidate(source);
    }
  }
}

/// A fixed set of tables held in memory. Sources not inserted are
/// unavailable.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
  tables: HashMap<SourceId, Arc<Table>>,
}

impl MemorySource {
  pub fn new() -> Self { Self::default() }

  pub fn with(mut self, source: SourceId, table: Table) -> Self {
    self.tables.insert(source, Arc::new(table));
    self
  }
}

impl TableSource for MemorySource {
  type Error = Error;

  fn table(&self, source: SourceId) -> Result<Arc<Table>, Error> {
    self
      .tables
      .get(&source)
      .cloned()
      .ok_or(Error::SourceMissing(source))
  }

  /// Tables held in memory are never stale.
  fn invalidate(&self, _source: SourceId) {}
}
