//! Building blocks shared by the platform reports.
//!
//! A report is split into sections, one per backing dataset. A section whose
//! dataset failed to load is [`Section::Unavailable`]; the others are still
//! computed.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
  Result,
  filter::{DateColumns, DateRange, Layout},
  schema::SourceId,
  source::TableSource,
  table::{Table, View},
};

// ─── Section ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Section<T> {
  Available(T),
  Unavailable { reason: String },
}

impl<T> Section<T> {
  pub fn is_available(&self) -> bool { matches!(self, Self::Available(_)) }

  pub fn available(&self) -> Option<&T> {
    match self {
      Self::Available(v) => Some(v),
      Self::Unavailable { .. } => None,
    }
  }
}

/// Fetch `id` and build a section from it, or mark the section unavailable
/// if the dataset did not load.
pub(crate) fn section<S, T>(
  source: &S,
  id: SourceId,
  build: impl FnOnce(&Table) -> Result<T>,
) -> Result<Section<T>>
where
  S: TableSource + ?Sized,
{
  match source.table(id) {
    Ok(table) => Ok(Section::Available(build(&table)?)),
    Err(e) => {
      tracing::warn!(source = %id, error = %e, "dataset unavailable");
      Ok(Section::Unavailable { reason: e.to_string() })
    }
  }
}

/// The table for `id`, or `None` if it did not load.
pub(crate) fn fetch<S>(source: &S, id: SourceId) -> Option<Arc<Table>>
where
  S: TableSource + ?Sized,
{
  match source.table(id) {
    Ok(table) => Some(table),
    Err(e) => {
      tracing::debug!(source = %id, error = %e, "dataset unavailable");
      None
    }
  }
}

// ─── Selector options ────────────────────────────────────────────────────────

/// Choices a presentation layer offers for a dataset's filters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectorOptions {
  /// Sorted distinct store names; the "All" sentinel is implied.
  pub stores:      Vec<String>,
  /// The full date span of the dataset, the default date range.
  pub date_bounds: Option<DateRange>,
}

impl SelectorOptions {
  pub fn collect(table: &Table, layout: &Layout) -> Self {
    let view = table.view();
    Self {
      stores:      view.distinct_text(layout.store),
      date_bounds: bounds(&view, layout),
    }
  }
}

// ─── Data summary ────────────────────────────────────────────────────────────

/// Row-level facts about a filtered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSummary {
  pub records:       usize,
  pub first_date:    Option<NaiveDate>,
  pub last_date:     Option<NaiveDate>,
  pub unique_stores: usize,
}

impl DataSummary {
  pub fn collect(view: &View<'_>, layout: &Layout) -> Self {
    let span = bounds(view, layout);
    Self {
      records:       view.len(),
      first_date:    span.map(|r| r.start),
      last_date:     span.map(|r| r.end),
      unique_stores: view.distinct_count(layout.store),
    }
  }
}

fn bounds(view: &View<'_>, layout: &Layout) -> Option<DateRange> {
  match layout.dates {
    DateColumns::Single(column) => view.date_bounds(column, column),
    DateColumns::Span { start, end } => view.date_bounds(start, end),
  }
}
