//! Declarative reducers, scalar summaries and grouped roll-ups.
//!
//! Degenerate input is never an error: an empty view sums to zero, the mean
//! of nothing is zero, and a ratio with a zero denominator is zero. Null
//! cells are skipped by every column reducer.

use std::collections::HashMap;

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{
  Error, Result,
  table::{Table, Value, View},
};

// ─── Reducers ────────────────────────────────────────────────────────────────

/// How one metric is computed from a set of rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Reducer {
  Sum(String),
  /// `|sum(column)|`, for columns the exports record as negative amounts.
  AbsSum(String),
  Mean(String),
  Count,
  /// `numerator / denominator`, each reduced over the same rows.
  Ratio(Box<Reducer>, Box<Reducer>),
}

impl Reducer {
  pub fn sum(column: impl Into<String>) -> Self { Self::Sum(column.into()) }

  pub fn abs_sum(column: impl Into<String>) -> Self { Self::AbsSum(column.into()) }

  pub fn mean(column: impl Into<String>) -> Self { Self::Mean(column.into()) }

  pub fn count() -> Self { Self::Count }

  pub fn ratio(numerator: Reducer, denominator: Reducer) -> Self {
    Self::Ratio(Box::new(numerator), Box::new(denominator))
  }

  /// Fail with [`Error::UnknownColumn`] if any referenced column is missing.
  fn check(&self, table: &Table) -> Result<()> {
    match self {
      Self::Sum(c) | Self::AbsSum(c) | Self::Mean(c) => {
        if table.has_column(c) {
          Ok(())
        } else {
          Err(Error::UnknownColumn(c.clone()))
        }
      }
      Self::Count => Ok(()),
      Self::Ratio(n, d) => {
        n.check(table)?;
        d.check(table)
      }
    }
  }

  fn reduce(&self, view: &View<'_>) -> f64 {
    match self {
      Self::Sum(c) => numbers(view, c).sum(),
      Self::AbsSum(c) => numbers(view, c).sum::<f64>().abs(),
      Self::Mean(c) => {
        let (total, n) = numbers(view, c).fold((0.0, 0usize), |(t, n), v| (t + v, n + 1));
        if n == 0 { 0.0 } else { total / n as f64 }
      }
      Self::Count => view.len() as f64,
      Self::Ratio(n, d) => {
        let denominator = d.reduce(view);
        if denominator == 0.0 {
          0.0
        } else {
          n.reduce(view) / denominator
        }
      }
    }
  }
}

fn numbers<'v>(view: &'v View<'_>, column: &str) -> impl Iterator<Item = f64> + 'v {
  let index = view.table().column_index(column);
  view
    .rows()
    .filter_map(move |row| index.and_then(|i| row.at(i).as_f64()))
}

/// A named reducer.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDef {
  pub name:    String,
  pub reducer: Reducer,
}

pub fn metric(name: impl Into<String>, reducer: Reducer) -> MetricDef {
  MetricDef { name: name.into(), reducer }
}

// ─── Metrics ─────────────────────────────────────────────────────────────────

/// Named scalar results in declaration order. Serialises as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics(Vec<(String, f64)>);

impl Metrics {
  pub fn get(&self, name: &str) -> Option<f64> {
    self.0.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
    self.0.iter().map(|(n, v)| (n.as_str(), *v))
  }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  fn compute(view: &View<'_>, defs: &[MetricDef]) -> Self {
    Self(
      defs
        .iter()
        .map(|def| (def.name.clone(), def.reducer.reduce(view)))
        .collect(),
    )
  }
}

impl Serialize for Metrics {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.0.len()))?;
    for (name, value) in &self.0 {
      map.serialize_entry(name, value)?;
    }
    map.end()
  }
}

/// Reduce a whole view to one value per metric definition.
pub fn summarize(view: &View<'_>, defs: &[MetricDef]) -> Result<Metrics> {
  for def in defs {
    def.reducer.check(view.table())?;
  }
  Ok(Metrics::compute(view, defs))
}

// ─── Roll-ups ────────────────────────────────────────────────────────────────

/// One group of a [`Rollup`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
  pub key:     Value,
  pub metrics: Metrics,
}

/// Per-group metrics, sorted descending by one of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rollup {
  pub group_key: String,
  pub sorted_by: String,
  pub rows:      Vec<GroupRow>,
}

impl Rollup {
  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  /// The group keys in output order.
  pub fn keys(&self) -> impl Iterator<Item = &Value> { self.rows.iter().map(|r| &r.key) }
}

/// Group `view` by `group_key`, reduce each group with `defs`, sort
/// descending by the metric named `sort_metric` and keep the first `top_n`
/// groups (`0` keeps all).
///
/// Ties keep first-encountered order. Rows with a null key belong to no
/// group. A `group_key` that is not a column of the table yields an empty
/// roll-up.
pub fn rollup(
  view: &View<'_>,
  group_key: &str,
  defs: &[MetricDef],
  sort_metric: &str,
  top_n: usize,
) -> Result<Rollup> {
  let sort_index = defs
    .iter()
    .position(|def| def.name == sort_metric)
    .ok_or_else(|| Error::UnknownMetric(sort_metric.to_owned()))?;
  for def in defs {
    def.reducer.check(view.table())?;
  }

  let mut out = Rollup {
    group_key: group_key.to_owned(),
    sorted_by: sort_metric.to_owned(),
    rows:      Vec::new(),
  };

  let Some(key_column) = view.table().column_index(group_key) else {
    tracing::debug!(group_key, "roll-up key is not a column; returning no groups");
    return Ok(out);
  };

  let mut slots = HashMap::new();
  let mut groups: Vec<(Value, Vec<usize>)> = Vec::new();
  for row in view.rows() {
    let key = row.at(key_column);
    if key.is_null() {
      continue;
    }
    let slot = *slots.entry(key.key()).or_insert_with(|| {
      groups.push((key.clone(), Vec::new()));
      groups.len() - 1
    });
    groups[slot].1.push(row.position());
  }

  out.rows = groups
    .into_iter()
    .map(|(key, positions)| {
      let group = View::from_positions(view.table(), positions);
      GroupRow { key, metrics: Metrics::compute(&group, defs) }
    })
    .collect();

  // `sort_by` is stable, so equal metrics keep encounter order.
  out
    .rows
    .sort_by(|a, b| b.metrics.0[sort_index].1.total_cmp(&a.metrics.0[sort_index].1));
  if top_n > 0 {
    out.rows.truncate(top_n);
  }
  Ok(out)
}
