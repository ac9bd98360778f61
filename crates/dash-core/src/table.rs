//! Column-indexed tables and the filtered views derived from them.
//!
//! A [`Table`] is immutable once loaded and is shared by reference. Every
//! derived selection is a [`View`]: a list of row positions into the table,
//! so a view can reorder or drop rows but never invent or duplicate them.

use std::{cmp::Ordering, collections::HashMap};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::{
  Error, Result,
  filter::{DateRange, Predicate},
};

// ─── Cell values ─────────────────────────────────────────────────────────────

/// A single typed cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
  Null,
  Bool(bool),
  Number(f64),
  Text(String),
  DateTime(NaiveDateTime),
}

impl Value {
  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }

  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Self::Number(n) => Some(*n),
      _ => None,
    }
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Self::Bool(b) => Some(*b),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::Text(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_datetime(&self) -> Option<NaiveDateTime> {
    match self {
      Self::DateTime(dt) => Some(*dt),
      _ => None,
    }
  }

  /// Calendar date of a date/time cell; time-of-day is discarded.
  pub fn as_date(&self) -> Option<NaiveDate> {
    self.as_datetime().map(|dt| dt.date())
  }

  /// Hashable identity used for grouping. Equality is on the raw value.
  pub(crate) fn key(&self) -> ValueKey {
    match self {
      Self::Null => ValueKey::Null,
      Self::Bool(b) => ValueKey::Bool(*b),
      // -0.0 and 0.0 compare equal, so they must group together.
      Self::Number(n) if *n == 0.0 => ValueKey::Number(0f64.to_bits()),
      Self::Number(n) => ValueKey::Number(n.to_bits()),
      Self::Text(s) => ValueKey::Text(s.clone()),
      Self::DateTime(dt) => ValueKey::DateTime(*dt),
    }
  }

  /// Ascending order within one column. Nulls are handled by the caller.
  fn cmp_same_kind(&self, other: &Self) -> Ordering {
    match (self, other) {
      (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
      (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
      (Self::Text(a), Self::Text(b)) => a.cmp(b),
      (Self::DateTime(a), Self::DateTime(b)) => a.cmp(b),
      _ => Ordering::Equal,
    }
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<String> for Value {
  fn from(s: String) -> Self { Self::Text(s) }
}

impl From<f64> for Value {
  fn from(n: f64) -> Self { Self::Number(n) }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self { Self::Bool(b) }
}

impl From<NaiveDateTime> for Value {
  fn from(dt: NaiveDateTime) -> Self { Self::DateTime(dt) }
}

impl From<NaiveDate> for Value {
  fn from(d: NaiveDate) -> Self { Self::DateTime(d.and_time(NaiveTime::MIN)) }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ValueKey {
  Null,
  Bool(bool),
  Number(u64),
  Text(String),
  DateTime(NaiveDateTime),
}

// ─── Table ───────────────────────────────────────────────────────────────────

/// An ordered sequence of rows sharing one set of named columns.
#[derive(Debug, Clone, Default)]
pub struct Table {
  columns: Vec<String>,
  index:   HashMap<String, usize>,
  rows:    Vec<Vec<Value>>,
}

impl Table {
  /// Create an empty table. A repeated column name resolves to its first
  /// occurrence.
  pub fn new<I, S>(columns: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
    let mut index = HashMap::with_capacity(columns.len());
    for (i, name) in columns.iter().enumerate() {
      index.entry(name.clone()).or_insert(i);
    }
    Self { columns, index, rows: Vec::new() }
  }

  /// Append a row; its length must match the column count.
  pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
    if row.len() != self.columns.len() {
      return Err(Error::RowArity {
        expected: self.columns.len(),
        found:    row.len(),
      });
    }
    self.rows.push(row);
    Ok(())
  }

  pub fn columns(&self) -> &[String] { &self.columns }

  pub fn column_index(&self, name: &str) -> Option<usize> {
    self.index.get(name).copied()
  }

  pub fn has_column(&self, name: &str) -> bool { self.index.contains_key(name) }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  pub fn row(&self, position: usize) -> Option<Row<'_>> {
    (position < self.rows.len()).then_some(Row { table: self, position })
  }

  pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
    (0..self.rows.len()).map(move |position| Row { table: self, position })
  }

  /// A view over every row, in load order.
  pub fn view(&self) -> View<'_> {
    View { table: self, positions: (0..self.rows.len()).collect() }
  }

  /// The rows matching `predicate`, in load order.
  pub fn filter(&self, predicate: &Predicate) -> View<'_> {
    self.view().filter(predicate)
  }
}

// ─── Row ─────────────────────────────────────────────────────────────────────

/// A borrowed row of a [`Table`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
  table:    &'a Table,
  position: usize,
}

impl<'a> Row<'a> {
  /// Position of this row in its source table.
  pub fn position(&self) -> usize { self.position }

  pub fn values(&self) -> &'a [Value] { &self.table.rows[self.position] }

  /// The cell in column `name`, or `None` if the table has no such column.
  pub fn get(&self, name: &str) -> Option<&'a Value> {
    let i = self.table.column_index(name)?;
    self.values().get(i)
  }

  pub(crate) fn at(&self, column: usize) -> &'a Value {
    &self.table.rows[self.position][column]
  }
}

// ─── View ────────────────────────────────────────────────────────────────────

/// Sort direction for [`View::sorted_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  Ascending,
  Descending,
}

/// A selection of rows from one [`Table`].
#[derive(Debug, Clone)]
pub struct View<'a> {
  table:     &'a Table,
  positions: Vec<usize>,
}

impl<'a> View<'a> {
  pub(crate) fn from_positions(table: &'a Table, positions: Vec<usize>) -> Self {
    Self { table, positions }
  }

  pub fn table(&self) -> &'a Table { self.table }

  pub fn positions(&self) -> &[usize] { &self.positions }

  pub fn len(&self) -> usize { self.positions.len() }

  pub fn is_empty(&self) -> bool { self.positions.is_empty() }

  pub fn rows(&self) -> impl Iterator<Item = Row<'a>> + '_ {
    let table = self.table;
    self.positions.iter().map(move |&position| Row { table, position })
  }

  /// Narrow this view to the rows matching `predicate`.
  pub fn filter(&self, predicate: &Predicate) -> View<'a> {
    let positions = self
      .rows()
      .filter(|row| predicate.matches(row))
      .map(|row| row.position)
      .collect();
    View { table: self.table, positions }
  }

  /// Stable sort by `column`. Null cells sort last in either direction; an
  /// unknown column leaves the order unchanged.
  pub fn sorted_by(&self, column: &str, direction: Direction) -> View<'a> {
    let mut positions = self.positions.clone();
    if let Some(i) = self.table.column_index(column) {
      let rows = &self.table.rows;
      positions.sort_by(|&a, &b| {
        let (va, vb) = (&rows[a][i], &rows[b][i]);
        match (va.is_null(), vb.is_null()) {
          (true, true) => Ordering::Equal,
          (true, false) => Ordering::Greater,
          (false, true) => Ordering::Less,
          (false, false) => match direction {
            Direction::Ascending => va.cmp_same_kind(vb),
            Direction::Descending => vb.cmp_same_kind(va),
          },
        }
      });
    }
    View { table: self.table, positions }
  }

  /// Sorted distinct text values of `column`, skipping nulls.
  pub fn distinct_text(&self, column: &str) -> Vec<String> {
    let Some(i) = self.table.column_index(column) else {
      return Vec::new();
    };
    let mut values: Vec<String> = self
      .rows()
      .filter_map(|row| row.at(i).as_str().map(str::to_owned))
      .collect();
    values.sort();
    values.dedup();
    values
  }

  /// Number of distinct non-null values in `column`.
  pub fn distinct_count(&self, column: &str) -> usize {
    let Some(i) = self.table.column_index(column) else {
      return 0;
    };
    let mut seen = std::collections::HashSet::new();
    for row in self.rows() {
      let value = row.at(i);
      if !value.is_null() {
        seen.insert(value.key());
      }
    }
    seen.len()
  }

  pub fn min_date(&self, column: &str) -> Option<NaiveDate> {
    let i = self.table.column_index(column)?;
    self.rows().filter_map(|row| row.at(i).as_date()).min()
  }

  pub fn max_date(&self, column: &str) -> Option<NaiveDate> {
    let i = self.table.column_index(column)?;
    self.rows().filter_map(|row| row.at(i).as_date()).max()
  }

  /// `[min(start_column), max(end_column)]`, or `None` if either column has
  /// no dates in this view.
  pub fn date_bounds(&self, start_column: &str, end_column: &str) -> Option<DateRange> {
    Some(DateRange::new(
      self.min_date(start_column)?,
      self.max_date(end_column)?,
    ))
  }
}
