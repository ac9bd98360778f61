//! Filter criteria and the row predicates built from them.
//!
//! [`Criteria`] is a snapshot of user selections. [`Predicate::build`] binds
//! it to a dataset's [`Layout`] and yields a pure, reusable row test. All
//! active constraints are combined with logical AND; a [`Selection::All`]
//! constraint is dropped entirely.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::table::{Row, Value};

// ─── Date interval ───────────────────────────────────────────────────────────

/// A closed calendar interval `[start, end]`.
///
/// An interval with `start > end` is legal and contains nothing. An open
/// side is stored as the extreme representable date and serialises as
/// `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
  pub start: NaiveDate,
  pub end:   NaiveDate,
}

impl DateRange {
  pub fn new(start: NaiveDate, end: NaiveDate) -> Self { Self { start, end } }

  /// Build a range from optional bounds; a missing bound is open.
  pub fn from_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<Self> {
    if start.is_none() && end.is_none() {
      return None;
    }
    Some(Self::new(
      start.unwrap_or(NaiveDate::MIN),
      end.unwrap_or(NaiveDate::MAX),
    ))
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start <= date && date <= self.end
  }

  pub fn is_empty(&self) -> bool { self.start > self.end }

  /// The lower bound, or `None` if the range is open below.
  pub fn start_bound(&self) -> Option<NaiveDate> {
    (self.start != NaiveDate::MIN).then_some(self.start)
  }

  /// The upper bound, or `None` if the range is open above.
  pub fn end_bound(&self) -> Option<NaiveDate> {
    (self.end != NaiveDate::MAX).then_some(self.end)
  }
}

impl Serialize for DateRange {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct Bounds {
      start: Option<NaiveDate>,
      end:   Option<NaiveDate>,
    }
    Bounds { start: self.start_bound(), end: self.end_bound() }.serialize(serializer)
  }
}

// ─── Selection ───────────────────────────────────────────────────────────────

/// A selector value where `All` means "no constraint".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection<T> {
  #[default]
  All,
  Only(T),
}

impl<T> Selection<T> {
  pub fn is_all(&self) -> bool { matches!(self, Self::All) }

  pub fn as_only(&self) -> Option<&T> {
    match self {
      Self::All => None,
      Self::Only(v) => Some(v),
    }
  }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Selection<U> {
    match self {
      Self::All => Selection::All,
      Self::Only(v) => Selection::Only(f(v)),
    }
  }
}

impl<T> From<Option<T>> for Selection<T> {
  fn from(v: Option<T>) -> Self {
    match v {
      Some(v) => Self::Only(v),
      None => Self::All,
    }
  }
}

impl<T: Serialize> Serialize for Selection<T> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Self::All => serializer.serialize_str("All"),
      Self::Only(v) => v.serialize(serializer),
    }
  }
}

// ─── Layout ──────────────────────────────────────────────────────────────────

/// Which column(s) carry a row's date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateColumns {
  /// One date per row (a transaction timestamp, a campaign day).
  Single(&'static str),
  /// A summary period; both ends must fall inside the selected interval.
  Span {
    start: &'static str,
    end:   &'static str,
  },
}

/// Where a dataset keeps the columns that date and store criteria apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
  pub dates: DateColumns,
  pub store: &'static str,
}

// ─── Criteria ────────────────────────────────────────────────────────────────

/// User selections for one render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
  pub dates:  Option<DateRange>,
  pub store:  Selection<String>,
  /// Extra equality constraints as `(column, value)`.
  pub equals: Vec<(String, Selection<Value>)>,
}

impl Criteria {
  pub fn new() -> Self { Self::default() }

  pub fn with_dates(mut self, dates: Option<DateRange>) -> Self {
    self.dates = dates;
    self
  }

  pub fn with_store(mut self, store: Selection<String>) -> Self {
    self.store = store;
    self
  }

  pub fn with_equals(
    mut self,
    column: impl Into<String>,
    value: Selection<Value>,
  ) -> Self {
    self.equals.push((column.into(), value));
    self
  }
}

// ─── Predicate ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Clause {
  DateWithin {
    column: &'static str,
    range:  DateRange,
  },
  SpanWithin {
    start: &'static str,
    end:   &'static str,
    range: DateRange,
  },
  Equals {
    column: String,
    value:  Value,
  },
}

impl Clause {
  fn matches(&self, row: &Row<'_>) -> bool {
    let within = |column: &str, range: &DateRange| {
      row
        .get(column)
        .and_then(Value::as_date)
        .is_some_and(|d| range.contains(d))
    };
    match self {
      Self::DateWithin { column, range } => within(column, range),
      Self::SpanWithin { start, end, range } => {
        within(start, range) && within(end, range)
      }
      Self::Equals { column, value } => row.get(column) == Some(value),
    }
  }
}

/// A conjunction of row tests.
///
/// Deterministic and side-effect-free; one predicate can be applied to any
/// table with the same schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
  clauses: Vec<Clause>,
}

impl Predicate {
  /// A predicate that accepts every row.
  pub fn always() -> Self { Self::default() }

  pub fn build(criteria: &Criteria, layout: &Layout) -> Self {
    let mut clauses = Vec::new();

    if let Some(range) = criteria.dates {
      clauses.push(match layout.dates {
        DateColumns::Single(column) => Clause::DateWithin { column, range },
        DateColumns::Span { start, end } => Clause::SpanWithin { start, end, range },
      });
    }

    if let Selection::Only(store) = &criteria.store {
      clauses.push(Clause::Equals {
        column: layout.store.to_owned(),
        value:  Value::Text(store.clone()),
      });
    }

    for (column, selection) in &criteria.equals {
      if let Selection::Only(value) = selection {
        clauses.push(Clause::Equals {
          column: column.clone(),
          value:  value.clone(),
        });
      }
    }

    Self { clauses }
  }

  pub fn is_unconstrained(&self) -> bool { self.clauses.is_empty() }

  pub fn matches(&self, row: &Row<'_>) -> bool {
    self.clauses.iter().all(|clause| clause.matches(row))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::table::Table;

  const LAYOUT: Layout = Layout {
    dates: DateColumns::Single("day"),
    store: "store",
  };

  const SPAN: Layout = Layout {
    dates: DateColumns::Span { start: "from", end: "to" },
    store: "store",
  };

  fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
  }

  fn table() -> Table {
    let mut t = Table::new(["store", "day", "self_serve"]);
    let rows = [
      ("A", date(9, 22), true),
      ("B", date(9, 25), false),
      ("A", date(10, 1), false),
      ("C", date(10, 5), true),
    ];
    for (store, day, flag) in rows {
      t.push_row(vec![store.into(), day.into(), flag.into()]).unwrap();
    }
    t.push_row(vec!["D".into(), Value::Null, true.into()]).unwrap();
    t
  }

  fn positions(t: &Table, criteria: &Criteria, layout: &Layout) -> Vec<usize> {
    t.filter(&Predicate::build(criteria, layout))
      .positions()
      .to_vec()
  }

  #[test]
  fn unset_criteria_keep_every_row() {
    let t = table();
    let criteria = Criteria::new()
      .with_store(Selection::All)
      .with_equals("self_serve", Selection::All);
    let predicate = Predicate::build(&criteria, &LAYOUT);
    assert!(predicate.is_unconstrained());
    assert_eq!(t.filter(&predicate).len(), t.len());
  }

  #[test]
  fn date_range_is_inclusive_on_both_ends() {
    let t = table();
    let criteria =
      Criteria::new().with_dates(Some(DateRange::new(date(9, 25), date(10, 1))));
    assert_eq!(positions(&t, &criteria, &LAYOUT), vec![1, 2]);
  }

  #[test]
  fn date_range_ignores_time_of_day() {
    let mut t = Table::new(["store", "day"]);
    let evening = date(9, 30).and_hms_opt(23, 59, 59).unwrap();
    t.push_row(vec!["A".into(), evening.into()]).unwrap();
    let criteria =
      Criteria::new().with_dates(Some(DateRange::new(date(9, 1), date(9, 30))));
    assert_eq!(positions(&t, &criteria, &LAYOUT), vec![0]);
  }

  #[test]
  fn full_bounds_keep_every_dated_row() {
    let t = table();
    let bounds = t.view().date_bounds("day", "day").unwrap();
    let criteria = Criteria::new().with_dates(Some(bounds));
    // The null-dated row cannot satisfy a date constraint.
    assert_eq!(positions(&t, &criteria, &LAYOUT).len(), t.len() - 1);
  }

  #[test]
  fn inverted_range_matches_nothing() {
    let t = table();
    let range = DateRange::new(date(10, 5), date(9, 22));
    assert!(range.is_empty());
    let criteria = Criteria::new().with_dates(Some(range));
    assert!(positions(&t, &criteria, &LAYOUT).is_empty());
  }

  #[test]
  fn store_and_flag_are_conjunctive() {
    let t = table();
    let criteria = Criteria::new()
      .with_store(Selection::Only("A".into()))
      .with_equals("self_serve", Selection::Only(Value::Bool(false)));
    assert_eq!(positions(&t, &criteria, &LAYOUT), vec![2]);
  }

  #[test]
  fn unknown_column_matches_nothing() {
    let t = table();
    let criteria =
      Criteria::new().with_equals("channel", Selection::Only("web".into()));
    assert!(positions(&t, &criteria, &LAYOUT).is_empty());
  }

  #[test]
  fn span_requires_both_ends_inside() {
    let mut t = Table::new(["store", "from", "to"]);
    t.push_row(vec!["A".into(), date(9, 22).into(), date(9, 28).into()])
      .unwrap();
    t.push_row(vec!["A".into(), date(9, 29).into(), date(10, 5).into()])
      .unwrap();
    t.push_row(vec!["A".into(), date(9, 15).into(), date(9, 21).into()])
      .unwrap();

    let criteria =
      Criteria::new().with_dates(Some(DateRange::new(date(9, 22), date(9, 30))));
    assert_eq!(positions(&t, &criteria, &SPAN), vec![0]);
  }

  #[test]
  fn open_bounds() {
    assert_eq!(DateRange::from_bounds(None, None), None);
    let range = DateRange::from_bounds(Some(date(10, 1)), None).unwrap();
    assert!(range.contains(date(12, 31)));
    assert!(!range.contains(date(9, 30)));
    assert_eq!(range.start_bound(), Some(date(10, 1)));
    assert_eq!(range.end_bound(), None);
  }

  #[test]
  fn open_bounds_serialize_as_null() {
    let range = DateRange::from_bounds(None, Some(date(9, 30))).unwrap();
    let json = serde_json::to_value(range).unwrap();
    assert_eq!(json, serde_json::json!({ "start": null, "end": "2025-09-30" }));

    let closed = serde_json::to_value(DateRange::new(date(9, 22), date(9, 30))).unwrap();
    assert_eq!(closed, serde_json::json!({ "start": "2025-09-22", "end": "2025-09-30" }));
  }

  #[test]
  fn selection_serializes_all_sentinel() {
    let all: Selection<String> = Selection::All;
    assert_eq!(serde_json::to_string(&all).unwrap(), "\"All\"");
    let only = Selection::Only(true);
    assert_eq!(serde_json::to_string(&only).unwrap(), "true");
  }
}
