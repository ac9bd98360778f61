//! Cell parsing and column kind inference.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use dash_core::{schema::ColumnKind, table::Value};

const DATETIME_FORMATS: &[&str] = &[
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%d %H:%M",
  "%m/%d/%Y %H:%M:%S",
  "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a date or timestamp. Offsets are dropped and the local clock time
/// kept; a bare date is midnight.
pub(crate) fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.naive_local());
  }
  DATETIME_FORMATS
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    .or_else(|| {
      DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
    })
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
  if raw.eq_ignore_ascii_case("true") {
    Some(true)
  } else if raw.eq_ignore_ascii_case("false") {
    Some(false)
  } else {
    None
  }
}

pub(crate) fn parse_number(raw: &str) -> Option<f64> {
  raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a non-empty cell as `kind`, or `None` if it does not fit.
pub(crate) fn parse_cell(raw: &str, kind: ColumnKind) -> Option<Value> {
  match kind {
    ColumnKind::Text => Some(Value::Text(raw.to_owned())),
    ColumnKind::Number => parse_number(raw).map(Value::Number),
    ColumnKind::Bool => parse_bool(raw).map(Value::Bool),
    ColumnKind::Date => parse_datetime(raw).map(Value::DateTime),
  }
}

/// The kind of an undeclared column: boolean if every non-empty cell is
/// `true`/`false`, number if every one parses as a number, otherwise text.
pub(crate) fn infer_kind<'a>(cells: impl Iterator<Item = &'a str> + Clone) -> ColumnKind {
  let mut present = cells.filter(|c| !c.is_empty()).peekable();
  if present.peek().is_none() {
    return ColumnKind::Text;
  }
  if present.clone().all(|c| parse_bool(c).is_some()) {
    ColumnKind::Bool
  } else if present.all(|c| parse_number(c).is_some()) {
    ColumnKind::Number
  } else {
    ColumnKind::Text
  }
}
