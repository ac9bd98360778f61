//! Query-string parsing shared by the report handlers.
//!
//! Parameters arrive as raw strings so that a bad value produces a JSON 400
//! naming the parameter, instead of the extractor's plain-text rejection.

use std::{fmt::Display, str::FromStr};

use chrono::NaiveDate;
use dash_core::filter::{DateRange, Selection};

use crate::error::ApiError;

/// The sentinel for "no constraint" in selector parameters.
pub const ALL: &str = "All";

fn bad(field: &str, value: &str, reason: impl Display) -> ApiError {
  ApiError::BadRequest(format!("invalid {field} {value:?}: {reason}"))
}

pub fn date(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
  match raw.map(str::trim).filter(|s| !s.is_empty()) {
    None => Ok(None),
    Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
      .map(Some)
      .map_err(|e| bad(field, s, e)),
  }
}

/// A date range from two optional bounds. A missing bound is open; no
/// bounds at all means no date constraint.
pub fn date_range(
  (start_field, start): (&str, Option<&str>),
  (end_field, end): (&str, Option<&str>),
) -> Result<Option<DateRange>, ApiError> {
  Ok(DateRange::from_bounds(date(start_field, start)?, date(end_field, end)?))
}

/// A selector value; omitted, empty or `All` means unconstrained.
pub fn selection<T>(field: &str, raw: Option<&str>) -> Result<Selection<T>, ApiError>
where
  T: FromStr,
  T::Err: Display,
{
  match raw.map(str::trim).filter(|s| !s.is_empty() && *s != ALL) {
    None => Ok(Selection::All),
    Some(s) => s.parse().map(Selection::Only).map_err(|e| bad(field, s, e)),
  }
}

/// A boolean selector; `true`/`false` in any case, as the loader reads
/// boolean cells.
pub fn flag(field: &str, raw: Option<&str>) -> Result<Selection<bool>, ApiError> {
  match selection::<String>(field, raw)? {
    Selection::All => Ok(Selection::All),
    Selection::Only(s) if s.eq_ignore_ascii_case("true") => Ok(Selection::Only(true)),
    Selection::Only(s) if s.eq_ignore_ascii_case("false") => Ok(Selection::Only(false)),
    Selection::Only(s) => Err(bad(field, &s, "expected true or false")),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn all_and_blank_are_unconstrained() {
    assert_eq!(selection::<String>("store", None).unwrap(), Selection::All);
    assert_eq!(selection::<String>("store", Some("All")).unwrap(), Selection::All);
    assert_eq!(selection::<String>("store", Some(" ")).unwrap(), Selection::All);
    assert_eq!(
      selection::<String>("store", Some("Midtown")).unwrap(),
      Selection::Only("Midtown".to_owned())
    );
  }

  #[test]
  fn bad_values_name_the_parameter() {
    let err = flag("self_serve", Some("maybe")).unwrap_err();
    assert!(err.to_string().contains("self_serve"));

    let err = date("start", Some("22/09/2025")).unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(m) if m.contains("start")));
  }

  #[test]
  fn flags_ignore_case() {
    assert_eq!(flag("self_serve", Some("True")).unwrap(), Selection::Only(true));
    assert_eq!(flag("self_serve", Some("FALSE")).unwrap(), Selection::Only(false));
    assert_eq!(flag("self_serve", Some("All")).unwrap(), Selection::All);
  }

  #[test]
  fn one_sided_ranges_are_open() {
    let range = date_range(("start", Some("2025-09-22")), ("end", None))
      .unwrap()
      .unwrap();
    assert_eq!(range.start, NaiveDate::from_ymd_opt(2025, 9, 22).unwrap());
    assert_eq!(range.end, NaiveDate::MAX);
    assert_eq!(date_range(("start", None), ("end", None)).unwrap(), None);
  }
}
