//! Reading one CSV export into a typed [`Table`].

use std::{fs::File, io::Read, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};
use dash_core::{
  schema::{ColumnKind, DATE_COLUMNS, DatePolicy, SourceId},
  table::{Table, Value},
};

use crate::{
  Error, Result,
  parse::{infer_kind, parse_cell},
};

/// Read a CSV export for `source` from `reader`.
///
/// Every column declared by the source's schema must be present. Declared
/// columns are parsed as their declared kind, known date columns as dates,
/// and the rest as the kind inferred from their content. Empty cells are
/// null.
pub fn read_table<R: Read>(reader: R, source: SourceId) -> Result<Table> {
  let schema = source.schema();
  let mut csv = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

  let headers: Vec<String> = csv.headers()?.iter().map(str::to_owned).collect();
  for (column, _) in schema.columns {
    if !headers.iter().any(|h| h == column) {
      return Err(Error::MissingColumn { dataset: source, column: (*column).to_owned() });
    }
  }

  let records = csv.records().collect::<Result<Vec<StringRecord>, _>>()?;

  let kinds: Vec<ColumnKind> = headers
    .iter()
    .enumerate()
    .map(|(i, name)| {
      schema.kind_of(name).unwrap_or_else(|| {
        if DATE_COLUMNS.contains(&name.as_str()) {
          ColumnKind::Date
        } else {
          infer_kind(records.iter().map(|r| r.get(i).unwrap_or("")))
        }
      })
    })
    .collect();

  let mut table = Table::new(headers.iter().map(String::as_str));
  let mut coerced = 0usize;
  for (index, record) in records.iter().enumerate() {
    let mut row = Vec::with_capacity(headers.len());
    for (i, kind) in kinds.iter().enumerate() {
      let raw = record.get(i).unwrap_or("");
      if raw.is_empty() {
        row.push(Value::Null);
        continue;
      }
      match parse_cell(raw, *kind) {
        Some(value) => row.push(value),
        None if *kind == ColumnKind::Date && schema.dates == DatePolicy::Coerce => {
          coerced += 1;
          row.push(Value::Null);
        }
        None => {
          return Err(Error::InvalidValue {
            dataset:  source,
            column:   headers[i].clone(),
            // Header is line 1.
            line:     index + 2,
            value:    raw.to_owned(),
            expected: *kind,
          });
        }
      }
    }
    table.push_row(row)?;
  }

  if coerced > 0 {
    tracing::warn!(%source, cells = coerced, "unparsable dates replaced with nulls");
  }
  Ok(table)
}

/// Load the export for `source` from the file at `path`.
pub fn load_path(path: &Path, source: SourceId) -> Result<Table> {
  let file = File::open(path).map_err(|e| match e.kind() {
    std::io::ErrorKind::NotFound => Error::NotFound(path.to_owned()),
    _ => Error::Io { path: path.to_owned(), source: e },
  })?;
  let table = read_table(file, source)?;
  tracing::info!(%source, path = %path.display(), rows = table.len(), "dataset loaded");
  Ok(table)
}
