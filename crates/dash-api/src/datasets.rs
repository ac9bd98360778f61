//! Handlers for `GET /datasets` and `POST /datasets/reload`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
};
use dash_core::{
  schema::{Platform, SourceId},
  source::TableSource,
};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{error::ApiError, params};

/// Load outcome of one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetStatus {
  pub source:   SourceId,
  pub platform: Platform,
  pub loaded:   bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub records:  Option<usize>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error:    Option<String>,
}

/// Load every source (or take its cached outcome) and report the result.
pub fn statuses<S>(source: &S) -> Vec<DatasetStatus>
where
  S: TableSource + ?Sized,
{
  SourceId::iter()
    .map(|id| {
      let (loaded, records, error) = match source.table(id) {
        Ok(table) => (true, Some(table.len()), None),
        Err(e) => (false, None, Some(e.to_string())),
      };
      DatasetStatus { source: id, platform: id.platform(), loaded, records, error }
    })
    .collect()
}

/// `GET /datasets`
pub async fn list<S>(State(source): State<Arc<S>>) -> Result<Json<Vec<DatasetStatus>>, ApiError>
where
  S: TableSource + 'static,
{
  let list = tokio::task::spawn_blocking(move || statuses(source.as_ref())).await?;
  Ok(Json(list))
}

#[derive(Debug, Deserialize, Default)]
pub struct ReloadParams {
  pub source: Option<String>,
}

/// `POST /datasets/reload[?source=<id>]`
///
/// Drops cached results; the next access re-reads the files.
pub async fn reload<S>(
  State(source): State<Arc<S>>,
  Query(query): Query<ReloadParams>,
) -> Result<StatusCode, ApiError>
where
  S: TableSource + 'static,
{
  match params::selection::<SourceId>("source", query.source.as_deref())?.as_only() {
    Some(id) => source.invalidate(*id),
    None => source.invalidate_all(),
  }
  Ok(StatusCode::NO_CONTENT)
}
