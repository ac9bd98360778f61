//! Handler for `GET /grubhub`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use dash_core::{
  grubhub::{self, GrubHubReport, GrubHubSelection},
  source::TableSource,
};
use serde::Deserialize;

use crate::{error::ApiError, params};

#[derive(Debug, Deserialize, Default)]
pub struct GrubHubParams {
  pub start:         Option<String>,
  pub end:           Option<String>,
  pub store:         Option<String>,
  /// `New`, `Returning`, `Loyal` or `All`.
  pub customer_type: Option<String>,
  /// `GH+`, `Non-GH+` or `All`. The `+` must be sent percent-encoded
  /// (`GH%2B`); a literal `+` in a query string decodes to a space.
  pub gh_plus:       Option<String>,
}

impl GrubHubParams {
  pub fn selection(&self) -> Result<GrubHubSelection, ApiError> {
    Ok(GrubHubSelection {
      dates:         params::date_range(
        ("start", self.start.as_deref()),
        ("end", self.end.as_deref()),
      )?,
      store:         params::selection("store", self.store.as_deref())?,
      customer_type: params::selection("customer_type", self.customer_type.as_deref())?,
      gh_plus:       params::selection("gh_plus", self.gh_plus.as_deref())?,
    })
  }
}

/// `GET /grubhub[?start=...][&end=...][&store=...][&customer_type=...][&gh_plus=...]`
pub async fn handler<S>(
  State(source): State<Arc<S>>,
  Query(params): Query<GrubHubParams>,
) -> Result<Json<GrubHubReport>, ApiError>
where
  S: TableSource + 'static,
{
  let selection = params.selection()?;
  let report =
    tokio::task::spawn_blocking(move || grubhub::report(source.as_ref(), &selection)).await??;
  Ok(Json(report))
}
