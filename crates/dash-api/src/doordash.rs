//! Handler for `GET /doordash`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use dash_core::{
  doordash::{self, DoorDashReport, DoorDashSelection},
  source::TableSource,
};
use serde::Deserialize;

use crate::{error::ApiError, params};

#[derive(Debug, Deserialize, Default)]
pub struct DoorDashParams {
  pub marketing_start: Option<String>,
  pub marketing_end:   Option<String>,
  /// `true`, `false` (any case) or `All`.
  pub self_serve:      Option<String>,
  pub marketing_store: Option<String>,
  pub financial_start: Option<String>,
  pub financial_end:   Option<String>,
  pub financial_store: Option<String>,
}

impl DoorDashParams {
  pub fn selection(&self) -> Result<DoorDashSelection, ApiError> {
    Ok(DoorDashSelection {
      marketing_dates: params::date_range(
        ("marketing_start", self.marketing_start.as_deref()),
        ("marketing_end", self.marketing_end.as_deref()),
      )?,
      self_serve:      params::flag("self_serve", self.self_serve.as_deref())?,
      marketing_store: params::selection("marketing_store", self.marketing_store.as_deref())?,
      financial_dates: params::date_range(
        ("financial_start", self.financial_start.as_deref()),
        ("financial_end", self.financial_end.as_deref()),
      )?,
      financial_store: params::selection("financial_store", self.financial_store.as_deref())?,
    })
  }
}

/// `GET /doordash[?marketing_start=...][&self_serve=...][&financial_store=...]...`
pub async fn handler<S>(
  State(source): State<Arc<S>>,
  Query(params): Query<DoorDashParams>,
) -> Result<Json<DoorDashReport>, ApiError>
where
  S: TableSource + 'static,
{
  let selection = params.selection()?;
  let report =
    tokio::task::spawn_blocking(move || doordash::report(source.as_ref(), &selection)).await??;
  Ok(Json(report))
}
