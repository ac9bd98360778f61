//! JSON API for the delivery dashboard.
//!
//! Exposes an axum [`Router`] backed by any [`dash_core::source::TableSource`].
//! Reports are computed on the blocking pool because a cold source reads
//! its file from disk.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", dash_api::api_router(cache.clone()))
//! ```

pub mod datasets;
pub mod doordash;
pub mod error;
pub mod grubhub;
pub mod params;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use dash_core::source::TableSource;

pub use error::ApiError;

/// Build a fully-materialised API router for `source`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(source: Arc<S>) -> Router<()>
where
  S: TableSource + 'static,
{
  Router::new()
    // Reports
    .route("/doordash", get(doordash::handler::<S>))
    .route("/grubhub", get(grubhub::handler::<S>))
    // Datasets
    .route("/datasets", get(datasets::list::<S>))
    .route("/datasets/reload", post(datasets::reload::<S>))
    .with_state(source)
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use dash_core::{
    doordash::col as dd,
    grubhub::col as gh,
    schema::SourceId,
    source::MemorySource,
    table::Table,
  };
  use serde_json::Value as Json;
  use tower::ServiceExt;

  use super::*;

  fn financial() -> Table {
    let mut t = Table::new([
      dd::STORE_NAME,
      dd::TIMESTAMP_LOCAL_DATE,
      dd::TRANSACTION_TYPE,
      dd::FINAL_ORDER_STATUS,
      dd::SUBTOTAL,
      dd::NET_TOTAL,
    ]);
    let day = chrono::NaiveDate::from_ymd_opt(2025, 9, 22).unwrap();
    for (store, subtotal, net) in [("A", 100.0, 90.0), ("A", 50.0, 45.0), ("B", 30.0, 27.0)] {
      t.push_row(vec![
        store.into(),
        day.into(),
        "Order".into(),
        "Delivered".into(),
        subtotal.into(),
        net.into(),
      ])
      .unwrap();
    }
    t
  }

  fn memory() -> Arc<MemorySource> {
    Arc::new(
      MemorySource::new()
        .with(SourceId::DoordashFinancial, financial())
        .with(
          SourceId::GrubhubProductMix,
          Table::new([
            gh::STORE_NAME,
            gh::START_DATE,
            gh::END_DATE,
            gh::MENU_ITEM_NAME,
            gh::QUANTITY_SOLD,
            gh::ITEM_SALES,
          ]),
        ),
    )
  }

  async fn call<S: TableSource + 'static>(
    source: Arc<S>,
    method: &str,
    uri: &str,
  ) -> (StatusCode, Option<Json>) {
    let req = Request::builder()
      .method(method)
      .uri(uri)
      .body(Body::empty())
      .unwrap();
    let resp = api_router(source).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, serde_json::from_slice(&bytes).ok())
  }

  // ─── Reports ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn doordash_report_isolates_missing_marketing() {
    let (status, body) = call(memory(), "GET", "/doordash").await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();

    assert_eq!(body["financial"]["status"], "available");
    assert_eq!(body["financial"]["metrics"]["overall_subtotal"], 180.0);
    assert_eq!(body["financial"]["top_stores"]["rows"][0]["key"], "A");
    assert_eq!(body["financial"]["summary"]["records"], 3);
    assert_eq!(body["financial"]["summary"]["total_subtotal"], 180.0);
    assert_eq!(body["marketing"]["status"], "unavailable");
    assert!(
      body["marketing"]["reason"]
        .as_str()
        .unwrap()
        .contains("doordash_marketing")
    );
    assert_eq!(body["filters"]["financial_store"], "All");
  }

  #[tokio::test]
  async fn doordash_store_filter_narrows_metrics() {
    let (status, body) = call(memory(), "GET", "/doordash?financial_store=B").await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["financial"]["metrics"]["net_total"], 27.0);
    assert_eq!(body["filters"]["financial_store"], "B");
  }

  #[tokio::test]
  async fn bad_query_values_are_rejected() {
    let (status, body) = call(memory(), "GET", "/doordash?financial_start=yesterday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.unwrap()["error"].as_str().unwrap().contains("financial_start"));

    let (status, _) = call(memory(), "GET", "/doordash?self_serve=sometimes").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(memory(), "GET", "/grubhub?customer_type=Occasional").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn self_serve_accepts_capitalized_booleans() {
    let (status, body) = call(memory(), "GET", "/doordash?self_serve=True").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["filters"]["self_serve"], true);

    let (status, body) = call(memory(), "GET", "/doordash?self_serve=FALSE").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["filters"]["self_serve"], false);
  }

  #[tokio::test]
  async fn grubhub_echoes_unconstrained_selectors() {
    let (status, body) = call(
      memory(),
      "GET",
      "/grubhub?start=2025-09-01&customer_type=Loyal&gh_plus=GH%2B",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();

    assert_eq!(body["filters"]["customer_type"], "Loyal");
    assert_eq!(body["filters"]["gh_plus"], "GH+");
    assert_eq!(body["filters"]["dates"]["start"], "2025-09-01");
    assert!(body["filters"]["dates"]["end"].is_null());
    assert_eq!(body["financial"]["status"], "unavailable");
    assert_eq!(body["product_mix"]["status"], "available");
    assert_eq!(body["records"][0]["source"], "grubhub_product_mix");
    assert_eq!(body["records"][0]["records"], 0);
  }

  // ─── Datasets ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn datasets_report_every_source() {
    let (status, body) = call(memory(), "GET", "/datasets").await;
    assert_eq!(status, StatusCode::OK);
    let list = body.unwrap();
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 10);

    let financial = list
      .iter()
      .find(|s| s["source"] == "doordash_financial")
      .unwrap();
    assert_eq!(financial["loaded"], true);
    assert_eq!(financial["records"], 3);
    assert_eq!(financial["platform"], "doordash");

    let deposits = list.iter().find(|s| s["source"] == "grubhub_deposits").unwrap();
    assert_eq!(deposits["loaded"], false);
    assert!(deposits.get("records").is_none());
  }

  /// Records invalidations instead of holding tables.
  #[derive(Default)]
  struct Recorder {
    invalidated: Mutex<Vec<SourceId>>,
  }

  impl TableSource for Recorder {
    type Error = dash_core::Error;

    fn table(&self, source: SourceId) -> dash_core::Result<Arc<Table>> {
      Err(dash_core::Error::SourceMissing(source))
    }

    fn invalidate(&self, source: SourceId) { self.invalidated.lock().unwrap().push(source); }
  }

  #[tokio::test]
  async fn reload_invalidates_one_or_all_sources() {
    let recorder = Arc::new(Recorder::default());

    let (status, _) =
      call(recorder.clone(), "POST", "/datasets/reload?source=grubhub_deposits").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(*recorder.invalidated.lock().unwrap(), vec![SourceId::GrubhubDeposits]);

    let (status, _) = call(recorder.clone(), "POST", "/datasets/reload").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(recorder.invalidated.lock().unwrap().len(), 11);

    let (status, body) = call(recorder, "POST", "/datasets/reload?source=yelp").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.unwrap()["error"].as_str().unwrap().contains("yelp"));
  }
}
