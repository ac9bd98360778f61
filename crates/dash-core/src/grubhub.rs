//! The GrubHub dashboard: period summaries, operations and product mix.
//!
//! GrubHub exports one row per store and reporting period, so the date
//! filter keeps a row only when its whole period falls inside the selected
//! interval.

use serde::Serialize;
use strum::{EnumString, IntoEnumIterator};

use crate::{
  Result,
  aggregate::{Metrics, MetricDef, Reducer, Rollup, metric, rollup, summarize},
  filter::{Criteria, DateColumns, DateRange, Layout, Predicate, Selection},
  report::{DataSummary, Section, SelectorOptions, fetch, section},
  schema::{Platform, SourceId},
  source::TableSource,
  table::{Table, View},
};

/// Column names of the GrubHub exports.
pub mod col {
  pub const STORE_NAME: &str = "store_name";
  pub const START_DATE: &str = "start_date";
  pub const END_DATE: &str = "end_date";

  pub const TOTAL_ORDERS: &str = "total_orders";
  pub const SUBTOTAL_SALES: &str = "subtotal_sales";
  pub const MERCHANT_NET_TOTAL: &str = "merchant_net_total";
  pub const COMMISSION: &str = "commission";
  pub const TIP: &str = "tip";

  pub const TOTAL_CANCELED_ORDERS: &str = "total_canceled_orders";
  pub const NEW_CUSTOMER_ORDERS: &str = "new_customer_orders";
  pub const GH_PLUS_CUSTOMER_ORDERS: &str = "gh_plus_customer_orders";

  pub const MENU_ITEM_NAME: &str = "menu_item_name";
  pub const QUANTITY_SOLD: &str = "quantity_sold";
  pub const ITEM_SALES: &str = "item_sales";
}

pub const LAYOUT: Layout = Layout {
  dates: DateColumns::Span { start: col::START_DATE, end: col::END_DATE },
  store: col::STORE_NAME,
};

pub const TOP_STORES: usize = 10;
pub const TOP_ITEMS: usize = 15;

// ─── Selection ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, EnumString)]
pub enum CustomerType {
  New,
  Returning,
  Loyal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, EnumString)]
pub enum GhPlus {
  #[serde(rename = "GH+")]
  #[strum(serialize = "GH+")]
  Member,
  #[serde(rename = "Non-GH+")]
  #[strum(serialize = "Non-GH+")]
  NonMember,
}

/// User filters for one GrubHub render pass.
///
/// `customer_type` and `gh_plus` are reported back but do not narrow rows:
/// the summary exports have no per-row column for either.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GrubHubSelection {
  pub dates:         Option<DateRange>,
  pub store:         Selection<String>,
  pub customer_type: Selection<CustomerType>,
  pub gh_plus:       Selection<GhPlus>,
}

impl GrubHubSelection {
  pub fn criteria(&self) -> Criteria {
    Criteria::new()
      .with_dates(self.dates)
      .with_store(self.store.clone())
  }
}

// ─── Report ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrubHubReport {
  pub filters:     GrubHubSelection,
  pub financial:   Section<FinancialSection>,
  pub operations:  Section<OperationsSection>,
  pub product_mix: Section<ProductMixSection>,
  /// Row counts of every GrubHub dataset that loaded.
  pub records:     Vec<RecordCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSection {
  pub options:       SelectorOptions,
  /// `total_orders`, `total_sales`, `net_total`, `average_order_value`,
  /// `total_commission`, `commission_rate`, `total_tips`.
  pub metrics:       Metrics,
  pub top_by_sales:  Rollup,
  pub top_by_orders: Rollup,
  pub summary:       DataSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationsSection {
  /// `total_orders`, `cancellation_rate`, `new_customer_rate`,
  /// `gh_plus_rate`; rates are fractions.
  pub metrics: Metrics,
  pub summary: DataSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductMixSection {
  pub top_by_quantity: Rollup,
  pub top_by_sales:    Rollup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordCount {
  pub source:  SourceId,
  pub records: usize,
}

/// Run one GrubHub render pass.
pub fn report<S>(source: &S, selection: &GrubHubSelection) -> Result<GrubHubReport>
where
  S: TableSource + ?Sized,
{
  let records = SourceId::iter()
    .filter(|id| id.platform() == Platform::GrubHub)
    .filter_map(|id| {
      fetch(source, id).map(|table| RecordCount { source: id, records: table.len() })
    })
    .collect();

  Ok(GrubHubReport {
    filters: selection.clone(),
    financial: section(source, SourceId::GrubhubFinancialSummary, |t| {
      financial_section(t, selection)
    })?,
    operations: section(source, SourceId::GrubhubOperationsSummary, |t| {
      operations_section(t, selection)
    })?,
    product_mix: section(source, SourceId::GrubhubProductMix, |t| {
      product_mix_section(t, selection)
    })?,
    records,
  })
}

fn filtered<'a>(table: &'a Table, selection: &GrubHubSelection) -> View<'a> {
  table.filter(&Predicate::build(&selection.criteria(), &LAYOUT))
}

// ─── Financial summary ───────────────────────────────────────────────────────

fn commission_rate() -> Reducer {
  Reducer::ratio(Reducer::abs_sum(col::COMMISSION), Reducer::sum(col::SUBTOTAL_SALES))
}

fn sales_per_order() -> Reducer {
  Reducer::ratio(Reducer::sum(col::SUBTOTAL_SALES), Reducer::sum(col::TOTAL_ORDERS))
}

fn financial_metrics() -> Vec<MetricDef> {
  vec![
    metric("total_orders", Reducer::sum(col::TOTAL_ORDERS)),
    metric("total_sales", Reducer::sum(col::SUBTOTAL_SALES)),
    metric("net_total", Reducer::sum(col::MERCHANT_NET_TOTAL)),
    metric("average_order_value", sales_per_order()),
    metric("total_commission", Reducer::abs_sum(col::COMMISSION)),
    metric("commission_rate", commission_rate()),
    metric("total_tips", Reducer::sum(col::TIP)),
  ]
}

fn store_metrics() -> Vec<MetricDef> {
  vec![
    metric("total_orders", Reducer::sum(col::TOTAL_ORDERS)),
    metric("subtotal_sales", Reducer::sum(col::SUBTOTAL_SALES)),
    metric("merchant_net_total", Reducer::sum(col::MERCHANT_NET_TOTAL)),
    metric("commission", Reducer::sum(col::COMMISSION)),
    metric("average_order_value", sales_per_order()),
    metric("commission_rate", commission_rate()),
  ]
}

pub fn financial_section(
  table: &Table,
  selection: &GrubHubSelection,
) -> Result<FinancialSection> {
  let view = filtered(table, selection);
  let stores = store_metrics();
  Ok(FinancialSection {
    options:       SelectorOptions::collect(table, &LAYOUT),
    metrics:       summarize(&view, &financial_metrics())?,
    top_by_sales:  rollup(&view, col::STORE_NAME, &stores, "subtotal_sales", TOP_STORES)?,
    top_by_orders: rollup(&view, col::STORE_NAME, &stores, "total_orders", TOP_STORES)?,
    summary:       DataSummary::collect(&view, &LAYOUT),
  })
}

// ─── Operations summary ──────────────────────────────────────────────────────

fn share_of_orders(column: &str) -> Reducer {
  Reducer::ratio(Reducer::sum(column), Reducer::sum(col::TOTAL_ORDERS))
}

fn operations_metrics() -> Vec<MetricDef> {
  vec![
    metric("total_orders", Reducer::sum(col::TOTAL_ORDERS)),
    metric("cancellation_rate", share_of_orders(col::TOTAL_CANCELED_ORDERS)),
    metric("new_customer_rate", share_of_orders(col::NEW_CUSTOMER_ORDERS)),
    metric("gh_plus_rate", share_of_orders(col::GH_PLUS_CUSTOMER_ORDERS)),
  ]
}

pub fn operations_section(
  table: &Table,
  selection: &GrubHubSelection,
) -> Result<OperationsSection> {
  let view = filtered(table, selection);
  Ok(OperationsSection {
    metrics: summarize(&view, &operations_metrics())?,
    summary: DataSummary::collect(&view, &LAYOUT),
  })
}

// ─── Product mix ─────────────────────────────────────────────────────────────

pub fn product_mix_section(
  table: &Table,
  selection: &GrubHubSelection,
) -> Result<ProductMixSection> {
  let view = filtered(table, selection);
  let items = [
    metric("quantity_sold", Reducer::sum(col::QUANTITY_SOLD)),
    metric("item_sales", Reducer::sum(col::ITEM_SALES)),
  ];
  Ok(ProductMixSection {
    top_by_quantity: rollup(&view, col::MENU_ITEM_NAME, &items, "quantity_sold", TOP_ITEMS)?,
    top_by_sales:    rollup(&view, col::MENU_ITEM_NAME, &items, "item_sales", TOP_ITEMS)?,
  })
}
