//! The DoorDash dashboard: delivered-order financials and marketing campaigns.
//!
//! Financial and marketing sections are independent. Either one can be
//! unavailable without affecting the other.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
  Result,
  aggregate::{Metrics, MetricDef, Reducer, Rollup, metric, rollup, summarize},
  filter::{Criteria, DateColumns, DateRange, Layout, Predicate, Selection},
  report::{DataSummary, Section, SelectorOptions, section},
  schema::SourceId,
  source::TableSource,
  table::{Direction, Row, Table, Value, View},
};

/// Column names of the DoorDash exports.
pub mod col {
  pub const STORE_NAME: &str = "Store name";

  pub const TIMESTAMP_LOCAL_DATE: &str = "Timestamp local date";
  pub const TRANSACTION_TYPE: &str = "Transaction type";
  pub const FINAL_ORDER_STATUS: &str = "Final order status";
  pub const SUBTOTAL: &str = "Subtotal";
  pub const NET_TOTAL: &str = "Net total";

  pub const DATE: &str = "Date";
  pub const IS_SELF_SERVE: &str = "Is self serve campaign";
  pub const CAMPAIGN_NAME: &str = "Campaign name";
  pub const PROMOTION_TYPE: &str = "Type of promotion";
  pub const ORDERS: &str = "Orders";
  pub const SALES: &str = "Sales";
  pub const ROAS: &str = "ROAS";
  pub const NEW_CUSTOMERS: &str = "New customers acquired";
  pub const NEW_DP_CUSTOMERS: &str = "New DP customers acquired";
  pub const AVERAGE_ORDER_VALUE: &str = "Average order value";
}

pub const FINANCIAL_LAYOUT: Layout = Layout {
  dates: DateColumns::Single(col::TIMESTAMP_LOCAL_DATE),
  store: col::STORE_NAME,
};

pub const MARKETING_LAYOUT: Layout = Layout {
  dates: DateColumns::Single(col::DATE),
  store: col::STORE_NAME,
};

/// Number of stores in each top-stores roll-up.
pub const TOP_STORES: usize = 10;

/// Campaign days with a ROAS below this are flagged.
pub const ROAS_TARGET: f64 = 4.0;

// ─── Selection ───────────────────────────────────────────────────────────────

/// User filters for one DoorDash render pass. `None` date ranges mean the
/// dataset's full span.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DoorDashSelection {
  pub marketing_dates: Option<DateRange>,
  pub self_serve:      Selection<bool>,
  pub marketing_store: Selection<String>,
  pub financial_dates: Option<DateRange>,
  pub financial_store: Selection<String>,
}

impl DoorDashSelection {
  /// Delivered orders only, within the chosen dates and store.
  pub fn financial_criteria(&self) -> Criteria {
    Criteria::new()
      .with_dates(self.financial_dates)
      .with_store(self.financial_store.clone())
      .with_equals(col::TRANSACTION_TYPE, Selection::Only(Value::from("Order")))
      .with_equals(col::FINAL_ORDER_STATUS, Selection::Only(Value::from("Delivered")))
  }

  pub fn marketing_criteria(&self) -> Criteria {
    Criteria::new()
      .with_dates(self.marketing_dates)
      .with_store(self.marketing_store.clone())
      .with_equals(col::IS_SELF_SERVE, self.self_serve.clone().map(Value::Bool))
  }
}

// ─── Report ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoorDashReport {
  pub filters:   DoorDashSelection,
  pub financial: Section<FinancialSection>,
  pub marketing: Section<MarketingSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSection {
  pub options:    SelectorOptions,
  /// `overall_subtotal`, `net_total`.
  pub metrics:    Metrics,
  /// Present only when no store is selected.
  pub top_stores: Option<Rollup>,
  pub summary:    FinancialSummary,
}

/// The data summary of the financial view plus its total subtotal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
  #[serde(flatten)]
  pub rows:           DataSummary,
  pub total_subtotal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketingSection {
  pub options:         SelectorOptions,
  /// `marketing_sales`, `average_roas`, `marketing_orders`, `new_customers`,
  /// `new_dp_customers`, `average_order_value`.
  pub metrics:         Metrics,
  /// Present only when no store is selected.
  pub top_stores:      Option<Rollup>,
  /// Present only when a store is selected.
  pub campaigns:       Option<CampaignDetail>,
  pub summary:         DataSummary,
  pub promotion_types: usize,
}

/// Campaign days of one store, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignDetail {
  pub store:  String,
  pub lines:  Vec<CampaignLine>,
  /// `total_campaigns`, `total_sales`, `average_roas`, `total_orders`.
  pub totals: Metrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignLine {
  pub campaign_name:       Option<String>,
  pub promotion_type:      Option<String>,
  pub date:                Option<NaiveDate>,
  pub orders:              f64,
  pub sales:               f64,
  pub roas:                Option<f64>,
  pub new_customers:       f64,
  pub new_dp_customers:    f64,
  /// As exported for the campaign day.
  pub average_order_value: f64,
  pub below_roas_target:   bool,
}

impl CampaignLine {
  fn from_row(row: &Row<'_>) -> Self {
    let text = |c: &str| row.get(c).and_then(Value::as_str).map(str::to_owned);
    let number = |c: &str| row.get(c).and_then(Value::as_f64).unwrap_or(0.0);
    let roas = row.get(col::ROAS).and_then(Value::as_f64);
    Self {
      campaign_name:       text(col::CAMPAIGN_NAME),
      promotion_type:      text(col::PROMOTION_TYPE),
      date:                row.get(col::DATE).and_then(Value::as_date),
      orders:              number(col::ORDERS),
      sales:               number(col::SALES),
      roas,
      new_customers:       number(col::NEW_CUSTOMERS),
      new_dp_customers:    number(col::NEW_DP_CUSTOMERS),
      average_order_value: number(col::AVERAGE_ORDER_VALUE),
      below_roas_target:   roas.is_some_and(|r| r < ROAS_TARGET),
    }
  }
}

/// Run one DoorDash render pass.
pub fn report<S>(source: &S, selection: &DoorDashSelection) -> Result<DoorDashReport>
where
  S: TableSource + ?Sized,
{
  Ok(DoorDashReport {
    filters:   selection.clone(),
    financial: section(source, SourceId::DoordashFinancial, |t| {
      financial_section(t, selection)
    })?,
    marketing: section(source, SourceId::DoordashMarketing, |t| {
      marketing_section(t, selection)
    })?,
  })
}

// ─── Financial ───────────────────────────────────────────────────────────────

fn financial_metrics() -> Vec<MetricDef> {
  vec![
    metric("overall_subtotal", Reducer::sum(col::SUBTOTAL)),
    metric("net_total", Reducer::sum(col::NET_TOTAL)),
  ]
}

fn financial_store_metrics() -> Vec<MetricDef> {
  vec![
    metric("subtotal", Reducer::sum(col::SUBTOTAL)),
    metric("net_total", Reducer::sum(col::NET_TOTAL)),
  ]
}

pub fn financial_section(
  table: &Table,
  selection: &DoorDashSelection,
) -> Result<FinancialSection> {
  let predicate = Predicate::build(&selection.financial_criteria(), &FINANCIAL_LAYOUT);
  let filtered = table.filter(&predicate);

  let top_stores = if selection.financial_store.is_all() {
    Some(rollup(
      &filtered,
      col::STORE_NAME,
      &financial_store_metrics(),
      "subtotal",
      TOP_STORES,
    )?)
  } else {
    None
  };

  let metrics = summarize(&filtered, &financial_metrics())?;
  let summary = FinancialSummary {
    rows:           DataSummary::collect(&filtered, &FINANCIAL_LAYOUT),
    total_subtotal: metrics.get("overall_subtotal").unwrap_or(0.0),
  };

  Ok(FinancialSection {
    options: SelectorOptions::collect(table, &FINANCIAL_LAYOUT),
    metrics,
    top_stores,
    summary,
  })
}

// ─── Marketing ───────────────────────────────────────────────────────────────

fn sales_per_order() -> Reducer {
  Reducer::ratio(Reducer::sum(col::SALES), Reducer::sum(col::ORDERS))
}

fn marketing_metrics() -> Vec<MetricDef> {
  vec![
    metric("marketing_sales", Reducer::sum(col::SALES)),
    metric("average_roas", Reducer::mean(col::ROAS)),
    metric("marketing_orders", Reducer::sum(col::ORDERS)),
    metric("new_customers", Reducer::sum(col::NEW_CUSTOMERS)),
    metric("new_dp_customers", Reducer::sum(col::NEW_DP_CUSTOMERS)),
    metric("average_order_value", sales_per_order()),
  ]
}

fn marketing_store_metrics() -> Vec<MetricDef> {
  vec![
    metric("sales", Reducer::sum(col::SALES)),
    metric("orders", Reducer::sum(col::ORDERS)),
    metric("average_roas", Reducer::mean(col::ROAS)),
    metric("new_customers", Reducer::sum(col::NEW_CUSTOMERS)),
  ]
}

fn campaign_totals() -> Vec<MetricDef> {
  vec![
    metric("total_campaigns", Reducer::count()),
    metric("total_sales", Reducer::sum(col::SALES)),
    metric("average_roas", Reducer::mean(col::ROAS)),
    metric("total_orders", Reducer::sum(col::ORDERS)),
  ]
}

pub fn marketing_section(
  table: &Table,
  selection: &DoorDashSelection,
) -> Result<MarketingSection> {
  let predicate = Predicate::build(&selection.marketing_criteria(), &MARKETING_LAYOUT);
  let filtered = table.filter(&predicate);

  let (top_stores, campaigns) = match &selection.marketing_store {
    Selection::All => (
      Some(rollup(
        &filtered,
        col::STORE_NAME,
        &marketing_store_metrics(),
        "sales",
        TOP_STORES,
      )?),
      None,
    ),
    Selection::Only(store) => (None, Some(campaign_detail(&filtered, store)?)),
  };

  Ok(MarketingSection {
    options: SelectorOptions::collect(table, &MARKETING_LAYOUT),
    metrics: summarize(&filtered, &marketing_metrics())?,
    top_stores,
    campaigns,
    summary: DataSummary::collect(&filtered, &MARKETING_LAYOUT),
    promotion_types: filtered.distinct_count(col::PROMOTION_TYPE),
  })
}

/// `filtered` is already restricted to `store`.
fn campaign_detail(filtered: &View<'_>, store: &str) -> Result<CampaignDetail> {
  let lines = filtered
    .sorted_by(col::DATE, Direction::Descending)
    .rows()
    .map(|row| CampaignLine::from_row(&row))
    .collect();
  Ok(CampaignDetail {
    store: store.to_owned(),
    lines,
    totals: summarize(filtered, &campaign_totals())?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::source::MemorySource;

  fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
  }

  fn transactions() -> Table {
    let mut t = Table::new([
      col::STORE_NAME,
      col::TIMESTAMP_LOCAL_DATE,
      col::TRANSACTION_TYPE,
      col::FINAL_ORDER_STATUS,
      col::SUBTOTAL,
      col::NET_TOTAL,
    ]);
    let rows = [
      ("A", date(9, 22), "Order", "Delivered", 100.0, 90.0),
      ("A", date(9, 23), "Order", "Delivered", 50.0, 45.0),
      ("B", date(9, 24), "Refund", "Delivered", 30.0, 27.0),
    ];
    for (store, day, kind, status, subtotal, net) in rows {
      t.push_row(vec![
        store.into(),
        day.into(),
        kind.into(),
        status.into(),
        subtotal.into(),
        net.into(),
      ])
      .unwrap();
    }
    t
  }

  fn campaigns() -> Table {
    let mut t = Table::new([
      col::STORE_NAME,
      col::DATE,
      col::IS_SELF_SERVE,
      col::CAMPAIGN_NAME,
      col::PROMOTION_TYPE,
      col::ORDERS,
      col::SALES,
      col::ROAS,
      col::NEW_CUSTOMERS,
      col::NEW_DP_CUSTOMERS,
      col::AVERAGE_ORDER_VALUE,
    ]);
    let rows = [
      ("X", date(9, 22), true, "Spend $15", "Discount", 10.0, 100.0, 3.5, 2.0, 1.0, 10.0),
      ("X", date(9, 24), false, "Free delivery", "Delivery", 20.0, 300.0, 6.0, 4.0, 0.0, 15.0),
      ("Y", date(9, 23), true, "Spend $15", "Discount", 5.0, 500.0, 8.0, 1.0, 1.0, 100.0),
    ];
    for (store, day, serve, name, kind, orders, sales, roas, new, dp, aov) in rows {
      t.push_row(vec![
        store.into(),
        day.into(),
        serve.into(),
        name.into(),
        kind.into(),
        orders.into(),
        sales.into(),
        roas.into(),
        new.into(),
        dp.into(),
        aov.into(),
      ])
      .unwrap();
    }
    t
  }

  #[test]
  fn delivered_orders_only() {
    let section = financial_section(&transactions(), &DoorDashSelection::default()).unwrap();
    assert_eq!(section.metrics.get("overall_subtotal"), Some(150.0));
    assert_eq!(section.metrics.get("net_total"), Some(135.0));
    assert_eq!(section.summary.rows.records, 2);
    assert_eq!(section.summary.rows.unique_stores, 1);
    assert_eq!(section.summary.total_subtotal, 150.0);

    let top = section.top_stores.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top.rows[0].key, Value::from("A"));
    // Options come from the unfiltered table.
    assert_eq!(section.options.stores, vec!["A", "B"]);
  }

  #[test]
  fn store_selection_hides_top_stores() {
    let selection = DoorDashSelection {
      financial_store: Selection::Only("A".into()),
      financial_dates: Some(DateRange::new(date(9, 23), date(9, 30))),
      ..Default::default()
    };
    let section = financial_section(&transactions(), &selection).unwrap();
    assert!(section.top_stores.is_none());
    assert_eq!(section.metrics.get("overall_subtotal"), Some(50.0));
  }

  #[test]
  fn average_order_value_is_sales_over_orders() {
    let selection = DoorDashSelection {
      marketing_store: Selection::Only("X".into()),
      ..Default::default()
    };
    let section = marketing_section(&campaigns(), &selection).unwrap();
    let aov = section.metrics.get("average_order_value").unwrap();
    assert!((aov - 400.0 / 30.0).abs() < 1e-9);
    assert_eq!(section.metrics.get("average_roas"), Some(4.75));
    assert_eq!(section.metrics.get("new_dp_customers"), Some(1.0));
  }

  #[test]
  fn campaign_detail_is_newest_first_and_flags_low_roas() {
    let selection = DoorDashSelection {
      marketing_store: Selection::Only("X".into()),
      ..Default::default()
    };
    let section = marketing_section(&campaigns(), &selection).unwrap();
    assert!(section.top_stores.is_none());

    let detail = section.campaigns.unwrap();
    assert_eq!(detail.store, "X");
    assert_eq!(detail.lines.len(), 2);
    assert_eq!(detail.lines[0].date, Some(date(9, 24)));
    assert!(!detail.lines[0].below_roas_target);
    assert!(detail.lines[1].below_roas_target);
    assert_eq!(detail.totals.get("total_campaigns"), Some(2.0));
    assert_eq!(detail.totals.get("total_sales"), Some(400.0));
    assert_eq!(detail.totals.get("total_orders"), Some(30.0));
  }

  #[test]
  fn self_serve_filter() {
    let selection = DoorDashSelection { self_serve: Selection::Only(true), ..Default::default() };
    let section = marketing_section(&campaigns(), &selection).unwrap();
    assert_eq!(section.metrics.get("marketing_sales"), Some(600.0));
    assert_eq!(section.promotion_types, 1);

    let top = section.top_stores.unwrap();
    let keys: Vec<_> = top.keys().cloned().collect();
    assert_eq!(keys, vec![Value::from("Y"), Value::from("X")]);
  }

  #[test]
  fn missing_campaigns_leave_financials_intact() {
    let source = MemorySource::new().with(SourceId::DoordashFinancial, transactions());
    let report = report(&source, &DoorDashSelection::default()).unwrap();

    let financial = report.financial.available().unwrap();
    assert_eq!(financial.metrics.get("overall_subtotal"), Some(150.0));
    assert_eq!(financial.metrics.get("net_total"), Some(135.0));
    assert!(!report.marketing.is_available());
  }

  #[test]
  fn empty_date_window_yields_zeros() {
    let selection = DoorDashSelection {
      marketing_dates: Some(DateRange::new(date(12, 1), date(12, 31))),
      ..Default::default()
    };
    let section = marketing_section(&campaigns(), &selection).unwrap();
    for (_, value) in section.metrics.iter() {
      assert_eq!(value, 0.0);
    }
    assert!(section.top_stores.unwrap().is_empty());
    assert_eq!(section.summary.first_date, None);
  }
}
