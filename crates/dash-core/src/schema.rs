//! Dataset identifiers and the columns each dataset must provide.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{doordash, grubhub};

/// Column names parsed as dates wherever they appear.
pub const DATE_COLUMNS: &[&str] = &[
  doordash::col::DATE,
  doordash::col::TIMESTAMP_LOCAL_DATE,
  grubhub::col::START_DATE,
  grubhub::col::END_DATE,
  "order_date",
  "transaction_date",
  "cancellation_date",
  "payout_date",
];

// ─── Sources ─────────────────────────────────────────────────────────────────

/// The delivery platform an export comes from.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
  #[strum(serialize = "DoorDash")]
  DoorDash,
  #[strum(serialize = "GrubHub")]
  GrubHub,
}

/// One input file.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SourceId {
  DoordashFinancial,
  DoordashMarketing,
  GrubhubFinancialSummary,
  GrubhubOperationsSummary,
  GrubhubOrderDetails,
  GrubhubTransactions,
  GrubhubProductMix,
  GrubhubCancellations,
  GrubhubDeposits,
  GrubhubDepositDetails,
}

impl SourceId {
  pub fn as_str(self) -> &'static str { self.into() }

  pub fn platform(self) -> Platform {
    match self {
      Self::DoordashFinancial | Self::DoordashMarketing => Platform::DoorDash,
      _ => Platform::GrubHub,
    }
  }

  pub fn schema(self) -> Schema {
    let (columns, dates) = match self {
      Self::DoordashFinancial => (DOORDASH_FINANCIAL, DatePolicy::Strict),
      Self::DoordashMarketing => (DOORDASH_MARKETING, DatePolicy::Strict),
      Self::GrubhubFinancialSummary => (GRUBHUB_FINANCIAL_SUMMARY, DatePolicy::Coerce),
      Self::GrubhubOperationsSummary => (GRUBHUB_OPERATIONS_SUMMARY, DatePolicy::Coerce),
      Self::GrubhubProductMix => (GRUBHUB_PRODUCT_MIX, DatePolicy::Coerce),
      Self::GrubhubOrderDetails
      | Self::GrubhubTransactions
      | Self::GrubhubCancellations
      | Self::GrubhubDeposits
      | Self::GrubhubDepositDetails => (NO_COLUMNS, DatePolicy::Coerce),
    };
    Schema { columns, dates }
  }
}

/// Declared `(name, kind)` pairs.
pub type Columns = &'static [(&'static str, ColumnKind)];

const NO_COLUMNS: Columns = &[];

const DOORDASH_FINANCIAL: Columns = &[
  (doordash::col::STORE_NAME, ColumnKind::Text),
  (doordash::col::TIMESTAMP_LOCAL_DATE, ColumnKind::Date),
  (doordash::col::TRANSACTION_TYPE, ColumnKind::Text),
  (doordash::col::FINAL_ORDER_STATUS, ColumnKind::Text),
  (doordash::col::SUBTOTAL, ColumnKind::Number),
  (doordash::col::NET_TOTAL, ColumnKind::Number),
];

const DOORDASH_MARKETING: Columns = &[
  (doordash::col::STORE_NAME, ColumnKind::Text),
  (doordash::col::DATE, ColumnKind::Date),
  (doordash::col::IS_SELF_SERVE, ColumnKind::Bool),
  (doordash::col::CAMPAIGN_NAME, ColumnKind::Text),
  (doordash::col::PROMOTION_TYPE, ColumnKind::Text),
  (doordash::col::ORDERS, ColumnKind::Number),
  (doordash::col::SALES, ColumnKind::Number),
  (doordash::col::ROAS, ColumnKind::Number),
  (doordash::col::NEW_CUSTOMERS, ColumnKind::Number),
  (doordash::col::NEW_DP_CUSTOMERS, ColumnKind::Number),
  (doordash::col::AVERAGE_ORDER_VALUE, ColumnKind::Number),
];

const GRUBHUB_FINANCIAL_SUMMARY: Columns = &[
  (grubhub::col::STORE_NAME, ColumnKind::Text),
  (grubhub::col::START_DATE, ColumnKind::Date),
  (grubhub::col::END_DATE, ColumnKind::Date),
  (grubhub::col::TOTAL_ORDERS, ColumnKind::Number),
  (grubhub::col::SUBTOTAL_SALES, ColumnKind::Number),
  (grubhub::col::MERCHANT_NET_TOTAL, ColumnKind::Number),
  (grubhub::col::COMMISSION, ColumnKind::Number),
  (grubhub::col::TIP, ColumnKind::Number),
];

const GRUBHUB_OPERATIONS_SUMMARY: Columns = &[
  (grubhub::col::STORE_NAME, ColumnKind::Text),
  (grubhub::col::START_DATE, ColumnKind::Date),
  (grubhub::col::END_DATE, ColumnKind::Date),
  (grubhub::col::TOTAL_ORDERS, ColumnKind::Number),
  (grubhub::col::TOTAL_CANCELED_ORDERS, ColumnKind::Number),
  (grubhub::col::NEW_CUSTOMER_ORDERS, ColumnKind::Number),
  (grubhub::col::GH_PLUS_CUSTOMER_ORDERS, ColumnKind::Number),
];

const GRUBHUB_PRODUCT_MIX: Columns = &[
  (grubhub::col::STORE_NAME, ColumnKind::Text),
  (grubhub::col::START_DATE, ColumnKind::Date),
  (grubhub::col::END_DATE, ColumnKind::Date),
  (grubhub::col::MENU_ITEM_NAME, ColumnKind::Text),
  (grubhub::col::QUANTITY_SOLD, ColumnKind::Number),
  (grubhub::col::ITEM_SALES, ColumnKind::Number),
];

// ─── Schema ──────────────────────────────────────────────────────────────────

/// The type a column's cells are parsed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ColumnKind {
  Text,
  Number,
  Bool,
  Date,
}

/// What the loader does with a date cell it cannot parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePolicy {
  /// Reject the whole file.
  Strict,
  /// Store a null and keep going.
  Coerce,
}

/// The declared columns of a source. Undeclared columns are still loaded,
/// with their kind inferred from content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
  pub columns: Columns,
  pub dates:   DatePolicy,
}

impl Schema {
  pub fn kind_of(&self, column: &str) -> Option<ColumnKind> {
    self
      .columns
      .iter()
      .find(|(name, _)| *name == column)
      .map(|(_, kind)| *kind)
  }
}
