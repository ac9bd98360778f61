//! Core types and pure computation for the delivery-platform dashboard.
//!
//! This crate is deliberately free of file, HTTP and async dependencies.
//! Loading lives in `dash-csv`, transport in `dash-api`; both depend on the
//! types and the [`source::TableSource`] seam defined here.

pub mod aggregate;
pub mod doordash;
pub mod error;
pub mod filter;
pub mod grubhub;
pub mod report;
pub mod schema;
pub mod source;
pub mod table;

pub use error::{Error, Result};
