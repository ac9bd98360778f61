//! CSV loading for the dashboard's source tables.
//!
//! [`load_path`] turns one export into a typed [`dash_core::table::Table`];
//! [`DatasetCache`] maps each [`dash_core::schema::SourceId`] to a file and
//! memoises the outcome, success or failure, until invalidated.

mod cache;
mod loader;
mod parse;

pub mod error;

pub use cache::DatasetCache;
pub use error::{Error, Result};
pub use loader::{load_path, read_table};
