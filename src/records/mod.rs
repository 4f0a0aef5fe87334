//! Member Records
//!
//! Tabular data model for the member spreadsheet.
//!
//! ## Components
//!
//! - **Cell**: a single spreadsheet cell value (text, number, boolean or empty)
//! - **Record**: one member row, keyed by header name
//! - **normalize**: turns a raw grid (header row first) into records

mod normalize;
mod types;

pub use normalize::normalize;
pub use types::{Cell, RawGrid, Record};
