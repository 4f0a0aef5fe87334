//! Engagement Metrics
//!
//! Pure functions over a snapshot of member records.
//!
//! - [`calculate_overview`]: cohort-wide counts and percentages
//! - [`build_correlation_data`]: per-member projection for scatter plots
//!
//! Nothing here performs I/O or fails; unparseable fields become `None`.

mod coerce;
mod correlation;
mod overview;

pub use coerce::{to_number, to_percent};
pub use correlation::{build_correlation_data, CorrelationPoint};
pub use overview::{calculate_overview, Overview};

/// Source column names in the member spreadsheet
pub mod columns {
    pub const MEMBER_ID: &str = "MEMBER_ID";
    pub const MEAL_LOG_7D_PCT: &str = "7D MEAL LOG %";
    pub const GFY_7D_PCT: &str = "7D GFY %";
    pub const APP_USAGE_7D_MIN: &str = "app usege min 7d";
    pub const START_HBA1C: &str = "START HbA1c";
    pub const LAST_HBA1C: &str = "LAST HbA1c";
    pub const START_WEIGHT: &str = "START WEIGHT";
    pub const LAST_WEIGHT: &str = "LAST WEIGHT";
}
