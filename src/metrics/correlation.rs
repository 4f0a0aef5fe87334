//! Correlation projection
//!
//! One point per member relating engagement inputs to outcome deltas.

use serde::Serialize;

use super::coerce::{to_number, to_percent};
use super::columns;
use crate::records::{Cell, Record};

/// Per-member engagement vs. outcome projection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationPoint {
    /// Member identifier, passed through verbatim (null when absent)
    pub member_id: Option<Cell>,
    /// 7-day meal logging percentage (0-100)
    pub meal_log7d_pct: Option<f64>,
    /// 7-day GFY percentage (0-100)
    pub gfy7d_pct: Option<f64>,
    /// 7-day app usage in minutes
    pub app_usage7d_min: Option<f64>,
    /// Last minus start weight, in pounds
    pub weight_change_lbs: Option<f64>,
    /// Last minus start HbA1c
    pub hba1c_change: Option<f64>,
}

/// Project every record into a correlation point, preserving order
pub fn build_correlation_data(records: &[Record]) -> Vec<CorrelationPoint> {
    records.iter().map(correlation_point).collect()
}

fn correlation_point(record: &Record) -> CorrelationPoint {
    CorrelationPoint {
        member_id: record.get(columns::MEMBER_ID).cloned(),
        meal_log7d_pct: to_percent(record.get(columns::MEAL_LOG_7D_PCT)),
        gfy7d_pct: to_percent(record.get(columns::GFY_7D_PCT)),
        app_usage7d_min: to_number(record.get(columns::APP_USAGE_7D_MIN)),
        weight_change_lbs: delta(record, columns::START_WEIGHT, columns::LAST_WEIGHT),
        hba1c_change: delta(record, columns::START_HBA1C, columns::LAST_HBA1C),
    }
}

fn delta(record: &Record, start_field: &str, last_field: &str) -> Option<f64> {
    let start = to_number(record.get(start_field))?;
    let last = to_number(record.get(last_field))?;
    Some(last - start)
}
