//! Cohort overview
//!
//! Counts members meeting each engagement or outcome threshold.

use serde::Serialize;

use super::coerce::{to_number, to_percent};
use super::columns;
use crate::records::Record;

/// Meal logging percentage at or above which a member counts as a follower
pub const MEAL_ADHERENCE_THRESHOLD_PCT: f64 = 80.0;

/// Weekly app minutes at or above which a member counts as active
pub const ACTIVE_USAGE_THRESHOLD_MIN: f64 = 30.0;

/// Aggregate cohort metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_members: usize,

    pub meal_followers: usize,
    pub meal_followers_pct: u32,

    pub active_users: usize,
    pub active_pct: u32,

    pub hba1c_improved: usize,
    pub hba1c_improved_pct: u32,

    pub weight_improved: usize,
    pub weight_improved_pct: u32,
}

/// Compute the cohort overview
///
/// Each predicate is evaluated independently per record; a record missing any
/// field a predicate needs simply does not count toward it.
pub fn calculate_overview(records: &[Record]) -> Overview {
    let total_members = records.len();

    let mut meal_followers = 0;
    let mut active_users = 0;
    let mut hba1c_improved = 0;
    let mut weight_improved = 0;

    for record in records {
        if to_percent(record.get(columns::MEAL_LOG_7D_PCT))
            .is_some_and(|pct| pct >= MEAL_ADHERENCE_THRESHOLD_PCT)
        {
            meal_followers += 1;
        }

        if to_number(record.get(columns::APP_USAGE_7D_MIN))
            .is_some_and(|minutes| minutes >= ACTIVE_USAGE_THRESHOLD_MIN)
        {
            active_users += 1;
        }

        if decreased(record, columns::START_HBA1C, columns::LAST_HBA1C) {
            hba1c_improved += 1;
        }

        if decreased(record, columns::START_WEIGHT, columns::LAST_WEIGHT) {
            weight_improved += 1;
        }
    }

    let pct = |count: usize| percent_of(count, total_members);

    Overview {
        total_members,
        meal_followers,
        meal_followers_pct: pct(meal_followers),
        active_users,
        active_pct: pct(active_users),
        hba1c_improved,
        hba1c_improved_pct: pct(hba1c_improved),
        weight_improved,
        weight_improved_pct: pct(weight_improved),
    }
}

/// True when both readings are present and the last is strictly below the start
fn decreased(record: &Record, start_field: &str, last_field: &str) -> bool {
    match (
        to_number(record.get(start_field)),
        to_number(record.get(last_field)),
    ) {
        (Some(start), Some(last)) => last < start,
        _ => false,
    }
}

/// Whole-number percentage, rounding halves up; zero for an empty cohort
fn percent_of(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as u32
}
