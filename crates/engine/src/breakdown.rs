//! Day-of-week and hour-of-day breakdowns for the dashboard's panel
//! charts. Empty slots keep the zero aggregate so bar-chart axes stay
//! complete.

use chrono::{Datelike, Timelike};
use mailpulse_core::types::EmailRecord;
use serde::Serialize;
use utoipa::ToSchema;

use crate::aggregate::{self, Aggregate};

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownSlot {
    pub label: String,
    pub aggregate: Aggregate,
}

const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Seven slots, Monday first.
pub fn by_weekday(subset: &[&EmailRecord]) -> Vec<BreakdownSlot> {
    let mut bins: [Vec<&EmailRecord>; 7] = Default::default();
    for record in subset.iter().copied() {
        bins[record.sent_date.weekday().num_days_from_monday() as usize].push(record);
    }

    bins.iter()
        .zip(WEEKDAY_LABELS)
        .map(|(members, label)| BreakdownSlot {
            label: label.to_string(),
            aggregate: aggregate::aggregate(members),
        })
        .collect()
}

/// Twenty-four slots, midnight first.
pub fn by_hour(subset: &[&EmailRecord]) -> Vec<BreakdownSlot> {
    let mut bins: Vec<Vec<&EmailRecord>> = vec![Vec::new(); 24];
    for record in subset.iter().copied() {
        bins[record.sent_date.hour() as usize].push(record);
    }

    bins.iter()
        .enumerate()
        .map(|(hour, members)| BreakdownSlot {
            label: format!("{hour:02}:00"),
            aggregate: aggregate::aggregate(members),
        })
        .collect()
}
