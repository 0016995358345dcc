//! Period comparator: percent change against the immediately preceding
//! window of equal length, with polarity-aware favorability.

use chrono::{DateTime, Duration, Utc};
use mailpulse_core::types::{Metric, Polarity, RangeKey, Scope};
use serde::Serialize;
use utoipa::ToSchema;

use crate::aggregate::{self, Aggregate};
use crate::filter;
use crate::store::RecordStore;

/// Delta reported when the previous period had nothing to compare against.
const FULL_SWING_PERCENT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodDelta {
    pub change_percent: f64,
    pub is_favorable: bool,
}

impl PeriodDelta {
    /// No-change result: zero delta, favorable.
    pub fn neutral() -> Self {
        Self {
            change_percent: 0.0,
            is_favorable: true,
        }
    }
}

/// Aggregates for the current window and, when the range has a finite
/// length, the window immediately before it.
#[derive(Debug, Clone, Copy)]
pub struct PeriodAggregates {
    pub current: Aggregate,
    /// `None` for `all`: a zero-length previous period is undefined.
    pub previous: Option<Aggregate>,
}

/// Filter and aggregate both windows once; per-metric deltas then come
/// from [`delta`] without re-scanning the store.
pub fn period_aggregates(
    store: &RecordStore,
    reference: DateTime<Utc>,
    range: RangeKey,
    scope: Scope,
    flow_name: Option<&str>,
) -> PeriodAggregates {
    let records = store.partition(scope);
    let current = aggregate::aggregate(&filter::apply(&records, reference, range, flow_name));

    // Same filter, anchored one window earlier. The shared boundary
    // instant belongs to the current period only.
    let previous = range.days().map(|days| {
        let prev_reference = reference - Duration::days(days);
        let mut subset = filter::apply(&records, prev_reference, range, flow_name);
        subset.retain(|r| r.sent_date < prev_reference);
        aggregate::aggregate(&subset)
    });

    PeriodAggregates { current, previous }
}

/// Percent change with a finite cap instead of `Infinity`/`NaN`:
/// `previous == 0 && current == 0` is no change; `previous == 0` with a
/// non-zero current reports a full swing in the direction of the change.
pub fn change_between(current: f64, previous: f64, polarity: Polarity) -> PeriodDelta {
    let change_percent = if previous == 0.0 {
        if current == 0.0 {
            0.0
        } else if current > 0.0 {
            FULL_SWING_PERCENT
        } else {
            -FULL_SWING_PERCENT
        }
    } else {
        (current - previous) / previous.abs() * 100.0
    };

    let is_favorable = match polarity {
        Polarity::HigherIsBetter => change_percent >= 0.0,
        Polarity::LowerIsBetter => change_percent <= 0.0,
    };

    PeriodDelta {
        change_percent,
        is_favorable,
    }
}

/// Delta for one metric out of precomputed period aggregates.
pub fn delta(periods: &PeriodAggregates, metric: Metric) -> PeriodDelta {
    match periods.previous {
        Some(previous) => change_between(
            periods.current.metric(metric),
            previous.metric(metric),
            metric.polarity(),
        ),
        None => PeriodDelta::neutral(),
    }
}

/// One-shot comparison for a single metric. Reuses the range filter and
/// the aggregator; there is no parallel implementation.
pub fn compare_to_previous(
    store: &RecordStore,
    metric: Metric,
    reference: DateTime<Utc>,
    range: RangeKey,
    scope: Scope,
    flow_name: Option<&str>,
) -> PeriodDelta {
    delta(
        &period_aggregates(store, reference, range, scope, flow_name),
        metric,
    )
}
