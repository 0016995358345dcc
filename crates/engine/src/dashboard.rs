//! Dashboard facade: one parametrized query path shared by the overview,
//! campaign-only, and flow-only views. Every output is a pure function of
//! (store, reference date, query).

use chrono::{DateTime, Duration, Utc};
use mailpulse_core::types::{Metric, RangeKey, Scope};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use utoipa::ToSchema;

use crate::aggregate::Aggregate;
use crate::breakdown::{self, BreakdownSlot};
use crate::bucket::{self, TimeBucket};
use crate::compare::{self, PeriodAggregates, PeriodDelta};
use crate::granularity;
use crate::store::RecordStore;

/// One dashboard filter selection. The range stays a raw string so stale
/// keys from a reloaded UI degrade to empty results instead of errors.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    pub range: String,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub flow_name: Option<String>,
}

impl DashboardQuery {
    pub fn new(range: &str, scope: Scope) -> Self {
        Self {
            range: range.to_string(),
            scope,
            flow_name: None,
        }
    }

    pub fn with_flow(range: &str, flow_name: &str) -> Self {
        Self {
            range: range.to_string(),
            scope: Scope::Flows,
            flow_name: Some(flow_name.to_string()),
        }
    }

    fn flow(&self) -> Option<&str> {
        self.flow_name.as_deref()
    }
}

/// Headline value plus its period-over-period delta.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricSnapshot {
    pub value: f64,
    pub change_percent: f64,
    pub is_favorable: bool,
}

/// Everything the headline cards need for one filter selection.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub range: String,
    pub scope: Scope,
    pub flow_name: Option<String>,
    pub reference_date: DateTime<Utc>,
    pub record_count: u64,
    pub metrics: HashMap<String, MetricSnapshot>,
}

/// One sparkline point extracted from a bucket.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub label: Option<String>,
}

/// Aggregated snapshot with one [`MetricSnapshot`] per dashboard metric.
/// Both windows are scanned exactly once regardless of the metric count.
pub fn snapshot(
    store: &RecordStore,
    reference: DateTime<Utc>,
    query: &DashboardQuery,
) -> DashboardSnapshot {
    let (record_count, periods) = match RangeKey::parse(&query.range) {
        Some(range) => {
            let periods =
                compare::period_aggregates(store, reference, range, query.scope, query.flow());
            (periods.current.record_count, periods)
        }
        None => (
            0,
            PeriodAggregates {
                current: Aggregate::default(),
                previous: None,
            },
        ),
    };

    let mut metrics = HashMap::with_capacity(Metric::ALL.len());
    for metric in Metric::ALL {
        let delta = compare::delta(&periods, metric);
        metrics.insert(
            metric.key().to_string(),
            MetricSnapshot {
                value: periods.current.metric(metric),
                change_percent: delta.change_percent,
                is_favorable: delta.is_favorable,
            },
        );
    }

    debug!(
        range = %query.range,
        scope = query.scope.as_str(),
        records = record_count,
        "Computed dashboard snapshot"
    );

    DashboardSnapshot {
        range: query.range.clone(),
        scope: query.scope,
        flow_name: query.flow_name.clone(),
        reference_date: reference,
        record_count,
        metrics,
    }
}

/// Ordered bucket sequence for the trend chart. For `all` the range spans
/// from the earliest record in the selected partition to the reference.
pub fn trend(
    store: &RecordStore,
    reference: DateTime<Utc>,
    query: &DashboardQuery,
) -> Vec<TimeBucket> {
    let Some(range) = RangeKey::parse(&query.range) else {
        return Vec::new();
    };

    let subset = store.select(query.scope, reference, range, query.flow());
    let range_start = match range.days() {
        Some(days) => reference - Duration::days(days),
        None => match subset.first() {
            Some(first) => first.sent_date,
            None => return Vec::new(),
        },
    };

    bucket::bucketize(
        &subset,
        range_start,
        reference,
        granularity::granularity_for(range),
    )
}

/// Sparkline points for one metric over an already-computed bucket
/// sequence, so one `trend` call can feed every card.
pub fn metric_series(buckets: &[TimeBucket], metric: Metric) -> Vec<TimeSeriesPoint> {
    buckets
        .iter()
        .map(|b| TimeSeriesPoint {
            timestamp: b.start_date,
            value: b.aggregate.metric(metric),
            label: Some(b.period_label.clone()),
        })
        .collect()
}

pub fn weekday_breakdown(
    store: &RecordStore,
    reference: DateTime<Utc>,
    query: &DashboardQuery,
) -> Vec<BreakdownSlot> {
    match RangeKey::parse(&query.range) {
        Some(range) => {
            breakdown::by_weekday(&store.select(query.scope, reference, range, query.flow()))
        }
        None => breakdown::by_weekday(&[]),
    }
}

pub fn hour_breakdown(
    store: &RecordStore,
    reference: DateTime<Utc>,
    query: &DashboardQuery,
) -> Vec<BreakdownSlot> {
    match RangeKey::parse(&query.range) {
        Some(range) => {
            breakdown::by_hour(&store.select(query.scope, reference, range, query.flow()))
        }
        None => breakdown::by_hour(&[]),
    }
}

/// Period delta for a single metric, honoring the same unknown-range
/// degradation as the other facade calls.
pub fn metric_delta(
    store: &RecordStore,
    reference: DateTime<Utc>,
    query: &DashboardQuery,
    metric: Metric,
) -> PeriodDelta {
    match RangeKey::parse(&query.range) {
        Some(range) => compare::compare_to_previous(
            store,
            metric,
            reference,
            range,
            query.scope,
            query.flow(),
        ),
        None => PeriodDelta::neutral(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailpulse_core::types::{EmailRecord, FlowStatus, RecordChannel};
    use uuid::Uuid;

    fn campaign(sent: &str, emails_sent: u64, revenue: f64, open_rate: f64) -> EmailRecord {
        EmailRecord {
            id: Uuid::new_v4(),
            channel: RecordChannel::Campaign,
            name: "Campaign".to_string(),
            sent_date: sent.parse().unwrap(),
            emails_sent,
            revenue,
            total_orders: 0,
            open_rate,
            click_rate: 0.0,
            click_to_open_rate: 0.0,
            conversion_rate: 0.0,
            unsubscribe_rate: 0.0,
            spam_rate: 0.0,
            bounce_rate: 0.0,
            flow_name: None,
            status: None,
        }
    }

    fn flow(sent: &str, emails_sent: u64, revenue: f64, flow_name: &str) -> EmailRecord {
        EmailRecord {
            flow_name: Some(flow_name.to_string()),
            status: Some(FlowStatus::Live),
            channel: RecordChannel::Flow,
            ..campaign(sent, emails_sent, revenue, 0.0)
        }
    }

    fn sample_store() -> RecordStore {
        RecordStore::new(
            vec![
                campaign("2025-06-10T09:00:00Z", 100, 500.0, 50.0),
                campaign("2025-06-20T09:00:00Z", 900, 300.0, 10.0),
                campaign("2025-05-10T09:00:00Z", 400, 400.0, 20.0),
            ],
            vec![
                flow("2025-06-12T09:00:00Z", 200, 150.0, "Welcome Series"),
                flow("2025-06-25T09:00:00Z", 300, 250.0, "Win-Back"),
            ],
        )
    }

    fn reference() -> DateTime<Utc> {
        "2025-06-30T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_snapshot_weights_rates() {
        let store = sample_store();
        let snap = snapshot(
            &store,
            reference(),
            &DashboardQuery::new("30d", Scope::Campaigns),
        );

        // 100 sends at 50% and 900 at 10% weight to 14%, not 30%.
        let open = &snap.metrics["openRate"];
        assert!((open.value - 14.0).abs() < 1e-9);
        assert_eq!(snap.record_count, 2);
    }

    #[test]
    fn test_snapshot_covers_every_metric() {
        let store = sample_store();
        let snap = snapshot(&store, reference(), &DashboardQuery::new("30d", Scope::All));
        for metric in Metric::ALL {
            assert!(snap.metrics.contains_key(metric.key()), "{}", metric.key());
        }
    }

    #[test]
    fn test_scope_monotonicity() {
        // Flows-only revenue can never exceed all-scope revenue.
        let store = sample_store();
        let all = snapshot(&store, reference(), &DashboardQuery::new("30d", Scope::All));
        let flows = snapshot(&store, reference(), &DashboardQuery::new("30d", Scope::Flows));

        assert!(flows.metrics["revenue"].value <= all.metrics["revenue"].value);
    }

    #[test]
    fn test_unknown_range_degrades_to_zero_snapshot() {
        let store = sample_store();
        let snap = snapshot(&store, reference(), &DashboardQuery::new("45d", Scope::All));

        assert_eq!(snap.record_count, 0);
        assert_eq!(snap.metrics["revenue"].value, 0.0);
        assert_eq!(snap.metrics["revenue"].change_percent, 0.0);
        assert!(snap.metrics["revenue"].is_favorable);
        assert!(trend(&store, reference(), &DashboardQuery::new("45d", Scope::All)).is_empty());
    }

    #[test]
    fn test_trend_bucket_totals_match_snapshot() {
        let store = sample_store();
        let query = DashboardQuery::new("30d", Scope::All);

        let buckets = trend(&store, reference(), &query);
        let bucketed: u64 = buckets.iter().map(|b| b.aggregate.emails_sent).sum();
        let snap = snapshot(&store, reference(), &query);

        assert_eq!(bucketed as f64, snap.metrics["emailsSent"].value);
    }

    #[test]
    fn test_trend_boundaries_match_across_scopes() {
        let store = sample_store();
        let all = trend(&store, reference(), &DashboardQuery::new("30d", Scope::All));
        let campaigns = trend(
            &store,
            reference(),
            &DashboardQuery::new("30d", Scope::Campaigns),
        );

        assert_eq!(all.len(), campaigns.len());
        for (a, c) in all.iter().zip(&campaigns) {
            assert_eq!(a.start_date, c.start_date);
            assert_eq!(a.end_date, c.end_date);
        }
    }

    #[test]
    fn test_trend_all_range_starts_at_earliest_record() {
        let store = sample_store();
        let buckets = trend(&store, reference(), &DashboardQuery::new("all", Scope::All));

        assert!(!buckets.is_empty());
        assert_eq!(
            buckets[0].start_date,
            "2025-05-10T09:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn test_flow_restriction_narrows_results() {
        let store = sample_store();
        let snap = snapshot(
            &store,
            reference(),
            &DashboardQuery::with_flow("30d", "Welcome Series"),
        );

        assert_eq!(snap.record_count, 1);
        assert!((snap.metrics["revenue"].value - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_metric_series_tracks_buckets() {
        let store = sample_store();
        let buckets = trend(&store, reference(), &DashboardQuery::new("30d", Scope::All));
        let points = metric_series(&buckets, Metric::Revenue);

        assert_eq!(points.len(), buckets.len());
        let series_total: f64 = points.iter().map(|p| p.value).sum();
        let bucket_total: f64 = buckets.iter().map(|b| b.aggregate.revenue).sum();
        assert!((series_total - bucket_total).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let store = sample_store();
        let snap = snapshot(&store, reference(), &DashboardQuery::new("30d", Scope::All));
        let json = serde_json::to_string(&snap).unwrap();

        assert!(json.contains("\"referenceDate\""));
        assert!(json.contains("\"recordCount\""));
        assert!(json.contains("\"changePercent\""));
    }

    #[test]
    fn test_empty_store_yields_wellformed_zero_results() {
        let store = RecordStore::default();
        let query = DashboardQuery::new("30d", Scope::All);
        let snap = snapshot(&store, reference(), &query);

        assert_eq!(snap.record_count, 0);
        for metric in Metric::ALL {
            let m = &snap.metrics[metric.key()];
            assert_eq!(m.value, 0.0);
            assert_eq!(m.change_percent, 0.0);
            assert!(m.is_favorable);
        }
        assert_eq!(weekday_breakdown(&store, reference(), &query).len(), 7);
        assert_eq!(hour_breakdown(&store, reference(), &query).len(), 24);
    }
}
