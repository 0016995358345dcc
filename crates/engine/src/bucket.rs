//! Time-series bucketer: contiguous calendar-aligned buckets spanning the
//! filtered range, with the metric aggregator run independently per bucket.

use chrono::{DateTime, Datelike, Days, Months, NaiveTime, Utc, Weekday};
use mailpulse_core::types::EmailRecord;
use serde::Serialize;
use utoipa::ToSchema;

use crate::aggregate::{self, Aggregate};
use crate::granularity::Granularity;

/// One trend-chart bucket. Buckets are ordered oldest first and cover the
/// whole range, including units with no records (zeroed metrics), so chart
/// x-axes stay contiguous.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeBucket {
    pub period_label: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub aggregate: Aggregate,
}

/// Start of the calendar unit following `at`. Always strictly later than
/// `at`, so the bucket walk terminates.
fn start_of_next_unit(at: DateTime<Utc>, granularity: Granularity) -> DateTime<Utc> {
    let date = at.date_naive();
    let next = match granularity {
        Granularity::Daily => date + Days::new(1),
        Granularity::Weekly => date.week(Weekday::Mon).first_day() + Days::new(7),
        Granularity::Monthly => {
            let month_start = date.with_day(1).unwrap_or(date);
            month_start + Months::new(1)
        }
    };
    next.and_time(NaiveTime::MIN).and_utc()
}

fn period_label(start: DateTime<Utc>, granularity: Granularity) -> String {
    match granularity {
        Granularity::Daily => start.format("%b %d").to_string(),
        Granularity::Weekly => format!("Week of {}", start.format("%b %d")),
        Granularity::Monthly => start.format("%b %Y").to_string(),
    }
}

/// Group `subset` into ordered buckets spanning `[range_start, range_end]`.
///
/// Membership is half-open `[bucket_start, bucket_end)` except for the
/// final bucket, which is closed on both ends so it captures `range_end`
/// itself. Bucket boundaries depend only on the range and granularity, so
/// overview, campaign-only, and flow-only series over one range are
/// time-aligned.
///
/// `subset` must be ordered ascending by `sent_date` (the record store
/// guarantees this); assignment is then a single linear scan.
pub fn bucketize(
    subset: &[&EmailRecord],
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    granularity: Granularity,
) -> Vec<TimeBucket> {
    if range_end < range_start {
        return Vec::new();
    }

    let mut buckets = Vec::new();
    let mut idx = 0;
    while idx < subset.len() && subset[idx].sent_date < range_start {
        idx += 1;
    }

    let mut cursor = range_start;
    loop {
        let next = start_of_next_unit(cursor, granularity);
        let is_final = next > range_end;

        let lo = idx;
        if is_final {
            while idx < subset.len() && subset[idx].sent_date <= range_end {
                idx += 1;
            }
        } else {
            while idx < subset.len() && subset[idx].sent_date < next {
                idx += 1;
            }
        }

        buckets.push(TimeBucket {
            period_label: period_label(cursor, granularity),
            start_date: cursor,
            end_date: if is_final { range_end } else { next },
            aggregate: aggregate::aggregate(&subset[lo..idx]),
        });

        if is_final {
            break;
        }
        cursor = next;
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailpulse_core::types::RecordChannel;
    use uuid::Uuid;

    fn record(sent: &str, emails_sent: u64) -> EmailRecord {
        EmailRecord {
            id: Uuid::new_v4(),
            channel: RecordChannel::Campaign,
            name: "Send".to_string(),
            sent_date: sent.parse().unwrap(),
            emails_sent,
            revenue: 0.0,
            total_orders: 0,
            open_rate: 0.0,
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

    fn date(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_daily_buckets_are_contiguous() {
        let buckets = bucketize(
            &[],
            date("2025-01-01T00:00:00Z"),
            date("2025-01-08T00:00:00Z"),
            Granularity::Daily,
        );

        // Seven full days plus the closed final bucket at range end.
        assert_eq!(buckets.len(), 8);
        assert_eq!(buckets[0].start_date, date("2025-01-01T00:00:00Z"));
        for pair in buckets.windows(2) {
            assert_eq!(pair[0].end_date, pair[1].start_date);
        }
        assert_eq!(buckets.last().unwrap().end_date, date("2025-01-08T00:00:00Z"));
    }

    #[test]
    fn test_empty_units_carry_zero_aggregate() {
        let records = vec![record("2025-01-03T12:00:00Z", 500)];
        let subset: Vec<&EmailRecord> = records.iter().collect();

        let buckets = bucketize(
            &subset,
            date("2025-01-01T00:00:00Z"),
            date("2025-01-05T00:00:00Z"),
            Granularity::Daily,
        );

        let populated: Vec<_> = buckets.iter().filter(|b| b.aggregate.emails_sent > 0).collect();
        assert_eq!(populated.len(), 1);
        assert_eq!(populated[0].period_label, "Jan 03");
        assert!(buckets.iter().all(|b| b.aggregate.record_count <= 1));
    }

    #[test]
    fn test_every_record_lands_in_exactly_one_bucket() {
        let records = vec![
            record("2025-01-01T00:00:00Z", 10),
            record("2025-01-02T00:00:00Z", 20),
            record("2025-01-02T23:59:59Z", 30),
            record("2025-01-05T00:00:00Z", 40),
        ];
        let subset: Vec<&EmailRecord> = records.iter().collect();

        let buckets = bucketize(
            &subset,
            date("2025-01-01T00:00:00Z"),
            date("2025-01-05T00:00:00Z"),
            Granularity::Daily,
        );

        let bucketed: u64 = buckets.iter().map(|b| b.aggregate.emails_sent).sum();
        let total = aggregate::aggregate(&subset).emails_sent;
        assert_eq!(bucketed, total);
    }

    #[test]
    fn test_final_bucket_is_closed_at_range_end() {
        let records = vec![record("2025-01-05T00:00:00Z", 40)];
        let subset: Vec<&EmailRecord> = records.iter().collect();

        let buckets = bucketize(
            &subset,
            date("2025-01-01T00:00:00Z"),
            date("2025-01-05T00:00:00Z"),
            Granularity::Daily,
        );

        assert_eq!(buckets.last().unwrap().aggregate.emails_sent, 40);
    }

    #[test]
    fn test_weekly_buckets_align_to_mondays() {
        // 2025-01-15 is a Wednesday; the second bucket starts Monday Jan 20.
        let buckets = bucketize(
            &[],
            date("2025-01-15T00:00:00Z"),
            date("2025-02-10T00:00:00Z"),
            Granularity::Weekly,
        );

        assert_eq!(buckets[0].start_date, date("2025-01-15T00:00:00Z"));
        assert_eq!(buckets[1].start_date, date("2025-01-20T00:00:00Z"));
        assert_eq!(buckets[1].period_label, "Week of Jan 20");
        for bucket in &buckets[1..] {
            assert_eq!(bucket.start_date.weekday(), Weekday::Mon);
        }
    }

    #[test]
    fn test_monthly_buckets_align_to_month_starts() {
        let buckets = bucketize(
            &[],
            date("2024-11-20T00:00:00Z"),
            date("2025-02-15T00:00:00Z"),
            Granularity::Monthly,
        );

        let labels: Vec<&str> = buckets.iter().map(|b| b.period_label.as_str()).collect();
        assert_eq!(labels, vec!["Nov 2024", "Dec 2024", "Jan 2025", "Feb 2025"]);
        assert_eq!(buckets[1].start_date, date("2024-12-01T00:00:00Z"));
    }

    #[test]
    fn test_boundaries_identical_across_subsets() {
        // Different record subsets over the same range must produce the
        // same bucket boundaries, keeping cross-view charts aligned.
        let campaigns = vec![record("2025-01-02T00:00:00Z", 10)];
        let flows = vec![record("2025-01-04T00:00:00Z", 99)];
        let start = date("2025-01-01T00:00:00Z");
        let end = date("2025-01-07T00:00:00Z");

        let a = bucketize(&campaigns.iter().collect::<Vec<_>>(), start, end, Granularity::Daily);
        let b = bucketize(&flows.iter().collect::<Vec<_>>(), start, end, Granularity::Daily);

        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.start_date, y.start_date);
            assert_eq!(x.end_date, y.end_date);
        }
    }

    #[test]
    fn test_degenerate_range_yields_single_bucket() {
        let at = date("2025-01-01T12:00:00Z");
        let buckets = bucketize(&[], at, at, Granularity::Daily);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].start_date, at);
        assert_eq!(buckets[0].end_date, at);
    }

    #[test]
    fn test_inverted_range_yields_nothing() {
        let buckets = bucketize(
            &[],
            date("2025-01-05T00:00:00Z"),
            date("2025-01-01T00:00:00Z"),
            Granularity::Daily,
        );
        assert!(buckets.is_empty());
    }
}
