//! Metric aggregator: totals and send-weighted average rates for one
//! record subset, in a single pass.

use mailpulse_core::types::{EmailRecord, Metric};
use serde::Serialize;
use utoipa::ToSchema;

/// Aggregated metrics for one subset. An empty subset produces the
/// all-zero aggregate; callers never special-case empty input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    pub record_count: u64,
    pub emails_sent: u64,
    pub revenue: f64,
    pub total_orders: u64,
    pub average_order_value: f64,
    pub revenue_per_email: f64,
    pub open_rate: f64,
    pub click_rate: f64,
    pub click_to_open_rate: f64,
    pub conversion_rate: f64,
    pub unsubscribe_rate: f64,
    pub spam_rate: f64,
    pub bounce_rate: f64,
}

impl Aggregate {
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Revenue => self.revenue,
            Metric::EmailsSent => self.emails_sent as f64,
            Metric::TotalOrders => self.total_orders as f64,
            Metric::AverageOrderValue => self.average_order_value,
            Metric::RevenuePerEmail => self.revenue_per_email,
            Metric::OpenRate => self.open_rate,
            Metric::ClickRate => self.click_rate,
            Metric::ClickToOpenRate => self.click_to_open_rate,
            Metric::ConversionRate => self.conversion_rate,
            Metric::UnsubscribeRate => self.unsubscribe_rate,
            Metric::SpamRate => self.spam_rate,
            Metric::BounceRate => self.bounce_rate,
        }
    }
}

/// Reduce a subset to totals and weighted rates.
///
/// Rates are weighted by each record's `emails_sent`, never averaged
/// naively: a 100-send record at 50% and a 900-send record at 10% must
/// aggregate to 14%, not 30%. Zero denominators resolve to 0.
pub fn aggregate(subset: &[&EmailRecord]) -> Aggregate {
    let mut emails_sent = 0u64;
    let mut revenue = 0.0f64;
    let mut total_orders = 0u64;

    // Weighted numerators: sum(rate_i * emails_sent_i)
    let mut open = 0.0f64;
    let mut click = 0.0f64;
    let mut click_to_open = 0.0f64;
    let mut conversion = 0.0f64;
    let mut unsubscribe = 0.0f64;
    let mut spam = 0.0f64;
    let mut bounce = 0.0f64;

    for record in subset {
        let weight = record.emails_sent as f64;
        emails_sent += record.emails_sent;
        revenue += record.revenue;
        total_orders += record.total_orders;
        open += record.open_rate * weight;
        click += record.click_rate * weight;
        click_to_open += record.click_to_open_rate * weight;
        conversion += record.conversion_rate * weight;
        unsubscribe += record.unsubscribe_rate * weight;
        spam += record.spam_rate * weight;
        bounce += record.bounce_rate * weight;
    }

    let sent = emails_sent as f64;
    let weighted = |numerator: f64| if emails_sent > 0 { numerator / sent } else { 0.0 };

    Aggregate {
        record_count: subset.len() as u64,
        emails_sent,
        revenue,
        total_orders,
        average_order_value: if total_orders > 0 {
            revenue / total_orders as f64
        } else {
            0.0
        },
        revenue_per_email: weighted(revenue),
        open_rate: weighted(open),
        click_rate: weighted(click),
        click_to_open_rate: weighted(click_to_open),
        conversion_rate: weighted(conversion),
        unsubscribe_rate: weighted(unsubscribe),
        spam_rate: weighted(spam),
        bounce_rate: weighted(bounce),
    }
}
