//! Domain types shared by the engine and the API: send records, the metric
//! vocabulary, and the dashboard filter enumerations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One email send event (campaign blast or flow-step send) with its
/// pre-computed outcome metrics. Immutable after ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailRecord {
    pub id: Uuid,
    pub channel: RecordChannel,
    /// Campaign name, or the flow email/step name.
    pub name: String,
    /// Source of truth for all filtering and bucketing. UTC across the
    /// whole dataset.
    pub sent_date: DateTime<Utc>,
    /// Denominator for every weighted rate.
    pub emails_sent: u64,
    pub revenue: f64,
    pub total_orders: u64,
    /// Rates are percentages in [0, 100], computed per-record upstream.
    pub open_rate: f64,
    pub click_rate: f64,
    pub click_to_open_rate: f64,
    pub conversion_rate: f64,
    pub unsubscribe_rate: f64,
    pub spam_rate: f64,
    pub bounce_rate: f64,
    /// Flow-step records only: the flow this send belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_name: Option<String>,
    /// Flow-step records only: lifecycle state of the owning flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FlowStatus>,
}

/// Which store partition a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordChannel {
    Campaign,
    Flow,
}

/// Lifecycle state of an automated flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    Live,
    Manual,
    Draft,
    Archived,
}

impl FlowStatus {
    pub fn is_live(self) -> bool {
        matches!(self, FlowStatus::Live)
    }
}

/// Relative date-range selector shared by every dashboard chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum RangeKey {
    #[serde(rename = "7d")]
    Days7,
    #[serde(rename = "30d")]
    Days30,
    #[serde(rename = "60d")]
    Days60,
    #[serde(rename = "90d")]
    Days90,
    #[serde(rename = "120d")]
    Days120,
    #[serde(rename = "180d")]
    Days180,
    #[serde(rename = "365d")]
    Days365,
    #[serde(rename = "all")]
    All,
}

impl RangeKey {
    pub const ALL_KEYS: [RangeKey; 8] = [
        RangeKey::Days7,
        RangeKey::Days30,
        RangeKey::Days60,
        RangeKey::Days90,
        RangeKey::Days120,
        RangeKey::Days180,
        RangeKey::Days365,
        RangeKey::All,
    ];

    /// Window length in days; `None` for `all`.
    pub fn days(self) -> Option<i64> {
        match self {
            RangeKey::Days7 => Some(7),
            RangeKey::Days30 => Some(30),
            RangeKey::Days60 => Some(60),
            RangeKey::Days90 => Some(90),
            RangeKey::Days120 => Some(120),
            RangeKey::Days180 => Some(180),
            RangeKey::Days365 => Some(365),
            RangeKey::All => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RangeKey::Days7 => "7d",
            RangeKey::Days30 => "30d",
            RangeKey::Days60 => "60d",
            RangeKey::Days90 => "90d",
            RangeKey::Days120 => "120d",
            RangeKey::Days180 => "180d",
            RangeKey::Days365 => "365d",
            RangeKey::All => "all",
        }
    }

    /// Stale or unknown keys parse to `None`; callers degrade to an empty
    /// subset rather than failing.
    pub fn parse(s: &str) -> Option<RangeKey> {
        RangeKey::ALL_KEYS.iter().copied().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for RangeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which store partition a computation runs against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    #[default]
    All,
    Campaigns,
    Flows,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::All => "all",
            Scope::Campaigns => "campaigns",
            Scope::Flows => "flows",
        }
    }

    /// Unknown scope strings fall back to `all`, the safe superset.
    pub fn parse(s: &str) -> Scope {
        match s {
            "campaigns" => Scope::Campaigns,
            "flows" => Scope::Flows,
            _ => Scope::All,
        }
    }
}

/// Every metric the dashboard displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Revenue,
    EmailsSent,
    TotalOrders,
    AverageOrderValue,
    RevenuePerEmail,
    OpenRate,
    ClickRate,
    ClickToOpenRate,
    ConversionRate,
    UnsubscribeRate,
    SpamRate,
    BounceRate,
}

/// Whether an increase in a metric is good news.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

impl Metric {
    pub const ALL: [Metric; 12] = [
        Metric::Revenue,
        Metric::EmailsSent,
        Metric::TotalOrders,
        Metric::AverageOrderValue,
        Metric::RevenuePerEmail,
        Metric::OpenRate,
        Metric::ClickRate,
        Metric::ClickToOpenRate,
        Metric::ConversionRate,
        Metric::UnsubscribeRate,
        Metric::SpamRate,
        Metric::BounceRate,
    ];

    /// Unsubscribes, spam complaints, and bounces are cost metrics; a
    /// decrease is favorable.
    pub fn polarity(self) -> Polarity {
        match self {
            Metric::UnsubscribeRate | Metric::SpamRate | Metric::BounceRate => {
                Polarity::LowerIsBetter
            }
            _ => Polarity::HigherIsBetter,
        }
    }

    /// Wire key, matching the serde rename.
    pub fn key(self) -> &'static str {
        match self {
            Metric::Revenue => "revenue",
            Metric::EmailsSent => "emailsSent",
            Metric::TotalOrders => "totalOrders",
            Metric::AverageOrderValue => "averageOrderValue",
            Metric::RevenuePerEmail => "revenuePerEmail",
            Metric::OpenRate => "openRate",
            Metric::ClickRate => "clickRate",
            Metric::ClickToOpenRate => "clickToOpenRate",
            Metric::ConversionRate => "conversionRate",
            Metric::UnsubscribeRate => "unsubscribeRate",
            Metric::SpamRate => "spamRate",
            Metric::BounceRate => "bounceRate",
        }
    }

    pub fn parse(s: &str) -> Option<Metric> {
        Metric::ALL.iter().copied().find(|m| m.key() == s)
    }

    /// Rate metrics are send-weighted averages; everything else is a sum or
    /// a ratio of sums.
    pub fn is_rate(self) -> bool {
        matches!(
            self,
            Metric::OpenRate
                | Metric::ClickRate
                | Metric::ClickToOpenRate
                | Metric::ConversionRate
                | Metric::UnsubscribeRate
                | Metric::SpamRate
                | Metric::BounceRate
        )
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
