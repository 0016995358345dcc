//! Record store: the two ordered send-record partitions behind every
//! engine call. Passed explicitly; there is no global dataset.

use chrono::{DateTime, Utc};
use mailpulse_core::types::{EmailRecord, FlowStatus, RangeKey, Scope};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::filter;

/// Normalized per-send records, partitioned by origin. Both partitions are
/// kept sorted ascending by `sent_date` so downstream scans walk them once.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    campaigns: Vec<EmailRecord>,
    flows: Vec<EmailRecord>,
}

/// Per-flow rollup for the dashboard's flow selector.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlowSummary {
    pub flow_name: String,
    pub status: FlowStatus,
    /// Number of send records attributed to the flow.
    pub sends: u64,
    pub emails_sent: u64,
    pub revenue: f64,
}

impl RecordStore {
    pub fn new(mut campaigns: Vec<EmailRecord>, mut flows: Vec<EmailRecord>) -> Self {
        campaigns.sort_by_key(|r| r.sent_date);
        flows.sort_by_key(|r| r.sent_date);
        Self { campaigns, flows }
    }

    pub fn campaigns(&self) -> &[EmailRecord] {
        &self.campaigns
    }

    pub fn flows(&self) -> &[EmailRecord] {
        &self.flows
    }

    pub fn len(&self) -> usize {
        self.campaigns.len() + self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty() && self.flows.is_empty()
    }

    /// Records for a scope, merged in `sent_date` order.
    pub fn partition(&self, scope: Scope) -> Vec<&EmailRecord> {
        match scope {
            Scope::Campaigns => self.campaigns.iter().collect(),
            Scope::Flows => self.flows.iter().collect(),
            Scope::All => {
                let mut merged = Vec::with_capacity(self.len());
                let (mut i, mut j) = (0, 0);
                while i < self.campaigns.len() && j < self.flows.len() {
                    if self.campaigns[i].sent_date <= self.flows[j].sent_date {
                        merged.push(&self.campaigns[i]);
                        i += 1;
                    } else {
                        merged.push(&self.flows[j]);
                        j += 1;
                    }
                }
                merged.extend(self.campaigns[i..].iter());
                merged.extend(self.flows[j..].iter());
                merged
            }
        }
    }

    /// Scope partition plus range/flow filtering in one call.
    pub fn select(
        &self,
        scope: Scope,
        reference: DateTime<Utc>,
        range: RangeKey,
        flow_name: Option<&str>,
    ) -> Vec<&EmailRecord> {
        filter::apply(&self.partition(scope), reference, range, flow_name)
    }

    /// Newest send date across both partitions; the natural reference date
    /// for a historical dataset.
    pub fn latest_sent_date(&self) -> Option<DateTime<Utc>> {
        let last_campaign = self.campaigns.last().map(|r| r.sent_date);
        let last_flow = self.flows.last().map(|r| r.sent_date);
        match (last_campaign, last_flow) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    /// Distinct flow names, sorted, for filter dropdowns.
    pub fn flow_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .flows
            .iter()
            .filter_map(|r| r.flow_name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// One rollup per distinct flow, sorted by name. The status reflects the
    /// most recent record carrying one.
    pub fn flow_summaries(&self) -> Vec<FlowSummary> {
        let mut by_name: BTreeMap<&str, FlowSummary> = BTreeMap::new();
        for record in &self.flows {
            let Some(name) = record.flow_name.as_deref() else {
                continue;
            };
            let entry = by_name.entry(name).or_insert_with(|| FlowSummary {
                flow_name: name.to_string(),
                status: FlowStatus::Draft,
                sends: 0,
                emails_sent: 0,
                revenue: 0.0,
            });
            entry.sends += 1;
            entry.emails_sent += record.emails_sent;
            entry.revenue += record.revenue;
            if let Some(status) = record.status {
                entry.status = status;
            }
        }
        by_name.into_values().collect()
    }
}
