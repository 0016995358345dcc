//! Granularity selector: the single source of truth for chart bucket
//! resolution. Every chart consuming a given range must use this mapping
//! so sparklines, breakdown panels, and headline series stay aligned.

use mailpulse_core::types::RangeKey;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

/// Map a range to its bucket resolution. Thresholds keep bucket counts in
/// a chart-friendly window: up to 60 daily buckets, 13 to 26 weekly, and
/// monthly beyond that.
pub fn granularity_for(range: RangeKey) -> Granularity {
    match range {
        RangeKey::Days7 | RangeKey::Days30 | RangeKey::Days60 => Granularity::Daily,
        RangeKey::Days90 | RangeKey::Days120 | RangeKey::Days180 => Granularity::Weekly,
        RangeKey::Days365 | RangeKey::All => Granularity::Monthly,
    }
}
