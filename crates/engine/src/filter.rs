//! Range filter: selects the record subset for a relative date window and
//! optional flow restriction.

use chrono::{DateTime, Duration, Utc};
use mailpulse_core::types::{EmailRecord, RangeKey};

/// Sentinel flow name meaning "no flow restriction".
pub const ALL_FLOWS: &str = "all";

/// Lower bound of the window anchored at `reference`; `None` for `all`.
pub fn cutoff_for(reference: DateTime<Utc>, range: RangeKey) -> Option<DateTime<Utc>> {
    range.days().map(|days| reference - Duration::days(days))
}

/// Records whose `sent_date` falls in `[reference - N days, reference]`,
/// both bounds inclusive, optionally restricted to one flow (exact,
/// case-sensitive match). `all` skips date filtering entirely. Never
/// mutates the input; an empty input yields an empty subset.
pub fn apply<'a>(
    records: &[&'a EmailRecord],
    reference: DateTime<Utc>,
    range: RangeKey,
    flow_name: Option<&str>,
) -> Vec<&'a EmailRecord> {
    let cutoff = cutoff_for(reference, range);
    records
        .iter()
        .copied()
        .filter(|r| match cutoff {
            Some(cutoff) => r.sent_date >= cutoff && r.sent_date <= reference,
            None => true,
        })
        .filter(|r| match flow_name {
            Some(name) if name != ALL_FLOWS => r.flow_name.as_deref() == Some(name),
            _ => true,
        })
        .collect()
}
