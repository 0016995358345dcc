//! Seeded demo dataset: a stretch of plausible campaign and flow sends so
//! the dashboard has something to show without a real export.

use chrono::{Duration, NaiveTime, Utc};
use mailpulse_api::rest::Dataset;
use mailpulse_core::types::{EmailRecord, FlowStatus, RecordChannel};
use mailpulse_engine::store::RecordStore;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

const CAMPAIGN_NAMES: [&str; 6] = [
    "Weekly Newsletter",
    "Product Launch",
    "Seasonal Sale",
    "VIP Early Access",
    "Restock Alert",
    "Content Digest",
];

const FLOWS: [(&str, FlowStatus); 4] = [
    ("Welcome Series", FlowStatus::Live),
    ("Abandoned Cart", FlowStatus::Live),
    ("Post-Purchase", FlowStatus::Manual),
    ("Win-Back", FlowStatus::Draft),
];

pub fn generate(days: u32, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let anchor = Utc::now();

    let mut campaigns = Vec::new();
    let mut flows = Vec::new();

    for day in 0..days as i64 {
        let date = (anchor - Duration::days(day)).date_naive();

        // Campaign blasts go out a couple of times a week, mid-morning.
        if rng.gen_bool(2.0 / 7.0) {
            let name = CAMPAIGN_NAMES[rng.gen_range(0..CAMPAIGN_NAMES.len())];
            let hour = rng.gen_range(8..18);
            let sent_date = date
                .and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN))
                .and_utc();
            let emails_sent = rng.gen_range(5_000..60_000u64);
            campaigns.push(send(
                &mut rng,
                RecordChannel::Campaign,
                name,
                sent_date,
                emails_sent,
                None,
            ));
        }

        // Flow steps trickle out daily at much lower volume.
        for (flow_name, status) in FLOWS {
            if !rng.gen_bool(0.85) {
                continue;
            }
            let hour = rng.gen_range(0..24);
            let sent_date = date
                .and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN))
                .and_utc();
            let emails_sent = rng.gen_range(50..1_200u64);
            let mut record = send(
                &mut rng,
                RecordChannel::Flow,
                flow_name,
                sent_date,
                emails_sent,
                Some(flow_name),
            );
            record.status = Some(status);
            flows.push(record);
        }
    }

    Dataset {
        store: RecordStore::new(campaigns, flows),
        reference_date: None,
    }
}

fn send(
    rng: &mut StdRng,
    channel: RecordChannel,
    name: &str,
    sent_date: chrono::DateTime<Utc>,
    emails_sent: u64,
    flow_name: Option<&str>,
) -> EmailRecord {
    let conversion_rate = rate(rng, 1.4, 0.9);
    let total_orders = (emails_sent as f64 * conversion_rate / 100.0).round() as u64;
    let revenue = total_orders as f64 * rng.gen_range(40.0..90.0);

    let open_rate = rate(rng, 44.0, 10.0);
    let click_rate = rate(rng, 4.2, 2.0);
    let click_to_open_rate = if open_rate > 0.0 {
        (click_rate / open_rate * 100.0).min(100.0)
    } else {
        0.0
    };

    EmailRecord {
        id: Uuid::new_v4(),
        channel,
        name: name.to_string(),
        sent_date,
        emails_sent,
        revenue,
        total_orders,
        open_rate,
        click_rate,
        click_to_open_rate,
        conversion_rate,
        unsubscribe_rate: rate(rng, 0.25, 0.15),
        spam_rate: rate(rng, 0.03, 0.02),
        bounce_rate: rate(rng, 0.7, 0.4),
        flow_name: flow_name.map(str::to_string),
        status: None,
    }
}

fn rate(rng: &mut StdRng, base: f64, spread: f64) -> f64 {
    (base + rng.gen_range(-spread..spread)).clamp(0.0, 100.0)
}
