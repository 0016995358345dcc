//! REST API handlers for record ingestion and the dashboard read
//! endpoints.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use mailpulse_core::types::{EmailRecord, Metric, Scope};
use mailpulse_engine::breakdown::BreakdownSlot;
use mailpulse_engine::bucket::TimeBucket;
use mailpulse_engine::dashboard::{self, DashboardQuery, DashboardSnapshot, TimeSeriesPoint};
use mailpulse_engine::store::{FlowSummary, RecordStore};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

use crate::cache::{SelectionKey, SnapshotCache};

/// Maximum records accepted in one ingest batch.
const MAX_BATCH_RECORDS: usize = 500_000;

/// The dataset behind the dashboard: the immutable record store plus the
/// as-of anchor for every relative range.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub store: RecordStore,
    pub reference_date: Option<DateTime<Utc>>,
}

impl Dataset {
    /// Reference date for range arithmetic: the explicit anchor if one was
    /// ingested, else the newest send date. Never the wall clock; the
    /// dataset may be historical.
    pub fn reference(&self) -> DateTime<Utc> {
        self.reference_date
            .or_else(|| self.store.latest_sent_date())
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<RwLock<Dataset>>,
    pub cache: Arc<SnapshotCache>,
    pub start_time: Instant,
}

// ─── Request / response types ────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngestRequest {
    #[serde(default)]
    pub campaigns: Vec<EmailRecord>,
    #[serde(default)]
    pub flows: Vec<EmailRecord>,
    /// Optional explicit as-of anchor; defaults to the newest send date.
    #[serde(default)]
    pub reference_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub campaigns: usize,
    pub flows: usize,
    pub reference_date: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub records: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SelectionParams {
    /// Range key: 7d, 30d, 60d, 90d, 120d, 180d, 365d, or all.
    #[serde(default = "default_range")]
    pub range: String,
    /// all, campaigns, or flows.
    #[serde(default)]
    pub scope: Option<String>,
    /// Restrict to one flow (exact match); "all" disables the restriction.
    #[serde(default)]
    pub flow: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SeriesParams {
    /// Metric key, e.g. `revenue` or `openRate`.
    pub metric: String,
    #[serde(default = "default_range")]
    pub range: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub flow: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BreakdownParams {
    /// `weekday` or `hour`.
    #[serde(default = "default_dimension")]
    pub dimension: String,
    #[serde(default = "default_range")]
    pub range: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub flow: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompareResponse {
    pub metric: String,
    pub range: String,
    pub scope: Scope,
    pub change_percent: f64,
    pub is_favorable: bool,
}

fn default_range() -> String {
    "30d".to_string()
}

fn default_dimension() -> String {
    "weekday".to_string()
}

fn scope_of(scope: &Option<String>) -> Scope {
    scope.as_deref().map(Scope::parse).unwrap_or_default()
}

fn dashboard_query(range: &str, scope: &Option<String>, flow: &Option<String>) -> DashboardQuery {
    DashboardQuery {
        range: range.to_string(),
        scope: scope_of(scope),
        flow_name: flow.clone(),
    }
}

fn bad_request(error: &str, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        }),
    )
}

// ─── Ingestion ───────────────────────────────────────────────────────

/// Validate an ingest batch at the input boundary. The engine assumes
/// schema-valid records; this is where that contract is enforced, whether
/// the batch arrives over HTTP or from a file.
pub fn validate_batch(request: &IngestRequest) -> Result<(), &'static str> {
    if request.campaigns.len() + request.flows.len() > MAX_BATCH_RECORDS {
        return Err("batch exceeds maximum record count");
    }
    for record in request.campaigns.iter().chain(request.flows.iter()) {
        if !record.revenue.is_finite() || record.revenue < 0.0 {
            return Err("record 'revenue' must be finite and non-negative");
        }
        let rates = [
            record.open_rate,
            record.click_rate,
            record.click_to_open_rate,
            record.conversion_rate,
            record.unsubscribe_rate,
            record.spam_rate,
            record.bounce_rate,
        ];
        if rates.iter().any(|rate| !(0.0..=100.0).contains(rate)) {
            return Err("record rates must be percentages in [0, 100]");
        }
    }
    for record in &request.flows {
        if record.flow_name.is_none() {
            return Err("flow records must carry 'flowName'");
        }
    }
    Ok(())
}

/// POST /v1/records — replace the record store with a normalized batch.
#[utoipa::path(
    post,
    path = "/v1/records",
    tag = "Ingestion",
    request_body = IngestRequest,
    responses(
        (status = 200, description = "Record store replaced", body = IngestResponse),
        (status = 400, description = "Batch failed boundary validation", body = ErrorResponse),
    )
)]
pub async fn handle_ingest(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(msg) = validate_batch(&request) {
        warn!(error = msg, "Ingest batch validation failed");
        metrics::counter!("api.validation_errors").increment(1);
        return Err(bad_request("invalid_batch", msg));
    }

    let campaigns = request.campaigns.len();
    let flows = request.flows.len();
    let dataset = Dataset {
        store: RecordStore::new(request.campaigns, request.flows),
        reference_date: request.reference_date,
    };
    let reference_date = dataset.reference();

    *state.dataset.write() = dataset;
    state.cache.clear();

    metrics::counter!("api.records_ingested").increment((campaigns + flows) as u64);
    info!(campaigns, flows, reference = %reference_date, "Record store replaced");

    Ok(Json(IngestResponse {
        campaigns,
        flows,
        reference_date,
    }))
}

// ─── Dashboard reads ─────────────────────────────────────────────────

/// GET /v1/dashboard/snapshot — aggregated metrics with period deltas.
#[utoipa::path(
    get,
    path = "/v1/dashboard/snapshot",
    tag = "Dashboard",
    params(SelectionParams),
    responses(
        (status = 200, description = "Snapshot for the selection", body = DashboardSnapshot),
    )
)]
pub async fn handle_snapshot(
    State(state): State<AppState>,
    Query(params): Query<SelectionParams>,
) -> Json<DashboardSnapshot> {
    metrics::counter!("api.dashboard_requests").increment(1);

    let key = SelectionKey {
        range: params.range.clone(),
        scope: scope_of(&params.scope).as_str().to_string(),
        flow_name: params.flow.clone(),
    };
    if let Some(hit) = state.cache.get(&key) {
        metrics::counter!("api.snapshot_cache_hits").increment(1);
        return Json((*hit).clone());
    }

    let query = dashboard_query(&params.range, &params.scope, &params.flow);
    let snapshot = {
        let dataset = state.dataset.read();
        dashboard::snapshot(&dataset.store, dataset.reference(), &query)
    };

    state.cache.put(key, Arc::new(snapshot.clone()));
    Json(snapshot)
}

/// GET /v1/dashboard/trend — the full bucket sequence for trend charts.
#[utoipa::path(
    get,
    path = "/v1/dashboard/trend",
    tag = "Dashboard",
    params(SelectionParams),
    responses(
        (status = 200, description = "Ordered buckets, oldest first", body = [TimeBucket]),
    )
)]
pub async fn handle_trend(
    State(state): State<AppState>,
    Query(params): Query<SelectionParams>,
) -> Json<Vec<TimeBucket>> {
    metrics::counter!("api.dashboard_requests").increment(1);

    let query = dashboard_query(&params.range, &params.scope, &params.flow);
    let dataset = state.dataset.read();
    Json(dashboard::trend(&dataset.store, dataset.reference(), &query))
}

/// GET /v1/dashboard/series — sparkline points for one metric.
#[utoipa::path(
    get,
    path = "/v1/dashboard/series",
    tag = "Dashboard",
    params(SeriesParams),
    responses(
        (status = 200, description = "Points, oldest first", body = [TimeSeriesPoint]),
        (status = 400, description = "Unknown metric", body = ErrorResponse),
    )
)]
pub async fn handle_series(
    State(state): State<AppState>,
    Query(params): Query<SeriesParams>,
) -> Result<Json<Vec<TimeSeriesPoint>>, (StatusCode, Json<ErrorResponse>)> {
    metrics::counter!("api.dashboard_requests").increment(1);

    let Some(metric) = Metric::parse(&params.metric) else {
        metrics::counter!("api.validation_errors").increment(1);
        return Err(bad_request(
            "unknown_metric",
            "metric is not one of the dashboard metrics",
        ));
    };

    let query = dashboard_query(&params.range, &params.scope, &params.flow);
    let dataset = state.dataset.read();
    let buckets = dashboard::trend(&dataset.store, dataset.reference(), &query);
    Ok(Json(dashboard::metric_series(&buckets, metric)))
}

/// GET /v1/dashboard/compare — period-over-period delta for one metric.
#[utoipa::path(
    get,
    path = "/v1/dashboard/compare",
    tag = "Dashboard",
    params(SeriesParams),
    responses(
        (status = 200, description = "Delta vs the preceding period", body = CompareResponse),
        (status = 400, description = "Unknown metric", body = ErrorResponse),
    )
)]
pub async fn handle_compare(
    State(state): State<AppState>,
    Query(params): Query<SeriesParams>,
) -> Result<Json<CompareResponse>, (StatusCode, Json<ErrorResponse>)> {
    metrics::counter!("api.dashboard_requests").increment(1);

    let Some(metric) = Metric::parse(&params.metric) else {
        metrics::counter!("api.validation_errors").increment(1);
        return Err(bad_request(
            "unknown_metric",
            "metric is not one of the dashboard metrics",
        ));
    };

    let query = dashboard_query(&params.range, &params.scope, &params.flow);
    let delta = {
        let dataset = state.dataset.read();
        dashboard::metric_delta(&dataset.store, dataset.reference(), &query, metric)
    };

    Ok(Json(CompareResponse {
        metric: params.metric,
        range: query.range,
        scope: query.scope,
        change_percent: delta.change_percent,
        is_favorable: delta.is_favorable,
    }))
}

/// GET /v1/dashboard/breakdown — day-of-week or hour-of-day panels.
#[utoipa::path(
    get,
    path = "/v1/dashboard/breakdown",
    tag = "Dashboard",
    params(BreakdownParams),
    responses(
        (status = 200, description = "One slot per unit, full axis", body = [BreakdownSlot]),
        (status = 400, description = "Unknown dimension", body = ErrorResponse),
    )
)]
pub async fn handle_breakdown(
    State(state): State<AppState>,
    Query(params): Query<BreakdownParams>,
) -> Result<Json<Vec<BreakdownSlot>>, (StatusCode, Json<ErrorResponse>)> {
    metrics::counter!("api.dashboard_requests").increment(1);

    let query = dashboard_query(&params.range, &params.scope, &params.flow);
    let dataset = state.dataset.read();
    let slots = match params.dimension.as_str() {
        "weekday" => dashboard::weekday_breakdown(&dataset.store, dataset.reference(), &query),
        "hour" => dashboard::hour_breakdown(&dataset.store, dataset.reference(), &query),
        _ => {
            metrics::counter!("api.validation_errors").increment(1);
            return Err(bad_request(
                "unknown_dimension",
                "dimension must be 'weekday' or 'hour'",
            ));
        }
    };
    Ok(Json(slots))
}

/// GET /v1/flows — per-flow rollups for the flow selector.
#[utoipa::path(
    get,
    path = "/v1/flows",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Flow rollups, sorted by name", body = [FlowSummary]),
    )
)]
pub async fn handle_flows(State(state): State<AppState>) -> Json<Vec<FlowSummary>> {
    let dataset = state.dataset.read();
    Json(dataset.store.flow_summaries())
}

// ─── Operational endpoints ───────────────────────────────────────────

/// GET /health — health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Operations",
    responses((status = 200, description = "Service health", body = HealthResponse))
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let records = state.dataset.read().store.len();
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        records,
    })
}

/// GET /ready — readiness probe.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Operations",
    responses((status = 200, description = "Ready to serve"))
)]
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.start_time.elapsed().as_secs() > 0 {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /live — liveness probe.
#[utoipa::path(
    get,
    path = "/live",
    tag = "Operations",
    responses((status = 200, description = "Process is live"))
)]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}
