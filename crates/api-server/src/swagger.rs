//! OpenAPI specification and Swagger UI configuration.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MailPulse API",
        version = "0.1.0",
        description = "Email marketing performance dashboard backend.\n\nIngests normalized per-send records and serves aggregated snapshots, bucketed trend series, period-over-period deltas, and weekday/hour breakdowns.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Ingestion", description = "Record store replacement"),
        (name = "Dashboard", description = "Aggregated snapshots, trends, deltas, and breakdowns"),
        (name = "Operations", description = "Health, readiness, and liveness probes"),
    ),
    paths(
        // Ingestion
        crate::rest::handle_ingest,
        // Dashboard
        crate::rest::handle_snapshot,
        crate::rest::handle_trend,
        crate::rest::handle_series,
        crate::rest::handle_compare,
        crate::rest::handle_breakdown,
        crate::rest::handle_flows,
        // Operations
        crate::rest::health_check,
        crate::rest::readiness,
        crate::rest::liveness,
    ),
    components(schemas(
        // Domain types
        mailpulse_core::types::EmailRecord,
        mailpulse_core::types::RecordChannel,
        mailpulse_core::types::FlowStatus,
        mailpulse_core::types::RangeKey,
        mailpulse_core::types::Scope,
        mailpulse_core::types::Metric,
        // Engine output types
        mailpulse_engine::aggregate::Aggregate,
        mailpulse_engine::bucket::TimeBucket,
        mailpulse_engine::breakdown::BreakdownSlot,
        mailpulse_engine::compare::PeriodDelta,
        mailpulse_engine::dashboard::DashboardSnapshot,
        mailpulse_engine::dashboard::MetricSnapshot,
        mailpulse_engine::dashboard::TimeSeriesPoint,
        mailpulse_engine::store::FlowSummary,
        // REST request/response types
        crate::rest::IngestRequest,
        crate::rest::IngestResponse,
        crate::rest::CompareResponse,
        crate::rest::ErrorResponse,
        crate::rest::HealthResponse,
    ))
)]
pub struct ApiDoc;
