//! Routes for the analytics subsystem: event tracking, per-business
//! dashboards, and platform-wide rollups.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use portico_analytics::dashboard::MetricsBundle;
use portico_analytics::platform::PlatformBundle;
use portico_core::event::{Properties, PropertyValue, USER_AGENT_KEY};
use portico_core::timeframe::Timeframe;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::principal::AdminPrincipal;
use crate::state::AppState;

/// POST /track request body. `properties` defaults to an empty bag.
#[derive(Debug, Deserialize)]
struct TrackRequest {
    event: String,
    #[serde(default)]
    properties: Properties,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TrackResponse {
    success: bool,
    event_id: String,
}

#[derive(Debug, Deserialize)]
struct DashboardQuery {
    timeframe: Option<String>,
}

#[derive(Debug, Serialize)]
struct DashboardResponse {
    success: bool,
    metrics: MetricsBundle,
    timeframe: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlatformResponse {
    success: bool,
    platform_metrics: PlatformBundle,
}

/// POST /track
///
/// Records an analytics event. The `User-Agent` request header, when
/// present, is stamped into the property bag alongside the ingestion
/// timestamp.
async fn track_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<TrackRequest>,
) -> Result<Json<TrackResponse>, ApiError> {
    let mut properties = body.properties;
    if let Some(agent) = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
    {
        properties.insert(USER_AGENT_KEY.to_owned(), PropertyValue::from(agent));
    }

    let event = state
        .analytics
        .record(&body.event, properties, state.clock.as_ref())
        .map_err(|err| ApiError::from_domain(err, "Failed to track event"))?;

    Ok(Json(TrackResponse {
        success: true,
        event_id: event.id,
    }))
}

/// GET /dashboard/{business_id}?timeframe=7d|30d|90d
///
/// Always succeeds: an unknown business id yields a zeroed bundle and an
/// unrecognized timeframe falls back to 30 days.
async fn business_dashboard(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
    Query(query): Query<DashboardQuery>,
) -> Json<DashboardResponse> {
    let timeframe = Timeframe::parse_or_default(query.timeframe.as_deref());
    let metrics =
        state
            .analytics
            .business_dashboard(&business_id, timeframe, state.clock.as_ref());

    Json(DashboardResponse {
        success: true,
        metrics,
        timeframe: timeframe.as_str(),
    })
}

/// GET /platform — admin only.
async fn platform_metrics(
    State(state): State<AppState>,
    _principal: AdminPrincipal,
) -> Json<PlatformResponse> {
    let platform_metrics = state.analytics.platform_metrics(state.clock.as_ref());

    Json(PlatformResponse {
        success: true,
        platform_metrics,
    })
}

/// Returns the router for the analytics subsystem.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/track", post(track_event))
        .route("/dashboard/{business_id}", get(business_dashboard))
        .route("/platform", get(platform_metrics))
}
