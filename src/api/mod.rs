// HTTP API routes: event data, behavior buckets, path overlays, scouting capture.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{Json, Path, Query, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::classify::{classify, BehaviorBuckets};
use crate::error::ScoutError;
use crate::field::{median, PlatformCode};
use crate::geometry::{self, overlay_path};
use crate::metrics;
use crate::model::{AllianceColor, Event, Point, RobotMatchEntry, ViewType};
use crate::scout::{BoundingRect, PathCapture};
use crate::source::DataSource;
use crate::store::EventStore;

// ── Request types ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ViewParams {
    pub view: Option<ViewType>,
    pub number: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct BehaviorParams {
    pub team: Option<u32>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PointerEvent {
    Down,
    Move { client_x: f64, client_y: f64 },
    Up,
}

#[derive(Debug, Deserialize)]
pub struct CapturePathRequest {
    #[serde(default)]
    pub origin: BoundingRect,
    pub events: Vec<PointerEvent>,
}

// ── Response types ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct EventSummary<'a> {
    pub slug: &'a str,
    pub entry_count: usize,
    pub match_count: usize,
    pub teams: Vec<u32>,
    pub match_numbers: Vec<u32>,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PathOverlay {
    pub match_number: u32,
    pub team_number: u32,
    pub alliance: AllianceColor,
    pub platform_code: Option<PlatformCode>,
    pub d: String,
}

#[derive(Debug, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct TeamSummary {
    pub team_number: u32,
    pub matches_scouted: usize,
    pub median_auto_scale_cubes: Option<f64>,
    pub median_auto_switch_cubes: Option<f64>,
    pub median_scale_cubes_teleop: Option<f64>,
    pub median_own_switch_cubes_teleop: Option<f64>,
    pub median_exchange_cubes: Option<f64>,
    pub climbs: usize,
    pub assisted_climbs: usize,
    pub defense_matches: usize,
    pub auto_behaviors: Vec<LabelCount>,
    pub teleop_behaviors: Vec<LabelCount>,
}

#[derive(Debug, Serialize)]
pub struct CapturePathResponse {
    pub path: Vec<Point>,
    pub d: Option<String>,
}

// ── Shared application state ─────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EventStore<DataSource>>,
    pub asset_prefix: String,
}

// ── Error helper ──────────────────────────────────────────────────────

fn json_error(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "error": msg }))).into_response()
}

fn scout_error(slug: &str, e: &ScoutError) -> Response {
    match e {
        ScoutError::NotFound { .. } => json_error(StatusCode::NOT_FOUND, "Event not found"),
        ScoutError::InvalidSlug(_) => json_error(StatusCode::BAD_REQUEST, "Invalid event slug"),
        e if e.is_upstream() => {
            tracing::error!(slug, "Event source error: {e}");
            json_error(StatusCode::BAD_GATEWAY, "Failed to fetch event data")
        }
        e => {
            tracing::warn!(slug, "Event data rejected: {e}");
            json_error(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string())
        }
    }
}

async fn load(state: &AppState, slug: &str) -> Result<Arc<Event>, Response> {
    state
        .store
        .load_event(slug)
        .await
        .map_err(|e| scout_error(slug, &e))
}

fn select<'a>(event: &'a Event, params: &ViewParams) -> Result<Vec<&'a RobotMatchEntry>, Response> {
    match (params.view, params.number) {
        (Some(view), Some(number)) => Ok(event.entries_by(view, number)),
        (None, None) => Ok(event.robot_entries.iter().collect()),
        _ => Err(json_error(
            StatusCode::BAD_REQUEST,
            "view and number must be given together",
        )),
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn router(store: Arc<EventStore<DataSource>>, asset_prefix: String) -> Router {
    let state = AppState {
        store,
        asset_prefix,
    };

    Router::new()
        .route("/api/config", get(get_config))
        // Events
        .route("/api/events", get(list_events))
        .route("/api/events/{slug}", get(get_event))
        .route("/api/events/{slug}/entries", get(list_entries))
        .route("/api/events/{slug}/behaviors", get(get_behaviors))
        .route("/api/events/{slug}/paths", get(get_paths))
        .route("/api/events/{slug}/teams/{team}", get(get_team))
        .route("/api/events/{slug}/matches/{key}", get(get_match))
        // Scouting input
        .route("/api/scout/path", post(capture_path))
        .route("/metrics", get(get_metrics))
        .with_state(state)
        .layer(axum::middleware::from_fn(track_requests))
}

/// Record request counts and latency per normalized endpoint.
pub async fn track_requests(req: Request<Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let endpoint = metrics::normalize_path(req.uri().path());
    let start = Instant::now();

    let resp = next.run(req).await;

    metrics::API_REQUEST_DURATION_SECONDS
        .with_label_values(&[endpoint.as_str()])
        .observe(start.elapsed().as_secs_f64());
    metrics::API_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), endpoint.as_str(), resp.status().as_str()])
        .inc();
    resp
}

// ── Config handler ────────────────────────────────────────────────────

async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "asset_prefix": state.asset_prefix,
        "field": {
            "width": geometry::FIELD_WIDTH,
            "height": geometry::FIELD_HEIGHT,
            "capture_height": geometry::CAPTURE_HEIGHT,
        },
    }))
}

// ── Event handlers ────────────────────────────────────────────────────

async fn list_events(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "loaded": state.store.loaded_slugs() }))
}

async fn get_event(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let event = match load(&state, &slug).await {
        Ok(event) => event,
        Err(resp) => return resp,
    };
    let summary = EventSummary {
        slug: &event.slug,
        entry_count: event.robot_entries.len(),
        match_count: event.matches.len(),
        teams: event.teams(),
        match_numbers: event.match_numbers(),
        loaded_at: event.loaded_at,
    };
    (StatusCode::OK, Json(summary)).into_response()
}

async fn list_entries(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<ViewParams>,
) -> Response {
    let event = match load(&state, &slug).await {
        Ok(event) => event,
        Err(resp) => return resp,
    };
    match select(&event, &params) {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(resp) => resp,
    }
}

async fn get_behaviors(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<BehaviorParams>,
) -> Response {
    let event = match load(&state, &slug).await {
        Ok(event) => event,
        Err(resp) => return resp,
    };
    let entries: Vec<&RobotMatchEntry> = match params.team {
        Some(team) => event.entries_by(ViewType::Team, team),
        None => event.robot_entries.iter().collect(),
    };
    let behaviors = classify(entries.iter().copied());
    record_classified(entries.len());
    (StatusCode::OK, Json(behaviors)).into_response()
}

async fn get_paths(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<ViewParams>,
) -> Response {
    let event = match load(&state, &slug).await {
        Ok(event) => event,
        Err(resp) => return resp,
    };
    let entries = match select(&event, &params) {
        Ok(entries) => entries,
        Err(resp) => return resp,
    };

    let overlays: Vec<PathOverlay> = entries
        .into_iter()
        .filter_map(|entry| {
            let result = event.match_result_for(entry);
            // Without an official result the team's side is unknown; draw it as blue.
            let alliance = result
                .map(|m| m.alliance_of(entry.team_number))
                .unwrap_or(AllianceColor::Blue);
            let platform_code = result
                .and_then(|m| m.platform_code())
                .and_then(|code| code.parse::<PlatformCode>().ok());
            let d = overlay_path(&entry.autonomous_path, alliance)?;
            Some(PathOverlay {
                match_number: entry.match_number,
                team_number: entry.team_number,
                alliance,
                platform_code,
                d,
            })
        })
        .collect();

    (StatusCode::OK, Json(overlays)).into_response()
}

async fn get_team(
    State(state): State<AppState>,
    Path((slug, team)): Path<(String, u32)>,
) -> Response {
    let event = match load(&state, &slug).await {
        Ok(event) => event,
        Err(resp) => return resp,
    };
    let entries = event.entries_by(ViewType::Team, team);
    if entries.is_empty() {
        return json_error(StatusCode::NOT_FOUND, "Team not found");
    }
    (StatusCode::OK, Json(team_summary(team, &entries))).into_response()
}

async fn get_match(
    State(state): State<AppState>,
    Path((slug, key)): Path<(String, String)>,
) -> Response {
    let event = match load(&state, &slug).await {
        Ok(event) => event,
        Err(resp) => return resp,
    };
    match event.matches.get(&key) {
        Some(m) => (StatusCode::OK, Json(m)).into_response(),
        None => json_error(StatusCode::NOT_FOUND, "Match not found"),
    }
}

// ── Scouting handlers ─────────────────────────────────────────────────

async fn capture_path(Json(req): Json<CapturePathRequest>) -> impl IntoResponse {
    let mut capture = PathCapture::new(req.origin);
    for event in req.events {
        match event {
            PointerEvent::Down => capture.pointer_down(),
            PointerEvent::Move { client_x, client_y } => capture.pointer_move(client_x, client_y),
            PointerEvent::Up => capture.pointer_up(),
        }
    }
    let d = capture.preview();
    Json(CapturePathResponse {
        path: capture.into_path(),
        d,
    })
}

async fn get_metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        metrics::gather_metrics(),
    )
}

// ── Helpers ───────────────────────────────────────────────────────────

fn record_classified(count: usize) {
    for phase in ["auto", "teleop"] {
        metrics::ENTRIES_CLASSIFIED_TOTAL
            .with_label_values(&[phase])
            .inc_by(count as u64);
    }
}

fn label_counts(buckets: &BehaviorBuckets<'_>) -> Vec<LabelCount> {
    buckets
        .iter()
        .map(|b| LabelCount {
            label: b.label.clone(),
            count: b.entries.len(),
        })
        .collect()
}

fn median_of(entries: &[&RobotMatchEntry], field: impl Fn(&RobotMatchEntry) -> u32) -> Option<f64> {
    let values: Vec<f64> = entries.iter().map(|&e| field(e) as f64).collect();
    median(&values)
}

pub fn team_summary(team_number: u32, entries: &[&RobotMatchEntry]) -> TeamSummary {
    let behaviors = classify(entries.iter().copied());
    record_classified(entries.len());

    TeamSummary {
        team_number,
        matches_scouted: entries.len(),
        median_auto_scale_cubes: median_of(entries, |e| e.auto_scale_cubes),
        median_auto_switch_cubes: median_of(entries, |e| e.auto_switch_cubes),
        median_scale_cubes_teleop: median_of(entries, |e| e.scale_cubes_teleop),
        median_own_switch_cubes_teleop: median_of(entries, |e| e.own_switch_cubes_teleop),
        median_exchange_cubes: median_of(entries, |e| e.exchange_cubes),
        climbs: entries
            .iter()
            .filter(|e| e.single_climb || e.climb_with_one_buddy || e.climb_with_two_buddies)
            .count(),
        assisted_climbs: entries
            .iter()
            .filter(|e| e.climb_with_one_buddy || e.climb_with_two_buddies)
            .count(),
        defense_matches: entries.iter().filter(|e| e.played_defense).count(),
        auto_behaviors: label_counts(&behaviors.auto_behaviors),
        teleop_behaviors: label_counts(&behaviors.teleop_behaviors),
    }
}
