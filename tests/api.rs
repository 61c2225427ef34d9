// Integration tests for the HTTP API, backed by a temporary data directory.

use std::path::Path;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use frc_scout_backend::api;
use frc_scout_backend::source::DataSource;
use frc_scout_backend::store::EventStore;

fn raw_entry(match_number: u32, team: u32, path: &str, overrides: Value) -> Value {
    let mut record = json!({
        "Match Number": match_number.to_string(),
        "Team Number": team.to_string(),
        "Autonomous Path": path,
        "Auto Cross Line": "0",
        "Auto Switch Cubes": "0",
        "Auto Scale Cubes": "0",
        "Own Switch Cubes Teleop": "0",
        "Scale Cubes Teleop": "0",
        "Opponent Switch Cubes Teleop": "0",
        "Exchange Cubes": "0",
        "Single Climb": "0",
        "Climb + 1 Buddy": "0",
        "Climb + 2 Buddies": "0",
        "Played Defense": "0"
    });
    for (k, v) in overrides.as_object().unwrap() {
        record[k] = v.clone();
    }
    record
}

fn match_results() -> Value {
    json!([{
        "key": "2018cc_qm1",
        "comp_level": "qm",
        "set_number": 1,
        "match_number": 1,
        "alliances": {
            "red": {"score": 320, "team_keys": ["frc254", "frc971", "frc1678"]},
            "blue": {"score": 150, "team_keys": ["frc33", "frc118", "frc148"]}
        },
        "score_breakdown": {
            "red": {"tba_gameData": "LRL"},
            "blue": {"tba_gameData": "LRL"}
        },
        "winning_alliance": "red",
        "event_key": "2018cc"
    }])
}

fn write_event(dir: &Path, slug: &str, entries: Value, results: Option<Value>) {
    std::fs::create_dir_all(dir.join("event_data")).unwrap();
    std::fs::create_dir_all(dir.join("match_results")).unwrap();
    std::fs::write(
        dir.join(format!("event_data/{slug}.json")),
        entries.to_string(),
    )
    .unwrap();
    if let Some(results) = results {
        std::fs::write(
            dir.join(format!("match_results/{slug}.json")),
            results.to_string(),
        )
        .unwrap();
    }
}

fn standard_event(dir: &Path) {
    write_event(
        dir,
        "2018cc",
        json!([
            raw_entry(1, 254, "[[10,-24],[50,60]]", json!({
                "Auto Scale Cubes": "2",
                "Scale Cubes Teleop": "5",
                "Single Climb": "1"
            })),
            raw_entry(1, 33, "[]", json!({
                "Own Switch Cubes Teleop": "3",
                "Exchange Cubes": "2",
                "Played Defense": "1"
            })),
            raw_entry(2, 254, "[[0,0]]", json!({"Auto Cross Line": "1"})),
        ]),
        Some(match_results()),
    );
}

fn app(dir: &Path) -> Router {
    let store = Arc::new(EventStore::new(DataSource::Directory(dir.to_path_buf())));
    api::router(store, "/scouting".to_string())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_event_summary() {
    let dir = tempfile::tempdir().unwrap();
    standard_event(dir.path());
    let app = app(dir.path());

    let (status, body) = get_json(&app, "/api/events/2018cc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], "2018cc");
    assert_eq!(body["entry_count"], 3);
    assert_eq!(body["match_count"], 1);
    assert_eq!(body["teams"], json!([33, 254]));
    assert_eq!(body["match_numbers"], json!([1, 2]));

    let (_, body) = get_json(&app, "/api/events").await;
    assert_eq!(body["loaded"], json!(["2018cc"]));
}

#[tokio::test]
async fn test_unknown_event_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());
    let (status, body) = get_json(&app, "/api/events/2018nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Event not found");
}

#[tokio::test]
async fn test_slug_outside_data_dir_is_rejected() {
    let root = tempfile::tempdir().unwrap();
    let data = root.path().join("data");
    std::fs::create_dir_all(data.join("event_data")).unwrap();
    std::fs::write(root.path().join("secret.json"), "[]").unwrap();
    let app = app(&data);

    for uri in [
        "/api/events/..%2F..%2Fsecret",
        "/api/events/..%2F..%2Fsecret/entries",
        "/api/events/2018cc.json",
    ] {
        let (status, body) = get_json(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "Invalid event slug");
    }

    let (_, body) = get_json(&app, "/api/events").await;
    assert_eq!(body["loaded"], json!([]));
}

#[tokio::test]
async fn test_malformed_event_is_422_and_names_field() {
    let dir = tempfile::tempdir().unwrap();
    write_event(
        dir.path(),
        "2018bad",
        json!([raw_entry(1, 254, "[[1,2]]", json!({"Exchange Cubes": "lots"}))]),
        None,
    );
    let app = app(dir.path());
    let (status, body) = get_json(&app, "/api/events/2018bad").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let msg = body["error"].as_str().unwrap();
    assert!(msg.contains("Exchange Cubes"), "{msg}");
    assert!(msg.contains("record 0"), "{msg}");
}

#[tokio::test]
async fn test_event_without_results_still_loads() {
    let dir = tempfile::tempdir().unwrap();
    write_event(
        dir.path(),
        "2018early",
        json!([raw_entry(1, 254, "[]", json!({}))]),
        None,
    );
    let app = app(dir.path());
    let (status, body) = get_json(&app, "/api/events/2018early").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["match_count"], 0);
}

#[tokio::test]
async fn test_entries_filtered_by_view() {
    let dir = tempfile::tempdir().unwrap();
    standard_event(dir.path());
    let app = app(dir.path());

    let (_, body) = get_json(&app, "/api/events/2018cc/entries?view=team&number=254").await;
    let matches: Vec<u64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["match_number"].as_u64().unwrap())
        .collect();
    assert_eq!(matches, vec![1, 2]);

    let (_, body) = get_json(&app, "/api/events/2018cc/entries?view=match&number=1").await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = get_json(&app, "/api/events/2018cc/entries?view=team").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_behaviors() {
    let dir = tempfile::tempdir().unwrap();
    standard_event(dir.path());
    let app = app(dir.path());

    let (status, body) = get_json(&app, "/api/events/2018cc/behaviors").await;
    assert_eq!(status, StatusCode::OK);
    let auto = body["auto_behaviors"].as_array().unwrap();
    let labels: Vec<&str> = auto.iter().map(|b| b["label"].as_str().unwrap()).collect();
    assert_eq!(labels, vec!["2 Cube Scale Auto", "No Auto", "Only Cross Auto Line"]);

    let teleop = body["teleop_behaviors"].as_array().unwrap();
    let labels: Vec<&str> = teleop.iter().map(|b| b["label"].as_str().unwrap()).collect();
    assert_eq!(
        labels,
        vec!["Scale", "Own Switch & Exchange & Defense", "Unknown"]
    );

    let (_, body) = get_json(&app, "/api/events/2018cc/behaviors?team=33").await;
    assert_eq!(body["auto_behaviors"][0]["label"], "No Auto");
    assert_eq!(body["auto_behaviors"][0]["entries"][0]["team_number"], 33);
}

#[tokio::test]
async fn test_paths_skip_empty_and_mirror_by_alliance() {
    let dir = tempfile::tempdir().unwrap();
    standard_event(dir.path());
    let app = app(dir.path());

    let (status, body) = get_json(&app, "/api/events/2018cc/paths").await;
    assert_eq!(status, StatusCode::OK);
    let overlays = body.as_array().unwrap();
    // Team 33 recorded no path.
    assert_eq!(overlays.len(), 2);

    // 254 was red in qm1: rows mirrored across the field height.
    assert_eq!(overlays[0]["team_number"], 254);
    assert_eq!(overlays[0]["alliance"], "red");
    assert_eq!(overlays[0]["platform_code"], "LRL");
    assert_eq!(overlays[0]["d"], "M300,348L384,300");

    // No official result for qm2: drawn as blue, columns mirrored across the width.
    assert_eq!(overlays[1]["alliance"], "blue");
    assert_eq!(overlays[1]["platform_code"], Value::Null);
    assert_eq!(overlays[1]["d"], "M324,0");
}

#[tokio::test]
async fn test_team_summary_and_match_lookup() {
    let dir = tempfile::tempdir().unwrap();
    standard_event(dir.path());
    let app = app(dir.path());

    let (status, body) = get_json(&app, "/api/events/2018cc/teams/254").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matches_scouted"], 2);
    assert_eq!(body["median_auto_scale_cubes"], 1.0);
    assert_eq!(body["climbs"], 1);

    let (status, _) = get_json(&app, "/api/events/2018cc/teams/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get_json(&app, "/api/events/2018cc/matches/2018cc_qm1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["winning_alliance"], "red");
    assert_eq!(body["alliances"]["blue"]["score"], 150);

    let (status, _) = get_json(&app, "/api/events/2018cc/matches/2018cc_qm99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_config_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());
    let (_, body) = get_json(&app, "/api/config").await;
    assert_eq!(body["asset_prefix"], "/scouting");
    assert_eq!(body["field"]["width"], 648.0);
    assert_eq!(body["field"]["height"], 360.0);
    assert_eq!(body["field"]["capture_height"], 300.0);
}

#[tokio::test]
async fn test_scout_path_capture() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());

    let payload = json!({
        "origin": {"x": 100.0, "y": 50.0},
        "events": [
            {"type": "move", "client_x": 0.0, "client_y": 0.0},
            {"type": "down"},
            {"type": "move", "client_x": 150.0, "client_y": 80.0},
            {"type": "move", "client_x": 160.0, "client_y": 95.0},
            {"type": "up"},
            {"type": "move", "client_x": 500.0, "client_y": 500.0}
        ]
    });
    let resp = app
        .clone()
        .oneshot(
            Request::post("/api/scout/path")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["path"], json!([[30.0, 50.0], [45.0, 60.0]]));
    assert_eq!(body["d"], "M50,30L60,45");

    let resp = app
        .oneshot(
            Request::post("/api/scout/path")
                .header("content-type", "application/json")
                .body(Body::from(json!({"events": []}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["d"], Value::Null);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    frc_scout_backend::metrics::register_metrics();
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());
    let _ = get_json(&app, "/api/config").await;

    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("scout_api_requests_total"));
}
