//! Integration tests for kiosk-player API endpoints
//!
//! Each test builds the full router over a temp directory holding the resume
//! file, a small catalog and a static web UI directory.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use kiosk_common::{Catalog, ResumeStore};
use kiosk_player::playback::{LoadedItem, PlaybackEngine};
use kiosk_player::{build_router, AppState, PlayerControl};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

const CATALOG: &str = r#"{
  "categories": [
    {
      "id": "stories",
      "title": "Stories",
      "items": [
        {
          "id": "benjamin",
          "display_name": "Benjamin the Elephant",
          "type": "artist",
          "resume": true,
          "sources": [
            { "type": "local", "priority": 1, "path": "/media/benjamin", "cover_path": "/covers/benjamin.png" }
          ]
        },
        {
          "id": "bedtime",
          "display_name": "Bedtime Songs",
          "type": "playlist",
          "sources": [
            { "type": "spotify", "priority": 1, "playlistUrl": "https://example.com/p/1", "cover_path": "/covers/missing.png" }
          ]
        }
      ]
    }
  ]
}"#;

struct TestApp {
    _dir: TempDir,
    state: AppState,
}

impl TestApp {
    fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }
}

/// Test helper: Create app over fresh files
fn setup_app() -> TestApp {
    let dir = TempDir::new().unwrap();

    let static_dir = dir.path().join("static");
    std::fs::create_dir_all(static_dir.join("covers")).unwrap();
    std::fs::write(static_dir.join("index.html"), "<html>kiosk</html>").unwrap();
    std::fs::write(static_dir.join("covers/benjamin.png"), b"png").unwrap();

    let catalog_path = dir.path().join("catalog.json");
    std::fs::write(&catalog_path, CATALOG).unwrap();

    let store = ResumeStore::open(dir.path().join("data/state.json")).unwrap();
    let catalog = Catalog::load(&catalog_path).unwrap();
    let engine = Arc::new(PlaybackEngine::new(LoadedItem::demo(), 40));

    let state = AppState::new(
        PlayerControl::new(engine),
        Arc::new(store),
        Arc::new(catalog),
        static_dir,
        "kids".to_string(),
    );

    TestApp { _dir: dir, state }
}

/// Test helper: Create request without body
fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Create request with JSON body
fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router().oneshot(request).await.unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

// =============================================================================
// Health and device status
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app();

    let (status, body) = send(&app, test_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "kiosk-player");
    assert!(body["version"].is_string());
    assert!(!body["git_hash"].as_str().unwrap().is_empty());
    assert!(chrono::DateTime::parse_from_rfc3339(body["build_timestamp"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_device_status_reports_engine_volume() {
    let app = setup_app();
    app.state.control.apply(kiosk_player::Command::SetVolume(65));

    let (status, body) = send(&app, test_request("GET", "/api/status")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "kids");
    assert_eq!(body["volume"], 65);
    assert_eq!(body["muted"], false);
    assert_eq!(body["time"].as_str().unwrap().len(), 5);
    assert!(body["battery"]["percent"].is_number());
    assert!(body["wifi"]["connected"].is_boolean());
}

// =============================================================================
// Player
// =============================================================================

#[tokio::test]
async fn test_player_status_initial() {
    let app = setup_app();

    let (status, body) = send(&app, test_request("GET", "/api/player/status")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "paused");
    assert_eq!(body["mode"], "audiobook_chapters");
    assert_eq!(body["track"], 1);
    assert_eq!(body["track_count"], 20);
    assert_eq!(body["duration"], 300);
    assert_eq!(body["volume"], 40);
}

#[tokio::test]
async fn test_commands_acknowledge_and_apply() {
    let app = setup_app();

    for uri in [
        "/api/player/play",
        "/api/player/track?nr=3",
        "/api/player/seek?position=100",
        "/api/player/skip?seconds=-30",
        "/api/player/volume?level=0",
        "/api/player/mute/toggle",
    ] {
        let (status, body) = send(&app, test_request("POST", uri)).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(body, json!({ "ok": true }), "{}", uri);
    }

    let (_, body) = send(&app, test_request("GET", "/api/player/status")).await;
    assert_eq!(body["state"], "playing");
    assert_eq!(body["track"], 3);
    assert_eq!(body["duration"], 320);
    assert_eq!(body["position"], 70);
    assert_eq!(body["volume"], 0);
    assert_eq!(body["muted"], true);
}

#[tokio::test]
async fn test_out_of_range_arguments_are_clamped() {
    let app = setup_app();

    send(&app, test_request("POST", "/api/player/track?nr=99")).await;
    send(&app, test_request("POST", "/api/player/seek?position=100000")).await;
    send(&app, test_request("POST", "/api/player/volume?level=250")).await;

    let status = app.state.control.status();
    assert_eq!(status.track, 20);
    assert_eq!(status.position, status.duration);
    assert_eq!(status.volume, 100);
}

#[tokio::test]
async fn test_missing_query_param_is_bad_request() {
    let app = setup_app();

    let (status, body) = send(&app, test_request("POST", "/api/player/seek")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["status"]
        .as_str()
        .unwrap()
        .contains("missing query param: position"));
}

#[tokio::test]
async fn test_invalid_int_is_bad_request() {
    let app = setup_app();

    let (status, body) = send(&app, test_request("POST", "/api/player/volume?level=loud")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["status"].as_str().unwrap().contains("invalid int for level"));
    // Engine untouched
    assert_eq!(app.state.control.status().volume, 40);
}

#[tokio::test]
async fn test_commands_reject_get() {
    let app = setup_app();

    let response = app
        .router()
        .oneshot(test_request("GET", "/api/player/play"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_load_replaces_item() {
    let app = setup_app();
    send(&app, test_request("POST", "/api/player/volume?level=55")).await;

    let request = json_request(
        "POST",
        "/api/player/load",
        json!({
            "mode": "music",
            "title": "Bedtime Songs",
            "track_durations": [120, 0, 200],
            "duration": 90,
            "start_track": 2,
            "start_position": 500
        }),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "paused");
    assert_eq!(body["mode"], "music");
    assert_eq!(body["track"], 2);
    assert_eq!(body["track_count"], 3);
    // Zero table entry falls back to the flat duration
    assert_eq!(body["duration"], 90);
    assert_eq!(body["position"], 90);
    assert_eq!(body["volume"], 55);
}

// =============================================================================
// Resume
// =============================================================================

#[tokio::test]
async fn test_resume_put_then_get() {
    let app = setup_app();

    let checkpoint = json!({
        "item_id": "benjamin",
        "track_index": 4,
        "position_sec": 125,
        "updated_at": "1999-01-01T00:00:00Z"
    });
    let (status, stored) = send(&app, json_request("PUT", "/api/resume/benjamin", checkpoint)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["position_sec"], 125);
    // Server stamps the write
    assert_ne!(stored["updated_at"], "1999-01-01T00:00:00Z");

    let (status, body) = send(&app, test_request("GET", "/api/resume/benjamin")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, stored);
}

#[tokio::test]
async fn test_resume_unknown_key_is_not_found() {
    let app = setup_app();

    let (status, body) = send(&app, test_request("GET", "/api/resume/nobody")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["status"].as_str().unwrap().starts_with("error:"));
}

#[tokio::test]
async fn test_resume_persist_failure_is_service_unavailable() {
    let app = setup_app();
    let data_dir = app.state.store.path().parent().unwrap().to_path_buf();
    std::fs::remove_dir_all(&data_dir).unwrap();

    let request = json_request(
        "PUT",
        "/api/resume/benjamin",
        json!({ "track_index": 1, "position_sec": 10 }),
    );
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(app.state.store.get("benjamin").is_none());
}

#[tokio::test]
async fn test_resume_recent_listing() {
    let app = setup_app();
    for (key, pos) in [("a", 10), ("b", 0), ("c", 30)] {
        let request = json_request(
            "PUT",
            &format!("/api/resume/{}", key),
            json!({ "track_index": 1, "position_sec": pos }),
        );
        send(&app, request).await;
    }

    let (status, body) = send(&app, test_request("GET", "/api/resume")).await;
    assert_eq!(status, StatusCode::OK);
    let keys: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["c", "a"]);

    let (_, body) = send(&app, test_request("GET", "/api/resume?limit=1")).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["key"], "c");
    assert_eq!(body[0]["state"]["position_sec"], 30);
}

#[tokio::test]
async fn test_continue_uses_catalog_title_and_cover() {
    let app = setup_app();
    let request = json_request(
        "PUT",
        "/api/resume/benjamin-ep12",
        json!({ "item_id": "benjamin", "track_index": 2, "position_sec": 75 }),
    );
    send(&app, request).await;

    let (status, body) = send(&app, test_request("GET", "/api/continue/benjamin-ep12")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "benjamin-ep12");
    assert_eq!(body["title"], "Benjamin the Elephant");
    assert_eq!(body["cover"], "/covers/benjamin.png");
    assert_eq!(body["track_index"], 2);
    assert_eq!(body["position_sec"], 75);

    let (status, _) = send(&app, test_request("GET", "/api/continue/unknown")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_resume_reads_and_writes() {
    let app = setup_app();

    let mut tasks = tokio::task::JoinSet::new();
    for i in 1..=20 {
        let router = app.router();
        tasks.spawn(async move {
            let put = json_request(
                "PUT",
                &format!("/api/resume/ep-{}", i),
                json!({ "track_index": 1, "position_sec": i }),
            );
            let response = router.clone().oneshot(put).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let own = format!("/api/resume/ep-{}", i);
            for uri in ["/api/resume", "/api/home", own.as_str()] {
                let response = router.clone().oneshot(test_request("GET", uri)).await.unwrap();
                assert_eq!(response.status(), StatusCode::OK, "{}", uri);
            }
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap();
    }

    let (_, body) = send(&app, test_request("GET", "/api/resume")).await;
    assert_eq!(body.as_array().unwrap().len(), 20);
    // Last write first
    let newest = body[0]["state"]["updated_at"].as_str().unwrap();
    let oldest = body[19]["state"]["updated_at"].as_str().unwrap();
    assert!(newest > oldest);
}

// =============================================================================
// Home, collection and artist views
// =============================================================================

#[tokio::test]
async fn test_home_without_checkpoints_lists_categories() {
    let app = setup_app();

    let (status, body) = send(&app, test_request("GET", "/api/home")).await;

    assert_eq!(status, StatusCode::OK);
    let sections = body["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0]["title"], "Stories");

    let items = sections[0]["items"].as_array().unwrap();
    assert_eq!(items[0]["id"], "benjamin");
    assert_eq!(items[0]["type"], "artist");
    assert_eq!(items[0]["image"], "/covers/benjamin.png");
    assert_eq!(items[0]["can_resume"], true);
    assert!(items[0].get("resume_pos_sec").is_none());
    // Cover file absent on disk
    assert_eq!(items[1]["image"], "/covers/placeholder.png");
}

#[tokio::test]
async fn test_home_continue_row_first() {
    let app = setup_app();
    let request = json_request(
        "PUT",
        "/api/resume/benjamin",
        json!({ "item_id": "benjamin", "track_index": 1, "position_sec": 42 }),
    );
    send(&app, request).await;

    let (_, body) = send(&app, test_request("GET", "/api/home")).await;

    let sections = body["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0]["title"], "Continue listening");
    assert_eq!(sections[0]["items"][0]["title"], "Benjamin the Elephant");
    assert_eq!(sections[0]["items"][0]["type"], "continue");
    assert_eq!(sections[0]["items"][0]["resume_pos_sec"], 42);

    let benjamin = &sections[1]["items"][0];
    assert_eq!(benjamin["resume_pos_sec"], 42);
    assert_eq!(benjamin["resume_label"], "Continue");
}

#[tokio::test]
async fn test_collections_list_catalog_categories() {
    let app = setup_app();

    let (status, body) = send(&app, test_request("GET", "/api/collections")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{ "id": "stories", "title": "Stories", "item_count": 2 }])
    );

    let response = app
        .router()
        .oneshot(test_request("POST", "/api/collections"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_artist_details() {
    let app = setup_app();

    let (status, body) = send(&app, test_request("GET", "/api/artist/benjamin")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Benjamin the Elephant");
    assert_eq!(body["albums"].as_array().unwrap().len(), 2);
    assert_eq!(body["albums"][0]["id"], "benjamin_1");

    // Known item, but not an artist
    let (status, _) = send(&app, test_request("GET", "/api/artist/bedtime")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Static web UI
// =============================================================================

#[tokio::test]
async fn test_static_fallback_serves_web_ui() {
    let app = setup_app();

    let response = app
        .router()
        .oneshot(test_request("GET", "/index.html"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"<html>kiosk</html>");

    let response = app
        .router()
        .oneshot(test_request("GET", "/nope.js"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
