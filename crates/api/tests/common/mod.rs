//! Shared helpers for API integration tests.
//!
//! Builds the full application router with the production middleware
//! stack, backed by stub collaborators: a filesystem media store rooted
//! in a per-test temp directory, pre-computed tracking output, and an
//! instant narrator.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use matchlens_api::config::ServerConfig;
use matchlens_api::router::build_app_router;
use matchlens_api::state::AppState;
use matchlens_core::config::AnalysisConfig;
use matchlens_core::track::{BallTrack, BoundingBox, PlayerTrack, Team, TrackedFrame};
use matchlens_jobs::{JobRegistry, WorkerContext};
use matchlens_narrator::StaticNarrator;
use matchlens_pipeline::assign::NearestPlayerAssigner;
use matchlens_pipeline::engine::{AnnotationWriter, JsonTrackSource};
use matchlens_pipeline::media::FsMediaStore;

/// Media-store key the fixture recording is seeded under.
pub const SOURCE_KEY: &str = "uploads/match.json";

/// Fixed narrator line, asserted on in commentary/coaching checks.
pub const NARRATOR_LINE: &str = "a composed spell of possession";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        media_root: "unused-in-tests".to_string(),
        narrator_url: "http://localhost:0".to_string(),
    }
}

/// Three-frame fixture producing a pass, a tackle, and a shot: player 1
/// (team A) starts on the ball, player 2 (team B) takes it on frame 1,
/// and the ball flies on frame 2.
fn fixture_frames() -> Vec<TrackedFrame> {
    let player = |x: f64, team: Team| PlayerTrack {
        bbox: BoundingBox::new(x, 0.0, x + 10.0, 20.0),
        speed: 0.0,
        team,
    };
    (0..3)
        .map(|i| {
            let mut players = BTreeMap::new();
            players.insert(1, player(0.0, Team::A));
            players.insert(2, player(300.0, Team::B));
            let (ball_x, speed) = match i {
                0 => (3.0, 0.0),
                1 => (303.0, 0.0),
                _ => (303.0, 9.0),
            };
            TrackedFrame {
                frame_index: i,
                players,
                ball: BallTrack {
                    bbox: BoundingBox::new(ball_x, 18.0, ball_x + 4.0, 22.0),
                    speed,
                },
            }
        })
        .collect()
}

/// Build app state backed by a fresh temp directory seeded with the
/// fixture recording under [`SOURCE_KEY`].
pub async fn test_state(name: &str) -> AppState {
    let root = std::env::temp_dir().join(format!("matchlens-api-test-{name}"));
    tokio::fs::create_dir_all(root.join("uploads")).await.unwrap();
    let frames = serde_json::to_vec(&fixture_frames()).unwrap();
    tokio::fs::write(root.join(SOURCE_KEY), frames).await.unwrap();

    let analysis = AnalysisConfig::default();
    let worker = Arc::new(WorkerContext {
        store: Arc::new(FsMediaStore::new(&root)),
        tracker: Arc::new(JsonTrackSource),
        renderer: Arc::new(AnnotationWriter),
        assigner: Arc::new(NearestPlayerAssigner::new(
            analysis.max_player_ball_distance,
        )),
        narrator: Arc::new(StaticNarrator::new(NARRATOR_LINE)),
        config: analysis,
    });

    AppState {
        registry: Arc::new(JobRegistry::new()),
        worker,
        config: Arc::new(test_config()),
    }
}

/// Build the full application router with all middleware layers.
///
/// This goes through the same [`build_app_router`] as `main.rs`, so
/// integration tests exercise the production middleware stack (CORS,
/// request ID, timeout, tracing, panic recovery).
pub fn build_test_app(state: AppState) -> Router {
    let config = test_config();
    build_app_router(state, &config)
}

/// Send a GET request to the app.
pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a POST request with a JSON body to the app.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Submit the fixture recording, asserting the 201 contract, and return
/// the new job id.
pub async fn submit_fixture(app: &Router) -> String {
    let response = post_json(
        app.clone(),
        "/api/v1/analyses",
        serde_json::json!({ "source_key": SOURCE_KEY }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "queued");
    json["data"]["job_id"].as_str().unwrap().to_string()
}

/// Poll an analysis until it reaches a terminal status, returning the
/// final response body.
pub async fn poll_until_terminal(app: &Router, job_id: &str) -> serde_json::Value {
    for _ in 0..250 {
        let response = get(app.clone(), &format!("/api/v1/analyses/{job_id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        if matches!(
            json["data"]["status"].as_str(),
            Some("done" | "error" | "cancelled")
        ) {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("analysis never reached a terminal status");
}
