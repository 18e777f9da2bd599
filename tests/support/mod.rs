//! Shared fixtures for the integration suites: a scripted mock AI
//! inference service served over a real TCP port, plus frame builders.
#![allow(dead_code)]

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use common::{PixelFormat, RawVideoFrame};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

static LOGGING: Once = Once::new();

/// Install the logging stack the way an embedding host would at plugin
/// load. Shared by every integration test in the binary.
pub fn init_test_logging() {
    LOGGING.call_once(|| {
        telemetry::init_structured_logging(
            telemetry::LogConfig::new("vigil-analytics-tests")
                .with_format(telemetry::LogFormat::Compact),
        );
    });
}

/// One scripted reply from the mock inference service.
#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with the given JSON body.
    Json(serde_json::Value),
    /// A bare status code with an empty body.
    Status(u16),
}

#[derive(Clone)]
struct MockState {
    hits: Arc<AtomicUsize>,
    script: Arc<Mutex<VecDeque<Reply>>>,
}

/// Mock AI service. Serves the scripted replies in order and repeats the
/// last one once the script runs dry; counts every request it sees.
pub struct MockAiService {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    // Dropped with the service, tearing the server down.
    _runtime: tokio::runtime::Runtime,
}

impl MockAiService {
    pub fn start(replies: Vec<Reply>) -> Self {
        assert!(!replies.is_empty(), "mock service needs at least one reply");
        init_test_logging();

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("mock runtime");

        let hits = Arc::new(AtomicUsize::new(0));
        let state = MockState {
            hits: Arc::clone(&hits),
            script: Arc::new(Mutex::new(replies.into())),
        };

        let listener = runtime
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .expect("bind mock service");
        let addr = listener.local_addr().expect("mock service addr");

        let app = Router::new().route("/infer", post(infer)).with_state(state);
        runtime.spawn(async move {
            axum::serve(listener, app).await.expect("mock service");
        });

        Self {
            base_url: format!("http://{}", addr),
            hits,
            _runtime: runtime,
        }
    }

    /// Total number of requests the service has received.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn infer(State(state): State<MockState>, Json(request): Json<serde_json::Value>) -> Response {
    assert!(request.get("camera_id").is_some(), "missing camera_id");
    assert!(request.get("image").is_some(), "missing image");

    state.hits.fetch_add(1, Ordering::SeqCst);

    let reply = {
        let mut script = state.script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap()
        }
    };

    match reply {
        Reply::Json(body) => Json(body).into_response(),
        Reply::Status(code) => StatusCode::from_u16(code).unwrap().into_response(),
    }
}

/// A wire detection element as the service would return it.
pub fn service_detection(
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    track_id: Option<i64>,
    fall_detected: bool,
) -> serde_json::Value {
    let mut value = serde_json::json!({
        "x": x,
        "y": y,
        "w": w,
        "h": h,
        "cls": "person",
        "score": 0.9,
        "fall_detected": fall_detected,
    });
    if let Some(id) = track_id {
        value["track_id"] = serde_json::json!(id);
    }
    value
}

/// A solid BGR24 test frame.
pub fn bgr_frame(timestamp_us: i64, width: i32, height: i32) -> RawVideoFrame {
    RawVideoFrame::packed(
        timestamp_us,
        width,
        height,
        PixelFormat::Bgr24,
        vec![60; (width * height * 3) as usize],
    )
}
