#![allow(dead_code)]
use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tower::ServiceExt;

use rollcall_backend::{
    app::build_router,
    clock::ManualClock,
    config::{Config, SinkDelivery},
    models::AttendanceRecord,
    services::{AttendanceSink, MemorySink, SinkError},
    state::AppState,
    types::TokenTtl,
};

/// Defaults with rate limiting off, since `oneshot` requests carry no peer address.
pub fn test_config() -> Config {
    let mut config = Config::from_lookup(|_| None).expect("default config");
    config.token_ttl = TokenTtl::from_secs(5).expect("ttl");
    config.rate_limit_check_in_max_requests = 0;
    config.sweep_interval_seconds = 0;
    config
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub fn new(config: Config, sink: Arc<dyn AttendanceSink>) -> Self {
        let clock = Arc::new(ManualClock::at_epoch());
        let state = AppState::from_config(config, clock.clone(), sink);
        let router = build_router(state.clone()).expect("build router");
        Self {
            router,
            state,
            clock,
        }
    }

    pub fn with_memory_sink() -> (Self, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (Self::new(test_config(), sink.clone()), sink)
    }

    pub fn with_delivery(delivery: SinkDelivery, sink: Arc<dyn AttendanceSink>) -> Self {
        let mut config = test_config();
        config.sink_delivery = delivery;
        Self::new(config, sink)
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router call")
    }
}

pub fn check_in_request(token: &str, student_id: &str) -> Request<Body> {
    let body = serde_json::json!({ "token": token, "student_id": student_id });
    Request::builder()
        .method("POST")
        .uri("/api/check-in")
        .header("content-type", "application/json")
        .header("user-agent", "integration-test")
        .header("x-forwarded-for", "203.0.113.50")
        .body(Body::from(body.to_string()))
        .expect("build check-in request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("build get request")
}

pub fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .expect("build post request")
}

pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Sink that refuses every record and counts the attempts.
#[derive(Default)]
pub struct FailingSink {
    pub attempts: AtomicUsize,
}

impl FailingSink {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AttendanceSink for FailingSink {
    async fn append(&self, _record: AttendanceRecord) -> Result<(), SinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SinkError::Unavailable("spreadsheet offline".to_string()))
    }
}
