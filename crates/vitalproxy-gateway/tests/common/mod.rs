//! Shared harness: stub upstreams and a live gateway on ephemeral ports.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use vitalproxy_gateway::{app_state::AppState, config::GatewayConfig, server};

pub fn sample_patient() -> Value {
    json!({
        "age": 65,
        "sex": "Male",
        "bmi": 28.5,
        "systolic_bp": 140,
        "diastolic_bp": 90,
        "glucose": 110.0,
        "cholesterol": 200.0,
        "creatinine": 1.2,
        "diabetes": 1,
        "hypertension": 1,
        "diagnosis": "Heart Failure",
        "readmission_30d": 0
    })
}

/// Canned upstream (scorer or alert API) that records what it received.
#[derive(Clone)]
pub struct Stub {
    pub addr: SocketAddr,
    state: StubState,
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: &'static str,
    delay: Duration,
    hits: Arc<AtomicUsize>,
    bodies: Arc<Mutex<Vec<String>>>,
    auth: Arc<Mutex<Vec<Option<String>>>>,
}

impl Stub {
    pub fn url(&self) -> String {
        format!("http://{}/score", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn last_body(&self) -> Value {
        let bodies = self.state.bodies.lock().unwrap();
        serde_json::from_str(bodies.last().expect("stub never called")).unwrap()
    }

    pub fn last_auth(&self) -> Option<String> {
        self.state.auth.lock().unwrap().last().cloned().flatten()
    }
}

async fn stub_handler(State(s): State<StubState>, headers: HeaderMap, body: String) -> Response {
    s.hits.fetch_add(1, Ordering::SeqCst);
    s.bodies.lock().unwrap().push(body);
    s.auth.lock().unwrap().push(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    );
    if !s.delay.is_zero() {
        tokio::time::sleep(s.delay).await;
    }
    (s.status, [(header::CONTENT_TYPE, "application/json")], s.body).into_response()
}

pub async fn spawn_stub(status: StatusCode, body: &'static str) -> Stub {
    spawn_slow_stub(status, body, Duration::ZERO).await
}

pub async fn spawn_slow_stub(status: StatusCode, body: &'static str, delay: Duration) -> Stub {
    let state = StubState {
        status,
        body,
        delay,
        hits: Arc::new(AtomicUsize::new(0)),
        bodies: Arc::new(Mutex::new(Vec::new())),
        auth: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/score", post(stub_handler))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Stub { addr, state }
}

/// URL on a port nothing listens on.
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/score")
}

pub struct Gateway {
    pub base: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl Gateway {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn predict(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url("/predict"))
            .json(body)
            .send()
            .await
            .unwrap()
    }

    pub async fn metrics(&self) -> Vec<Value> {
        self.client
            .get(self.url("/metrics"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

/// Config pointing at `scorer_url`, memory fallback on, no alerts.
pub fn config_for(scorer_url: Option<String>) -> GatewayConfig {
    let mut cfg = GatewayConfig::default();
    cfg.server.listen = "127.0.0.1:0".into();
    cfg.scorer.url = scorer_url;
    cfg.scorer.token = Some("test-token".into());
    cfg
}

pub async fn spawn_gateway(cfg: GatewayConfig) -> Gateway {
    let state = AppState::new(cfg).await.expect("state builds");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let serve_state = state.clone();
    tokio::spawn(async move {
        server::serve(listener, serve_state, std::future::pending())
            .await
            .unwrap();
    });

    Gateway {
        base: format!("http://{addr}"),
        state,
        client: reqwest::Client::new(),
    }
}
