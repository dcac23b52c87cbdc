// tests/common/mod.rs
// Stub parser and database services for integration tests

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use minidb_console::client::http_services;
use minidb_console::pipeline::Orchestrator;

/// A canned reply for one route
#[derive(Debug, Clone)]
pub enum Canned {
    Json(u16, Value),
    Text(u16, String),
}

impl Canned {
    pub fn ok(body: Value) -> Self {
        Self::Json(200, body)
    }

    fn respond(&self) -> Response {
        match self {
            Canned::Json(status, body) => (code(*status), Json(body.clone())).into_response(),
            Canned::Text(status, body) => (code(*status), body.clone()).into_response(),
        }
    }
}

fn code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap()
}

/// Shared stub state: replies, hit counters and the last bodies received
pub struct Stub {
    pub parser_reply: Mutex<Canned>,
    pub database_reply: Mutex<Canned>,
    pub parser_hits: AtomicUsize,
    pub database_hits: AtomicUsize,
    pub last_parser_body: Mutex<Option<Value>>,
    pub last_database_body: Mutex<Option<Value>>,
}

impl Stub {
    pub fn new(parser_reply: Canned, database_reply: Canned) -> Arc<Self> {
        Arc::new(Self {
            parser_reply: Mutex::new(parser_reply),
            database_reply: Mutex::new(database_reply),
            parser_hits: AtomicUsize::new(0),
            database_hits: AtomicUsize::new(0),
            last_parser_body: Mutex::new(None),
            last_database_body: Mutex::new(None),
        })
    }

    pub fn parser_hits(&self) -> usize {
        self.parser_hits.load(Ordering::SeqCst)
    }

    pub fn database_hits(&self) -> usize {
        self.database_hits.load(Ordering::SeqCst)
    }

    pub fn last_database_body(&self) -> Option<Value> {
        self.last_database_body.lock().unwrap().clone()
    }

    pub fn last_parser_body(&self) -> Option<Value> {
        self.last_parser_body.lock().unwrap().clone()
    }
}

async fn parser(State(stub): State<Arc<Stub>>, Json(body): Json<Value>) -> Response {
    stub.parser_hits.fetch_add(1, Ordering::SeqCst);
    *stub.last_parser_body.lock().unwrap() = Some(body);
    let reply = stub.parser_reply.lock().unwrap().clone();
    reply.respond()
}

async fn database(State(stub): State<Arc<Stub>>, Json(body): Json<Value>) -> Response {
    stub.database_hits.fetch_add(1, Ordering::SeqCst);
    *stub.last_database_body.lock().unwrap() = Some(body);
    let reply = stub.database_reply.lock().unwrap().clone();
    reply.respond()
}

/// Serve the stub on an ephemeral port, returning its base URL
pub async fn serve(stub: Arc<Stub>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new()
        .route("/parser", post(parser))
        .route("/database", post(database))
        .with_state(stub);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// A base URL nothing is listening on
pub async fn dead_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Orchestrator wired to real HTTP clients against `base_url`
pub fn orchestrator(base_url: &str, selector: &str) -> Orchestrator {
    let (parser, executor) = http_services(base_url, Duration::from_secs(5)).unwrap();
    Orchestrator::new(Arc::new(parser), Arc::new(executor)).with_selector(selector)
}
