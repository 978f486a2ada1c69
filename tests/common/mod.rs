//! In-process fake of the WW historian for integration tests.
//!
//! Runs a small `axum` server on a random port of 127.0.0.1, driven by its
//! own `tokio` runtime on a background thread so the blocking client can be
//! tested from plain `#[test]` functions. Every GET is answered with the
//! response registered for its path (404 otherwise) and its target is
//! recorded, so tests can inspect the query strings the client sent.

#![allow(dead_code)]

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

#[derive(Clone)]
struct Canned {
    status: StatusCode,
    body: String,
    delay: Option<Duration>,
}

#[derive(Default)]
struct HistorianState {
    routes: HashMap<String, Canned>,
    requests: Vec<String>,
}

type SharedState = Arc<Mutex<HistorianState>>;

/// Handle to the running fake historian. Dropping it stops the server.
pub struct FakeHistorian {
    addr: SocketAddr,
    state: SharedState,
    shutdown: Option<oneshot::Sender<()>>,
}

impl FakeHistorian {
    /// Starts the server and returns once it is listening.
    pub fn start() -> Self {
        let state = SharedState::default();
        let (addr_tx, addr_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let shared = state.clone();
        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("build fake historian runtime");

            runtime.block_on(async move {
                let listener = TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind fake historian");
                addr_tx
                    .send(listener.local_addr().expect("local addr"))
                    .expect("report fake historian address");

                let app = Router::new().fallback(answer).with_state(shared);
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .expect("serve fake historian");
            });
        });

        let addr = addr_rx.recv().expect("fake historian did not start");
        Self {
            addr,
            state,
            shutdown: Some(shutdown_tx),
        }
    }

    /// Base URL to configure the client with, e.g. `http://127.0.0.1:PORT/ww/`.
    pub fn base_url(&self) -> String {
        format!("http://{}/ww/", self.addr)
    }

    pub fn respond(&self, path: &str, status: u16, body: &str) {
        self.register(path, status, body, None);
    }

    pub fn respond_after(&self, path: &str, delay: Duration, body: &str) {
        self.register(path, 200, body, Some(delay));
    }

    fn register(&self, path: &str, status: u16, body: &str, delay: Option<Duration>) {
        let canned = Canned {
            status: StatusCode::from_u16(status).expect("valid status code"),
            body: body.to_string(),
            delay,
        };
        self.state.lock().routes.insert(path.to_string(), canned);
    }

    /// Request targets (path and query) in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().requests.clone()
    }
}

impl Drop for FakeHistorian {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

async fn answer(State(state): State<SharedState>, uri: Uri) -> Response {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    let canned = {
        let mut state = state.lock();
        state.requests.push(target);
        state.routes.get(uri.path()).cloned()
    };

    let Some(canned) = canned else {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    };

    if let Some(delay) = canned.delay {
        tokio::time::sleep(delay).await;
    }
    (canned.status, canned.body).into_response()
}

/// An address nothing listens on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}/ww/", addr)
}
