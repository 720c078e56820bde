//! Integration test harness for Bizdesk.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory store, no external services needed
//! cargo test -p bizdesk-integration-tests
//!
//! # Include the PostgreSQL tests (database must be migrated)
//! BIZDESK_TEST_DATABASE_URL=postgres://... \
//!     cargo test -p bizdesk-integration-tests -- --include-ignored
//! ```
//!
//! Each [`TestServer`] runs the production router on an ephemeral port, so
//! tests exercise routing, extraction, middleware, and error rendering
//! exactly as a client would see them.

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::sync::Arc;

use bizdesk_api::db::{MemoryStore, Store};
use bizdesk_api::routes;
use bizdesk_api::services::auth::TokenIssuer;
use bizdesk_api::state::AppState;
use reqwest::{Client, Response, StatusCode};
use secrecy::SecretString;
use serde_json::Value;

/// Signing secret used by every test server.
pub const TEST_JWT_SECRET: &str = "it-k3y_Zq8!vX2#mN5@pL7$wR9%tB4^c";

/// A running API server bound to `127.0.0.1:0`.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Spawn a server over a fresh in-memory store.
    pub async fn spawn() -> Self {
        Self::spawn_with(Arc::new(MemoryStore::new())).await
    }

    /// Spawn a server over the given store.
    pub async fn spawn_with(store: Arc<dyn Store>) -> Self {
        let tokens = TokenIssuer::new(&SecretString::from(TEST_JWT_SECRET), 600);
        let app = routes::app(AppState::new(store, tokens));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            client: Client::new(),
            handle,
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET path`.
    pub async fn get(&self, path: &str) -> Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    /// `POST path` with a JSON body.
    pub async fn post(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .unwrap()
    }

    /// `POST path`, assert the status, and return the decoded body.
    pub async fn post_expect(&self, path: &str, body: &Value, status: StatusCode) -> Value {
        let res = self.post(path, body).await;
        assert_eq!(res.status(), status, "POST {path} {body}");
        res.json().await.unwrap()
    }

    /// `GET path`, assert 200, and return the decoded body.
    pub async fn get_ok(&self, path: &str) -> Value {
        let res = self.get(path).await;
        assert_eq!(res.status(), StatusCode::OK, "GET {path}");
        res.json().await.unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// The `error` message of a JSON error body.
#[must_use]
pub fn error_message(body: &Value) -> &str {
    body["error"].as_str().unwrap_or_default()
}
