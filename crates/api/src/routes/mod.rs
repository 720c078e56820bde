//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (store round-trip)
//!
//! # Customers
//! POST /customers               - Create customer (201)
//! GET  /customers?searchTerm=   - Search customers
//!
//! # Employees
//! POST /employees               - Create employee (200)
//! GET  /employees?searchTerm=   - Search employees
//!
//! # Inventory
//! POST /inventory               - Create item (201)
//! GET  /inventory               - List items
//!
//! # Purchases
//! POST /purchases               - Record purchase, decrementing stock (201)
//! GET  /purchases               - List purchases, newest first
//! GET  /purchases/{id}/invoice  - Invoice totals
//!
//! # Accounts
//! POST /users                   - Sign up (201)
//! POST /users/signin            - Exchange credentials for a bearer token
//! GET  /users/me                - Current account (requires bearer token)
//! ```

pub mod customers;
pub mod employees;
pub mod health;
pub mod inventory;
pub mod purchases;
pub mod users;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// `?searchTerm=` query shared by the search endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub search_term: Option<String>,
}

impl SearchQuery {
    /// The term to match; absent means match everything.
    #[must_use]
    pub fn term(&self) -> &str {
        self.search_term.as_deref().unwrap_or_default()
    }
}

/// Create the purchase routes router.
pub fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(purchases::index).post(purchases::create))
        .route("/{id}/invoice", get(purchases::invoice))
}

/// Create the account routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(users::signup))
        .route("/signin", post(users::signin))
        .route("/me", get(users::me))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(customers::index).post(customers::create))
        .route("/employees", get(employees::index).post(employees::create))
        .route("/inventory", get(inventory::index).post(inventory::create))
        .nest("/purchases", purchase_routes())
        .nest("/users", user_routes())
}

/// Build the complete application: routes, health checks, request IDs,
/// request tracing, and Sentry layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(routes())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        #[allow(clippy::cast_possible_truncation)]
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
