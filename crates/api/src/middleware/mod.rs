//! HTTP middleware and extractors.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request span with method, URI, status, latency)
//! 3. Request ID (propagate or generate `x-request-id`)

pub mod auth;
pub mod request_id;

pub use auth::RequireAccount;
pub use request_id::request_id_middleware;
