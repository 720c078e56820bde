//! Bizdesk API - HTTP JSON backend for a small business.
//!
//! Manages customers, employees, inventory, and purchases, plus the login
//! accounts that may call the API.
//!
//! # Architecture
//!
//! - Axum web framework, JSON in and out with camelCase field names
//! - Services own validation and multi-step writes
//! - A [`db::Store`] handle is injected through [`state::AppState`]; the
//!   binary uses `PostgreSQL`, tests use the in-memory store
//!
//! Recording a purchase decrements stock inside one transaction: either the
//! purchase row exists and the quantity went down, or nothing changed.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
