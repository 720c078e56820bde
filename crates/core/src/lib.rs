//! Bizdesk Core - Shared types library.
//!
//! This crate provides the types shared by every Bizdesk component:
//! - `api` - HTTP JSON backend for customers, employees, inventory, and purchases
//! - `cli` - Command-line tools for migrations and account provisioning
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP.
//! Database encoding lives behind the optional `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, validated emails, and employee enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
