//! Domain error taxonomy shared by the business services.

use thiserror::Error;

use bizdesk_core::InventoryItemId;

use crate::db::RepositoryError;

/// Errors raised by the customer, inventory, purchase and employee services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input failed validation. The message is safe to show to the caller.
    #[error("{0}")]
    Validation(String),

    /// The record would duplicate an existing one.
    #[error("{0}")]
    Conflict(String),

    /// A referenced record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Not enough stock to satisfy a purchase.
    #[error(
        "insufficient stock for inventory item {inventory_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        inventory_id: InventoryItemId,
        requested: i32,
        available: i32,
    },

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Whether the failed unit of work may succeed if run again from scratch.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Repository(e) if e.is_transient())
    }
}
