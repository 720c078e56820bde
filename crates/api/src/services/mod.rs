//! Business logic services.
//!
//! # Services
//!
//! - [`customers`] - Customer directory (find-or-create by email or phone)
//! - [`inventory`] - Inventory ledger (stock levels, reservation)
//! - [`purchases`] - Purchase recorder and invoice summaries
//! - [`employees`] - Employee roster
//! - [`auth`] - Account directory (password hashing, bearer tokens)
//!
//! Services borrow the injected [`Store`](crate::db::Store) for the duration of
//! a call and hold no state of their own.

pub mod auth;
pub mod customers;
pub mod employees;
pub mod error;
pub mod inventory;
pub mod purchases;

pub use customers::CustomerDirectory;
pub use employees::EmployeeRoster;
pub use error::ServiceError;
pub use inventory::InventoryLedger;
pub use purchases::{PurchaseRecorder, PurchaseStage};

use rust_decimal::Decimal;

use crate::db::StoreTx;

/// How many times a unit of work is attempted when it loses a race.
pub const MAX_ATTEMPTS: u32 = 3;

/// Money columns are `NUMERIC(12,2)`: whole cents below 10^10.
const MONEY_SCALE: u32 = 2;
// 10_000_000_000 (= 2 * 2^32 + 0x540B_E400), built via const `from_parts`.
const MONEY_LIMIT: Decimal = Decimal::from_parts(0x540B_E400, 2, 0, false, 0);

/// Check an amount fits a money column exactly and is not negative.
///
/// Trailing zeros beyond cents are accepted (`2.500` is stored as `2.50`).
pub(crate) fn validate_money(field: &str, amount: Decimal) -> Result<Decimal, ServiceError> {
    if amount < Decimal::ZERO {
        return Err(ServiceError::validation(format!("{field} cannot be negative")));
    }
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(ServiceError::validation(format!(
            "{field} cannot have more than {MONEY_SCALE} decimal places"
        )));
    }
    if amount >= MONEY_LIMIT {
        return Err(ServiceError::validation(format!(
            "{field} must be less than {MONEY_LIMIT}"
        )));
    }
    Ok(amount.round_dp(MONEY_SCALE))
}

/// Roll back a transaction without masking the error that caused it.
pub(crate) async fn rollback_quietly(tx: Box<dyn StoreTx>) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(error = %e, "transaction rollback failed");
    }
}
