//! Purchase and invoice domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bizdesk_core::{CustomerId, InventoryItemId, PurchaseId};

use super::customer::{CustomerDetails, NewCustomer};

/// A committed purchase. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: PurchaseId,
    pub customer_id: CustomerId,
    pub inventory_id: InventoryItemId,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// A purchase as submitted by a client.
///
/// Exactly one of `customer_id` and `customer` must be set; that rule is
/// enforced when the draft is validated into a [`ValidatedPurchase`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDraft {
    pub customer_id: Option<CustomerId>,
    pub customer: Option<CustomerDetails>,
    pub inventory_id: Option<InventoryItemId>,
    pub quantity: Option<i64>,
}

/// Who a purchase is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerRef {
    /// A customer that must already exist.
    Existing(CustomerId),
    /// Details to resolve through find-or-create.
    Details(NewCustomer),
}

/// A purchase that passed input validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPurchase {
    pub customer: CustomerRef,
    pub inventory_id: InventoryItemId,
    pub quantity: i32,
}

/// The row written once stock has been reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewPurchase {
    pub customer_id: CustomerId,
    pub inventory_id: InventoryItemId,
    pub quantity: i32,
}

/// Totals for a single purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub purchase_id: PurchaseId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub issued_at: DateTime<Utc>,
    pub lines: Vec<InvoiceLine>,
    pub total: Decimal,
}

/// One billed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub description: String,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub total: Decimal,
}

impl InvoiceLine {
    /// Build a line, computing `quantity × unit_cost`.
    ///
    /// Returns `None` if the total overflows `Decimal`.
    #[must_use]
    pub fn new(description: String, quantity: i32, unit_cost: Decimal) -> Option<Self> {
        let total = unit_cost.checked_mul(Decimal::from(quantity))?;
        Some(Self {
            description,
            quantity,
            unit_cost,
            total,
        })
    }
}
