//! Inventory domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bizdesk_core::InventoryItemId;

/// A stocked item.
///
/// `quantity` is never negative; only purchase commits lower it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub name: String,
    pub unit_cost: Decimal,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inventory fields as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDraft {
    pub name: Option<String>,
    pub unit_cost: Option<Decimal>,
    pub quantity: Option<i64>,
}

/// A validated inventory item ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInventoryItem {
    pub name: String,
    pub unit_cost: Decimal,
    pub quantity: i32,
}
