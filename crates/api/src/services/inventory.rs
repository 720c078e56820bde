//! Inventory ledger.


use bizdesk_core::InventoryItemId;

use super::{ServiceError, rollback_quietly, validate_money};
use crate::db::{Store, StoreTx};
use crate::models::{InventoryDraft, InventoryItem, NewInventoryItem, non_blank};

/// Inventory ledger service.
pub struct InventoryLedger<'a> {
    store: &'a dyn Store,
}

impl<'a> InventoryLedger<'a> {
    /// Create a new inventory ledger over `store`.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Validate a submitted item.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if the name is missing, if
    /// `unitCost` or `quantity` is null or negative, or if `unitCost` does
    /// not fit whole cents below 10^10.
    pub fn validate(draft: InventoryDraft) -> Result<NewInventoryItem, ServiceError> {
        let (Some(name), Some(unit_cost), Some(quantity)) =
            (non_blank(draft.name), draft.unit_cost, draft.quantity)
        else {
            return Err(ServiceError::validation(
                "name, unitCost, and quantity are required",
            ));
        };

        let unit_cost = validate_money("unitCost", unit_cost)?;
        if quantity < 0 {
            return Err(ServiceError::validation("quantity cannot be negative"));
        }
        let quantity = i32::try_from(quantity)
            .map_err(|_| ServiceError::validation("quantity is too large"))?;

        Ok(NewInventoryItem {
            name,
            unit_cost,
            quantity,
        })
    }

    /// Add an item to the ledger with the quantity as given.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for invalid input.
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn create(&self, draft: InventoryDraft) -> Result<InventoryItem, ServiceError> {
        let item = Self::validate(draft)?;
        let created = self.store.insert_inventory_item(&item).await?;
        tracing::info!(
            inventory_id = %created.id,
            quantity = created.quantity,
            "inventory item created"
        );
        Ok(created)
    }

    /// Every item, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn list(&self) -> Result<Vec<InventoryItem>, ServiceError> {
        Ok(self.store.list_inventory_items().await?)
    }

    /// Get an item by ID.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the item doesn't exist.
    pub async fn get(&self, id: InventoryItemId) -> Result<InventoryItem, ServiceError> {
        self.store
            .get_inventory_item(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Lock the item inside `tx`, check it can cover `quantity`, and lower its
    /// stock by that amount. The new level becomes visible when `tx` commits.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the item doesn't exist.
    /// Returns `ServiceError::InsufficientStock` if fewer than `quantity`
    /// units are on hand.
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn reserve_and_decrement_in(
        tx: &mut dyn StoreTx,
        id: InventoryItemId,
        quantity: i32,
    ) -> Result<InventoryItem, ServiceError> {
        let item = tx
            .lock_inventory_item(id)
            .await?
            .ok_or_else(|| not_found(id))?;

        if item.quantity < quantity {
            return Err(ServiceError::InsufficientStock {
                inventory_id: id,
                requested: quantity,
                available: item.quantity,
            });
        }

        let updated = tx
            .set_inventory_quantity(id, item.quantity - quantity)
            .await?;
        tracing::debug!(
            inventory_id = %id,
            before = item.quantity,
            after = updated.quantity,
            "stock decremented"
        );
        Ok(updated)
    }

    /// [`Self::reserve_and_decrement_in`] in a transaction of its own.
    ///
    /// # Errors
    ///
    /// See [`Self::reserve_and_decrement_in`].
    pub async fn reserve_and_decrement(
        &self,
        id: InventoryItemId,
        quantity: i32,
    ) -> Result<InventoryItem, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::validation("quantity must be greater than 0"));
        }

        let mut tx = self.store.begin().await?;
        match Self::reserve_and_decrement_in(tx.as_mut(), id, quantity).await {
            Ok(updated) => {
                tx.commit().await?;
                Ok(updated)
            }
            Err(e) => {
                rollback_quietly(tx).await;
                Err(e)
            }
        }
    }
}

fn not_found(id: InventoryItemId) -> ServiceError {
    ServiceError::not_found(format!("inventory item {id} not found"))
}
