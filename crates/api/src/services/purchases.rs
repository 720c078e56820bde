//! Purchase recorder.
//!
//! Recording a purchase walks a fixed sequence of stages:
//!
//! ```text
//! Validating -> ResolvingCustomer -> CheckingStock -> Committing -> Done
//! ```
//!
//! Any stage can fail. Everything after validation runs inside one store
//! transaction, so a failure rolls back the customer insert and the stock
//! decrement together and no purchase row is written. When the transaction
//! loses a race it is retried from `ResolvingCustomer` against fresh data.

use std::fmt;

use bizdesk_core::{CustomerId, PurchaseId};

use super::{
    CustomerDirectory, InventoryLedger, MAX_ATTEMPTS, ServiceError, rollback_quietly,
};
use crate::db::{RepositoryError, Store, StoreTx};
use crate::models::{
    CustomerRef, Invoice, InvoiceLine, NewPurchase, Purchase, PurchaseDraft, ValidatedPurchase,
};

/// Where a purchase is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseStage {
    Validating,
    ResolvingCustomer,
    CheckingStock,
    Committing,
    Done,
}

impl PurchaseStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::ResolvingCustomer => "resolving_customer",
            Self::CheckingStock => "checking_stock",
            Self::Committing => "committing",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for PurchaseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn enter(stage: &mut PurchaseStage, next: PurchaseStage) {
    tracing::debug!(from = %stage, to = %next, "purchase stage");
    *stage = next;
}

/// Purchase recorder service.
pub struct PurchaseRecorder<'a> {
    store: &'a dyn Store,
}

impl<'a> PurchaseRecorder<'a> {
    /// Create a new purchase recorder over `store`.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Check a submitted purchase before touching the store.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if `inventoryId` is missing, the
    /// quantity is not positive, or the purchase does not name exactly one of
    /// `customerId` and `customer`.
    pub fn validate(draft: PurchaseDraft) -> Result<ValidatedPurchase, ServiceError> {
        let Some(inventory_id) = draft.inventory_id else {
            return Err(ServiceError::validation("inventoryId is required"));
        };
        let quantity = match draft.quantity {
            Some(q) if q > 0 => i32::try_from(q)
                .map_err(|_| ServiceError::validation("quantity is too large"))?,
            _ => return Err(ServiceError::validation("quantity must be greater than 0")),
        };

        let customer = match (draft.customer_id, draft.customer) {
            (Some(id), None) => CustomerRef::Existing(id),
            (None, Some(details)) => CustomerRef::Details(CustomerDirectory::validate(details)?),
            _ => {
                return Err(ServiceError::validation(
                    "exactly one of customerId or customer is required",
                ));
            }
        };

        Ok(ValidatedPurchase {
            customer,
            inventory_id,
            quantity,
        })
    }

    /// Validate and commit a purchase, lowering the item's stock by the
    /// purchased quantity in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for invalid input.
    /// Returns `ServiceError::NotFound` if the customer or item doesn't exist.
    /// Returns `ServiceError::InsufficientStock` if the item cannot cover the
    /// quantity.
    /// Returns `ServiceError::Repository` if the store fails, including after
    /// the last retry of a contended transaction.
    pub async fn record(&self, draft: PurchaseDraft) -> Result<Purchase, ServiceError> {
        let purchase = Self::validate(draft).inspect_err(|e| {
            tracing::info!(stage = %PurchaseStage::Validating, error = %e, "purchase rejected");
        })?;

        let mut attempt = 1;
        loop {
            match self.attempt(&purchase).await {
                Err(e) if e.is_transient() && attempt < MAX_ATTEMPTS => {
                    tracing::warn!(attempt, error = %e, "purchase contended, retrying");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn attempt(&self, purchase: &ValidatedPurchase) -> Result<Purchase, ServiceError> {
        let mut stage = PurchaseStage::Validating;
        let mut tx = self.store.begin().await?;

        let outcome = match Self::run(tx.as_mut(), purchase, &mut stage).await {
            Ok(created) => tx
                .commit()
                .await
                .map(|()| created)
                .map_err(ServiceError::from),
            Err(e) => {
                rollback_quietly(tx).await;
                Err(e)
            }
        };

        match &outcome {
            Ok(created) => {
                enter(&mut stage, PurchaseStage::Done);
                tracing::info!(
                    purchase_id = %created.id,
                    customer_id = %created.customer_id,
                    inventory_id = %created.inventory_id,
                    quantity = created.quantity,
                    "purchase recorded"
                );
            }
            Err(e) => tracing::info!(stage = %stage, error = %e, "purchase failed"),
        }
        outcome
    }

    async fn run(
        tx: &mut dyn StoreTx,
        purchase: &ValidatedPurchase,
        stage: &mut PurchaseStage,
    ) -> Result<Purchase, ServiceError> {
        enter(stage, PurchaseStage::ResolvingCustomer);
        let customer_id = match &purchase.customer {
            CustomerRef::Existing(id) => tx
                .get_customer(*id)
                .await?
                .ok_or_else(|| customer_not_found(*id))?
                .id,
            CustomerRef::Details(details) => {
                CustomerDirectory::find_or_create_in(tx, details).await?.id
            }
        };

        enter(stage, PurchaseStage::CheckingStock);
        InventoryLedger::reserve_and_decrement_in(tx, purchase.inventory_id, purchase.quantity)
            .await?;

        enter(stage, PurchaseStage::Committing);
        let created = tx
            .insert_purchase(&NewPurchase {
                customer_id,
                inventory_id: purchase.inventory_id,
                quantity: purchase.quantity,
            })
            .await?;
        Ok(created)
    }

    /// Every purchase, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn list(&self) -> Result<Vec<Purchase>, ServiceError> {
        Ok(self.store.list_purchases().await?)
    }

    /// Totals for a committed purchase, priced at the item's current unit cost.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the purchase doesn't exist.
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn invoice(&self, id: PurchaseId) -> Result<Invoice, ServiceError> {
        let purchase = self
            .store
            .get_purchase(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("purchase {id} not found")))?;

        let customer = self
            .store
            .get_customer(purchase.customer_id)
            .await?
            .ok_or_else(|| dangling(id, "customer"))?;
        let item = self
            .store
            .get_inventory_item(purchase.inventory_id)
            .await?
            .ok_or_else(|| dangling(id, "inventory item"))?;

        let line = InvoiceLine::new(item.name, purchase.quantity, item.unit_cost).ok_or_else(|| {
            ServiceError::from(RepositoryError::DataCorruption(format!(
                "purchase {id} total overflows"
            )))
        })?;
        Ok(Invoice {
            purchase_id: purchase.id,
            customer_id: customer.id,
            customer_name: customer.full_name(),
            issued_at: purchase.created_at,
            total: line.total,
            lines: vec![line],
        })
    }
}

fn customer_not_found(id: CustomerId) -> ServiceError {
    ServiceError::not_found(format!("customer {id} not found"))
}

fn dangling(id: PurchaseId, what: &str) -> ServiceError {
    RepositoryError::DataCorruption(format!("purchase {id} references a missing {what}")).into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use bizdesk_core::{CustomerId, InventoryItemId};

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{CustomerDetails, InventoryDraft, NewInventoryItem};

    async fn stock(store: &MemoryStore, quantity: i64) -> InventoryItemId {
        InventoryLedger::new(store)
            .create(InventoryDraft {
                name: Some("Widget".to_owned()),
                unit_cost: Some(Decimal::new(250, 2)),
                quantity: Some(quantity),
            })
            .await
            .unwrap()
            .id
    }

    async fn customer(store: &MemoryStore) -> CustomerId {
        CustomerDirectory::new(store)
            .create(ada())
            .await
            .unwrap()
            .id
    }

    fn ada() -> CustomerDetails {
        CustomerDetails {
            first_name: Some("Ada".to_owned()),
            last_name: Some("Lovelace".to_owned()),
            email: Some("ada@example.com".to_owned()),
            ..CustomerDetails::default()
        }
    }

    fn for_customer(customer_id: CustomerId, inventory_id: InventoryItemId, quantity: i64) -> PurchaseDraft {
        PurchaseDraft {
            customer_id: Some(customer_id),
            customer: None,
            inventory_id: Some(inventory_id),
            quantity: Some(quantity),
        }
    }

    async fn on_hand(store: &MemoryStore, id: InventoryItemId) -> i32 {
        InventoryLedger::new(store).get(id).await.unwrap().quantity
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        let id = InventoryItemId::new(1);
        let cases = [
            PurchaseDraft {
                inventory_id: None,
                ..for_customer(CustomerId::new(1), id, 1)
            },
            for_customer(CustomerId::new(1), id, 0),
            for_customer(CustomerId::new(1), id, -2),
            PurchaseDraft {
                customer_id: None,
                ..for_customer(CustomerId::new(1), id, 1)
            },
            PurchaseDraft {
                customer: Some(ada()),
                ..for_customer(CustomerId::new(1), id, 1)
            },
        ];
        for draft in cases {
            assert!(matches!(
                PurchaseRecorder::validate(draft),
                Err(ServiceError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_validate_checks_inline_customer() {
        let draft = PurchaseDraft {
            customer_id: None,
            customer: Some(CustomerDetails::default()),
            inventory_id: Some(InventoryItemId::new(1)),
            quantity: Some(1),
        };
        assert!(matches!(
            PurchaseRecorder::validate(draft),
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_record_decrements_stock() {
        let store = MemoryStore::new();
        let item = stock(&store, 10).await;
        let customer_id = customer(&store).await;

        let purchase = PurchaseRecorder::new(&store)
            .record(for_customer(customer_id, item, 3))
            .await
            .unwrap();

        assert_eq!(purchase.quantity, 3);
        assert_eq!(purchase.customer_id, customer_id);
        assert_eq!(on_hand(&store, item).await, 7);
    }

    #[tokio::test]
    async fn test_stock_drops_by_total_purchased() {
        let store = MemoryStore::new();
        let item = stock(&store, 20).await;
        let customer_id = customer(&store).await;
        let recorder = PurchaseRecorder::new(&store);

        for quantity in [1, 4, 2, 6] {
            recorder
                .record(for_customer(customer_id, item, quantity))
                .await
                .unwrap();
        }

        assert_eq!(on_hand(&store, item).await, 20 - 13);
        assert_eq!(recorder.list().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_inline_customer_is_found_or_created() {
        let store = MemoryStore::new();
        let item = stock(&store, 10).await;
        let recorder = PurchaseRecorder::new(&store);
        let inline = || PurchaseDraft {
            customer_id: None,
            customer: Some(ada()),
            inventory_id: Some(item),
            quantity: Some(1),
        };

        let first = recorder.record(inline()).await.unwrap();
        let second = recorder.record(inline()).await.unwrap();

        assert_eq!(first.customer_id, second.customer_id);
        assert_eq!(CustomerDirectory::new(&store).search("").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insufficient_stock_leaves_everything_untouched() {
        let store = MemoryStore::new();
        let item = stock(&store, 2).await;
        let recorder = PurchaseRecorder::new(&store);

        let err = recorder
            .record(PurchaseDraft {
                customer_id: None,
                customer: Some(ada()),
                inventory_id: Some(item),
                quantity: Some(3),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::InsufficientStock {
                requested: 3,
                available: 2,
                ..
            }
        ));
        assert_eq!(on_hand(&store, item).await, 2);
        assert!(recorder.list().await.unwrap().is_empty());
        // The inline customer was rolled back with the rest.
        assert!(CustomerDirectory::new(&store).search("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_references_are_not_found() {
        let store = MemoryStore::new();
        let item = stock(&store, 5).await;
        let customer_id = customer(&store).await;
        let recorder = PurchaseRecorder::new(&store);

        let no_customer = recorder
            .record(for_customer(CustomerId::new(99), item, 1))
            .await;
        assert!(matches!(no_customer, Err(ServiceError::NotFound(_))));

        let no_item = recorder
            .record(for_customer(customer_id, InventoryItemId::new(99), 1))
            .await;
        assert!(matches!(no_item, Err(ServiceError::NotFound(_))));

        assert_eq!(on_hand(&store, item).await, 5);
    }

    #[tokio::test]
    async fn test_failed_insert_rolls_back_decrement() {
        let store = MemoryStore::new();
        let item = stock(&store, 5).await;
        let customer_id = customer(&store).await;
        store.fail_next_purchase_insert();

        let result = PurchaseRecorder::new(&store)
            .record(for_customer(customer_id, item, 2))
            .await;

        assert!(matches!(result, Err(ServiceError::Repository(_))));
        assert_eq!(on_hand(&store, item).await, 5);
        assert!(store.list_purchases().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_contention_is_retried_without_double_decrement() {
        let store = MemoryStore::new();
        let item = stock(&store, 5).await;
        let customer_id = customer(&store).await;
        store.contend_next_commits(2);

        PurchaseRecorder::new(&store)
            .record(for_customer(customer_id, item, 2))
            .await
            .unwrap();

        assert_eq!(on_hand(&store, item).await, 3);
        assert_eq!(store.list_purchases().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_contention_gives_up_after_max_attempts() {
        let store = MemoryStore::new();
        let item = stock(&store, 5).await;
        let customer_id = customer(&store).await;
        store.contend_next_commits(MAX_ATTEMPTS);

        let err = PurchaseRecorder::new(&store)
            .record(for_customer(customer_id, item, 2))
            .await
            .unwrap_err();

        assert!(err.is_transient());
        assert_eq!(on_hand(&store, item).await, 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_purchases_cannot_oversell() {
        let store = MemoryStore::new();
        let item = stock(&store, 5).await;
        let customer_id = customer(&store).await;

        let spawn = || {
            let store = store.clone();
            tokio::spawn(async move {
                PurchaseRecorder::new(&store)
                    .record(for_customer(customer_id, item, 3))
                    .await
            })
        };
        let (a, b) = tokio::join!(spawn(), spawn());
        let results = [a.unwrap(), b.unwrap()];

        let successes = results.iter().filter(|r| r.is_ok()).count();
        let short = results
            .iter()
            .filter(|r| matches!(r, Err(ServiceError::InsufficientStock { .. })))
            .count();
        assert_eq!((successes, short), (1, 1));
        assert_eq!(on_hand(&store, item).await, 2);
    }

    #[tokio::test]
    async fn test_invoice_totals() {
        let store = MemoryStore::new();
        let item = stock(&store, 10).await;
        let customer_id = customer(&store).await;
        let recorder = PurchaseRecorder::new(&store);
        let purchase = recorder
            .record(for_customer(customer_id, item, 4))
            .await
            .unwrap();

        let invoice = recorder.invoice(purchase.id).await.unwrap();

        assert_eq!(invoice.customer_name, "Ada Lovelace");
        assert_eq!(invoice.lines.len(), 1);
        assert_eq!(invoice.total, Decimal::new(1000, 2));

        let missing = recorder.invoice(PurchaseId::new(404)).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invoice_overflow_is_an_error_not_a_panic() {
        let store = MemoryStore::new();
        // Written straight to the store, past validation
        let item = store
            .insert_inventory_item(&NewInventoryItem {
                name: "Heirloom".to_owned(),
                unit_cost: Decimal::MAX,
                quantity: 5,
            })
            .await
            .unwrap();
        let customer_id = customer(&store).await;
        let recorder = PurchaseRecorder::new(&store);
        let purchase = recorder
            .record(for_customer(customer_id, item.id, 2))
            .await
            .unwrap();

        let result = recorder.invoice(purchase.id).await;
        assert!(matches!(
            result,
            Err(ServiceError::Repository(RepositoryError::DataCorruption(_)))
        ));
    }
}
