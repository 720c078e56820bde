//! In-process store.
//!
//! All tables live in one [`Tables`] value behind an async mutex. A
//! transaction holds the mutex for its whole lifetime and works on a clone of
//! the tables; commit writes the clone back, rollback (or drop) discards it.
//! Transactions are therefore fully serialized, which is what the purchase
//! flow's row lock provides in `PostgreSQL`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use bizdesk_core::{AccountId, CustomerId, EmployeeId, InventoryItemId, PurchaseId};

use super::{RepositoryError, Store, StoreTx};
use crate::models::{
    Account, Customer, CustomerIdentity, Employee, InventoryItem, NewAccount, NewCustomer,
    NewEmployee, NewInventoryItem, NewPurchase, Purchase,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    customers: Vec<Customer>,
    inventory: Vec<InventoryItem>,
    purchases: Vec<Purchase>,
    employees: Vec<Employee>,
    accounts: Vec<(Account, String)>,
}

/// Next `SERIAL` value for a table that never deletes rows.
fn next_id(len: usize) -> Result<i32, RepositoryError> {
    i32::try_from(len + 1)
        .map_err(|_| RepositoryError::DataCorruption("id sequence exhausted".to_owned()))
}

impl Tables {
    fn customer(&self, id: CustomerId) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    fn inventory_item(&self, id: InventoryItemId) -> Option<&InventoryItem> {
        self.inventory.iter().find(|i| i.id == id)
    }

    fn insert_customer(&mut self, new: &NewCustomer) -> Result<Customer, RepositoryError> {
        if let Some(email) = &new.email
            && self.customers.iter().any(|c| c.email.as_ref() == Some(email))
        {
            return Err(RepositoryError::Conflict(
                "customer email already exists".to_owned(),
            ));
        }
        if let Some(phone) = &new.phone
            && self.customers.iter().any(|c| c.phone.as_ref() == Some(phone))
        {
            return Err(RepositoryError::Conflict(
                "customer phone already exists".to_owned(),
            ));
        }

        let customer = Customer {
            id: CustomerId::new(next_id(self.customers.len())?),
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            email: new.email.clone(),
            phone: new.phone.clone(),
            address: new.address.clone(),
            city: new.city.clone(),
            state: new.state.clone(),
            postal_code: new.postal_code.clone(),
            country: new.country.clone(),
            is_regular: new.is_regular,
            created_at: Utc::now(),
        };
        self.customers.push(customer.clone());
        Ok(customer)
    }
}

/// Store backed by process memory. Cloning shares the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    #[cfg(test)]
    faults: Arc<faults::Faults>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next purchase insert fail with a database error.
    #[cfg(test)]
    pub(crate) fn fail_next_purchase_insert(&self) {
        self.faults.arm_purchase_insert();
    }

    /// Make the next `count` commits fail as if they lost a serialization race.
    #[cfg(test)]
    pub(crate) fn contend_next_commits(&self, count: u32) {
        self.faults.arm_commits(count);
    }
}

/// An open [`MemoryStore`] transaction.
pub struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
    #[cfg(test)]
    faults: Arc<faults::Faults>,
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, RepositoryError> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx {
            guard,
            working,
            #[cfg(test)]
            faults: Arc::clone(&self.faults),
        }))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.tables.lock().await.customer(id).cloned())
    }

    async fn search_customers(&self, term: &str) -> Result<Vec<Customer>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .customers
            .iter()
            .filter(|c| c.matches_term(term))
            .cloned()
            .collect())
    }

    async fn insert_inventory_item(
        &self,
        item: &NewInventoryItem,
    ) -> Result<InventoryItem, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let row = InventoryItem {
            id: InventoryItemId::new(next_id(tables.inventory.len())?),
            name: item.name.clone(),
            unit_cost: item.unit_cost,
            quantity: item.quantity,
            created_at: now,
            updated_at: now,
        };
        tables.inventory.push(row.clone());
        Ok(row)
    }

    async fn get_inventory_item(
        &self,
        id: InventoryItemId,
    ) -> Result<Option<InventoryItem>, RepositoryError> {
        Ok(self.tables.lock().await.inventory_item(id).cloned())
    }

    async fn list_inventory_items(&self) -> Result<Vec<InventoryItem>, RepositoryError> {
        Ok(self.tables.lock().await.inventory.clone())
    }

    async fn get_purchase(&self, id: PurchaseId) -> Result<Option<Purchase>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.purchases.iter().find(|p| p.id == id).cloned())
    }

    async fn list_purchases(&self) -> Result<Vec<Purchase>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut purchases = tables.purchases.clone();
        purchases.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(purchases)
    }

    async fn insert_employee(&self, employee: &NewEmployee) -> Result<Employee, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let row = Employee {
            id: EmployeeId::new(next_id(tables.employees.len())?),
            name: employee.name.clone(),
            email: employee.email.clone(),
            phone: employee.phone.clone(),
            role: employee.role.clone(),
            employment_type: employee.employment_type,
            salary: employee.salary,
            status: employee.status,
            start_date: employee.start_date,
            end_date: employee.end_date,
            created_at: Utc::now(),
        };
        tables.employees.push(row.clone());
        Ok(row)
    }

    async fn search_employees(&self, term: &str) -> Result<Vec<Employee>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .employees
            .iter()
            .filter(|e| e.matches_term(term))
            .cloned()
            .collect())
    }

    async fn insert_account(&self, account: &NewAccount) -> Result<Account, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables
            .accounts
            .iter()
            .any(|(a, _)| a.username == account.username)
        {
            return Err(RepositoryError::Conflict(
                "username already exists".to_owned(),
            ));
        }
        if let Some(email) = &account.email
            && tables
                .accounts
                .iter()
                .any(|(a, _)| a.email.as_ref() == Some(email))
        {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let row = Account {
            id: AccountId::new(next_id(tables.accounts.len())?),
            username: account.username.clone(),
            email: account.email.clone(),
            created_at: Utc::now(),
        };
        tables
            .accounts
            .push((row.clone(), account.password_hash.clone()));
        Ok(row)
    }

    async fn get_account_with_hash(
        &self,
        username: &str,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .accounts
            .iter()
            .find(|(a, _)| a.username == username)
            .cloned())
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn find_customer_by_identity(
        &mut self,
        identity: &CustomerIdentity,
    ) -> Result<Option<Customer>, RepositoryError> {
        Ok(self
            .working
            .customers
            .iter()
            .find(|c| identity.matches(c))
            .cloned())
    }

    async fn get_customer(&mut self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.working.customer(id).cloned())
    }

    async fn insert_customer(
        &mut self,
        customer: &NewCustomer,
    ) -> Result<Customer, RepositoryError> {
        self.working.insert_customer(customer)
    }

    async fn lock_inventory_item(
        &mut self,
        id: InventoryItemId,
    ) -> Result<Option<InventoryItem>, RepositoryError> {
        Ok(self.working.inventory_item(id).cloned())
    }

    async fn set_inventory_quantity(
        &mut self,
        id: InventoryItemId,
        quantity: i32,
    ) -> Result<InventoryItem, RepositoryError> {
        if quantity < 0 {
            return Err(RepositoryError::Conflict(
                "inventory quantity cannot be negative".to_owned(),
            ));
        }
        let item = self
            .working
            .inventory
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(RepositoryError::NotFound)?;
        item.quantity = quantity;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn insert_purchase(
        &mut self,
        purchase: &NewPurchase,
    ) -> Result<Purchase, RepositoryError> {
        #[cfg(test)]
        if self.faults.take_purchase_insert() {
            return Err(RepositoryError::Database(sqlx::Error::PoolClosed));
        }

        if self.working.customer(purchase.customer_id).is_none()
            || self.working.inventory_item(purchase.inventory_id).is_none()
        {
            return Err(RepositoryError::Conflict(
                "purchase references a missing row".to_owned(),
            ));
        }

        let row = Purchase {
            id: PurchaseId::new(next_id(self.working.purchases.len())?),
            customer_id: purchase.customer_id,
            inventory_id: purchase.inventory_id,
            quantity: purchase.quantity,
            created_at: Utc::now(),
        };
        self.working.purchases.push(row.clone());
        Ok(row)
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        #[cfg(test)]
        if self.faults.take_commit() {
            return Err(RepositoryError::Contention(
                "could not serialize access due to concurrent update".to_owned(),
            ));
        }

        let Self {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod faults {
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    /// Armed failures for exercising rollback and retry paths.
    #[derive(Debug, Default)]
    pub struct Faults {
        purchase_insert: AtomicBool,
        commits: AtomicU32,
    }

    impl Faults {
        pub fn arm_purchase_insert(&self) {
            self.purchase_insert.store(true, Ordering::SeqCst);
        }

        pub fn take_purchase_insert(&self) -> bool {
            self.purchase_insert.swap(false, Ordering::SeqCst)
        }

        pub fn arm_commits(&self, count: u32) {
            self.commits.store(count, Ordering::SeqCst);
        }

        pub fn take_commit(&self) -> bool {
            self.commits
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use bizdesk_core::Email;
    use rust_decimal::Decimal;

    use super::*;

    fn new_customer(email: Option<&str>, phone: Option<&str>) -> NewCustomer {
        NewCustomer {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: email.map(|e| Email::parse(e).unwrap()),
            phone: phone.map(str::to_owned),
            address: None,
            city: None,
            state: None,
            postal_code: None,
            country: None,
            is_regular: false,
        }
    }

    fn widget(quantity: i32) -> NewInventoryItem {
        NewInventoryItem {
            name: "Widget".to_owned(),
            unit_cost: Decimal::new(250, 2),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let customer = tx
            .insert_customer(&new_customer(Some("ada@example.com"), None))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let found = store.get_customer(customer.id).await.unwrap();
        assert_eq!(found, Some(customer));
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let store = MemoryStore::new();
        let item = store.insert_inventory_item(&widget(5)).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.set_inventory_quantity(item.id, 2).await.unwrap();
        tx.rollback().await.unwrap();

        let item = store.get_inventory_item(item.id).await.unwrap().unwrap();
        assert_eq!(item.quantity, 5);
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let store = MemoryStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_customer(&new_customer(None, Some("555-0100")))
                .await
                .unwrap();
        }
        assert!(store.search_customers("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_customer_identity_is_unique() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_customer(&new_customer(Some("ada@example.com"), Some("555-0100")))
            .await
            .unwrap();

        let email_dup = tx
            .insert_customer(&new_customer(Some("ada@example.com"), None))
            .await;
        assert!(matches!(email_dup, Err(RepositoryError::Conflict(_))));

        let phone_dup = tx
            .insert_customer(&new_customer(None, Some("555-0100")))
            .await;
        assert!(matches!(phone_dup, Err(RepositoryError::Conflict(_))));

        // Neither key set: always insertable.
        tx.insert_customer(&new_customer(None, None)).await.unwrap();
        tx.insert_customer(&new_customer(None, None)).await.unwrap();
    }

    #[tokio::test]
    async fn test_find_by_identity_matches_either_key() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let ada = tx
            .insert_customer(&new_customer(Some("ada@example.com"), Some("555-0100")))
            .await
            .unwrap();

        let by_phone = CustomerIdentity {
            email: Some(Email::parse("other@example.com").unwrap()),
            phone: Some("555-0100".to_owned()),
        };
        let found = tx.find_customer_by_identity(&by_phone).await.unwrap();
        assert_eq!(found.map(|c| c.id), Some(ada.id));

        let nothing = tx
            .find_customer_by_identity(&CustomerIdentity::default())
            .await
            .unwrap();
        assert!(nothing.is_none());
    }

    #[tokio::test]
    async fn test_quantity_never_negative() {
        let store = MemoryStore::new();
        let item = store.insert_inventory_item(&widget(1)).await.unwrap();
        let mut tx = store.begin().await.unwrap();
        let result = tx.set_inventory_quantity(item.id, -1).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryStore::new();
        let account = NewAccount {
            username: "alice".to_owned(),
            email: None,
            password_hash: "hash".to_owned(),
        };
        store.insert_account(&account).await.unwrap();
        let result = store.insert_account(&account).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_purchases_listed_newest_first() {
        let store = MemoryStore::new();
        let item = store.insert_inventory_item(&widget(10)).await.unwrap();
        let mut tx = store.begin().await.unwrap();
        let customer = tx
            .insert_customer(&new_customer(None, None))
            .await
            .unwrap();
        for _ in 0..3 {
            tx.insert_purchase(&NewPurchase {
                customer_id: customer.id,
                inventory_id: item.id,
                quantity: 1,
            })
            .await
            .unwrap();
        }
        tx.commit().await.unwrap();

        let ids: Vec<i32> = store
            .list_purchases()
            .await
            .unwrap()
            .iter()
            .map(|p| p.id.as_i32())
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }
}
