//! Persistence for the Bizdesk backend.
//!
//! # Database: `bizdesk` schema
//!
//! ## Tables
//!
//! - `customer` - Customers, unique by email and by phone
//! - `inventory_item` - Stocked items (quantity never below zero)
//! - `purchase` - Immutable purchase records
//! - `employee` - Employee roster
//! - `account` - API login accounts (Argon2id hashes)
//!
//! # Store handles
//!
//! Handlers never touch a database driver directly. They receive a
//! [`Store`] through application state and call it explicitly:
//!
//! - [`PgStore`] - `PostgreSQL` via sqlx (production)
//! - [`MemoryStore`] - in-process tables (tests, local development)
//!
//! Multi-step writes go through a [`StoreTx`] obtained from [`Store::begin`].
//! Dropping a transaction without committing discards every write made on it.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p bizdesk-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use bizdesk_core::{CustomerId, Email, InventoryItemId, PurchaseId};

use crate::models::{
    Account, Customer, CustomerIdentity, Employee, InventoryItem, NewAccount, NewCustomer,
    NewEmployee, NewInventoryItem, NewPurchase, Purchase,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The transaction lost a race (serialization failure or deadlock) and
    /// may succeed if run again.
    #[error("transaction contention: {0}")]
    Contention(String),
}

impl RepositoryError {
    /// Whether re-running the whole unit of work could succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Contention(_))
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// A shared, injected handle to the backing store.
///
/// Single-statement reads and writes are methods here; anything that must be
/// atomic across statements opens a [`StoreTx`].
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Open a transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if no connection is available.
    async fn begin(&self) -> Result<Box<dyn StoreTx>, RepositoryError>;

    /// Round-trip to the store, for readiness checks.
    async fn ping(&self) -> Result<(), RepositoryError>;

    // Customers
    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;
    async fn search_customers(&self, term: &str) -> Result<Vec<Customer>, RepositoryError>;

    // Inventory
    async fn insert_inventory_item(
        &self,
        item: &NewInventoryItem,
    ) -> Result<InventoryItem, RepositoryError>;
    async fn get_inventory_item(
        &self,
        id: InventoryItemId,
    ) -> Result<Option<InventoryItem>, RepositoryError>;
    async fn list_inventory_items(&self) -> Result<Vec<InventoryItem>, RepositoryError>;

    // Purchases
    async fn get_purchase(&self, id: PurchaseId) -> Result<Option<Purchase>, RepositoryError>;
    async fn list_purchases(&self) -> Result<Vec<Purchase>, RepositoryError>;

    // Employees
    async fn insert_employee(&self, employee: &NewEmployee) -> Result<Employee, RepositoryError>;
    async fn search_employees(&self, term: &str) -> Result<Vec<Employee>, RepositoryError>;

    // Accounts
    /// Insert an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or email is taken.
    async fn insert_account(&self, account: &NewAccount) -> Result<Account, RepositoryError>;

    /// Fetch an account together with its stored password hash.
    async fn get_account_with_hash(
        &self,
        username: &str,
    ) -> Result<Option<(Account, String)>, RepositoryError>;
}

/// An open transaction on the store.
///
/// Reads see the transaction's own writes. Nothing is visible to other
/// callers until [`StoreTx::commit`] succeeds.
#[async_trait]
pub trait StoreTx: Send {
    /// First customer whose email or phone matches `identity`.
    async fn find_customer_by_identity(
        &mut self,
        identity: &CustomerIdentity,
    ) -> Result<Option<Customer>, RepositoryError>;

    async fn get_customer(&mut self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;

    /// Insert a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or phone already
    /// belongs to another customer.
    async fn insert_customer(&mut self, customer: &NewCustomer)
    -> Result<Customer, RepositoryError>;

    /// Read an inventory item and hold it against concurrent writers until
    /// the transaction ends.
    async fn lock_inventory_item(
        &mut self,
        id: InventoryItemId,
    ) -> Result<Option<InventoryItem>, RepositoryError>;

    /// Overwrite the on-hand quantity of an item locked by this transaction.
    async fn set_inventory_quantity(
        &mut self,
        id: InventoryItemId,
        quantity: i32,
    ) -> Result<InventoryItem, RepositoryError>;

    async fn insert_purchase(&mut self, purchase: &NewPurchase)
    -> Result<Purchase, RepositoryError>;

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError>;
}

/// Lookup key helper shared by both stores.
pub(crate) fn identity_parts(identity: &CustomerIdentity) -> (Option<&str>, Option<&str>) {
    (
        identity.email.as_ref().map(Email::as_str),
        identity.phone.as_deref(),
    )
}
