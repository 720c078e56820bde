//! `PostgreSQL` store.
//!
//! Queries are runtime-checked (`query_as` into `FromRow` rows) and the rows
//! are converted into domain types, so a stored value that no longer parses
//! surfaces as [`RepositoryError::DataCorruption`] instead of a panic.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use bizdesk_core::{
    AccountId, CustomerId, Email, EmployeeId, EmploymentStatus, EmploymentType, InventoryItemId,
    PurchaseId,
};

use super::{RepositoryError, Store, StoreTx, identity_parts};
use crate::models::{
    Account, Customer, CustomerIdentity, Employee, InventoryItem, NewAccount, NewCustomer,
    NewEmployee, NewInventoryItem, NewPurchase, Purchase,
};

/// SQLSTATE `serialization_failure`.
const SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE `deadlock_detected`.
const DEADLOCK_DETECTED: &str = "40P01";

/// Classify a driver error.
///
/// Unique violations become `Conflict(what)`; serialization failures and
/// deadlocks become `Contention` so the caller can retry the whole unit.
fn map_db_error(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(what.to_owned());
        }
        if let Some(code) = db_err.code()
            && (code == SERIALIZATION_FAILURE || code == DEADLOCK_DETECTED)
        {
            return RepositoryError::Contention(db_err.message().to_owned());
        }
    }
    RepositoryError::Database(e)
}

fn parse_email(raw: Option<String>) -> Result<Option<Email>, RepositoryError> {
    raw.map(|s| Email::parse(&s))
        .transpose()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid email in database: {e}")))
}

// =============================================================================
// Rows
// =============================================================================

const CUSTOMER_COLUMNS: &str = "id, first_name, last_name, email, phone, address, city, state, \
                                postal_code, country, is_regular, created_at";

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: CustomerId,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
    is_regular: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(r: CustomerRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            first_name: r.first_name,
            last_name: r.last_name,
            email: parse_email(r.email)?,
            phone: r.phone,
            address: r.address,
            city: r.city,
            state: r.state,
            postal_code: r.postal_code,
            country: r.country,
            is_regular: r.is_regular,
            created_at: r.created_at,
        })
    }
}

const INVENTORY_COLUMNS: &str = "id, name, unit_cost, quantity, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct InventoryRow {
    id: InventoryItemId,
    name: String,
    unit_cost: Decimal,
    quantity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<InventoryRow> for InventoryItem {
    fn from(r: InventoryRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            unit_cost: r.unit_cost,
            quantity: r.quantity,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const PURCHASE_COLUMNS: &str = "id, customer_id, inventory_id, quantity, created_at";

#[derive(sqlx::FromRow)]
struct PurchaseRow {
    id: PurchaseId,
    customer_id: CustomerId,
    inventory_id: InventoryItemId,
    quantity: i32,
    created_at: DateTime<Utc>,
}

impl From<PurchaseRow> for Purchase {
    fn from(r: PurchaseRow) -> Self {
        Self {
            id: r.id,
            customer_id: r.customer_id,
            inventory_id: r.inventory_id,
            quantity: r.quantity,
            created_at: r.created_at,
        }
    }
}

const EMPLOYEE_COLUMNS: &str = "id, name, email, phone, role, employment_type, salary, status, \
                                start_date, end_date, created_at";

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    id: EmployeeId,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    role: String,
    employment_type: String,
    salary: Option<Decimal>,
    status: String,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = RepositoryError;

    fn try_from(r: EmployeeRow) -> Result<Self, Self::Error> {
        let employment_type: EmploymentType = r
            .employment_type
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("{e}")))?;
        let status: EmploymentStatus = r
            .status
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("{e}")))?;

        Ok(Self {
            id: r.id,
            name: r.name,
            email: parse_email(r.email)?,
            phone: r.phone,
            role: r.role,
            employment_type,
            salary: r.salary,
            status,
            start_date: r.start_date,
            end_date: r.end_date,
            created_at: r.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: AccountId,
    username: String,
    email: Option<String>,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_parts(self) -> Result<(Account, String), RepositoryError> {
        let account = Account {
            id: self.id,
            username: self.username,
            email: parse_email(self.email)?,
            created_at: self.created_at,
        };
        Ok((account, self.password_hash))
    }
}

// =============================================================================
// Store
// =============================================================================

/// Store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// An open `PostgreSQL` transaction (READ COMMITTED).
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM bizdesk.customer WHERE id = $1");
        sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Customer::try_from)
            .transpose()
    }

    async fn search_customers(&self, term: &str) -> Result<Vec<Customer>, RepositoryError> {
        // strpos keeps the match a literal, case-sensitive substring test.
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM bizdesk.customer \
             WHERE strpos(first_name, $1) > 0 \
                OR strpos(last_name, $1) > 0 \
                OR strpos(COALESCE(email, ''), $1) > 0 \
                OR strpos(COALESCE(phone, ''), $1) > 0 \
             ORDER BY id"
        );
        sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(term)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Customer::try_from)
            .collect()
    }

    async fn insert_inventory_item(
        &self,
        item: &NewInventoryItem,
    ) -> Result<InventoryItem, RepositoryError> {
        let sql = format!(
            "INSERT INTO bizdesk.inventory_item (name, unit_cost, quantity) \
             VALUES ($1, $2, $3) RETURNING {INVENTORY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, InventoryRow>(&sql)
            .bind(&item.name)
            .bind(item.unit_cost)
            .bind(item.quantity)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "inventory item already exists"))?;
        Ok(row.into())
    }

    async fn get_inventory_item(
        &self,
        id: InventoryItemId,
    ) -> Result<Option<InventoryItem>, RepositoryError> {
        let sql = format!("SELECT {INVENTORY_COLUMNS} FROM bizdesk.inventory_item WHERE id = $1");
        let row = sqlx::query_as::<_, InventoryRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn list_inventory_items(&self) -> Result<Vec<InventoryItem>, RepositoryError> {
        let sql = format!("SELECT {INVENTORY_COLUMNS} FROM bizdesk.inventory_item ORDER BY id");
        let rows = sqlx::query_as::<_, InventoryRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_purchase(&self, id: PurchaseId) -> Result<Option<Purchase>, RepositoryError> {
        let sql = format!("SELECT {PURCHASE_COLUMNS} FROM bizdesk.purchase WHERE id = $1");
        let row = sqlx::query_as::<_, PurchaseRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn list_purchases(&self) -> Result<Vec<Purchase>, RepositoryError> {
        let sql = format!(
            "SELECT {PURCHASE_COLUMNS} FROM bizdesk.purchase ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, PurchaseRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_employee(&self, employee: &NewEmployee) -> Result<Employee, RepositoryError> {
        let sql = format!(
            "INSERT INTO bizdesk.employee \
             (name, email, phone, role, employment_type, salary, status, start_date, end_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {EMPLOYEE_COLUMNS}"
        );
        sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(&employee.name)
            .bind(employee.email.as_ref().map(Email::as_str))
            .bind(employee.phone.as_deref())
            .bind(&employee.role)
            .bind(employee.employment_type)
            .bind(employee.salary)
            .bind(employee.status)
            .bind(employee.start_date)
            .bind(employee.end_date)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "employee already exists"))?
            .try_into()
    }

    async fn search_employees(&self, term: &str) -> Result<Vec<Employee>, RepositoryError> {
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM bizdesk.employee \
             WHERE strpos(name, $1) > 0 OR strpos(role, $1) > 0 OR strpos(status, $1) > 0 \
             ORDER BY id"
        );
        sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(term)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Employee::try_from)
            .collect()
    }

    async fn insert_account(&self, account: &NewAccount) -> Result<Account, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            INSERT INTO bizdesk.account (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at
            ",
        )
        .bind(&account.username)
        .bind(account.email.as_ref().map(Email::as_str))
        .bind(&account.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "username or email already exists"))?;

        row.into_parts().map(|(account, _)| account)
    }

    async fn get_account_with_hash(
        &self,
        username: &str,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        sqlx::query_as::<_, AccountRow>(
            r"
            SELECT id, username, email, password_hash, created_at
            FROM bizdesk.account
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .map(AccountRow::into_parts)
        .transpose()
    }
}

#[async_trait]
impl StoreTx for PgTx {
    async fn find_customer_by_identity(
        &mut self,
        identity: &CustomerIdentity,
    ) -> Result<Option<Customer>, RepositoryError> {
        let (email, phone) = identity_parts(identity);
        if email.is_none() && phone.is_none() {
            return Ok(None);
        }

        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM bizdesk.customer \
             WHERE ($1::text IS NOT NULL AND email = $1) \
                OR ($2::text IS NOT NULL AND phone = $2) \
             ORDER BY id LIMIT 1"
        );
        sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(email)
            .bind(phone)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_db_error(e, "customer lookup failed"))?
            .map(Customer::try_from)
            .transpose()
    }

    async fn get_customer(&mut self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM bizdesk.customer WHERE id = $1");
        sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_db_error(e, "customer lookup failed"))?
            .map(Customer::try_from)
            .transpose()
    }

    async fn insert_customer(
        &mut self,
        customer: &NewCustomer,
    ) -> Result<Customer, RepositoryError> {
        let sql = format!(
            "INSERT INTO bizdesk.customer \
             (first_name, last_name, email, phone, address, city, state, postal_code, country, is_regular) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {CUSTOMER_COLUMNS}"
        );
        sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(&customer.first_name)
            .bind(&customer.last_name)
            .bind(customer.email.as_ref().map(Email::as_str))
            .bind(customer.phone.as_deref())
            .bind(customer.address.as_deref())
            .bind(customer.city.as_deref())
            .bind(customer.state.as_deref())
            .bind(customer.postal_code.as_deref())
            .bind(customer.country.as_deref())
            .bind(customer.is_regular)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| map_db_error(e, "customer already exists"))?
            .try_into()
    }

    async fn lock_inventory_item(
        &mut self,
        id: InventoryItemId,
    ) -> Result<Option<InventoryItem>, RepositoryError> {
        let sql = format!(
            "SELECT {INVENTORY_COLUMNS} FROM bizdesk.inventory_item WHERE id = $1 FOR UPDATE"
        );
        let row = sqlx::query_as::<_, InventoryRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_db_error(e, "inventory lock failed"))?;
        Ok(row.map(Into::into))
    }

    async fn set_inventory_quantity(
        &mut self,
        id: InventoryItemId,
        quantity: i32,
    ) -> Result<InventoryItem, RepositoryError> {
        let sql = format!(
            "UPDATE bizdesk.inventory_item SET quantity = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {INVENTORY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, InventoryRow>(&sql)
            .bind(id)
            .bind(quantity)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_db_error(e, "inventory update failed"))?
            .ok_or(RepositoryError::NotFound)?;
        Ok(row.into())
    }

    async fn insert_purchase(
        &mut self,
        purchase: &NewPurchase,
    ) -> Result<Purchase, RepositoryError> {
        let sql = format!(
            "INSERT INTO bizdesk.purchase (customer_id, inventory_id, quantity) \
             VALUES ($1, $2, $3) RETURNING {PURCHASE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PurchaseRow>(&sql)
            .bind(purchase.customer_id)
            .bind(purchase.inventory_id)
            .bind(purchase.quantity)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| map_db_error(e, "purchase already exists"))?;
        Ok(row.into())
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_db_error(e, "commit failed"))
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
