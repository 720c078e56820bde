//! Customer directory.
//!
//! A customer is identified by email OR phone. Lookups only use the fields
//! that are present; with neither present no lookup happens and every call
//! creates a fresh record.

use bizdesk_core::{CustomerId, Email};

use super::{MAX_ATTEMPTS, ServiceError, rollback_quietly};
use crate::db::{RepositoryError, Store, StoreTx};
use crate::models::{Customer, CustomerDetails, NewCustomer, non_blank};

/// Customer directory service.
pub struct CustomerDirectory<'a> {
    store: &'a dyn Store,
}

impl<'a> CustomerDirectory<'a> {
    /// Create a new customer directory over `store`.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Validate raw customer details.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if `firstName` or `lastName` is
    /// missing, or if `email` is present but malformed.
    pub fn validate(details: CustomerDetails) -> Result<NewCustomer, ServiceError> {
        let (Some(first_name), Some(last_name)) =
            (non_blank(details.first_name), non_blank(details.last_name))
        else {
            return Err(ServiceError::validation(
                "firstName and lastName are required",
            ));
        };

        let email = non_blank(details.email)
            .map(|raw| Email::parse(&raw))
            .transpose()
            .map_err(|e| ServiceError::validation(format!("invalid email: {e}")))?;

        Ok(NewCustomer {
            first_name,
            last_name,
            email,
            phone: non_blank(details.phone),
            address: non_blank(details.address),
            city: non_blank(details.city),
            state: non_blank(details.state),
            postal_code: non_blank(details.postal_code),
            country: non_blank(details.country),
            is_regular: details.is_regular.unwrap_or(false),
        })
    }

    /// Find the customer matching `customer`'s identity inside `tx`, or
    /// insert it.
    ///
    /// A unique-key violation on insert means another transaction created the
    /// same identity after our lookup; it is reported as contention so the
    /// whole unit of work is retried and the lookup finds the winner.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn find_or_create_in(
        tx: &mut dyn StoreTx,
        customer: &NewCustomer,
    ) -> Result<Customer, ServiceError> {
        let identity = customer.identity();
        if !identity.is_empty()
            && let Some(existing) = tx.find_customer_by_identity(&identity).await?
        {
            tracing::debug!(customer_id = %existing.id, "matched existing customer");
            return Ok(existing);
        }

        match tx.insert_customer(customer).await {
            Ok(created) => {
                tracing::info!(customer_id = %created.id, "customer created");
                Ok(created)
            }
            Err(RepositoryError::Conflict(msg)) => Err(RepositoryError::Contention(format!(
                "concurrent customer insert: {msg}"
            ))
            .into()),
            Err(e) => Err(e.into()),
        }
    }

    /// Return the existing customer with the same email or phone, or create
    /// one. Calling this twice with the same identity yields the same record.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for invalid details.
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn find_or_create(&self, details: CustomerDetails) -> Result<Customer, ServiceError> {
        let customer = Self::validate(details)?;

        let mut attempt = 1;
        loop {
            let mut tx = self.store.begin().await?;
            let result = match Self::find_or_create_in(tx.as_mut(), &customer).await {
                Ok(found) => tx.commit().await.map(|()| found).map_err(Into::into),
                Err(e) => {
                    rollback_quietly(tx).await;
                    Err(e)
                }
            };

            match result {
                Err(e) if e.is_transient() && attempt < MAX_ATTEMPTS => {
                    tracing::warn!(attempt, error = %e, "retrying customer find-or-create");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Create a customer, refusing duplicates.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for invalid details.
    /// Returns `ServiceError::Conflict` if a customer with the same email or
    /// phone already exists.
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn create(&self, details: CustomerDetails) -> Result<Customer, ServiceError> {
        let customer = Self::validate(details)?;
        let mut tx = self.store.begin().await?;

        let result = Self::create_in(tx.as_mut(), &customer).await;
        match result {
            Ok(created) => {
                tx.commit().await?;
                tracing::info!(customer_id = %created.id, "customer created");
                Ok(created)
            }
            Err(e) => {
                rollback_quietly(tx).await;
                Err(e)
            }
        }
    }

    async fn create_in(
        tx: &mut dyn StoreTx,
        customer: &NewCustomer,
    ) -> Result<Customer, ServiceError> {
        let identity = customer.identity();
        if !identity.is_empty() && tx.find_customer_by_identity(&identity).await?.is_some() {
            return Err(ServiceError::Conflict("customer already exists".to_owned()));
        }

        tx.insert_customer(customer).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                ServiceError::Conflict("customer already exists".to_owned())
            }
            other => other.into(),
        })
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the customer doesn't exist.
    pub async fn get(&self, id: CustomerId) -> Result<Customer, ServiceError> {
        self.store
            .get_customer(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("customer {id} not found")))
    }

    /// Customers whose first name, last name, email, or phone contains
    /// `term`. An empty term returns every customer. Ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn search(&self, term: &str) -> Result<Vec<Customer>, ServiceError> {
        Ok(self.store.search_customers(term).await?)
    }
}
