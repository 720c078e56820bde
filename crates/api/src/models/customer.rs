//! Customer domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bizdesk_core::{CustomerId, Email};

/// A customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub is_regular: bool,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// "First Last", as printed on invoices.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether any of the searchable fields contains `term` (case-sensitive).
    #[must_use]
    pub fn matches_term(&self, term: &str) -> bool {
        self.first_name.contains(term)
            || self.last_name.contains(term)
            || self.email.as_ref().is_some_and(|e| e.as_str().contains(term))
            || self.phone.as_ref().is_some_and(|p| p.contains(term))
    }
}

/// The findable identity of a customer: email OR phone.
///
/// Only the fields that are present take part in a lookup. An identity with
/// neither field never matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerIdentity {
    pub email: Option<Email>,
    pub phone: Option<String>,
}

impl CustomerIdentity {
    /// True when there is nothing to look up by.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none()
    }

    /// Whether `customer` shares the email or the phone of this identity.
    #[must_use]
    pub fn matches(&self, customer: &Customer) -> bool {
        let email_hit = self
            .email
            .as_ref()
            .is_some_and(|email| customer.email.as_ref() == Some(email));
        let phone_hit = self
            .phone
            .as_ref()
            .is_some_and(|phone| customer.phone.as_ref() == Some(phone));
        email_hit || phone_hit
    }
}

/// Customer fields as submitted by a client, before validation.
///
/// Every field is optional here so a missing name surfaces as a validation
/// error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub is_regular: Option<bool>,
}

/// A validated customer ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub is_regular: bool,
}

impl NewCustomer {
    /// The identity this customer would be deduplicated by.
    #[must_use]
    pub fn identity(&self) -> CustomerIdentity {
        CustomerIdentity {
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}
