//! Domain models for the Bizdesk backend.
//!
//! These are validated domain objects, separate from the database row types in
//! [`crate::db`] and the raw request drafts accepted by the routes. Everything
//! serializes with camelCase field names.

pub mod account;
pub mod customer;
pub mod employee;
pub mod inventory;
pub mod purchase;

pub use account::{Account, Credentials, NewAccount, SignupDraft};
pub use customer::{Customer, CustomerDetails, CustomerIdentity, NewCustomer};
pub use employee::{Employee, EmployeeDraft, NewEmployee};
pub use inventory::{InventoryDraft, InventoryItem, NewInventoryItem};
pub use purchase::{
    CustomerRef, Invoice, InvoiceLine, NewPurchase, Purchase, PurchaseDraft, ValidatedPurchase,
};

/// Collapse a blank string into `None`.
///
/// Form clients send `""` for untouched optional inputs; the store only ever
/// sees `NULL` for those.
#[must_use]
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_owned())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(String::new())), None);
        assert_eq!(non_blank(Some("   ".to_owned())), None);
        assert_eq!(non_blank(Some(" Ada ".to_owned())), Some("Ada".to_owned()));
        assert_eq!(non_blank(Some("Ada".to_owned())), Some("Ada".to_owned()));
    }
}
