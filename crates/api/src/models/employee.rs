//! Employee domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bizdesk_core::{Email, EmployeeId, EmploymentStatus, EmploymentType};

/// An employee record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub role: String,
    pub employment_type: EmploymentType,
    pub salary: Option<Decimal>,
    pub status: EmploymentStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Employee {
    /// Whether name, role, or status label contains `term` (case-sensitive).
    #[must_use]
    pub fn matches_term(&self, term: &str) -> bool {
        self.name.contains(term) || self.role.contains(term) || self.status.label().contains(term)
    }
}

/// Employee fields as submitted by a client.
///
/// Enum and date fields arrive as text so that bad values produce a
/// field-specific validation message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub employment_type: Option<String>,
    pub salary: Option<Decimal>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// A validated employee ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub name: String,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub role: String,
    pub employment_type: EmploymentType,
    pub salary: Option<Decimal>,
    pub status: EmploymentStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}
