//! Employee roster.

use chrono::{DateTime, NaiveDate};

use bizdesk_core::{Email, EmploymentStatus, EmploymentType};

use super::{ServiceError, validate_money};
use crate::db::Store;
use crate::models::{Employee, EmployeeDraft, NewEmployee, non_blank};

/// Employee roster service.
pub struct EmployeeRoster<'a> {
    store: &'a dyn Store,
}

/// Parse a date given as `YYYY-MM-DD` or as a full RFC 3339 timestamp
/// (date inputs in some browsers submit the latter).
fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| ServiceError::validation(format!("{field} must be a date (YYYY-MM-DD)")))
}

impl<'a> EmployeeRoster<'a> {
    /// Create a new employee roster over `store`.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Validate a submitted employee.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if a required field is missing or
    /// unparseable, if the salary is negative or not whole cents below 10^10,
    /// or if `endDate` precedes
    /// `startDate`.
    pub fn validate(draft: EmployeeDraft) -> Result<NewEmployee, ServiceError> {
        let (Some(name), Some(role), Some(employment_type), Some(status), Some(start_date)) = (
            non_blank(draft.name),
            non_blank(draft.role),
            non_blank(draft.employment_type),
            non_blank(draft.status),
            non_blank(draft.start_date),
        ) else {
            return Err(ServiceError::validation(
                "name, role, employmentType, status, and startDate are required",
            ));
        };

        let employment_type: EmploymentType = employment_type
            .parse()
            .map_err(|e| ServiceError::validation(format!("{e}")))?;
        let status: EmploymentStatus = status
            .parse()
            .map_err(|e| ServiceError::validation(format!("{e}")))?;

        let start_date = parse_date("startDate", &start_date)?;
        let end_date = non_blank(draft.end_date)
            .map(|raw| parse_date("endDate", &raw))
            .transpose()?;
        if end_date.is_some_and(|end| end < start_date) {
            return Err(ServiceError::validation("endDate cannot be before startDate"));
        }

        let salary = draft
            .salary
            .map(|s| validate_money("salary", s))
            .transpose()?;

        let email = non_blank(draft.email)
            .map(|raw| Email::parse(&raw))
            .transpose()
            .map_err(|e| ServiceError::validation(format!("invalid email: {e}")))?;

        Ok(NewEmployee {
            name,
            email,
            phone: non_blank(draft.phone),
            role,
            employment_type,
            salary,
            status,
            start_date,
            end_date,
        })
    }

    /// Add an employee to the roster.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for invalid input.
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn create(&self, draft: EmployeeDraft) -> Result<Employee, ServiceError> {
        let employee = Self::validate(draft)?;
        let created = self.store.insert_employee(&employee).await?;
        tracing::info!(employee_id = %created.id, "employee created");
        Ok(created)
    }

    /// Employees whose name, role, or status label contains `term`. An empty
    /// term returns everyone. Ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn search(&self, term: &str) -> Result<Vec<Employee>, ServiceError> {
        Ok(self.store.search_employees(term).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::MemoryStore;

    fn draft() -> EmployeeDraft {
        EmployeeDraft {
            name: Some("Grace Hopper".to_owned()),
            email: Some("grace@example.com".to_owned()),
            phone: Some(String::new()),
            role: Some("Engineer".to_owned()),
            employment_type: Some("Full-Time".to_owned()),
            salary: Some(Decimal::new(85_000, 0)),
            status: Some("Active".to_owned()),
            start_date: Some("2024-03-01".to_owned()),
            end_date: None,
        }
    }

    #[test]
    fn test_validate_accepts_labels_and_dates() {
        let employee = EmployeeRoster::validate(draft()).unwrap();
        assert_eq!(employee.employment_type, EmploymentType::FullTime);
        assert_eq!(employee.status, EmploymentStatus::Active);
        assert_eq!(employee.start_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(employee.phone, None);
    }

    #[test]
    fn test_validate_accepts_timestamp_dates() {
        let input = EmployeeDraft {
            start_date: Some("2024-03-01T00:00:00.000Z".to_owned()),
            ..draft()
        };
        let employee = EmployeeRoster::validate(input).unwrap();
        assert_eq!(employee.start_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        let cases = [
            EmployeeDraft {
                name: None,
                ..draft()
            },
            EmployeeDraft {
                employment_type: Some("Seasonal".to_owned()),
                ..draft()
            },
            EmployeeDraft {
                status: Some("active".to_owned()),
                ..draft()
            },
            EmployeeDraft {
                start_date: Some("March 1st".to_owned()),
                ..draft()
            },
            EmployeeDraft {
                end_date: Some("2024-02-01".to_owned()),
                ..draft()
            },
            EmployeeDraft {
                salary: Some(Decimal::new(-1, 0)),
                ..draft()
            },
            EmployeeDraft {
                salary: Some(Decimal::new(85_000_001, 3)),
                ..draft()
            },
            EmployeeDraft {
                salary: Some(Decimal::new(10_000_000_000, 0)),
                ..draft()
            },
        ];
        for input in cases {
            assert!(matches!(
                EmployeeRoster::validate(input),
                Err(ServiceError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_search_matches_status_label() {
        let store = MemoryStore::new();
        let roster = EmployeeRoster::new(&store);
        roster.create(draft()).await.unwrap();
        roster
            .create(EmployeeDraft {
                name: Some("Alan Turing".to_owned()),
                email: None,
                status: Some("On Leave".to_owned()),
                ..draft()
            })
            .await
            .unwrap();

        let on_leave = roster.search("Leave").await.unwrap();
        assert_eq!(on_leave.len(), 1);
        assert_eq!(on_leave.first().map(|e| e.name.as_str()), Some("Alan Turing"));

        assert_eq!(roster.search("Engineer").await.unwrap().len(), 2);
        assert_eq!(roster.search("").await.unwrap().len(), 2);
        assert!(roster.search("engineer").await.unwrap().is_empty());
    }
}
