//! Employee classification enums.
//!
//! Both enums travel over the wire and into the database as their
//! human-readable labels (`"Full-Time"`, `"On Leave"`, ...), which is also
//! what employee search matches against.

use serde::{Deserialize, Serialize};

/// Error returned when a label does not name a known variant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value:?} (expected one of {expected})")]
pub struct UnknownLabel {
    /// What was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
    /// Comma-separated list of accepted labels.
    pub expected: &'static str,
}

/// How an employee is engaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentType {
    #[serde(rename = "Full-Time")]
    FullTime,
    #[serde(rename = "Part-Time")]
    PartTime,
    Contract,
    Intern,
}

impl EmploymentType {
    /// All variants in display order.
    pub const ALL: [Self; 4] = [Self::FullTime, Self::PartTime, Self::Contract, Self::Intern];

    /// The stored and serialized label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FullTime => "Full-Time",
            Self::PartTime => "Part-Time",
            Self::Contract => "Contract",
            Self::Intern => "Intern",
        }
    }
}

/// Where an employee currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentStatus {
    Active,
    #[serde(rename = "On Leave")]
    OnLeave,
    Terminated,
    Resigned,
}

impl EmploymentStatus {
    /// All variants in display order.
    pub const ALL: [Self; 4] = [Self::Active, Self::OnLeave, Self::Terminated, Self::Resigned];

    /// The stored and serialized label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::OnLeave => "On Leave",
            Self::Terminated => "Terminated",
            Self::Resigned => "Resigned",
        }
    }

    /// Whether the employee is no longer with the business.
    #[must_use]
    pub const fn is_departed(self) -> bool {
        matches!(self, Self::Terminated | Self::Resigned)
    }
}

macro_rules! label_enum_impls {
    ($ty:ty, $kind:literal, $expected:literal) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .into_iter()
                    .find(|variant| variant.label() == s)
                    .ok_or_else(|| UnknownLabel {
                        kind: $kind,
                        value: s.to_owned(),
                        expected: $expected,
                    })
            }
        }

        #[cfg(feature = "postgres")]
        impl sqlx::Type<sqlx::Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $ty {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(s.parse()?)
            }
        }

        #[cfg(feature = "postgres")]
        impl sqlx::Encode<'_, sqlx::Postgres> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.label(), buf)
            }
        }
    };
}

label_enum_impls!(
    EmploymentType,
    "employment type",
    "Full-Time, Part-Time, Contract, Intern"
);
label_enum_impls!(
    EmploymentStatus,
    "employment status",
    "Active, On Leave, Terminated, Resigned"
);
