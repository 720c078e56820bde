//! Account domain types.
//!
//! Accounts exist only to authenticate API callers. They share nothing with
//! customers or employees.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bizdesk_core::{AccountId, Email};

/// A login account. The password hash is never part of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub email: Option<Email>,
    pub created_at: DateTime<Utc>,
}

/// An account ready to be inserted, with its password already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub email: Option<Email>,
    pub password_hash: String,
}

/// Signup fields as submitted by a client.
///
/// Deliberately not `Debug`: it carries a plaintext password.
#[derive(Default, Deserialize)]
pub struct SignupDraft {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

/// Signin fields as submitted by a client. Not `Debug`, like [`SignupDraft`].
#[derive(Default, Deserialize)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}
