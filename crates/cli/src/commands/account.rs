//! Account provisioning commands.
//!
//! # Usage
//!
//! ```bash
//! BIZDESK_ACCOUNT_PASSWORD=... bizdesk account create -u alice -e alice@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `BIZDESK_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `BIZDESK_ACCOUNT_PASSWORD` - Password for the new account

use bizdesk_api::config::{ConfigError, get_database_url};
use bizdesk_api::db::{self, PgStore};
use bizdesk_api::models::SignupDraft;
use bizdesk_api::services::auth::{self, AuthError};
use bizdesk_core::AccountId;
use thiserror::Error;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create a login account.
///
/// # Returns
///
/// The ID of the created account.
pub async fn create(
    username: String,
    email: Option<String>,
    password: String,
) -> Result<AccountId, AccountError> {
    dotenvy::dotenv().ok();

    let database_url = get_database_url("BIZDESK_DATABASE_URL")?;

    tracing::info!("Connecting to database...");
    let store = PgStore::new(db::create_pool(&database_url).await?);

    tracing::info!("Creating account: {}", username);
    let account = auth::register(
        &store,
        SignupDraft {
            username: Some(username),
            password: Some(password),
            email,
        },
    )
    .await?;

    tracing::info!(
        "Account created successfully! ID: {}, Username: {}",
        account.id,
        account.username
    );
    Ok(account.id)
}
