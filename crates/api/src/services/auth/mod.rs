//! Account directory.
//!
//! Accounts sign in with a username and password and receive a short-lived
//! bearer token. Passwords are stored as salted Argon2id PHC strings.

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, IssuedToken, TokenIssuer};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use bizdesk_core::Email;

use crate::db::{RepositoryError, Store};
use crate::models::{Account, Credentials, NewAccount, SignupDraft, non_blank};

const MISSING_CREDENTIALS: &str = "username and password are required";

/// Account directory service.
pub struct AccountDirectory<'a> {
    store: &'a dyn Store,
    tokens: &'a TokenIssuer,
}

impl<'a> AccountDirectory<'a> {
    /// Create a new account directory.
    #[must_use]
    pub const fn new(store: &'a dyn Store, tokens: &'a TokenIssuer) -> Self {
        Self { store, tokens }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// See [`register`].
    pub async fn signup(&self, draft: SignupDraft) -> Result<Account, AuthError> {
        register(self.store, draft).await
    }

    /// Check a username and password and issue a token for the account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the account doesn't exist
    /// or the password doesn't match.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<IssuedToken, AuthError> {
        let (account, password_hash) = self
            .store
            .get_account_with_hash(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        tracing::info!(account_id = %account.id, "account signed in");
        self.tokens.issue(&account.username)
    }

    /// [`Self::authenticate`] for client-submitted credentials.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` if either field is absent or blank.
    /// Otherwise as [`Self::authenticate`].
    pub async fn signin(&self, credentials: Credentials) -> Result<IssuedToken, AuthError> {
        let (Some(username), Some(password)) = (
            non_blank(credentials.username),
            credentials.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AuthError::MissingField(MISSING_CREDENTIALS));
        };
        self.authenticate(&username, &password).await
    }

    /// Resolve a bearer token to the username it was issued for.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is invalid or expired.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        self.tokens.verify(token)
    }
}

/// Create an account, hashing its password.
///
/// # Errors
///
/// Returns `AuthError::MissingField` if the username or password is absent.
/// Returns `AuthError::InvalidEmail` if an email is given but malformed.
/// Returns `AuthError::AccountExists` if the username or email is taken.
pub async fn register(store: &dyn Store, draft: SignupDraft) -> Result<Account, AuthError> {
    let (Some(username), Some(password)) = (
        non_blank(draft.username),
        draft.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AuthError::MissingField(MISSING_CREDENTIALS));
    };
    let email = non_blank(draft.email)
        .map(|raw| Email::parse(&raw))
        .transpose()?;

    let password_hash = hash_password(&password)?;

    let account = store
        .insert_account(&NewAccount {
            username,
            email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(msg) => AuthError::AccountExists(msg),
            other => AuthError::Repository(other),
        })?;

    tracing::info!(account_id = %account.id, "account created");
    Ok(account)
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
