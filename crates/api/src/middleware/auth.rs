//! Bearer token extractor.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Extractor that requires a valid `Authorization: Bearer <token>` header.
///
/// Yields the username the token was issued for. Missing, malformed, badly
/// signed, and expired tokens are all rejected with 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAccount(username): RequireAccount) -> String {
///     format!("Hello, {username}!")
/// }
/// ```
pub struct RequireAccount(pub String);

impl FromRequestParts<AppState> for RequireAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AuthError::InvalidToken)?;

        let username = state.tokens().verify(token)?;

        sentry::configure_scope(|scope| {
            scope.set_user(Some(sentry::User {
                username: Some(username.clone()),
                ..Default::default()
            }));
        });

        Ok(Self(username))
    }
}

/// The token part of a `Bearer` authorization value (scheme is case-insensitive).
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
