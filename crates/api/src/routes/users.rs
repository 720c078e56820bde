//! Account endpoints.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::middleware::RequireAccount;
use crate::models::{Account, Credentials, SignupDraft};
use crate::services::auth::AccountDirectory;
use crate::state::AppState;

/// Successful signin.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}

/// The authenticated caller.
#[derive(Debug, Serialize)]
pub struct Me {
    pub username: String,
}

/// `POST /users`
pub async fn signup(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SignupDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Account>)> {
    let Json(draft) = payload?;
    let account = AccountDirectory::new(state.store(), state.tokens())
        .signup(draft)
        .await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// `POST /users/signin`
pub async fn signin(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<TokenResponse>> {
    let Json(credentials) = payload?;
    let issued = AccountDirectory::new(state.store(), state.tokens())
        .signin(credentials)
        .await?;
    Ok(Json(TokenResponse {
        token: issued.token,
        token_type: "Bearer",
        expires_at: issued.expires_at,
    }))
}

/// `GET /users/me`
pub async fn me(RequireAccount(username): RequireAccount) -> Json<Me> {
    Json(Me { username })
}
