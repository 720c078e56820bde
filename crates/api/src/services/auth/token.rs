//! Bearer token issuing and verification (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the account.
    pub sub: String,
    /// Issued at (seconds since epoch).
    pub iat: i64,
    /// Expires at (seconds since epoch).
    pub exp: i64,
}

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies access tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Create an issuer whose tokens live for `ttl_secs` seconds.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_secs: u32) -> Self {
        let key = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            ttl: Duration::seconds(i64::from(ttl_secs)),
        }
    }

    /// Issue a token for `subject`, valid from now.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if encoding fails.
    pub fn issue(&self, subject: &str) -> Result<IssuedToken, AuthError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if encoding fails.
    pub fn issue_at(&self, subject: &str, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: subject.to_owned(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(AuthError::TokenSigning)?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Check the signature and expiry of `token` and return its subject.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is malformed, signed
    /// with another key, or expired. No clock leeway is allowed.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims.sub)
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                AuthError::InvalidToken
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn issuer(secret: &str, ttl: u32) -> TokenIssuer {
        TokenIssuer::new(&SecretString::from(secret.to_owned()), ttl)
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = issuer("k3y-for-tests-Zq8!vX2#mN5@pL7$wR", 3600);
        let issued = tokens.issue("alice").unwrap();
        assert_eq!(tokens.verify(&issued.token).unwrap(), "alice");
    }

    #[test]
    fn test_expiry_is_iat_plus_ttl() {
        let tokens = issuer("k3y-for-tests-Zq8!vX2#mN5@pL7$wR", 3600);
        let now = Utc::now();
        let issued = tokens.issue_at("alice", now).unwrap();
        assert_eq!(issued.expires_at - now, Duration::hours(1));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = issuer("k3y-for-tests-Zq8!vX2#mN5@pL7$wR", 60);
        let issued = tokens
            .issue_at("alice", Utc::now() - Duration::minutes(5))
            .unwrap();
        assert!(matches!(
            tokens.verify(&issued.token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let ours = issuer("k3y-for-tests-Zq8!vX2#mN5@pL7$wR", 3600);
        let theirs = issuer("another-key-Hy6&tB3*cJ9^uE1%oI4", 3600);
        let issued = theirs.issue("alice").unwrap();
        assert!(ours.verify(&issued.token).is_err());
        assert!(ours.verify("not-a-jwt").is_err());
    }
}
