//! Session token service (HS256 JWT).
//!
//! Tokens bind a user id to a validity window and nothing else: no role, no
//! capabilities. Role and account state are re-fetched live on every request,
//! so a role change or deactivation takes effect on the next request without
//! re-issuing tokens. There is no server-side revocation; a stolen token
//! stays valid until natural expiry (see DESIGN.md for the decision record).

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use storefront_core::UserId;

use crate::AuthError;

/// Token validity window used when none is configured.
pub const DEFAULT_VALIDITY_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: UserId,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Error)]
#[error("failed to encode token: {0}")]
pub struct TokenEncodeError(#[from] jsonwebtoken::errors::Error);

/// Stateless issuer/verifier for signed session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validity: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        Self::with_validity(secret, Duration::hours(DEFAULT_VALIDITY_HOURS))
    }

    pub fn with_validity(secret: &[u8], validity: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validity,
        }
    }

    /// Produce a signed token for the user. Stateless, no side effects.
    pub fn issue(&self, user_id: UserId) -> Result<String, TokenEncodeError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + self.validity).timestamp(),
        };
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding,
        )?)
    }

    /// Resolve a token back to its user id.
    ///
    /// Bad signature, expiry and malformed input all collapse to
    /// `TokenInvalid` on the way out; the cause is kept distinguishable in
    /// the debug log only.
    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims.sub),
            Err(err) => {
                tracing::debug!(cause = %err, "token verification failed");
                Err(AuthError::TokenInvalid)
            }
        }
    }
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Keys are secret material; never derive Debug over them.
        f.debug_struct("TokenService")
            .field("validity", &self.validity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_back_to_user_id() {
        let svc = TokenService::new(b"test-secret");
        let user_id = UserId::new();
        let token = svc.issue(user_id).unwrap();
        assert_eq!(svc.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn expired_token_is_invalid() {
        let svc = TokenService::with_validity(b"test-secret", Duration::hours(-1));
        let token = svc.issue(UserId::new()).unwrap();
        assert_eq!(svc.verify(&token), Err(AuthError::TokenInvalid));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let issuer = TokenService::new(b"secret-a");
        let verifier = TokenService::new(b"secret-b");
        let token = issuer.issue(UserId::new()).unwrap();
        assert_eq!(verifier.verify(&token), Err(AuthError::TokenInvalid));
    }

    #[test]
    fn malformed_token_is_invalid() {
        let svc = TokenService::new(b"test-secret");
        assert_eq!(svc.verify("not.a.jwt"), Err(AuthError::TokenInvalid));
        assert_eq!(svc.verify(""), Err(AuthError::TokenInvalid));
    }
}
