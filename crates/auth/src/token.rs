//! HS256 session tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use mesto_core::UserId;

use crate::claims::{JwtClaims, TokenError, validate_claims};

/// Session token lifetime.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Verifies a bearer token and returns the identity it asserts.
///
/// Implementations must not touch storage: a token is self-contained.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError>;
}

/// Shared-secret (HMAC-SHA256) token signer and verifier.
#[derive(Clone)]
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Hs256Jwt {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::days(TOKEN_TTL_DAYS),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `user`, valid from `now` for the configured lifetime.
    pub fn issue(&self, user: UserId, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = JwtClaims::new(user, now, now + self.ttl);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

impl core::fmt::Debug for Hs256Jwt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256Jwt")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError> {
        // Time checks run against the caller's clock in `validate_claims`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                TokenError::Malformed
            })?;

        validate_claims(&data.claims, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_validates_within_its_lifetime() {
        let jwt = Hs256Jwt::new("test-secret");
        let user = UserId::new();
        let now = Utc::now();

        let token = jwt.issue(user, now).unwrap();
        assert_eq!(jwt.validate(&token, now + Duration::days(6)), Ok(user));
        assert_eq!(
            jwt.validate(&token, now + Duration::days(TOKEN_TTL_DAYS)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let now = Utc::now();
        let token = Hs256Jwt::new("other-secret").issue(UserId::new(), now).unwrap();
        assert_eq!(
            Hs256Jwt::new("test-secret").validate(&token, now),
            Err(TokenError::Malformed)
        );
        assert_eq!(
            Hs256Jwt::new("test-secret").validate("not-a-jwt", now),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn token_without_identity_is_rejected() {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: None,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(
            Hs256Jwt::new("test-secret").validate(&token, now),
            Err(TokenError::MissingIdentity)
        );
    }
}
