use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mesto_core::UserId;

/// JWT claims carried by a session token.
///
/// The identity lives under `_id`; `iat`/`exp` are Unix seconds as in RFC 7519.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Authenticated user. Optional on the wire so a token without it can be told apart
    /// from a token that does not decode at all.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<UserId>,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,
}

impl JwtClaims {
    pub fn new(sub: UserId, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: Some(sub),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed or its signature does not verify")]
    Malformed,

    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("token carries no identity")]
    MissingIdentity,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Tolerated clock skew between the issuing and the verifying instance, in seconds.
pub const ISSUED_AT_LEEWAY_SECS: i64 = 60;

/// Deterministically validate decoded claims and return the identity they assert.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// [`crate::Hs256Jwt`].
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<UserId, TokenError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenError::InvalidTimeWindow);
    }
    if now + ISSUED_AT_LEEWAY_SECS < claims.iat {
        return Err(TokenError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenError::Expired);
    }
    claims.sub.ok_or(TokenError::MissingIdentity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn window_and_identity_are_checked() {
        let now = Utc::now();
        let user = UserId::new();
        let claims = JwtClaims::new(user, now, now + Duration::days(7));

        assert_eq!(validate_claims(&claims, now), Ok(user));
        assert_eq!(
            validate_claims(&claims, now + Duration::days(7)),
            Err(TokenError::Expired)
        );
        assert_eq!(
            validate_claims(&claims, now - Duration::minutes(5)),
            Err(TokenError::NotYetValid)
        );

        let anonymous = JwtClaims { sub: None, ..claims.clone() };
        assert_eq!(validate_claims(&anonymous, now), Err(TokenError::MissingIdentity));

        let inverted = JwtClaims { exp: claims.iat, ..claims };
        assert_eq!(validate_claims(&inverted, now), Err(TokenError::InvalidTimeWindow));
    }

    #[test]
    fn issued_at_tolerates_small_clock_skew() {
        let now = Utc::now();
        let user = UserId::new();
        let claims = JwtClaims::new(user, now, now + Duration::days(7));

        assert_eq!(validate_claims(&claims, now - Duration::seconds(30)), Ok(user));
        assert_eq!(
            validate_claims(&claims, now - Duration::seconds(ISSUED_AT_LEEWAY_SECS)),
            Ok(user)
        );
        assert_eq!(
            validate_claims(&claims, now - Duration::seconds(ISSUED_AT_LEEWAY_SECS + 1)),
            Err(TokenError::NotYetValid)
        );
    }

    #[test]
    fn identity_is_serialized_under_underscore_id() {
        let now = Utc::now();
        let user = UserId::new();
        let json = serde_json::to_value(JwtClaims::new(user, now, now + Duration::hours(1))).unwrap();
        assert_eq!(json["_id"], user.to_string());
        assert!(json.get("sub").is_none());
    }
}
