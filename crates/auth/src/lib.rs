//! `mesto-auth` — credentials: signed session tokens and password hashing.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod password;
pub mod token;

pub use claims::{JwtClaims, TokenError, validate_claims};
pub use password::{PasswordError, hash_password, verify_password};
pub use token::{Hs256Jwt, JwtValidator, TOKEN_TTL_DAYS};
