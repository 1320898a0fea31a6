//! `mesto-core` — domain foundation: identifiers, users, cards and their schema rules.
//!
//! This crate contains **pure domain** code (no HTTP, no storage).

pub mod card;
pub mod error;
pub mod id;
pub mod messages;
pub mod schema;
pub mod user;

pub use card::{Card, CardView, NewCard};
pub use error::{CastError, FieldError, SchemaError};
pub use id::{CardId, UserId};
pub use schema::FieldChecks;
pub use user::{Credentials, NewUser, User, UserPatch, UserSummary};
