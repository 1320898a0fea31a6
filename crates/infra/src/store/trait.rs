use thiserror::Error;

use mesto_core::{Card, CardId, CastError, Credentials, NewCard, NewUser, SchemaError, User, UserId, UserPatch};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation error.
///
/// These mirror the failure classes a document store reports; the HTTP boundary maps each
/// to a status code.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record broke the model schema; nothing was written.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A value could not be interpreted as an identifier.
    #[error(transparent)]
    Cast(#[from] CastError),

    /// A unique index rejected the write.
    #[error("duplicate key on {key}")]
    Duplicate { key: &'static str },

    /// Connectivity or driver failure.
    #[error("store backend failure: {0:#}")]
    Backend(anyhow::Error),
}

impl StoreError {
    pub fn backend(err: impl Into<anyhow::Error>) -> Self {
        Self::Backend(err.into())
    }
}

/// Persistence boundary for users and cards.
///
/// ## Semantics every implementation must honor
///
/// - Inserts and updates run the model schema ([`User::validate`], [`Card::validate`]) and
///   fail with [`StoreError::Schema`] without writing.
/// - User email is unique (exact match); a clash fails with [`StoreError::Duplicate`].
/// - `add_like`/`remove_like` are atomic set operations: concurrent calls on the same card
///   never lose an update, adding a present like or removing an absent one is a no-op.
/// - Lookups of a missing record return `Ok(None)`, never an error.
/// - Listings come back in creation order.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Batch lookup; ids that do not resolve are skipped.
    async fn find_users(&self, ids: &[UserId]) -> StoreResult<Vec<User>>;

    /// The only read that exposes the password hash.
    async fn find_credentials_by_email(&self, email: &str) -> StoreResult<Option<Credentials>>;

    async fn insert_user(&self, new_user: NewUser) -> StoreResult<User>;

    /// Apply `patch` and return the updated user, or `None` if `id` does not resolve.
    async fn update_user(&self, id: UserId, patch: UserPatch) -> StoreResult<Option<User>>;

    async fn list_cards(&self) -> StoreResult<Vec<Card>>;

    async fn find_card(&self, id: CardId) -> StoreResult<Option<Card>>;

    async fn insert_card(&self, new_card: NewCard) -> StoreResult<Card>;

    /// `false` when there was nothing to delete.
    async fn delete_card(&self, id: CardId) -> StoreResult<bool>;

    async fn add_like(&self, id: CardId, user: UserId) -> StoreResult<Option<Card>>;

    async fn remove_like(&self, id: CardId, user: UserId) -> StoreResult<Option<Card>>;

    /// Release connections. The handle must not be used afterwards.
    async fn close(&self);
}
