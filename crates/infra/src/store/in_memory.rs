use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use mesto_core::{Card, CardId, Credentials, NewCard, NewUser, User, UserId, UserPatch};

use super::r#trait::{Store, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Collections {
    // Keyed by time-ordered ids, so iteration follows creation order.
    users: BTreeMap<UserId, Credentials>,
    emails: HashMap<String, UserId>,
    cards: BTreeMap<CardId, Card>,
}

/// In-memory document store.
///
/// Intended for tests/dev. Every operation takes the lock once, so each call is atomic with
/// respect to the others.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Collections>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Collections>> {
        self.inner
            .read()
            .map_err(|_| StoreError::backend(anyhow::anyhow!("in-memory store lock poisoned")))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Collections>> {
        self.inner
            .write()
            .map_err(|_| StoreError::backend(anyhow::anyhow!("in-memory store lock poisoned")))
    }

    fn update_card(&self, id: CardId, f: impl FnOnce(&mut Card) -> bool) -> StoreResult<Option<Card>> {
        let mut data = self.write()?;
        Ok(data.cards.get_mut(&id).map(|card| {
            f(card);
            card.clone()
        }))
    }
}

#[async_trait::async_trait]
impl Store for InMemoryStore {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.read()?.users.values().map(|c| c.user.clone()).collect())
    }

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.get(&id).map(|c| c.user.clone()))
    }

    async fn find_users(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        let data = self.read()?;
        Ok(ids
            .iter()
            .filter_map(|id| data.users.get(id).map(|c| c.user.clone()))
            .collect())
    }

    async fn find_credentials_by_email(&self, email: &str) -> StoreResult<Option<Credentials>> {
        let data = self.read()?;
        Ok(data
            .emails
            .get(email)
            .and_then(|id| data.users.get(id))
            .cloned())
    }

    async fn insert_user(&self, new_user: NewUser) -> StoreResult<User> {
        let credentials = new_user.into_credentials(UserId::new())?;

        let mut data = self.write()?;
        if data.emails.contains_key(&credentials.user.email) {
            return Err(StoreError::Duplicate { key: "email" });
        }
        let user = credentials.user.clone();
        data.emails.insert(user.email.clone(), user.id);
        data.users.insert(user.id, credentials);
        Ok(user)
    }

    async fn update_user(&self, id: UserId, patch: UserPatch) -> StoreResult<Option<User>> {
        let mut data = self.write()?;
        let Some(credentials) = data.users.get_mut(&id) else {
            return Ok(None);
        };
        credentials.user = credentials.user.patched(&patch)?;
        Ok(Some(credentials.user.clone()))
    }

    async fn list_cards(&self) -> StoreResult<Vec<Card>> {
        Ok(self.read()?.cards.values().cloned().collect())
    }

    async fn find_card(&self, id: CardId) -> StoreResult<Option<Card>> {
        Ok(self.read()?.cards.get(&id).cloned())
    }

    async fn insert_card(&self, new_card: NewCard) -> StoreResult<Card> {
        let card = Card::create(CardId::new(), new_card, Utc::now())?;
        self.write()?.cards.insert(card.id, card.clone());
        Ok(card)
    }

    async fn delete_card(&self, id: CardId) -> StoreResult<bool> {
        Ok(self.write()?.cards.remove(&id).is_some())
    }

    async fn add_like(&self, id: CardId, user: UserId) -> StoreResult<Option<Card>> {
        self.update_card(id, |card| card.add_like(user))
    }

    async fn remove_like(&self, id: CardId, user: UserId) -> StoreResult<Option<Card>> {
        self.update_card(id, |card| card.remove_like(user))
    }

    async fn close(&self) {}
}
