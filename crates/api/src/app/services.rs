//! Service wiring shared by the handlers.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;

use mesto_auth::{Hs256Jwt, PasswordError};
use mesto_core::{Card, CardView, UserId, UserSummary};
use mesto_infra::Store;

use crate::app::errors::ApiResult;
use crate::config::Environment;

pub struct AppServices {
    pub store: Arc<dyn Store>,
    pub jwt: Arc<Hs256Jwt>,
    pub environment: Environment,
}

impl AppServices {
    pub fn new(store: Arc<dyn Store>, jwt: Arc<Hs256Jwt>, environment: Environment) -> Self {
        Self {
            store,
            jwt,
            environment,
        }
    }

    /// Argon2 is CPU-bound; keep it off the async workers.
    pub async fn hash_password(&self, password: String) -> ApiResult<String> {
        run_blocking(move || mesto_auth::hash_password(&password)).await
    }

    pub async fn verify_password(&self, password: String, hash: String) -> ApiResult<bool> {
        run_blocking(move || mesto_auth::verify_password(&password, &hash)).await
    }

    pub fn issue_token(&self, user: UserId) -> ApiResult<String> {
        Ok(self.jwt.issue(user, Utc::now())?)
    }

    /// Expand one card (owner and likers) with a single batch lookup.
    pub async fn expand_card(&self, card: Card) -> ApiResult<CardView> {
        let mut views = self.expand_cards(vec![card]).await?;
        views
            .pop()
            .context("card expansion returned no card")
            .map_err(Into::into)
    }

    /// Expand cards with one batch lookup for every referenced user.
    pub async fn expand_cards(&self, cards: Vec<Card>) -> ApiResult<Vec<CardView>> {
        let mut ids: Vec<UserId> = cards.iter().flat_map(Card::referenced_users).collect();
        ids.sort();
        ids.dedup();

        let users: HashMap<UserId, UserSummary> = self
            .store
            .find_users(&ids)
            .await?
            .iter()
            .map(|u| (u.id, u.summary()))
            .collect();

        Ok(cards
            .into_iter()
            .map(|card| CardView::expand(card, &users))
            .collect())
    }
}

async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(f)
        .await
        .context("password task panicked")?;
    Ok(result?)
}
