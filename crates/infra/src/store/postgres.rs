//! Postgres-backed document store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Duplicate { key: "email" }` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / network / decode | N/A | `Backend` |
//!
//! Like/unlike are single `UPDATE` statements (`array_append` guarded by `ANY`, `array_remove`),
//! so concurrent calls on one card serialize on the row lock and never lose an update.

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use mesto_core::{Card, CardId, Credentials, NewCard, NewUser, User, UserId, UserPatch};

use super::r#trait::{Store, StoreError, StoreResult};

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        about TEXT NOT NULL,
        avatar TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS cards (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        link TEXT NOT NULL,
        owner UUID NOT NULL,
        likes UUID[] NOT NULL DEFAULT '{}',
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS cards_created_at_idx ON cards (created_at, id)",
];

const USER_COLUMNS: &str = "id, name, about, avatar, email";
const CARD_COLUMNS: &str = "id, name, link, owner, likes, created_at";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `url` and create the tables if they are missing.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Idempotent schema bootstrap.
    pub async fn migrate(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }

    async fn fetch_card(&self, operation: &str, id: CardId) -> StoreResult<Option<Card>> {
        let row = sqlx::query(&format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = $1"))
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        row.map(|r| card_from_row(&r)).transpose()
    }
}

#[async_trait::async_trait]
impl Store for PostgresStore {
    #[instrument(skip(self), err)]
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;
        rows.iter().map(user_from_row).collect()
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user", e))?;
        row.map(|r| user_from_row(&r)).transpose()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn find_users(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"))
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_users", e))?;
        rows.iter().map(user_from_row).collect()
    }

    #[instrument(skip(self, email), err)]
    async fn find_credentials_by_email(&self, email: &str) -> StoreResult<Option<Credentials>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_credentials_by_email", e))?;

        row.map(|r| {
            Ok(Credentials {
                user: user_from_row(&r)?,
                password_hash: r
                    .try_get("password_hash")
                    .map_err(|e| map_sqlx_error("find_credentials_by_email", e))?,
            })
        })
        .transpose()
    }

    #[instrument(skip(self, new_user), err)]
    async fn insert_user(&self, new_user: NewUser) -> StoreResult<User> {
        let Credentials { user, password_hash } = new_user.into_credentials(UserId::new())?;
        sqlx::query(
            "INSERT INTO users (id, name, about, avatar, email, password_hash) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(*user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.about)
        .bind(&user.avatar)
        .bind(&user.email)
        .bind(&password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(user)
    }

    #[instrument(skip(self, patch), fields(user_id = %id), err)]
    async fn update_user(&self, id: UserId, patch: UserPatch) -> StoreResult<Option<User>> {
        // Validate the merged record before writing, as the in-memory store does.
        let Some(current) = self.find_user(id).await? else {
            return Ok(None);
        };
        let next = current.patched(&patch)?;

        let row = sqlx::query(&format!(
            "UPDATE users SET name = $2, about = $3, avatar = $4 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(*id.as_uuid())
        .bind(&next.name)
        .bind(&next.about)
        .bind(&next.avatar)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_user", e))?;
        row.map(|r| user_from_row(&r)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_cards(&self) -> StoreResult<Vec<Card>> {
        let rows = sqlx::query(&format!("SELECT {CARD_COLUMNS} FROM cards ORDER BY created_at, id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_cards", e))?;
        rows.iter().map(card_from_row).collect()
    }

    #[instrument(skip(self), fields(card_id = %id), err)]
    async fn find_card(&self, id: CardId) -> StoreResult<Option<Card>> {
        self.fetch_card("find_card", id).await
    }

    #[instrument(skip(self, new_card), err)]
    async fn insert_card(&self, new_card: NewCard) -> StoreResult<Card> {
        let card = Card::create(CardId::new(), new_card, Utc::now())?;
        let likes: Vec<Uuid> = card.likes.iter().map(|u| *u.as_uuid()).collect();
        sqlx::query(
            "INSERT INTO cards (id, name, link, owner, likes, created_at) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(*card.id.as_uuid())
        .bind(&card.name)
        .bind(&card.link)
        .bind(*card.owner.as_uuid())
        .bind(likes)
        .bind(card.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_card", e))?;
        Ok(card)
    }

    #[instrument(skip(self), fields(card_id = %id), err)]
    async fn delete_card(&self, id: CardId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_card", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(card_id = %id, user_id = %user), err)]
    async fn add_like(&self, id: CardId, user: UserId) -> StoreResult<Option<Card>> {
        sqlx::query(
            "UPDATE cards SET likes = array_append(likes, $2) WHERE id = $1 AND NOT ($2 = ANY(likes))",
        )
        .bind(*id.as_uuid())
        .bind(*user.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("add_like", e))?;
        self.fetch_card("add_like", id).await
    }

    #[instrument(skip(self), fields(card_id = %id, user_id = %user), err)]
    async fn remove_like(&self, id: CardId, user: UserId) -> StoreResult<Option<Card>> {
        let row = sqlx::query(&format!(
            "UPDATE cards SET likes = array_remove(likes, $2) WHERE id = $1 RETURNING {CARD_COLUMNS}"
        ))
        .bind(*id.as_uuid())
        .bind(*user.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("remove_like", e))?;
        row.map(|r| card_from_row(&r)).transpose()
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    let decode = |e| map_sqlx_error("decode_user", e);
    Ok(User {
        id: UserId::from_uuid(row.try_get("id").map_err(decode)?),
        name: row.try_get("name").map_err(decode)?,
        about: row.try_get("about").map_err(decode)?,
        avatar: row.try_get("avatar").map_err(decode)?,
        email: row.try_get("email").map_err(decode)?,
    })
}

fn card_from_row(row: &PgRow) -> StoreResult<Card> {
    let decode = |e| map_sqlx_error("decode_card", e);
    let likes: Vec<Uuid> = row.try_get("likes").map_err(decode)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(decode)?;
    Ok(Card {
        id: CardId::from_uuid(row.try_get("id").map_err(decode)?),
        name: row.try_get("name").map_err(decode)?,
        link: row.try_get("link").map_err(decode)?,
        owner: UserId::from_uuid(row.try_get("owner").map_err(decode)?),
        likes: likes.into_iter().map(UserId::from_uuid).collect(),
        created_at,
    })
}

/// Map SQLx errors to `StoreError`. Only the users table carries a unique index (email).
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return StoreError::Duplicate { key: "email" };
        }
    }
    StoreError::backend(anyhow::Error::new(err).context(format!("{operation} failed")))
}
