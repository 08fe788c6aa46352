use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt;
use tokio_postgres::Row;

use crate::localization::Lang;
use crate::user_session::SessionState;

#[derive(Debug)]
pub enum StoreError {
    DatabaseError(Box<dyn Error + Send + Sync>),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DatabaseError(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl Error for StoreError {}

impl From<tokio_postgres::Error> for StoreError {
    fn from(err: tokio_postgres::Error) -> Self {
        StoreError::DatabaseError(Box::new(err))
    }
}

impl From<deadpool_postgres::PoolError> for StoreError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        StoreError::DatabaseError(Box::new(err))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: i64,
    pub language: Option<String>,
    pub balance: i32,
    pub referred_by: Option<i64>,
    pub subscribed: bool,
    pub state: SessionState,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn lang(&self) -> Option<Lang> {
        self.language.as_deref().and_then(Lang::parse)
    }
}

/// what an upsert did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// the row did not exist before
    pub created: bool,
    /// the referrer's balance was incremented
    pub referrer_credited: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ReferrerStats {
    pub user_id: i64,
    pub balance: i32,
    pub referred_users: i64,
}

/// per-user persistence used by the onboarding flow
#[async_trait]
pub trait UserStore: Send + Sync {
    /// inserts the user if absent, otherwise updates the language when one is given.
    ///
    /// `referred_by` is only written on insert, and only then is the referrer credited.
    async fn upsert(
        &self,
        user_id: i64,
        language: Option<Lang>,
        referred_by: Option<i64>,
    ) -> Result<UpsertOutcome, StoreError>;

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError>;

    async fn set_subscribed(&self, user_id: i64, subscribed: bool) -> Result<(), StoreError>;

    async fn set_state(&self, user_id: i64, state: SessionState) -> Result<(), StoreError>;

    async fn get_language(&self, user_id: i64) -> Result<Option<Lang>, StoreError> {
        Ok(self.get_user(user_id).await?.and_then(|user| user.lang()))
    }

    async fn get_subscribed(&self, user_id: i64) -> Result<bool, StoreError> {
        Ok(self
            .get_user(user_id)
            .await?
            .map(|user| user.subscribed)
            .unwrap_or(false))
    }

    async fn get_balance(&self, user_id: i64) -> Result<i32, StoreError> {
        Ok(self
            .get_user(user_id)
            .await?
            .map(|user| user.balance)
            .unwrap_or(0))
    }

    async fn get_state(&self, user_id: i64) -> Result<SessionState, StoreError> {
        Ok(self
            .get_user(user_id)
            .await?
            .map(|user| user.state)
            .unwrap_or_default())
    }
}

pub struct UserManager {
    pool: Pool,
}

impl UserManager {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    fn user_from_row(row: &Row) -> User {
        User {
            user_id: row.get(0),
            language: row.get(1),
            balance: row.get::<_, Option<i32>>(2).unwrap_or(0),
            referred_by: row.get(3),
            subscribed: row.get::<_, Option<bool>>(4).unwrap_or(false),
            state: SessionState::from_db(row.get::<_, Option<&str>>(5)),
            created_at: row.get(6),
        }
    }

    /// users with the highest balance, with how many users name them as referrer
    pub async fn top_referrers(&self, limit: i64) -> Result<Vec<ReferrerStats>, StoreError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT u.user_id, COALESCE(u.balance, 0), COUNT(r.user_id)
                 FROM users u
                 LEFT JOIN users r ON r.referred_by = u.user_id
                 WHERE COALESCE(u.balance, 0) > 0
                 GROUP BY u.user_id, u.balance
                 ORDER BY COALESCE(u.balance, 0) DESC, u.user_id
                 LIMIT $1",
                &[&limit],
            )
            .await?;

        Ok(rows
            .iter()
            .map(|row| ReferrerStats {
                user_id: row.get(0),
                balance: row.get(1),
                referred_users: row.get(2),
            })
            .collect())
    }
}

#[async_trait]
impl UserStore for UserManager {
    async fn upsert(
        &self,
        user_id: i64,
        language: Option<Lang>,
        referred_by: Option<i64>,
    ) -> Result<UpsertOutcome, StoreError> {
        let mut client = self.pool.get().await?;
        let transaction = client.transaction().await?;
        let language_code = language.map(|lang| lang.code());

        let created = transaction
            .query_opt(
                "INSERT INTO users (user_id, language, referred_by)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (user_id) DO NOTHING
                 RETURNING user_id",
                &[&user_id, &language_code, &referred_by],
            )
            .await?
            .is_some();

        if !created && language_code.is_some() {
            transaction
                .execute(
                    "UPDATE users SET language = $2, updated_at = NOW() WHERE user_id = $1",
                    &[&user_id, &language_code],
                )
                .await?;
        }

        let mut referrer_credited = false;
        if created {
            if let Some(referrer_id) = referred_by {
                // single statement so concurrent signups cannot lose an increment
                let updated = transaction
                    .execute(
                        "UPDATE users SET balance = COALESCE(balance, 0) + 1, updated_at = NOW() WHERE user_id = $1",
                        &[&referrer_id],
                    )
                    .await?;
                referrer_credited = updated > 0;
                if !referrer_credited {
                    info!(
                        "Referrer {} of new user {} does not exist, nothing credited",
                        referrer_id, user_id
                    );
                }
            }
        }

        transaction.commit().await?;

        if created {
            info!("Created new user: {} (referred by {:?})", user_id, referred_by);
        }
        if referrer_credited {
            info!("Credited referrer {} for new user {}", referred_by.unwrap_or_default(), user_id);
        }

        Ok(UpsertOutcome {
            created,
            referrer_credited,
        })
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT user_id, language, balance, referred_by, subscribed, state, created_at
                 FROM users WHERE user_id = $1",
                &[&user_id],
            )
            .await?;
        Ok(row.as_ref().map(Self::user_from_row))
    }

    async fn set_subscribed(&self, user_id: i64, subscribed: bool) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "UPDATE users SET subscribed = $2, updated_at = NOW() WHERE user_id = $1",
                &[&user_id, &subscribed],
            )
            .await?;
        Ok(())
    }

    async fn set_state(&self, user_id: i64, state: SessionState) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "UPDATE users SET state = $2, updated_at = NOW() WHERE user_id = $1",
                &[&user_id, &state.as_str()],
            )
            .await?;
        Ok(())
    }
}
