use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{debug, warn};

use super::repo_types::{NewUser, User, UserChanges};

/// Storage-level failure. Unique violations are reported separately so the
/// service can tell a lost race from a broken database.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint `{constraint}` violated")]
    UniqueViolation { constraint: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::UniqueViolation {
                    constraint: db_err.constraint().unwrap_or("unknown").to_string(),
                }
            }
            other => StoreError::Other(anyhow::Error::new(other)),
        }
    }
}

/// Raw access to the `users` table. Every mutation is atomic: it either
/// commits fully or leaves the table untouched.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    /// Creation order; offset and limit are already clamped by the caller.
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>, StoreError>;
    async fn insert(&self, new: NewUser) -> Result<User, StoreError>;
    /// Writes only the columns present in `changes`. `None` if the row is gone.
    async fn update(&self, id: i64, changes: &UserChanges) -> Result<Option<User>, StoreError>;
    async fn delete(&self, id: i64) -> Result<Option<User>, StoreError>;
}

pub const USERNAME_CONSTRAINT: &str = "users_username_key";
pub const EMAIL_CONSTRAINT: &str = "users_email_key";

const COLUMNS: &str = "id, username, email, full_name, password_hash, created_at";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn find_where(&self, column: &str, value: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE {column} = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.db)
            .await
            .with_context(|| format!("find user by {}", column))?;
        Ok(user)
    }
}

/// Commit on success, roll back on failure. A failed rollback is only logged;
/// postgres discards the transaction when the connection drops it anyway.
async fn finish<T>(
    tx: Transaction<'_, Postgres>,
    res: Result<T, sqlx::Error>,
) -> Result<T, StoreError> {
    match res {
        Ok(v) => {
            tx.commit().await.context("commit tx")?;
            Ok(v)
        }
        Err(e) => {
            if let Err(rb) = tx.rollback().await {
                warn!(error = %rb, "rollback failed");
            }
            debug!(error = %e, "transaction rolled back");
            Err(e.into())
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("find user by id")?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.find_where("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.find_where("email", email).await
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM users ORDER BY id ASC LIMIT $1 OFFSET $2");
        let rows = sqlx::query_as::<_, User>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await
            .context("list users")?;
        Ok(rows)
    }

    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        let sql = format!(
            "INSERT INTO users (username, email, full_name, password_hash) \
             VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        );
        let res = sqlx::query_as::<_, User>(&sql)
            .bind(&new.username)
            .bind(&new.email)
            .bind(&new.full_name)
            .bind(&new.password_hash)
            .fetch_one(&mut *tx)
            .await;
        finish(tx, res).await
    }

    async fn update(&self, id: i64, changes: &UserChanges) -> Result<Option<User>, StoreError> {
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(username) = &changes.username {
                set.push("username = ").push_bind_unseparated(username.clone());
            }
            if let Some(email) = &changes.email {
                set.push("email = ").push_bind_unseparated(email.clone());
            }
            if let Some(full_name) = &changes.full_name {
                set.push("full_name = ").push_bind_unseparated(full_name.clone());
            }
            if let Some(password_hash) = &changes.password_hash {
                set.push("password_hash = ")
                    .push_bind_unseparated(password_hash.clone());
            }
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(format!(" RETURNING {COLUMNS}"));

        let mut tx = self.db.begin().await.context("begin tx")?;
        let res = qb
            .build_query_as::<User>()
            .fetch_optional(&mut *tx)
            .await;
        finish(tx, res).await
    }

    async fn delete(&self, id: i64) -> Result<Option<User>, StoreError> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        let sql = format!("DELETE FROM users WHERE id = $1 RETURNING {COLUMNS}");
        let res = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await;
        finish(tx, res).await
    }
}
