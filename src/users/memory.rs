//! In-memory `UserStore`, used when no database is configured and in tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::repo::{StoreError, UserStore, EMAIL_CONSTRAINT, USERNAME_CONSTRAINT};
use super::repo_types::{NewUser, User, UserChanges};

#[derive(Debug, Default)]
struct Inner {
    last_id: i64,
    users: BTreeMap<i64, User>,
}

impl Inner {
    /// Mirrors the unique indexes of the postgres schema.
    fn check_unique(&self, id: Option<i64>, username: &str, email: &str) -> Result<(), StoreError> {
        for other in self.users.values().filter(|u| Some(u.id) != id) {
            if other.username == username {
                return Err(StoreError::UniqueViolation {
                    constraint: USERNAME_CONSTRAINT.to_string(),
                });
            }
            if other.email == email {
                return Err(StoreError::UniqueViolation {
                    constraint: EMAIL_CONSTRAINT.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        inner.check_unique(None, &new.username, &new.email)?;

        // ids are never reused, like a postgres sequence
        inner.last_id += 1;
        let user = User {
            id: inner.last_id,
            username: new.username,
            email: new.email,
            full_name: new.full_name,
            password_hash: new.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: i64, changes: &UserChanges) -> Result<Option<User>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(current) = inner.users.get(&id) else {
            return Ok(None);
        };
        let username = changes.username.as_deref().unwrap_or(&current.username);
        let email = changes.email.as_deref().unwrap_or(&current.email);
        inner.check_unique(Some(id), username, email)?;

        let Some(stored) = inner.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = &changes.username {
            stored.username = username.clone();
        }
        if let Some(email) = &changes.email {
            stored.email = email.clone();
        }
        if let Some(full_name) = &changes.full_name {
            stored.full_name = full_name.clone();
        }
        if let Some(password_hash) = &changes.password_hash {
            stored.password_hash = password_hash.clone();
        }
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.inner.write().await.users.remove(&id))
    }
}
