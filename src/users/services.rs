use std::sync::Arc;

use tracing::{info, warn};

use super::error::UserError;
use super::password::PasswordHasher;
use super::patch::Patch;
use super::repo::{StoreError, UserStore};
use super::repo_types::{NewUser, User, UserCandidate, UserChanges, UserPatch};
use super::validation::{validate_email, validate_full_name, validate_password, validate_username};

pub const MAX_PAGE_SIZE: i64 = 1000;

fn storage(e: StoreError) -> UserError {
    match e {
        StoreError::Other(e) => UserError::Storage(e),
        // lookups never write, so a unique violation here means the store is confused
        e @ StoreError::UniqueViolation { .. } => UserError::Storage(anyhow::Error::new(e)),
    }
}

/// User lifecycle: validation, duplicate checks, hashing and persistence.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    #[cfg(test)]
    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, UserError> {
        self.store.find_by_id(id).await.map_err(storage)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, UserError> {
        self.store.find_by_username(username).await.map_err(storage)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        self.store.find_by_email(email).await.map_err(storage)
    }

    /// One page in creation order. Out-of-range bounds clamp instead of failing.
    pub async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>, UserError> {
        let offset = offset.max(0);
        let limit = limit.clamp(0, MAX_PAGE_SIZE);
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.store.list(offset, limit).await.map_err(storage)
    }

    pub async fn create(&self, candidate: UserCandidate) -> Result<User, UserError> {
        validate_username(&candidate.username)?;
        validate_email(&candidate.email)?;
        validate_full_name(candidate.full_name.as_deref())?;
        validate_password(&candidate.password)?;

        if self.get_by_username(&candidate.username).await?.is_some() {
            warn!(username = %candidate.username, "username already taken");
            return Err(UserError::DuplicateUsername);
        }
        if self.get_by_email(&candidate.email).await?.is_some() {
            warn!(email = %candidate.email, "email already taken");
            return Err(UserError::DuplicateEmail);
        }

        let password_hash = self
            .hasher
            .hash_password(&candidate.password)
            .map_err(UserError::Hashing)?;

        let new = NewUser {
            username: candidate.username,
            email: candidate.email,
            full_name: candidate.full_name,
            password_hash,
        };
        let user = self.store.insert(new).await.map_err(|e| match e {
            StoreError::UniqueViolation { constraint } => {
                warn!(%constraint, "concurrent create hit unique constraint");
                UserError::DuplicateConstraint
            }
            StoreError::Other(e) => UserError::Storage(e),
        })?;

        info!(user_id = user.id, username = %user.username, "user created");
        Ok(user)
    }

    /// Applies the `Set` fields of `patch`. `Ok(None)` when no such user.
    pub async fn update(&self, id: i64, patch: UserPatch) -> Result<Option<User>, UserError> {
        if let Some(username) = patch.username.as_set() {
            validate_username(username)?;
        }
        if let Some(email) = patch.email.as_set() {
            validate_email(email)?;
        }
        if let Some(full_name) = patch.full_name.as_set() {
            validate_full_name(full_name.as_deref())?;
        }
        // an empty password means "keep the current one"
        let new_password = match &patch.password {
            Patch::Set(p) if !p.is_empty() => Some(validate_password(p)?),
            _ => None,
        };

        let Some(current) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let mut changes = UserChanges::default();

        if let Patch::Set(username) = patch.username {
            if username != current.username {
                if let Some(other) = self.get_by_username(&username).await? {
                    warn!(user_id = id, other_id = other.id, %username, "username already taken");
                    return Err(UserError::DuplicateUsername);
                }
                changes.username = Some(username);
            }
        }
        if let Patch::Set(email) = patch.email {
            if email != current.email {
                if let Some(other) = self.get_by_email(&email).await? {
                    warn!(user_id = id, other_id = other.id, %email, "email already taken");
                    return Err(UserError::DuplicateEmail);
                }
                changes.email = Some(email);
            }
        }
        if let Patch::Set(full_name) = patch.full_name {
            if full_name != current.full_name {
                changes.full_name = Some(full_name);
            }
        }
        if let Some(password) = new_password {
            let hash = self
                .hasher
                .hash_password(password)
                .map_err(UserError::Hashing)?;
            changes.password_hash = Some(hash);
        }

        if changes.is_empty() {
            return Ok(Some(current));
        }

        let updated = self.store.update(id, &changes).await.map_err(|e| match e {
            StoreError::UniqueViolation { constraint } => {
                warn!(user_id = id, %constraint, "concurrent update hit unique constraint");
                UserError::ConstraintViolation
            }
            StoreError::Other(e) => UserError::Storage(e),
        })?;

        if let Some(user) = &updated {
            info!(user_id = user.id, username = %user.username, "user updated");
        }
        Ok(updated)
    }

    /// Hard delete. Returns the record as it was before removal.
    pub async fn delete(&self, id: i64) -> Result<Option<User>, UserError> {
        let deleted = self.store.delete(id).await.map_err(storage)?;
        if let Some(user) = &deleted {
            info!(user_id = user.id, username = %user.username, "user deleted");
        }
        Ok(deleted)
    }
}
