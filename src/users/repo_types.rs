use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

use super::patch::Patch;

/// User record in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never exposed
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Row to insert; id and created_at are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub password_hash: String,
}

/// Candidate for creation, still holding the plaintext password.
#[derive(Debug, Clone)]
pub struct UserCandidate {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub password: String,
}

/// Columns to overwrite on an existing row. `None` leaves the column as it is
/// in the database at write time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<Option<String>>,
    pub password_hash: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.full_name.is_none()
            && self.password_hash.is_none()
    }
}

/// Partial update. Only `Set` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Patch<String>,
    pub email: Patch<String>,
    pub full_name: Patch<Option<String>>,
    pub password: Patch<String>,
}
