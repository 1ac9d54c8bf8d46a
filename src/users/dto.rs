use serde::{Deserialize, Serialize};

use super::patch::Patch;
use super::repo_types::{UserCandidate, UserPatch};

/// Request body for `POST /api/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub password: String,
}

impl From<CreateUserRequest> for UserCandidate {
    fn from(r: CreateUserRequest) -> Self {
        Self {
            username: r.username,
            email: r.email,
            full_name: r.full_name,
            password: r.password,
        }
    }
}

/// Request body for `PATCH /api/users/:id`. Missing keys are left untouched,
/// `"full_name": null` clears the name.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: Patch<String>,
    #[serde(default)]
    pub email: Patch<String>,
    #[serde(default)]
    pub full_name: Patch<Option<String>>,
    #[serde(default)]
    pub password: Patch<String>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(r: UpdateUserRequest) -> Self {
        Self {
            username: r.username,
            email: r.email,
            full_name: r.full_name,
            password: r.password,
        }
    }
}

/// Fields posted by the create and edit HTML forms.
#[derive(Debug, Default, Deserialize)]
pub struct UserForm {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn blank_to_none(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

impl UserForm {
    pub fn into_candidate(self) -> UserCandidate {
        UserCandidate {
            username: self.username,
            email: self.email,
            full_name: blank_to_none(self.full_name),
            password: self.password.unwrap_or_default(),
        }
    }

    /// The edit form always posts every field: an empty full name clears it,
    /// an empty password keeps the current one.
    pub fn into_patch(self) -> UserPatch {
        UserPatch {
            username: Patch::Set(self.username),
            email: Patch::Set(self.email),
            full_name: Patch::Set(blank_to_none(self.full_name)),
            password: self.password.filter(|p| !p.is_empty()).into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: default_limit(),
        }
    }
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
