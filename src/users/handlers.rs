use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{error::ApiError, state::AppState};

use super::dto::{CreateUserRequest, MessageResponse, Pagination, UpdateUserRequest};
use super::error::UserError;
use super::repo_types::User;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.users.list(p.offset, p.limit).await?;
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    let user = state.users.get_by_id(id).await?.ok_or(UserError::NotFound)?;
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.users.create(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .users
        .update(id, payload.into())
        .await?
        .ok_or(UserError::NotFound)?;
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.users.delete(id).await?.ok_or(UserError::NotFound)?;
    Ok(Json(MessageResponse {
        message: "User deleted successfully".into(),
    }))
}
