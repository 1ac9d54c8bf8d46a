use crate::state::AppState;
use axum::Router;

mod dto;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod pages;
pub mod password;
pub mod patch;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod validation;
mod views;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(pages::page_routes())
        .merge(handlers::api_routes())
}
