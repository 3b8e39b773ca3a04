use crate::state::AppState;
use axum::Router;

pub mod captcha;
mod claims;
mod dto;
mod extractors;
mod handlers;
pub mod jwt;
mod password;
pub mod repo;
pub mod repo_types;
mod services;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
}
