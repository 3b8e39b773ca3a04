use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, instrument};

use crate::{
    auth::{
        dto::{Credentials, MeResponse, MessageResponse, TokenResponse},
        extractors::AuthUser,
        services::{login_user, register_user},
    },
    error::AppError,
    extract::FormOrJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    FormOrJson(payload): FormOrJson<Credentials>,
) -> Result<Json<MessageResponse>, AppError> {
    register_user(&state, payload, peer.map(|ConnectInfo(addr)| addr.ip())).await?;
    Ok(Json(MessageResponse {
        message: "Registration successful".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    FormOrJson(payload): FormOrJson<Credentials>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = login_user(&state, payload, peer.map(|ConnectInfo(addr)| addr.ip())).await?;
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip_all)]
pub async fn get_me(AuthUser(username): AuthUser) -> Json<MeResponse> {
    debug!(username = %username, "whoami");
    Json(MeResponse { username })
}
