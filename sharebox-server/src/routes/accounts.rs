use crate::error::ServerResult;
use crate::middleware::AuthUser;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sharebox_core::LoginToken;

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct UsersResponse {
    pub users: Vec<String>,
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> ServerResult<(StatusCode, Json<Value>)> {
    state.accounts.register(&body.username, &body.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully" })),
    ))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> ServerResult<Json<LoginToken>> {
    let token = state.accounts.login(&body.username, &body.password).await?;
    Ok(Json(token))
}

/// GET /users
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
) -> ServerResult<Json<UsersResponse>> {
    let users = state.accounts.list_usernames().await?;
    Ok(Json(UsersResponse { users }))
}
