use crate::error::ServerResult;
use crate::middleware::AuthUser;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use sharebox_core::FileRecord;

/// GET /trash
pub async fn list_trash(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ServerResult<Json<Vec<FileRecord>>> {
    Ok(Json(state.files.list_trash(&user).await?))
}

/// PATCH /trash/{key}
pub async fn restore(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(key): Path<String>,
) -> ServerResult<Json<FileRecord>> {
    Ok(Json(state.files.restore(&user, &key).await?))
}

/// DELETE /trash/{key}
pub async fn permanent_delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(key): Path<String>,
) -> ServerResult<Json<Value>> {
    state.files.permanent_delete(&user, &key).await?;
    Ok(Json(json!({
        "message": format!("File \"{key}\" deleted successfully")
    })))
}
