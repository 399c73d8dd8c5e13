use crate::error::{ServerError, ServerResult};
use crate::middleware::AuthUser;
use crate::state::AppState;
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::Response,
};
use serde::Deserialize;
use serde_json::{Value, json};
use sharebox_core::{FilePatch, FileRecord, ShareOutcome, UploadItem, UploadOutcome};

/// Multipart field carrying uploaded files
const UPLOAD_FIELD: &str = "files";

#[derive(Deserialize)]
pub struct ShareRequest {
    pub share_with: String,
}

#[derive(Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct ChangeOwnerRequest {
    pub new_owner: String,
}

/// POST /file
///
/// Responds 201 when at least one item was stored. When every item failed,
/// the status of the first failure is used.
pub async fn upload(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut multipart: Multipart,
) -> ServerResult<(StatusCode, Json<Value>)> {
    let mut items = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;
        items.push(UploadItem::new(name, content_type, data.to_vec()));
    }

    if items.is_empty() {
        return Err(ServerError::BadRequest(format!(
            "No files in multipart field '{UPLOAD_FIELD}'"
        )));
    }

    let outcomes = state.files.upload(&user, items).await;

    let body = serde_json::to_value(&outcomes).map_err(|e| ServerError::Internal(e.to_string()))?;

    let status = if outcomes.iter().any(UploadOutcome::is_stored) {
        StatusCode::CREATED
    } else {
        outcomes
            .into_iter()
            .find_map(UploadOutcome::into_failure)
            .map(|failure| ServerError::from(failure.error).status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    };

    Ok((status, Json(body)))
}

fn multipart_error(err: MultipartError) -> ServerError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(err.body_text())
    } else {
        ServerError::BadRequest(err.body_text())
    }
}

/// GET /file/{key}
pub async fn get_file(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(key): Path<String>,
) -> ServerResult<Json<FileRecord>> {
    Ok(Json(state.files.get_file(&user, &key).await?))
}

/// GET /file/{key}/download
pub async fn download(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(key): Path<String>,
) -> ServerResult<Response> {
    let download = state.files.download(&user, &key).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, &download.file.content_type)
        .header(header::CONTENT_LENGTH, download.data.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", disposition_name(&download.file.name)),
        )
        .body(Body::from(download.data))
        .map_err(|e| ServerError::Internal(e.to_string()))
}

/// Quote-safe filename for a Content-Disposition header
fn disposition_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// PATCH /file/{key}
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(key): Path<String>,
    Json(patch): Json<FilePatch>,
) -> ServerResult<Json<FileRecord>> {
    Ok(Json(state.files.update(&user, &key, patch).await?))
}

/// DELETE /file/{key} and PATCH /file/{key}/send_to_trash
pub async fn send_to_trash(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(key): Path<String>,
) -> ServerResult<Json<Value>> {
    state.files.send_to_trash(&user, &key).await?;
    Ok(Json(json!({
        "message": format!("File ({key}) sent to trash successfully")
    })))
}

/// POST /file/{key}/share
pub async fn share(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(key): Path<String>,
    Json(body): Json<ShareRequest>,
) -> ServerResult<(StatusCode, Json<Value>)> {
    let outcome = state.files.share(&user, &key, &body.share_with).await?;
    let status = match outcome {
        ShareOutcome::Created(_) => StatusCode::CREATED,
        ShareOutcome::AlreadyShared(_) => StatusCode::OK,
    };

    Ok((
        status,
        Json(json!({
            "message": format!("File ({key}) shared successfully"),
            "relation": outcome.relation(),
        })),
    ))
}

/// PATCH /file/{key}/rename
pub async fn rename(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(key): Path<String>,
    Json(body): Json<RenameRequest>,
) -> ServerResult<Json<FileRecord>> {
    Ok(Json(state.files.rename(&user, &key, &body.name).await?))
}

/// PATCH /file/{key}/change_owner
pub async fn change_owner(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(key): Path<String>,
    Json(body): Json<ChangeOwnerRequest>,
) -> ServerResult<Json<FileRecord>> {
    Ok(Json(
        state.files.change_owner(&user, &key, &body.new_owner).await?,
    ))
}

/// DELETE /file/{key}/stop_seeing
pub async fn stop_seeing(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(key): Path<String>,
) -> ServerResult<StatusCode> {
    state.files.stop_seeing(&user, &key).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /files
pub async fn list_files(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ServerResult<Json<Vec<FileRecord>>> {
    Ok(Json(state.files.list_files(&user).await?))
}

/// GET /files/owned
pub async fn list_owned(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ServerResult<Json<Vec<FileRecord>>> {
    Ok(Json(state.files.list_owned(&user).await?))
}

/// GET /files/shared
pub async fn list_shared(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ServerResult<Json<Vec<FileRecord>>> {
    Ok(Json(state.files.list_shared(&user).await?))
}
