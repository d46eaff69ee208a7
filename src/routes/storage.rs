use std::path::{Component, Path as FsPath, PathBuf};

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, put},
};
use serde_json::json;

use crate::db::auth_db;
use crate::routes::auth::bearer_token;
use crate::state::AppState;

// Object keys are caller-chosen ("messages/<ts>-<suffix>-<name>"); anything
// that would escape the bucket directory is rejected.
fn safe_object_path(objects_dir: &FsPath, bucket: &str, key: &str) -> Option<PathBuf> {
    if bucket.is_empty() || key.is_empty() {
        return None;
    }
    let relative = FsPath::new(bucket).join(key);
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(objects_dir.join(relative))
}

async fn put_object(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let authorized = match bearer_token(&headers) {
        Some(token) => matches!(
            auth_db::email_for_token(&state.db, token).await,
            Ok(Some(_))
        ),
        None => false,
    };
    if !authorized {
        return (StatusCode::UNAUTHORIZED, "Missing or invalid bearer token").into_response();
    }

    let mut key = String::new();
    let mut file_data: Option<Vec<u8>> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name().unwrap_or("") {
            "key" => key = field.text().await.unwrap_or_default(),
            "file" => match field.bytes().await {
                Ok(bytes) => file_data = Some(bytes.to_vec()),
                Err(e) => {
                    tracing::error!("Failed to read uploaded object: {}", e);
                    return StatusCode::BAD_REQUEST.into_response();
                }
            },
            _ => {}
        }
    }

    let Some(data) = file_data else {
        return (StatusCode::BAD_REQUEST, "No file posted").into_response();
    };

    if data.len() as u64 > state.config.max_upload_size_bytes {
        return (StatusCode::PAYLOAD_TOO_LARGE, "The posted object is too large")
            .into_response();
    }

    let Some(dest_path) = safe_object_path(&state.config.objects_dir, &bucket, &key) else {
        return (StatusCode::BAD_REQUEST, "Invalid object key").into_response();
    };

    if let Some(parent) = dest_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }
    if let Err(e) = tokio::fs::write(&dest_path, &data).await {
        tracing::error!("Failed to write object {:?}: {}", dest_path, e);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    Json(json!({ "key": key, "size": data.len() })).into_response()
}

async fn get_object(
    State(state): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
) -> impl IntoResponse {
    let Some(path) = safe_object_path(&state.config.objects_dir, &bucket, &key) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let body = match tokio::fs::read(&path).await {
        Ok(data) => data,
        Err(_) => return StatusCode::NOT_FOUND.into_response(),
    };

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/octet-stream")],
        body,
    )
        .into_response()
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/storage/buckets/{bucket}/objects", put(put_object))
        .route("/storage/buckets/{bucket}/objects/{key}", get(get_object))
}
