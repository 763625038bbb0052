use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::extractor::AuthenticatedUser,
    cache,
    diary::service::{self, DiaryDraft, TITLE_MAX_CHARS},
    error::{AppError, AppResult},
    upload::{
        progress::{UploadProgress, UploadStatus},
        validate::{validate_upload, UploadError},
    },
    AppState,
};

const FALLBACK_TITLE: &str = "Uploaded entry";

/// Title for an upload without an explicit one: the file name minus its extension.
fn title_from_file_name(file_name: Option<&str>) -> String {
    let stem = file_name
        .map(|name| match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => name,
        })
        .map(str::trim)
        .unwrap_or_default();

    if stem.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        stem.chars().take(TITLE_MAX_CHARS).collect()
    }
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(err.body_text())
}

pub async fn upload_diary(
    State(state): State<Arc<AppState>>,
    caller: AuthenticatedUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Value>)> {
    let user_id = caller.user_id()?;

    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut title: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(ToString::to_string);
                content_type = field.content_type().map(ToString::to_string);
                file_data = Some(field.bytes().await.map_err(bad_multipart)?.to_vec());
            }
            "title" => {
                let text = field.text().await.map_err(bad_multipart)?;
                if !text.trim().is_empty() {
                    title = Some(text);
                }
            }
            _ => {}
        }
    }

    let data = file_data.ok_or(UploadError::MissingFile)?;
    let content = validate_upload(&data, content_type.as_deref(), state.config.upload_max_bytes)?;
    let title = title.unwrap_or_else(|| title_from_file_name(file_name.as_deref()));

    let draft = DiaryDraft::new(title, content);
    draft.validate()?;

    let upload_id = state.uploads.start(user_id).await;

    tracing::info!(
        upload_id = %upload_id,
        user_id   = %user_id,
        bytes     = data.len(),
        file_name = ?file_name,
        "Upload accepted"
    );

    tokio::spawn(ingest(state, upload_id, user_id, draft));

    Ok((StatusCode::ACCEPTED, Json(json!({ "upload_id": upload_id }))))
}

async fn ingest(state: Arc<AppState>, upload_id: Uuid, owner: Uuid, draft: DiaryDraft) {
    state.uploads.advance(upload_id, UploadStatus::Analyzing, 50).await;

    match service::create_entry(&state.db, state.classifier.as_ref(), owner, draft).await {
        Ok(entry) => {
            cache::mood_changed(&state.redis, &owner).await;
            state.uploads.complete(upload_id, entry.id).await;
            tracing::info!(upload_id = %upload_id, entry_id = %entry.id, "Upload ingested");
        }
        Err(e) => {
            tracing::warn!(upload_id = %upload_id, error = %e, "Upload ingestion failed");
            state.uploads.fail(upload_id, e.to_string()).await;
        }
    }
}

pub async fn get_upload_progress(
    State(state): State<Arc<AppState>>,
    caller: AuthenticatedUser,
    Path(upload_id): Path<Uuid>,
) -> AppResult<Json<UploadProgress>> {
    let user_id = caller.user_id()?;

    state
        .uploads
        .poll(upload_id, user_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Upload not found".into()))
}
