use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::{
    auth::extractor::AuthenticatedUser,
    cache,
    diary::{
        models::{CreateDiaryRequest, DeleteDiaryRequest, DiaryListItem, DiaryQuery, DiaryResponse},
        repository,
        service::{self, DiaryDraft},
    },
    error::AppResult,
    AppState,
};

pub async fn create_or_update_diary(
    State(state): State<Arc<AppState>>,
    caller: AuthenticatedUser,
    Json(payload): Json<CreateDiaryRequest>,
) -> AppResult<(StatusCode, Json<DiaryResponse>)> {
    let user_id = caller.user_id()?;
    let draft = DiaryDraft::new(payload.title, payload.content);

    let (status, entry) = match payload.id {
        Some(id) => (
            StatusCode::OK,
            service::edit_entry(&state.db, state.classifier.as_ref(), user_id, id, draft).await?,
        ),
        None => (
            StatusCode::CREATED,
            service::create_entry(&state.db, state.classifier.as_ref(), user_id, draft).await?,
        ),
    };

    cache::mood_changed(&state.redis, &user_id).await;

    Ok((status, Json(entry.into())))
}

pub async fn get_diary(
    State(state): State<Arc<AppState>>,
    caller: AuthenticatedUser,
    Query(query): Query<DiaryQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let user_id = caller.user_id()?;

    if let Some(id) = query.id {
        let entry = service::get_visible_entry(&state.db, user_id, id).await?;
        Ok(Json(serde_json::json!(DiaryResponse::from(entry))))
    } else {
        let items: Vec<DiaryListItem> = repository::list_visible_to(&state.db, user_id)
            .await?
            .into_iter()
            .map(|row| DiaryListItem::from_row(row, user_id))
            .collect();
        Ok(Json(serde_json::json!({ "diaries": items })))
    }
}

pub async fn delete_diary(
    State(state): State<Arc<AppState>>,
    caller: AuthenticatedUser,
    Json(payload): Json<DeleteDiaryRequest>,
) -> AppResult<StatusCode> {
    let user_id = caller.user_id()?;

    service::delete_entry(&state.db, user_id, payload.id).await?;

    cache::mood_changed(&state.redis, &user_id).await;

    Ok(StatusCode::NO_CONTENT)
}
