use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::{
    auth::{extractor::AuthenticatedUser, models::UserSummary},
    diary::repository as diaries,
    error::{AppError, AppResult},
    sharing::{
        models::{ReconcileReport, ShareRequest, SharedUsersQuery},
        reconcile, repository,
    },
    AppState,
};

pub async fn share_diary(
    State(state): State<Arc<AppState>>,
    caller: AuthenticatedUser,
    Json(payload): Json<ShareRequest>,
) -> AppResult<Json<ReconcileReport>> {
    let user_id = caller.user_id()?;
    let report = reconcile::reconcile(&state.db, user_id, payload.id, &payload.usernames).await?;
    Ok(Json(report))
}

pub async fn get_shared_users(
    State(state): State<Arc<AppState>>,
    caller: AuthenticatedUser,
    Query(query): Query<SharedUsersQuery>,
) -> AppResult<Json<Vec<UserSummary>>> {
    let user_id = caller.user_id()?;

    let entry = diaries::find_by_id(&state.db, query.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Diary entry not found".into()))?;

    if !entry.is_owned_by(user_id) {
        return Err(AppError::Forbidden(
            "You can only view shared users for diaries you own".into(),
        ));
    }

    Ok(Json(repository::list_shared_users(&state.db, entry.id).await?))
}
