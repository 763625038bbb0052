use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::{
    auth::extractor::AuthenticatedUser,
    cache::{self, CacheService},
    diary::repository,
    error::AppResult,
    mood::{
        aggregate::{self, DayWindow, MOOD_INDEX_DAYS},
        models::{MoodIndex, TimelineQuery, TimelinePoint},
    },
    AppState,
};

pub async fn get_timeline(
    State(state): State<Arc<AppState>>,
    caller: AuthenticatedUser,
    Query(query): Query<TimelineQuery>,
) -> AppResult<Json<Vec<TimelinePoint>>> {
    let user_id = caller.user_id()?;
    let offset = state.config.mood_utc_offset;
    let days = aggregate::parse_window_days(query.days.as_deref());
    let today = aggregate::local_date(Utc::now(), offset);

    // read before the query; a write landing mid-query retires this key
    let mut redis = state.redis.clone();
    let key = CacheService::mood_generation(&mut redis, &user_id)
        .await
        .ok()
        .map(|generation| cache::timeline_key(&user_id, generation, today, days));
    if let Some(key) = &key {
        if let Ok(Some(points)) = CacheService::get_mood_report(&mut redis, key).await {
            return Ok(Json(points));
        }
    }

    let window = DayWindow::trailing(today, days);
    let samples = repository::mood_samples_since(&state.db, user_id, window.starts_at(offset)).await?;
    let points = aggregate::timeline(&samples, window, offset);

    tracing::debug!(user_id = %user_id, days, rows = points.len(), "Mood timeline computed");

    if let Some(key) = &key {
        let _ = CacheService::cache_mood_report(&mut redis, key, &points).await;
    }

    Ok(Json(points))
}

pub async fn get_mood_index(
    State(state): State<Arc<AppState>>,
    caller: AuthenticatedUser,
) -> AppResult<Json<MoodIndex>> {
    let user_id = caller.user_id()?;
    let offset = state.config.mood_utc_offset;
    let today = aggregate::local_date(Utc::now(), offset);

    let mut redis = state.redis.clone();
    let key = CacheService::mood_generation(&mut redis, &user_id)
        .await
        .ok()
        .map(|generation| cache::mood_index_key(&user_id, generation, today));
    if let Some(key) = &key {
        if let Ok(Some(index)) = CacheService::get_mood_report(&mut redis, key).await {
            return Ok(Json(index));
        }
    }

    let window = DayWindow::trailing(today, MOOD_INDEX_DAYS);
    let samples = repository::mood_samples_since(&state.db, user_id, window.starts_at(offset)).await?;
    let index = aggregate::mood_index(&samples, window, offset);

    tracing::debug!(user_id = %user_id, value = index.value, "Mood index computed");

    if let Some(key) = &key {
        let _ = CacheService::cache_mood_report(&mut redis, key, &index).await;
    }

    Ok(Json(index))
}
