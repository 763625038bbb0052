//! Query functions over `diary_entries`.
//!
//! Every function takes an executor so callers decide whether it runs on the
//! pool or inside a transaction.

use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgExecutor};
use uuid::Uuid;

use crate::diary::models::{DiaryEntry, DiaryListRow};
use crate::emotion::EmotionRecord;
use crate::mood::models::MoodSample;

pub async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    owner: Uuid,
    title: &str,
    content: &str,
    record: &EmotionRecord,
) -> Result<DiaryEntry, sqlx::Error> {
    sqlx::query_as::<_, DiaryEntry>(
        r#"
        INSERT INTO diary_entries
            (id, owner, title, content, dominant_label, dominant_score, emotion_scores, analyzed)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(owner)
    .bind(title)
    .bind(content)
    .bind(record.dominant_label.as_deref())
    .bind(record.dominant_score)
    .bind(record.all_scores.as_ref().map(Json))
    .bind(record.analyzed)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<DiaryEntry>, sqlx::Error> {
    sqlx::query_as::<_, DiaryEntry>("SELECT * FROM diary_entries WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Row-locks the entry until the surrounding transaction ends.
pub async fn find_by_id_for_update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<DiaryEntry>, sqlx::Error> {
    sqlx::query_as::<_, DiaryEntry>("SELECT * FROM diary_entries WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Rewrites text and emotion record together.
pub async fn update_with_analysis<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    title: &str,
    content: &str,
    record: &EmotionRecord,
) -> Result<DiaryEntry, sqlx::Error> {
    sqlx::query_as::<_, DiaryEntry>(
        r#"
        UPDATE diary_entries
        SET title = $1,
            content = $2,
            dominant_label = $3,
            dominant_score = $4,
            emotion_scores = $5,
            analyzed = $6,
            updated_at = now()
        WHERE id = $7
        RETURNING *
        "#,
    )
    .bind(title)
    .bind(content)
    .bind(record.dominant_label.as_deref())
    .bind(record.dominant_score)
    .bind(record.all_scores.as_ref().map(Json))
    .bind(record.analyzed)
    .bind(id)
    .fetch_one(executor)
    .await
}

/// Content is unchanged, so the emotion record stays as it is.
pub async fn update_title<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    title: &str,
) -> Result<DiaryEntry, sqlx::Error> {
    sqlx::query_as::<_, DiaryEntry>(
        r#"
        UPDATE diary_entries
        SET title = $1,
            updated_at = now()
        WHERE id = $2
        RETURNING *
        "#,
    )
    .bind(title)
    .bind(id)
    .fetch_one(executor)
    .await
}

/// Sharing rows go with the entry (`ON DELETE CASCADE`).
pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM diary_entries WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Entries the user owns or that were shared with them, newest first.
pub async fn list_visible_to<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
) -> Result<Vec<DiaryListRow>, sqlx::Error> {
    sqlx::query_as::<_, DiaryListRow>(
        r#"
        SELECT
            d.id,
            d.owner,
            u.username AS owner_name,
            d.title,
            d.dominant_label,
            d.dominant_score,
            d.created_at,
            d.updated_at
        FROM diary_entries d
        INNER JOIN users u ON d.owner = u.id
        WHERE d.owner = $1
           OR EXISTS (
               SELECT 1 FROM diary_shares s
               WHERE s.diary_id = d.id AND s.user_id = $1
           )
        ORDER BY d.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

/// Labelled entries of `owner` created at or after `since`, oldest first.
pub async fn mood_samples_since<'e>(
    executor: impl PgExecutor<'e>,
    owner: Uuid,
    since: DateTime<Utc>,
) -> Result<Vec<MoodSample>, sqlx::Error> {
    sqlx::query_as::<_, MoodSample>(
        r#"
        SELECT created_at, dominant_label
        FROM diary_entries
        WHERE owner = $1
          AND dominant_label IS NOT NULL
          AND created_at >= $2
        ORDER BY created_at
        "#,
    )
    .bind(owner)
    .bind(since)
    .fetch_all(executor)
    .await
}
