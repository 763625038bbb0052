//! The `diary_shares` relation. The owner of an entry is never a share
//! target: those calls are no-ops that report `false` without touching the
//! table.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::auth::models::UserSummary;
use crate::diary::models::DiaryEntry;

pub async fn share<'e>(
    executor: impl PgExecutor<'e>,
    entry: &DiaryEntry,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    if entry.is_owned_by(user_id) {
        return Ok(false);
    }

    let result = sqlx::query(
        r#"
        INSERT INTO diary_shares (diary_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT (diary_id, user_id) DO NOTHING
        "#,
    )
    .bind(entry.id)
    .bind(user_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn unshare<'e>(
    executor: impl PgExecutor<'e>,
    entry: &DiaryEntry,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    if entry.is_owned_by(user_id) {
        return Ok(false);
    }

    let result = sqlx::query("DELETE FROM diary_shares WHERE diary_id = $1 AND user_id = $2")
        .bind(entry.id)
        .bind(user_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn is_shared<'e>(
    executor: impl PgExecutor<'e>,
    entry: &DiaryEntry,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    if entry.is_owned_by(user_id) {
        return Ok(false);
    }

    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM diary_shares WHERE diary_id = $1 AND user_id = $2)",
    )
    .bind(entry.id)
    .bind(user_id)
    .fetch_one(executor)
    .await
}

/// Users the entry is shared with, by username.
pub async fn list_shared_users<'e>(
    executor: impl PgExecutor<'e>,
    entry_id: Uuid,
) -> Result<Vec<UserSummary>, sqlx::Error> {
    sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT u.id, u.username
        FROM diary_shares s
        INNER JOIN users u ON s.user_id = u.id
        WHERE s.diary_id = $1
        ORDER BY u.username
        "#,
    )
    .bind(entry_id)
    .fetch_all(executor)
    .await
}
