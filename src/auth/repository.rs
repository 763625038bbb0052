//! User lookups shared by the auth handlers and the sharing relation.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::auth::models::{User, UserSummary};

pub async fn find_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn find_by_username<'e>(
    executor: impl PgExecutor<'e>,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(executor)
        .await
}

/// Returns `(username_taken, email_taken)`.
pub async fn identity_taken<'e>(
    executor: impl PgExecutor<'e>,
    username: &str,
    email: &str,
) -> Result<(bool, bool), sqlx::Error> {
    sqlx::query_as::<_, (bool, bool)>(
        r#"
        SELECT
            EXISTS (SELECT 1 FROM users WHERE username = $1),
            EXISTS (SELECT 1 FROM users WHERE email = $2)
        "#,
    )
    .bind(username)
    .bind(email)
    .fetch_one(executor)
    .await
}

pub async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, username, email, password_hash)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .fetch_one(executor)
    .await
}

pub async fn list_active<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<UserSummary>, sqlx::Error> {
    sqlx::query_as::<_, UserSummary>(
        "SELECT id, username FROM users WHERE is_active ORDER BY username",
    )
    .fetch_all(executor)
    .await
}
