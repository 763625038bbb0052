use axum::{extract::State, http::{HeaderMap, StatusCode}, Json};
use std::sync::Arc;
use validator::Validate;

use crate::auth::{
    extractor::AuthenticatedUser,
    models::{LoginRequest, LoginResponse, Principal, RegisterRequest, UserResponse, UserSummary},
    repository,
    security::{create_jwt, hash_password, verify_password},
};
use crate::cache::CacheService;
use crate::error::{AppError, AppResult};
use crate::AppState;

/// Client address as reported by the reverse proxy, `-` when unknown.
fn client_ip(headers: &HeaderMap) -> String {
    if let Some(ip) = headers.get("X-Real-IP").and_then(|v| v.to_str().ok()) {
        return ip.to_string();
    }
    headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|fwd| fwd.split(',').next())
        .map(|first| first.trim().to_string())
        .unwrap_or_else(|| "-".to_string())
}

// bcrypt runs on the blocking pool
async fn hash_blocking(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("Password hashing error: {e}")))
}

async fn verify_blocking(password: String, hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("Password verification error: {e}")))
}

/// Message for a user row rejected by one of the unique constraints.
fn taken_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some(name) if name.contains("email") => "Please use a different email address.",
        _ => "Please use a different username.",
    }
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let ip = client_ip(&headers);

    payload.validate().map_err(|e| {
        tracing::warn!(ip = %ip, error = %e, "Registration validation failed");
        AppError::from(e)
    })?;

    let (username_taken, email_taken) =
        repository::identity_taken(&state.db, &payload.username, &payload.email).await?;

    if username_taken {
        tracing::warn!(username = %payload.username, ip = %ip, "Registration failed - username taken");
        return Err(AppError::Validation("Please use a different username.".into()));
    }
    if email_taken {
        tracing::warn!(email = %payload.email, ip = %ip, "Registration failed - email taken");
        return Err(AppError::Validation("Please use a different email address.".into()));
    }

    let password_hash = hash_blocking(payload.password).await?;

    // a concurrent registration can still win the unique index
    let user = repository::insert(&state.db, &payload.username, &payload.email, &password_hash)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                tracing::warn!(username = %payload.username, ip = %ip, "Registration failed - lost insert race");
                AppError::Validation(taken_message(db.constraint()).into())
            }
            other => AppError::from(other),
        })?;

    tracing::info!(
        user_id  = %user.id,
        username = %user.username,
        ip       = %ip,
        "New user registered"
    );

    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let ip = client_ip(&headers);
    let invalid = || AppError::Unauthorized("Invalid username or password".into());

    let Some(user) = repository::find_by_username(&state.db, &payload.username).await? else {
        tracing::warn!(username = %payload.username, ip = %ip, "Failed login - unknown user");
        return Err(invalid());
    };

    if !verify_blocking(payload.password, user.password_hash.clone()).await? {
        tracing::warn!(user_id = %user.id, ip = %ip, "Failed login - wrong password");
        return Err(invalid());
    }

    if !user.is_active() {
        tracing::warn!(user_id = %user.id, ip = %ip, "Login refused - account disabled");
        return Err(AppError::Forbidden("Account is disabled".into()));
    }

    let token = create_jwt(
        &user.id().to_string(),
        &user.username,
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
    )
    .map_err(|e| AppError::Internal(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = %user.id, username = %user.username, ip = %ip, "Successful login");

    let mut redis = state.redis.clone();
    let _ = CacheService::cache_user(&mut redis, &user.id.to_string(), &UserResponse::from(user))
        .await;

    Ok(Json(LoginResponse { token }))
}

pub async fn get_me(
    State(state): State<Arc<AppState>>,
    caller: AuthenticatedUser,
) -> AppResult<Json<UserResponse>> {
    let user_id = caller.user_id()?;

    let mut redis = state.redis.clone();
    if let Ok(Some(cached)) =
        CacheService::get_user::<UserResponse>(&mut redis, &user_id.to_string()).await
    {
        return Ok(Json(cached));
    }

    let user = repository::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    let response = UserResponse::from(user);

    let _ = CacheService::cache_user(&mut redis, &user_id.to_string(), &response).await;

    Ok(Json(response))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _caller: AuthenticatedUser,
) -> AppResult<Json<Vec<UserSummary>>> {
    Ok(Json(repository::list_active(&state.db).await?))
}
