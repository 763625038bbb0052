use chrono::NaiveDate;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const USER_CACHE_TTL: u64 = 300; // 5 minutes
const MOOD_CACHE_TTL: u64 = 60; // 1 minute

pub struct CacheService;

impl CacheService {
    /// Cache user data by user ID
    pub async fn cache_user<T: Serialize>(
        redis: &mut ConnectionManager,
        user_id: &str,
        user_data: &T,
    ) -> Result<(), redis::RedisError> {
        let key = format!("user:{}", user_id);
        let value = serde_json::to_string(user_data).unwrap_or_default();
        redis.set_ex(key, value, USER_CACHE_TTL).await
    }

    /// Get cached user data
    pub async fn get_user<T: for<'de> Deserialize<'de>>(
        redis: &mut ConnectionManager,
        user_id: &str,
    ) -> Result<Option<T>, redis::RedisError> {
        let key = format!("user:{}", user_id);
        let value: Option<String> = redis.get(key).await?;
        Ok(value.and_then(|v| serde_json::from_str(&v).ok()))
    }

    /// Cache a computed mood report
    pub async fn cache_mood_report<T: Serialize>(
        redis: &mut ConnectionManager,
        key: &str,
        report: &T,
    ) -> Result<(), redis::RedisError> {
        let value = serde_json::to_string(report).unwrap_or_default();
        redis.set_ex(key, value, MOOD_CACHE_TTL).await
    }

    /// Get a cached mood report
    pub async fn get_mood_report<T: for<'de> Deserialize<'de>>(
        redis: &mut ConnectionManager,
        key: &str,
    ) -> Result<Option<T>, redis::RedisError> {
        let value: Option<String> = redis.get(key).await?;
        Ok(value.and_then(|v| serde_json::from_str(&v).ok()))
    }

    /// Current generation of a user's mood reports. Report keys embed it, so
    /// read it before querying the entries the report is built from.
    pub async fn mood_generation(
        redis: &mut ConnectionManager,
        user_id: &Uuid,
    ) -> Result<u64, redis::RedisError> {
        let value: Option<u64> = redis.get(mood_generation_key(user_id)).await?;
        Ok(value.unwrap_or(0))
    }

    /// Moves a user's mood reports to a new generation. Everything cached
    /// under the old one is never read again and expires on its own.
    pub async fn invalidate_user_mood(
        redis: &mut ConnectionManager,
        user_id: &Uuid,
    ) -> Result<u64, redis::RedisError> {
        redis.incr(mood_generation_key(user_id), 1u64).await
    }
}

/// Called after every diary write of `user_id`.
pub async fn mood_changed(redis: &ConnectionManager, user_id: &Uuid) {
    let mut redis = redis.clone();
    if let Err(e) = CacheService::invalidate_user_mood(&mut redis, user_id).await {
        tracing::warn!(user_id = %user_id, error = %e, "Failed to invalidate cached mood reports");
    }
}

fn mood_generation_key(user_id: &Uuid) -> String {
    format!("mood:gen:{}", user_id)
}

pub fn timeline_key(user_id: &Uuid, generation: u64, today: NaiveDate, window_days: u32) -> String {
    format!("mood:{}:{}:timeline:{}:{}", user_id, generation, today, window_days)
}

pub fn mood_index_key(user_id: &Uuid, generation: u64, today: NaiveDate) -> String {
    format!("mood:{}:{}:index:{}", user_id, generation, today)
}
