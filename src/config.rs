use chrono::{FixedOffset, Offset, Utc};
use std::env;

pub const DEFAULT_CLASSIFIER_URL: &str =
    "https://api-inference.huggingface.co/models/j-hartmann/emotion-english-distilroberta-base";
/// Australia/Perth, where the journal was first deployed.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 480;
pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub server_address: String,
    pub classifier_url: String,
    pub classifier_token: Option<String>,
    pub classifier_timeout_secs: u64,
    /// Offset that defines a "calendar day" for timelines and the mood index.
    pub mood_utc_offset: FixedOffset,
    pub upload_max_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .unwrap_or(24),
            server_address: env::var("SERVER_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0:3003".to_string()),
            classifier_url: env::var("EMOTION_CLASSIFIER_URL")
                .unwrap_or_else(|_| DEFAULT_CLASSIFIER_URL.to_string()),
            classifier_token: env::var("EMOTION_CLASSIFIER_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            classifier_timeout_secs: env::var("CLASSIFIER_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            mood_utc_offset: parse_utc_offset(env::var("MOOD_UTC_OFFSET_MINUTES").ok().as_deref()),
            upload_max_bytes: env::var("UPLOAD_MAX_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_UPLOAD_MAX_BYTES),
        })
    }
}

/// Parses an offset in minutes east of UTC, falling back to UTC+8 for
/// missing or out-of-range values.
pub fn parse_utc_offset(minutes: Option<&str>) -> FixedOffset {
    minutes
        .and_then(|m| m.trim().parse::<i32>().ok())
        .and_then(|m| m.checked_mul(60))
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(default_utc_offset)
}

fn default_utc_offset() -> FixedOffset {
    FixedOffset::east_opt(DEFAULT_UTC_OFFSET_MINUTES * 60).unwrap_or_else(|| Utc.fix())
}
