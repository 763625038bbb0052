use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The two columns the reports need from a labelled entry.
#[derive(Debug, Clone, FromRow)]
pub struct MoodSample {
    pub created_at: DateTime<Utc>,
    pub dominant_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub emotion: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodIndex {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(rename = "average_mood_index")]
    pub value: f64,
}

#[derive(Debug, Deserialize)]
pub struct TimelineQuery {
    /// Kept as text so garbage falls back to the default window instead of a 400.
    pub days: Option<String>,
}
