use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use crate::emotion::{EmotionRecord, EmotionScore};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DiaryEntry {
    pub id: Uuid,
    pub owner: Uuid,
    pub title: String,
    pub content: String,
    pub dominant_label: Option<String>,
    pub dominant_score: Option<f64>,
    pub emotion_scores: Option<Json<Vec<EmotionScore>>>,
    pub analyzed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DiaryEntry {
    /// `None` until an analysis has been attached.
    pub fn emotion_record(&self) -> Option<EmotionRecord> {
        self.analyzed.then(|| EmotionRecord {
            dominant_label: self.dominant_label.clone(),
            dominant_score: self.dominant_score,
            all_scores: self.emotion_scores.as_ref().map(|scores| scores.0.clone()),
            analyzed: true,
        })
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner == user_id
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DiaryResponse {
    pub id: Uuid,
    pub owner: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub emotion: Option<EmotionRecord>,
}

impl From<DiaryEntry> for DiaryResponse {
    fn from(entry: DiaryEntry) -> Self {
        let emotion = entry.emotion_record();
        DiaryResponse {
            id: entry.id,
            owner: entry.owner,
            title: entry.title,
            content: entry.content,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
            emotion,
        }
    }
}

/// Row of the "my diaries" list: owned entries plus those shared with the caller.
#[derive(Debug, Clone, FromRow)]
pub struct DiaryListRow {
    pub id: Uuid,
    pub owner: Uuid,
    pub owner_name: String,
    pub title: String,
    pub dominant_label: Option<String>,
    pub dominant_score: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub label: Option<String>,
    pub score: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DiaryListItem {
    pub id: Uuid,
    pub title: String,
    pub owner: String,
    /// True when the caller is not the owner.
    pub shared: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub sentiment: SentimentSummary,
}

impl DiaryListItem {
    pub fn from_row(row: DiaryListRow, viewer: Uuid) -> Self {
        DiaryListItem {
            id: row.id,
            title: row.title,
            owner: row.owner_name,
            shared: row.owner != viewer,
            created_at: row.created_at,
            updated_at: row.updated_at,
            sentiment: SentimentSummary {
                label: row.dominant_label,
                score: row.dominant_score,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateDiaryRequest {
    pub id: Option<Uuid>,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct DiaryQuery {
    pub id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteDiaryRequest {
    pub id: Uuid,
}
