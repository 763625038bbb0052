//! Diary entry lifecycle: create, edit and delete, each in one transaction.
//!
//! Edits re-run the emotion analysis only when the content actually changed
//! (byte-for-byte); otherwise the stored record is left untouched. A
//! classifier fault aborts the whole operation before anything is written.

use std::borrow::Cow;

use sqlx::PgPool;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::diary::{models::DiaryEntry, repository};
use crate::emotion::{self, EmotionClassifier};
use crate::error::{AppError, AppResult};
use crate::sharing;

pub const TITLE_MAX_CHARS: usize = 100;

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("must not be empty")));
    }
    Ok(())
}

/// Title and content as submitted, checked before any classifier call.
#[derive(Debug, Clone, Validate)]
pub struct DiaryDraft {
    #[validate(
        length(min = 1, max = 100, message = "must be 1-100 characters"),
        custom(function = "not_blank")
    )]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub content: String,
}

impl DiaryDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Diary entry not found".into())
}

fn ensure_owner(entry: &DiaryEntry, caller: Uuid, action: &str) -> AppResult<()> {
    if entry.is_owned_by(caller) {
        return Ok(());
    }
    tracing::warn!(
        entry_id = %entry.id,
        caller   = %caller,
        action,
        "Permission denied - caller does not own the diary entry"
    );
    Err(AppError::Forbidden(format!(
        "You do not have permission to {action} this diary entry"
    )))
}

pub async fn create_entry(
    db: &PgPool,
    classifier: &dyn EmotionClassifier,
    owner: Uuid,
    draft: DiaryDraft,
) -> AppResult<DiaryEntry> {
    draft.validate()?;

    let record = emotion::analyze(classifier, &draft.content).await?;

    let mut tx = db.begin().await?;
    let entry = repository::insert(&mut *tx, owner, &draft.title, &draft.content, &record).await?;
    tx.commit().await?;

    tracing::info!(
        entry_id       = %entry.id,
        owner          = %owner,
        dominant_label = ?entry.dominant_label,
        "Diary entry created"
    );

    Ok(entry)
}

pub async fn edit_entry(
    db: &PgPool,
    classifier: &dyn EmotionClassifier,
    caller: Uuid,
    id: Uuid,
    draft: DiaryDraft,
) -> AppResult<DiaryEntry> {
    draft.validate()?;

    let mut tx = db.begin().await?;

    let entry = repository::find_by_id_for_update(&mut *tx, id)
        .await?
        .ok_or_else(not_found)?;
    ensure_owner(&entry, caller, "edit")?;

    let content_changed = entry.content != draft.content;
    let updated = if content_changed {
        let record = emotion::analyze(classifier, &draft.content).await?;
        repository::update_with_analysis(&mut *tx, id, &draft.title, &draft.content, &record)
            .await?
    } else {
        repository::update_title(&mut *tx, id, &draft.title).await?
    };

    tx.commit().await?;

    tracing::info!(
        entry_id   = %id,
        owner      = %caller,
        reanalyzed = content_changed,
        "Diary entry updated"
    );

    Ok(updated)
}

pub async fn delete_entry(db: &PgPool, caller: Uuid, id: Uuid) -> AppResult<()> {
    let mut tx = db.begin().await?;

    let entry = repository::find_by_id_for_update(&mut *tx, id)
        .await?
        .ok_or_else(not_found)?;
    ensure_owner(&entry, caller, "delete")?;

    repository::delete(&mut *tx, id).await?;
    tx.commit().await?;

    tracing::info!(entry_id = %id, owner = %caller, "Diary entry deleted");

    Ok(())
}

/// The entry if the caller owns it or it was shared with them.
pub async fn get_visible_entry(db: &PgPool, caller: Uuid, id: Uuid) -> AppResult<DiaryEntry> {
    let entry = repository::find_by_id(db, id).await?.ok_or_else(not_found)?;

    if entry.is_owned_by(caller) || sharing::repository::is_shared(db, &entry, caller).await? {
        return Ok(entry);
    }

    tracing::warn!(entry_id = %id, caller = %caller, "Permission denied - entry not shared with caller");
    Err(AppError::Forbidden(
        "You do not have permission to view this diary entry".into(),
    ))
}
