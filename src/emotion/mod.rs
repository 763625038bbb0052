//! Emotion analysis: the external classifier seam, the normalizer that turns
//! its raw output into an [`EmotionRecord`], and the polarity rubric used by
//! the mood reports.

pub mod classifier;
pub mod normalizer;
pub mod polarity;

pub use classifier::{ClassificationError, EmotionClassifier, HttpEmotionClassifier};
pub use normalizer::{normalize, EmotionRecord, EmotionScore};
pub use polarity::Polarity;

use crate::error::AppResult;

/// Classifies `text` once and normalizes the result.
///
/// Adapter faults propagate to the caller untouched.
pub async fn analyze(classifier: &dyn EmotionClassifier, text: &str) -> AppResult<EmotionRecord> {
    let raw = classifier.classify(text).await?;
    let record = normalize(&raw);

    tracing::debug!(
        dominant_label = ?record.dominant_label,
        dominant_score = ?record.dominant_score,
        "Emotion analysis finished"
    );

    Ok(record)
}
