use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub label: String,
    pub score: f64,
}

/// Normalized outcome of one classification.
///
/// `analyzed` distinguishes "never analyzed" from "analyzed, nothing usable":
/// an empty classification still yields `analyzed == true` with every other
/// field unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionRecord {
    pub dominant_label: Option<String>,
    pub dominant_score: Option<f64>,
    /// Classifier order, never re-sorted.
    pub all_scores: Option<Vec<EmotionScore>>,
    pub analyzed: bool,
}

impl EmotionRecord {
    pub fn empty() -> Self {
        Self {
            analyzed: true,
            ..Self::default()
        }
    }
}

/// Flattens `[[{label, score}, ...]]` into an [`EmotionRecord`].
///
/// Anything that is not a non-empty list whose first element is a non-empty
/// list of well-formed pairs degrades to [`EmotionRecord::empty`].
pub fn normalize(raw: &Value) -> EmotionRecord {
    let Some(scores) = raw
        .as_array()
        .and_then(|outer| outer.first())
        .and_then(parse_scores)
    else {
        return EmotionRecord::empty();
    };

    let (dominant_label, dominant_score) = match dominant(&scores) {
        Some(top) => (Some(top.label.clone()), Some(top.score)),
        None => (None, None),
    };

    EmotionRecord {
        dominant_label,
        dominant_score,
        all_scores: Some(scores),
        analyzed: true,
    }
}

fn parse_scores(inner: &Value) -> Option<Vec<EmotionScore>> {
    let scores: Vec<EmotionScore> = serde_json::from_value(inner.clone()).ok()?;
    (!scores.is_empty()).then_some(scores)
}

// Sequential max scan; a later score must be strictly greater to win.
fn dominant(scores: &[EmotionScore]) -> Option<&EmotionScore> {
    scores.iter().fold(None, |best, candidate| match best {
        Some(current) if candidate.score <= current.score => Some(current),
        _ => Some(candidate),
    })
}
