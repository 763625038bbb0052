pub const POSITIVE_EMOTIONS: &[&str] = &["joy", "surprise"];

pub const NEGATIVE_EMOTIONS: &[&str] = &["anger", "sadness", "fear", "disgust"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

impl Polarity {
    /// Unknown labels and missing labels are neutral.
    pub fn of(label: Option<&str>) -> Self {
        match label {
            Some(l) if POSITIVE_EMOTIONS.contains(&l) => Polarity::Positive,
            Some(l) if NEGATIVE_EMOTIONS.contains(&l) => Polarity::Negative,
            _ => Polarity::Neutral,
        }
    }

    pub fn score(self) -> i32 {
        match self {
            Polarity::Positive => 1,
            Polarity::Negative => -1,
            Polarity::Neutral => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rubric_buckets() {
        for label in ["joy", "surprise"] {
            assert_eq!(Polarity::of(Some(label)), Polarity::Positive);
        }
        for label in ["anger", "sadness", "fear", "disgust"] {
            assert_eq!(Polarity::of(Some(label)), Polarity::Negative);
        }
        assert_eq!(Polarity::of(Some("neutral")), Polarity::Neutral);
        assert_eq!(Polarity::of(Some("happy")), Polarity::Neutral);
        assert_eq!(Polarity::of(None), Polarity::Neutral);
    }

    #[test]
    fn labels_match_exactly() {
        assert_eq!(Polarity::of(Some("Joy")), Polarity::Neutral);
    }

    #[test]
    fn scores() {
        assert_eq!(Polarity::Positive.score(), 1);
        assert_eq!(Polarity::Negative.score(), -1);
        assert_eq!(Polarity::Neutral.score(), 0);
    }
}
