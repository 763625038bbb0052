use std::collections::BTreeMap;

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, Utc};

use crate::emotion::Polarity;
use crate::mood::models::{MoodIndex, MoodSample, TimelinePoint};

pub const DEFAULT_WINDOW_DAYS: u32 = 30;
pub const MAX_WINDOW_DAYS: u32 = 36_500;
pub const MOOD_INDEX_DAYS: u32 = 7;

/// `?days=` parsing: anything missing, non-numeric or out of range means 30.
pub fn parse_window_days(raw: Option<&str>) -> u32 {
    raw.and_then(|d| d.trim().parse::<u32>().ok())
        .filter(|d| (1..=MAX_WINDOW_DAYS).contains(d))
        .unwrap_or(DEFAULT_WINDOW_DAYS)
}

pub fn local_date(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

/// Inclusive range of calendar days in one fixed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DayWindow {
    /// `days` calendar days ending with `today`.
    pub fn trailing(today: NaiveDate, days: u32) -> Self {
        let back = u64::from(days.max(1) - 1);
        let start = today
            .checked_sub_days(Days::new(back))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Local midnight at the start of the window, as a UTC instant.
    pub fn starts_at(&self, offset: FixedOffset) -> DateTime<Utc> {
        self.start
            .and_time(NaiveTime::MIN)
            .and_local_timezone(offset)
            .single()
            .map(|local| local.with_timezone(&Utc))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Counts of dominant emotions per local day, ordered by date then label.
pub fn timeline(samples: &[MoodSample], window: DayWindow, offset: FixedOffset) -> Vec<TimelinePoint> {
    let mut groups: BTreeMap<(NaiveDate, &str), u32> = BTreeMap::new();

    for sample in samples {
        let date = local_date(sample.created_at, offset);
        if window.contains(date) {
            *groups.entry((date, sample.dominant_label.as_str())).or_default() += 1;
        }
    }

    groups
        .into_iter()
        .map(|((date, emotion), count)| TimelinePoint {
            date,
            emotion: emotion.to_string(),
            count,
        })
        .collect()
}

/// Mean polarity of the entries inside `window`, rounded to two decimals.
/// No entries means 0.
pub fn mood_index(samples: &[MoodSample], window: DayWindow, offset: FixedOffset) -> MoodIndex {
    let scores: Vec<i32> = samples
        .iter()
        .filter(|s| window.contains(local_date(s.created_at, offset)))
        .map(|s| Polarity::of(Some(s.dominant_label.as_str())).score())
        .collect();

    let total: i64 = scores.iter().map(|&s| i64::from(s)).sum();
    let value = mean_to_cents(total, scores.len() as i64);

    MoodIndex {
        start: window.start,
        end: window.end,
        value,
    }
}

/// `total / count` rounded to two decimals, ties to even, computed on the
/// exact integer ratio.
fn mean_to_cents(total: i64, count: i64) -> f64 {
    if count == 0 {
        return 0.0;
    }

    let scaled = total * 100;
    let mut cents = scaled.div_euclid(count);
    let twice_rem = 2 * scaled.rem_euclid(count);
    if twice_rem > count || (twice_rem == count && cents % 2 != 0) {
        cents += 1;
    }

    // integer cents, so a zero mean is always +0.0
    cents as f64 / 100.0
}
