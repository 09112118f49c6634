//! Aggregates over a session's mood log, for the dashboard.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::model::{MoodLabel, MoodRecord, Suggestion};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MoodDistribution {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl MoodDistribution {
    pub fn from_log(log: &[MoodRecord]) -> Self {
        let mut dist = Self::default();
        for record in log {
            match record.mood {
                MoodLabel::Positive => dist.positive += 1,
                MoodLabel::Neutral => dist.neutral += 1,
                MoodLabel::Negative => dist.negative += 1,
            }
        }
        dist
    }

    pub fn count(&self, label: MoodLabel) -> usize {
        match label {
            MoodLabel::Positive => self.positive,
            MoodLabel::Neutral => self.neutral,
            MoodLabel::Negative => self.negative,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }

    /// Share of records with `label`, 0.0 for an empty log.
    pub fn proportion(&self, label: MoodLabel) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.count(label) as f64 / total as f64,
        }
    }

    /// Counts in the fixed order Positive, Neutral, Negative.
    pub fn iter(&self) -> impl Iterator<Item = (MoodLabel, usize)> + '_ {
        MoodLabel::ALL.into_iter().map(|label| (label, self.count(label)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub timestamp: DateTime<Utc>,
    pub mood: MoodLabel,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAverage {
    pub date: NaiveDate,
    pub average: f64,
    pub entries: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentSuggestion {
    pub timestamp: DateTime<Utc>,
    pub entry: String,
    pub suggestion: Suggestion,
}

/// Everything the dashboard shows, computed in one pass over the log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodReport {
    pub distribution: MoodDistribution,
    pub timeline: Vec<TimelinePoint>,
    pub daily_averages: Vec<DailyAverage>,
    pub recent_suggestions: Vec<RecentSuggestion>,
}

impl MoodReport {
    /// Report with calendar days taken in the local time zone.
    pub fn from_log(log: &[MoodRecord], recent: usize) -> Self {
        Self::from_log_in(log, recent, &Local)
    }

    pub fn from_log_in<Tz: TimeZone>(log: &[MoodRecord], recent: usize, tz: &Tz) -> Self {
        Self {
            distribution: MoodDistribution::from_log(log),
            timeline: timeline(log),
            daily_averages: daily_averages_in(log, tz),
            recent_suggestions: recent_suggestions(log, recent),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.distribution.total() == 0
    }
}

/// (timestamp, score) points in time order.
pub fn timeline(log: &[MoodRecord]) -> Vec<TimelinePoint> {
    let mut points: Vec<TimelinePoint> = log
        .iter()
        .map(|r| TimelinePoint {
            timestamp: r.timestamp,
            mood: r.mood,
            score: r.score,
        })
        .collect();
    points.sort_by_key(|p| p.timestamp);
    points
}

pub fn daily_averages(log: &[MoodRecord]) -> Vec<DailyAverage> {
    daily_averages_in(log, &Local)
}

/// Mean score per calendar day in `tz`, oldest day first.
pub fn daily_averages_in<Tz: TimeZone>(log: &[MoodRecord], tz: &Tz) -> Vec<DailyAverage> {
    let mut days: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for record in log {
        let date = record.timestamp.with_timezone(tz).date_naive();
        let slot = days.entry(date).or_insert((0.0, 0));
        slot.0 += record.score;
        slot.1 += 1;
    }
    days.into_iter()
        .map(|(date, (sum, entries))| DailyAverage {
            date,
            average: sum / entries as f64,
            entries,
        })
        .collect()
}

/// The last `limit` entries with the suggestion shown for each.
pub fn recent_suggestions(log: &[MoodRecord], limit: usize) -> Vec<RecentSuggestion> {
    let start = log.len().saturating_sub(limit);
    log[start..]
        .iter()
        .map(|r| RecentSuggestion {
            timestamp: r.timestamp,
            entry: r.entry.clone(),
            suggestion: r.suggestion.clone(),
        })
        .collect()
}
