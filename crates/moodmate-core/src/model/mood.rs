use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Polarity strictly above this is Positive.
pub const POSITIVE_THRESHOLD: f64 = 0.2;
/// Polarity strictly below this is Negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodLabel {
    Positive,
    Neutral,
    Negative,
}

impl MoodLabel {
    /// All labels in display order.
    pub const ALL: [MoodLabel; 3] = [Self::Positive, Self::Neutral, Self::Negative];

    /// Boundary values (exactly 0.2 or -0.2) are Neutral.
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > POSITIVE_THRESHOLD {
            Self::Positive
        } else if polarity < NEGATIVE_THRESHOLD {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

impl std::fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "Positive"),
            Self::Neutral => write!(f, "Neutral"),
            Self::Negative => write!(f, "Negative"),
        }
    }
}

impl std::str::FromStr for MoodLabel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "neutral" => Ok(Self::Neutral),
            "negative" => Ok(Self::Negative),
            _ => Err(format!("unknown mood label: {s}")),
        }
    }
}

/// What the companion appended to a reply on top of the generated text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Suggestion {
    #[default]
    None,
    Tip {
        text: String,
    },
    Crisis,
}

impl Suggestion {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl std::fmt::Display for Suggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Tip { text } => write!(f, "{text}"),
            Self::Crisis => write!(f, "crisis support numbers shared"),
        }
    }
}

/// One logged user turn, captured once suggestion mode is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodRecord {
    pub timestamp: DateTime<Utc>,
    pub mood: MoodLabel,
    pub score: f64,
    pub entry: String,
    #[serde(default)]
    pub suggestion: Suggestion,
}

impl MoodRecord {
    pub fn new(mood: MoodLabel, score: f64, entry: String) -> Self {
        Self {
            timestamp: Utc::now(),
            mood,
            score: score.clamp(-1.0, 1.0),
            entry,
            suggestion: Suggestion::None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestion = suggestion;
        self
    }
}
