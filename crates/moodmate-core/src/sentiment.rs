//! Sentiment classification of free text.
//!
//! A [`SentimentScorer`] turns text into a polarity in [-1.0, 1.0];
//! [`classify`] maps that polarity onto a [`MoodLabel`]. The default scorer is
//! a small lexicon model: per-word polarities, intensifiers that scale the
//! next scored word, and negators that flip and halve it. The score is the
//! mean over scored words.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::MoodLabel;

/// Anything that can score text polarity. Must never fail.
pub trait SentimentScorer: Send + Sync {
    /// Polarity in [-1.0, 1.0]; 0.0 when nothing scoreable is found.
    fn polarity(&self, text: &str) -> f64;
}

impl<F> SentimentScorer for F
where
    F: Fn(&str) -> f64 + Send + Sync,
{
    fn polarity(&self, text: &str) -> f64 {
        self(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub mood: MoodLabel,
    pub polarity: f64,
}

/// Classify `text` with the given scorer. Out-of-range scores are clamped and
/// NaN degrades to Neutral/0.0.
pub fn classify(scorer: &impl SentimentScorer, text: &str) -> Classification {
    let raw = scorer.polarity(text);
    let polarity = if raw.is_nan() { 0.0 } else { raw.clamp(-1.0, 1.0) };
    let mood = MoodLabel::from_polarity(polarity);
    tracing::debug!(%mood, polarity, chars = text.chars().count(), "classified input");
    Classification { mood, polarity }
}

/// Words, plus clause punctuation as separate tokens.
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-z]+(?:'[a-z]+)?|[.!?;,]").expect("static regex is valid")
});

const LEXICON: &[(&str, f64)] = &[
    // positive
    ("good", 0.7),
    ("great", 0.8),
    ("happy", 0.8),
    ("glad", 0.5),
    ("joy", 0.8),
    ("joyful", 0.8),
    ("love", 0.5),
    ("loved", 0.7),
    ("lovely", 0.5),
    ("wonderful", 1.0),
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("excellent", 1.0),
    ("fantastic", 0.4),
    ("best", 1.0),
    ("better", 0.5),
    ("nice", 0.6),
    ("fine", 0.4),
    ("calm", 0.3),
    ("relaxed", 0.4),
    ("peaceful", 0.5),
    ("hopeful", 0.5),
    ("grateful", 0.6),
    ("thankful", 0.5),
    ("proud", 0.8),
    ("excited", 0.4),
    ("confident", 0.5),
    ("beautiful", 0.85),
    ("fun", 0.3),
    ("perfect", 1.0),
    ("positive", 0.2),
    ("energized", 0.4),
    // negative
    ("sad", -0.5),
    ("unhappy", -0.6),
    ("hopeless", -0.75),
    ("helpless", -0.6),
    ("worthless", -0.8),
    ("miserable", -1.0),
    ("depressed", -0.7),
    ("lonely", -0.5),
    ("alone", -0.3),
    ("bad", -0.7),
    ("worse", -0.4),
    ("worst", -1.0),
    ("terrible", -1.0),
    ("awful", -1.0),
    ("horrible", -1.0),
    ("angry", -0.5),
    ("upset", -0.4),
    ("anxious", -0.5),
    ("worried", -0.4),
    ("stressed", -0.5),
    ("scared", -0.5),
    ("afraid", -0.6),
    ("tired", -0.4),
    ("exhausted", -0.5),
    ("overwhelmed", -0.5),
    ("hurt", -0.5),
    ("pain", -0.6),
    ("cry", -0.4),
    ("crying", -0.5),
    ("hate", -0.8),
    ("frustrated", -0.7),
    ("annoyed", -0.4),
    ("lost", -0.3),
    ("empty", -0.4),
    ("broken", -0.6),
    ("painful", -0.7),
    ("disappointed", -0.75),
    ("negative", -0.3),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("so", 1.3),
    ("really", 1.3),
    ("too", 1.2),
    ("super", 1.4),
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("totally", 1.3),
    ("completely", 1.4),
    ("absolutely", 1.4),
    ("quite", 1.1),
    ("pretty", 1.1),
];

const NEGATORS: &[&str] = &["not", "no", "never", "cannot", "hardly", "nothing"];

/// Tokens that end the reach of a pending negation or intensifier.
const BREAKERS: &[&str] = &[
    "and", "but", "or", "though", "although", "because", ".", "!", "?", ";", ",",
];

/// Negation flips the sign and halves the magnitude.
const NEGATION_FACTOR: f64 = -0.5;

fn lookup(table: &[(&str, f64)], word: &str) -> Option<f64> {
    table.iter().find(|(w, _)| *w == word).map(|(_, v)| *v)
}

fn is_negator(word: &str) -> bool {
    NEGATORS.contains(&word) || word.ends_with("n't")
}

/// Built-in lexicon scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }
}

impl SentimentScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase().replace('\u{2019}', "'");

        let mut scores: Vec<f64> = Vec::new();
        let mut modifier = 1.0;
        let mut negated = false;

        for m in TOKEN_RE.find_iter(&lowered) {
            let word = m.as_str();

            if let Some(boost) = lookup(INTENSIFIERS, word) {
                modifier *= boost;
                continue;
            }
            if is_negator(word) {
                negated = !negated;
                continue;
            }
            if BREAKERS.contains(&word) {
                modifier = 1.0;
                negated = false;
                continue;
            }
            if let Some(value) = lookup(LEXICON, word) {
                let mut score = value * modifier;
                if negated {
                    score *= NEGATION_FACTOR;
                }
                scores.push(score.clamp(-1.0, 1.0));
                modifier = 1.0;
                negated = false;
            }
        }

        if scores.is_empty() {
            return 0.0;
        }
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        mean.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_text_is_neutral_zero() {
        let c = classify(&LexiconScorer, "");
        assert_eq!(c.mood, MoodLabel::Neutral);
        assert_eq!(c.polarity, 0.0);
    }

    #[test]
    fn test_unscoreable_text_is_neutral_zero() {
        let c = classify(&LexiconScorer, "1234 ?!? ###");
        assert_eq!(c.mood, MoodLabel::Neutral);
        assert_eq!(c.polarity, 0.0);
    }

    #[test]
    fn test_okay_day_is_neutral() {
        let c = classify(&LexiconScorer, "I feel okay today");
        assert_eq!(c.mood, MoodLabel::Neutral);
        assert!(c.polarity.abs() < 1e-9);
    }

    #[test]
    fn test_sad_and_hopeless_is_strongly_negative() {
        let c = classify(&LexiconScorer, "I am so sad and hopeless");
        assert_eq!(c.mood, MoodLabel::Negative);
        assert!(approx(c.polarity, -0.7), "polarity = {}", c.polarity);
    }

    #[test]
    fn test_positive_text() {
        let c = classify(&LexiconScorer, "Today was a great day, I'm really happy!");
        assert_eq!(c.mood, MoodLabel::Positive);
        assert!(c.polarity > 0.2);
    }

    #[test]
    fn test_negation_flips_and_halves() {
        let p = LexiconScorer.polarity("I am not happy");
        assert!(approx(p, -0.4), "p = {p}");
    }

    #[test]
    fn test_contraction_negation() {
        let p = LexiconScorer.polarity("I don't feel good");
        assert!(approx(p, -0.35), "p = {p}");
    }

    #[test]
    fn test_curly_apostrophe_negation() {
        let p = LexiconScorer.polarity("I don\u{2019}t feel good");
        assert!(approx(p, -0.35), "p = {p}");
    }

    #[test]
    fn test_intensifier_is_clamped() {
        let p = LexiconScorer.polarity("extremely extremely awful");
        assert_eq!(p, -1.0);
    }

    #[test]
    fn test_breaker_resets_negation() {
        // "not" applies to "tired" only; "happy" keeps its own sign
        let p = LexiconScorer.polarity("not tired but happy");
        assert!(approx(p, (0.2 + 0.8) / 2.0), "p = {p}");
    }

    #[test]
    fn test_negation_stops_at_sentence_end() {
        let c = classify(
            &LexiconScorer,
            "I couldn't sleep. Anyway the concert was amazing!",
        );
        assert_eq!(c.mood, MoodLabel::Positive);
        assert!(approx(c.polarity, 0.6), "polarity = {}", c.polarity);

        let p = LexiconScorer.polarity("I don't know. The weather is lovely.");
        assert!(approx(p, 0.5), "p = {p}");
    }

    #[test]
    fn test_intensifier_stops_at_sentence_end() {
        let p = LexiconScorer.polarity("I was late so I ran. It was fun.");
        assert!(approx(p, 0.3), "p = {p}");
    }

    #[test]
    fn test_comma_resets_negation() {
        let p = LexiconScorer.polarity("not today, I feel happy");
        assert!(approx(p, 0.8), "p = {p}");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            LexiconScorer.polarity("HAPPY"),
            LexiconScorer.polarity("happy")
        );
    }

    #[test]
    fn test_closure_scorer_and_clamping() {
        let scorer = |_: &str| 4.2;
        let c = classify(&scorer, "anything");
        assert_eq!(c.polarity, 1.0);
        assert_eq!(c.mood, MoodLabel::Positive);
    }

    #[test]
    fn test_nan_scorer_degrades_to_neutral() {
        let scorer = |_: &str| f64::NAN;
        let c = classify(&scorer, "anything");
        assert_eq!(c.polarity, 0.0);
        assert_eq!(c.mood, MoodLabel::Neutral);
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(&|_: &str| 0.2, "x").mood, MoodLabel::Neutral);
        assert_eq!(classify(&|_: &str| -0.2, "x").mood, MoodLabel::Neutral);
        assert_eq!(classify(&|_: &str| 0.2001, "x").mood, MoodLabel::Positive);
        assert_eq!(classify(&|_: &str| -0.2001, "x").mood, MoodLabel::Negative);
    }
}
