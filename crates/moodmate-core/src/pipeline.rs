//! Per-turn orchestration: classify, generate, augment, record.

use serde::Serialize;

use crate::error::{MoodmateError, Result};
use crate::llm::{GenerationResult, TextGenerator};
use crate::model::{MoodLabel, MoodRecord, Suggestion};
use crate::responder::{build_prompt, fallback_reply};
use crate::sentiment::{classify, Classification, LexiconScorer, SentimentScorer};
use crate::session::{SessionState, ACTIVATION_TURN};
use crate::support::{RandomTipPicker, SupportCatalog, TipPicker};

/// What one user turn produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnOutcome {
    /// 1-based user turn number within the session.
    pub turn: usize,
    pub mood: MoodLabel,
    pub polarity: f64,
    /// Final assistant reply as appended to the transcript.
    pub reply: String,
    pub suggestion: Suggestion,
    /// The remote call failed and `reply` is the fallback text.
    pub degraded: bool,
    /// This turn switched suggestion mode on.
    pub activated: bool,
}

/// The conversation pipeline. Stateless apart from its collaborators, so one
/// companion can serve any number of sessions.
pub struct Companion<G, S = LexiconScorer, P = RandomTipPicker> {
    generator: G,
    scorer: S,
    picker: P,
    support: SupportCatalog,
}

impl<G: TextGenerator> Companion<G> {
    pub fn new(generator: G, support: SupportCatalog) -> Self {
        Self {
            generator,
            scorer: LexiconScorer,
            picker: RandomTipPicker,
            support,
        }
    }
}

impl<G, S, P> Companion<G, S, P> {
    pub fn with_scorer<S2: SentimentScorer>(self, scorer: S2) -> Companion<G, S2, P> {
        Companion {
            generator: self.generator,
            scorer,
            picker: self.picker,
            support: self.support,
        }
    }

    pub fn with_picker<P2: TipPicker>(self, picker: P2) -> Companion<G, S, P2> {
        Companion {
            generator: self.generator,
            scorer: self.scorer,
            picker,
            support: self.support,
        }
    }

    pub fn support(&self) -> &SupportCatalog {
        &self.support
    }
}

impl<G, S, P> Companion<G, S, P>
where
    G: TextGenerator,
    S: SentimentScorer,
    P: TipPicker,
{
    pub fn classify(&self, text: &str) -> Classification {
        classify(&self.scorer, text)
    }

    /// One remote attempt with the mood-aware prompt. Errors are returned,
    /// not converted; [`Companion::respond`] decides on the fallback.
    pub async fn generate_reply(&self, user_text: &str, mood: MoodLabel) -> GenerationResult {
        self.generator.generate(&build_prompt(user_text, mood)).await
    }

    /// Crisis notice or tip for the given polarity, appended to `reply`.
    pub fn augment(&self, reply: &str, polarity: f64) -> String {
        self.support.augment(reply, polarity, &self.picker)
    }

    /// Run one user turn against `session`.
    ///
    /// Only blank input is rejected; a failed remote call degrades the reply
    /// to the fallback text and the turn completes normally.
    pub async fn respond(&self, session: &mut SessionState, input: &str) -> Result<TurnOutcome> {
        if input.trim().is_empty() {
            return Err(MoodmateError::InvalidInput("message cannot be empty".into()));
        }

        let turn = session.begin_turn(input);
        let Classification { mood, polarity } = self.classify(input);

        let (mut reply, degraded) = match self.generate_reply(input, mood).await {
            Ok(text) => (text, false),
            Err(e) => {
                tracing::warn!(
                    session = %session.id(),
                    turn,
                    kind = e.kind(),
                    error = %e,
                    "generation failed, using fallback reply"
                );
                (fallback_reply(&e), true)
            }
        };

        let mut suggestion = Suggestion::None;
        let mut activated = false;
        if turn >= ACTIVATION_TURN {
            activated = session.activate_suggestions();
            if activated {
                tracing::info!(session = %session.id(), turn, "suggestion mode active");
            }
            suggestion = self.support.suggest(polarity, &self.picker);
            reply = self.support.append(&reply, &suggestion);
        }

        if session.suggestion_active() {
            session.log_mood(
                MoodRecord::new(mood, polarity, input.to_string()).with_suggestion(suggestion.clone()),
            );
        }

        session.push_reply(reply.clone());

        Ok(TurnOutcome {
            turn,
            mood,
            polarity,
            reply,
            suggestion,
            degraded,
            activated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::model::Role;
    use crate::session::SessionRegistry;
    use crate::responder::FALLBACK_MARKER;
    use crate::support::{FixedTipPicker, CRISIS_MARKER, TIP_MARKER};
    use std::sync::Mutex;

    const GENERATED: &str = "I'm here for you. Try a walk and some water.";

    struct CannedGenerator;

    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _prompt: &str) -> GenerationResult {
            Ok(GENERATED.to_string())
        }
    }

    #[derive(Default)]
    struct RecordingGenerator {
        prompts: Mutex<Vec<String>>,
    }

    impl TextGenerator for RecordingGenerator {
        async fn generate(&self, prompt: &str) -> GenerationResult {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(GENERATED.to_string())
        }
    }

    /// Fails on the listed 1-based call numbers.
    struct FlakyGenerator {
        fail_on: Vec<usize>,
        calls: Mutex<usize>,
    }

    impl TextGenerator for FlakyGenerator {
        async fn generate(&self, _prompt: &str) -> GenerationResult {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                *calls
            };
            if self.fail_on.contains(&call) {
                Err(GenerationError::Network("connection refused".into()))
            } else {
                Ok(GENERATED.to_string())
            }
        }
    }

    fn scripted(text: &str) -> f64 {
        if text.contains("hopeless") {
            -0.7
        } else if text.contains("stressed") {
            -0.4
        } else if text.contains("great") {
            0.8
        } else {
            0.0
        }
    }

    fn companion<G: TextGenerator>(generator: G) -> Companion<G, fn(&str) -> f64, FixedTipPicker> {
        Companion::new(generator, SupportCatalog::default())
            .with_scorer(scripted as fn(&str) -> f64)
            .with_picker(FixedTipPicker(0))
    }

    fn session() -> SessionState {
        SessionState::new("Hello! I'm here to listen. How are you feeling today?")
    }

    #[tokio::test]
    async fn test_first_turn_is_plain() {
        let c = companion(CannedGenerator);
        let mut s = session();

        let out = c.respond(&mut s, "I feel okay today").await.unwrap();

        assert_eq!(out.turn, 1);
        assert_eq!(out.mood, MoodLabel::Neutral);
        assert_eq!(out.polarity, 0.0);
        assert_eq!(out.reply, GENERATED);
        assert!(out.suggestion.is_none());
        assert!(!out.activated);
        assert!(!out.degraded);
        assert_eq!(s.transcript().len(), 3);
        assert!(s.mood_log().is_empty());
        assert!(!s.suggestion_active());
    }

    #[tokio::test]
    async fn test_first_turn_negative_not_augmented() {
        let c = companion(CannedGenerator);
        let mut s = session();

        let out = c.respond(&mut s, "I feel hopeless").await.unwrap();

        assert_eq!(out.mood, MoodLabel::Negative);
        assert_eq!(out.reply, GENERATED);
        assert!(s.mood_log().is_empty());
    }

    #[tokio::test]
    async fn test_second_turn_severe_activates_and_shows_crisis() {
        let c = companion(CannedGenerator);
        let mut s = session();

        c.respond(&mut s, "I feel okay today").await.unwrap();
        let out = c.respond(&mut s, "I am so sad and hopeless").await.unwrap();

        assert_eq!(out.turn, 2);
        assert_eq!(out.mood, MoodLabel::Negative);
        assert!(out.activated);
        assert_eq!(out.suggestion, Suggestion::Crisis);
        assert!(out.reply.starts_with(GENERATED));
        assert!(out.reply.contains(CRISIS_MARKER));
        assert!(out.reply.contains("988"));
        assert!(out.reply.contains("116 123"));
        assert!(out.reply.contains("9152987821"));

        assert!(s.suggestion_active());
        assert_eq!(s.mood_log().len(), 1);
        let record = &s.mood_log()[0];
        assert_eq!(record.score, -0.7);
        assert_eq!(record.mood, MoodLabel::Negative);
        assert_eq!(record.entry, "I am so sad and hopeless");
        assert_eq!(record.suggestion, Suggestion::Crisis);
    }

    #[tokio::test]
    async fn test_mild_negative_gets_tip_and_record_keeps_it() {
        let c = companion(CannedGenerator);
        let mut s = session();

        c.respond(&mut s, "hi").await.unwrap();
        let out = c.respond(&mut s, "work has me stressed").await.unwrap();

        let expected = Suggestion::Tip {
            text: "Take 5 deep breaths. 🌬️".into(),
        };
        assert_eq!(out.suggestion, expected);
        assert!(out.reply.ends_with("> 💡 **Tip:** Take 5 deep breaths. 🌬️"));
        assert_eq!(out.reply.matches(TIP_MARKER).count(), 1);
        assert_eq!(s.mood_log()[0].suggestion, expected);
    }

    #[tokio::test]
    async fn test_positive_after_activation_unchanged_but_logged() {
        let c = companion(CannedGenerator);
        let mut s = session();

        c.respond(&mut s, "hi").await.unwrap();
        let out = c.respond(&mut s, "what a great day").await.unwrap();

        assert_eq!(out.reply, GENERATED);
        assert_eq!(s.mood_log().len(), 1);
        assert_eq!(s.mood_log()[0].mood, MoodLabel::Positive);
    }

    #[tokio::test]
    async fn test_generation_failure_uses_fallback_and_continues() {
        let c = companion(FlakyGenerator {
            fail_on: vec![2],
            calls: Mutex::new(0),
        });
        let mut s = session();

        c.respond(&mut s, "hi").await.unwrap();
        let out = c.respond(&mut s, "I feel hopeless").await.unwrap();

        assert!(out.degraded);
        assert!(out.reply.starts_with(FALLBACK_MARKER));
        assert!(out.reply.contains("connection refused"));
        assert!(out.reply.contains(CRISIS_MARKER));
        assert_eq!(s.transcript().len(), 5);
        assert_eq!(s.transcript()[4].content, out.reply);
        assert_eq!(s.mood_log().len(), 1);

        let next = c.respond(&mut s, "hi again").await.unwrap();
        assert!(!next.degraded);
        assert_eq!(next.reply, GENERATED);
    }

    #[tokio::test]
    async fn test_generation_failure_on_first_turn() {
        let c = companion(FlakyGenerator {
            fail_on: vec![1],
            calls: Mutex::new(0),
        });
        let mut s = session();

        let out = c.respond(&mut s, "hello").await.unwrap();
        assert!(out.degraded);
        assert_eq!(
            out.reply,
            "⚠️ Sorry, I had trouble generating a response: network error: connection refused"
        );
        assert_eq!(s.transcript().len(), 3);
        assert!(s.mood_log().is_empty());
    }

    #[tokio::test]
    async fn test_mood_log_growth_and_monotone_activation() {
        let c = companion(CannedGenerator);
        let mut s = session();

        for n in 1..=7usize {
            let input = if n % 2 == 0 { "feeling great" } else { "I am stressed" };
            c.respond(&mut s, input).await.unwrap();
            assert_eq!(s.user_turns(), n);
            assert_eq!(s.mood_log().len(), n.saturating_sub(1));
            assert_eq!(s.suggestion_active(), n >= 2);
        }
    }

    #[tokio::test]
    async fn test_transcript_alternates_roles() {
        let c = companion(CannedGenerator);
        let mut s = session();

        for input in ["a", "b", "c", "d"] {
            c.respond(&mut s, input).await.unwrap();
        }

        let t = s.transcript();
        assert_eq!(t.len(), 9);
        assert_eq!(t[0].role, Role::Assistant);
        for pair in t[1..].chunks(2) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[1].role, Role::Assistant);
        }
        assert_eq!(t[7].content, "d");
    }

    #[tokio::test]
    async fn test_blank_input_rejected_without_state_change() {
        let c = companion(CannedGenerator);
        let mut s = session();

        let err = c.respond(&mut s, "   \n").await.unwrap_err();
        assert!(matches!(err, MoodmateError::InvalidInput(_)));
        assert_eq!(s.user_turns(), 0);
        assert_eq!(s.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_prompt_carries_mood_label() {
        let generator = RecordingGenerator::default();
        let c = Companion::new(generator, SupportCatalog::default())
            .with_scorer(scripted as fn(&str) -> f64);
        let mut s = session();

        c.respond(&mut s, "I feel hopeless").await.unwrap();
        c.respond(&mut s, "great news today").await.unwrap();

        let prompts = c.generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("The user is feeling: Negative."));
        assert!(prompts[0].contains("User said: \"I feel hopeless\""));
        assert!(prompts[1].contains("The user is feeling: Positive."));
    }

    #[tokio::test]
    async fn test_default_scorer_end_to_end() {
        let c = Companion::new(CannedGenerator, SupportCatalog::default());
        let mut s = session();

        let first = c.respond(&mut s, "I feel okay today").await.unwrap();
        assert_eq!(first.mood, MoodLabel::Neutral);

        let second = c.respond(&mut s, "I am so sad and hopeless").await.unwrap();
        assert_eq!(second.mood, MoodLabel::Negative);
        assert!(second.polarity < -0.6);
        assert_eq!(second.suggestion, Suggestion::Crisis);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let c = companion(CannedGenerator);
        let mut registry = SessionRegistry::new();
        let a = registry.open("hi a");
        let b = registry.open("hi b");

        for input in ["one", "two", "three"] {
            c.respond(registry.get_mut(a).unwrap(), input).await.unwrap();
        }
        c.respond(registry.get_mut(b).unwrap(), "only one").await.unwrap();

        let sa = registry.get(a).unwrap();
        let sb = registry.get(b).unwrap();
        assert_eq!(sa.user_turns(), 3);
        assert_eq!(sa.mood_log().len(), 2);
        assert!(sa.suggestion_active());
        assert_eq!(sb.user_turns(), 1);
        assert!(sb.mood_log().is_empty());
        assert!(!sb.suggestion_active());
        assert_eq!(sb.transcript()[0].content, "hi b");
    }

    #[tokio::test]
    async fn test_concurrent_sessions_share_companion() {
        let c = companion(CannedGenerator);
        let mut s1 = session();
        let mut s2 = session();

        let f1 = async {
            for input in ["a", "b", "I feel hopeless"] {
                c.respond(&mut s1, input).await.unwrap();
            }
        };
        let f2 = async {
            c.respond(&mut s2, "just one").await.unwrap();
        };
        tokio::join!(f1, f2);

        assert_eq!(s1.user_turns(), 3);
        assert_eq!(s1.mood_log().len(), 2);
        assert_eq!(s2.user_turns(), 1);
        assert!(s2.mood_log().is_empty());
    }

    #[test]
    fn test_augment_delegates_to_catalog() {
        let c = companion(CannedGenerator);
        assert_eq!(c.augment("x", 0.5), "x");
        assert!(c.augment("x", -0.9).contains(CRISIS_MARKER));
    }
}
