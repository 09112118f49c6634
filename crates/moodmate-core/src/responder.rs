//! Prompt construction and fallback replies for the generation step.

use crate::error::GenerationError;
use crate::model::MoodLabel;

/// Marker that opens every fallback reply.
pub const FALLBACK_MARKER: &str = "⚠️";

/// Fixed-shape prompt embedding the mood label and the verbatim user text.
pub fn build_prompt(user_text: &str, mood: MoodLabel) -> String {
    format!(
        "You are a caring and empathetic mental health companion.\n\
         The user is feeling: {mood}.\n\
         Provide a short, supportive response with 2-3 practical tips\n\
         or coping strategies tailored to the user's mood.\n\
         Keep it warm and encouraging.\n\
         User said: \"{user_text}\""
    )
}

/// Reply shown in place of generated text when the remote call failed.
pub fn fallback_reply(err: &GenerationError) -> String {
    format!("{FALLBACK_MARKER} Sorry, I had trouble generating a response: {err}")
}
