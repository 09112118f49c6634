use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::{ChatMessage, MoodRecord};

/// User turn on which suggestion mode switches on.
pub const ACTIVATION_TURN: usize = 2;

/// Everything one conversation accumulates. Owned by a single session and
/// discarded when it ends.
///
/// The transcript and mood log are append-only; the turn counter only grows
/// and suggestion mode, once on, stays on.
#[derive(Debug, Clone)]
pub struct SessionState {
    id: Uuid,
    started_at: DateTime<Utc>,
    transcript: Vec<ChatMessage>,
    mood_log: Vec<MoodRecord>,
    user_turns: usize,
    suggestion_active: bool,
}

impl SessionState {
    /// New session seeded with an assistant greeting.
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            started_at: Utc::now(),
            transcript: vec![ChatMessage::assistant(greeting)],
            mood_log: Vec::new(),
            user_turns: 0,
            suggestion_active: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn mood_log(&self) -> &[MoodRecord] {
        &self.mood_log
    }

    pub fn user_turns(&self) -> usize {
        self.user_turns
    }

    pub fn suggestion_active(&self) -> bool {
        self.suggestion_active
    }

    /// Count a new user turn and append it to the transcript. Returns the
    /// updated counter.
    pub(crate) fn begin_turn(&mut self, input: &str) -> usize {
        self.user_turns += 1;
        self.transcript.push(ChatMessage::user(input));
        self.user_turns
    }

    /// Switch suggestion mode on. Returns `true` only on the call that
    /// actually flipped it.
    pub(crate) fn activate_suggestions(&mut self) -> bool {
        let flipped = !self.suggestion_active;
        self.suggestion_active = true;
        flipped
    }

    pub(crate) fn log_mood(&mut self, record: MoodRecord) {
        self.mood_log.push(record);
    }

    pub(crate) fn push_reply(&mut self, reply: String) {
        self.transcript.push(ChatMessage::assistant(reply));
    }
}

/// Many isolated sessions keyed by id. Nothing is shared between entries.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<Uuid, SessionState>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh session and return its id.
    pub fn open(&mut self, greeting: impl Into<String>) -> Uuid {
        let session = SessionState::new(greeting);
        let id = session.id();
        self.sessions.insert(id, session);
        tracing::debug!(%id, open = self.sessions.len(), "session opened");
        id
    }

    pub fn get(&self, id: Uuid) -> Option<&SessionState> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut SessionState> {
        self.sessions.get_mut(&id)
    }

    /// End a session, handing back its final state.
    pub fn close(&mut self, id: Uuid) -> Option<SessionState> {
        let closed = self.sessions.remove(&id);
        if closed.is_some() {
            tracing::debug!(%id, open = self.sessions.len(), "session closed");
        }
        closed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
