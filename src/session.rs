use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{CounterpointError, Result};
use crate::models::Turn;
use crate::styles::DebateStyle;

/// The single logical debate session: an ordered turn sequence plus the
/// style pinned at start. All operations are state transitions producing a
/// new `Session`; nothing here mutates in place, so every transition is
/// unit-testable without a rendering surface or a running server.
///
/// Invariant: `turns` strictly alternates starting with a user turn. The
/// transitions below make that invariant total over the contract -
/// `append_user_turn` refuses to run while a reply is awaited, and
/// `append_assistant_turn` refuses to run unless one is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: Option<Uuid>,
    pub style: Option<DebateStyle>,
    pub turns: Vec<Turn>,
    /// Set while a completion call is outstanding for the last user turn.
    /// Rejects duplicate concurrent sends.
    pub awaiting_reply: bool,
    pub started_at: Option<DateTime<Utc>>,
}

impl Session {
    /// The reset state: no id, no style pinned, no turns. Resetting twice
    /// yields the same result both times.
    pub fn empty() -> Self {
        Self {
            id: None,
            style: None,
            turns: Vec::new(),
            awaiting_reply: false,
            started_at: None,
        }
    }

    /// Begin a debate on `topic`. The topic becomes the first user turn.
    pub fn start(topic: &str, style: DebateStyle) -> Result<Self> {
        if topic.trim().is_empty() {
            return Err(CounterpointError::validation(
                "topic",
                "topic cannot be empty",
            ));
        }
        Ok(Self {
            id: Some(Uuid::new_v4()),
            style: Some(style),
            turns: vec![Turn::user(topic)],
            awaiting_reply: true,
            started_at: Some(Utc::now()),
        })
    }

    /// Append a user turn. Rejected while a reply is outstanding or before
    /// the session has started.
    pub fn append_user_turn(&self, text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(CounterpointError::validation(
                "text",
                "message cannot be empty",
            ));
        }
        if self.id.is_none() {
            return Err(CounterpointError::validation(
                "session",
                "no debate in progress; start one with a topic first",
            ));
        }
        if self.awaiting_reply {
            return Err(CounterpointError::validation(
                "session",
                "a reply is still pending; wait for it before sending again",
            ));
        }
        let mut next = self.clone();
        next.turns.push(Turn::user(text));
        next.awaiting_reply = true;
        Ok(next)
    }

    /// Append the model's reply. Empty model text is allowed and passed
    /// through verbatim. Errors if no user turn is awaiting a reply, which
    /// keeps the alternation invariant total.
    pub fn append_assistant_turn(&self, text: &str) -> Result<Self> {
        if !self.awaiting_reply {
            return Err(CounterpointError::validation(
                "session",
                "no user turn is awaiting a reply",
            ));
        }
        let mut next = self.clone();
        next.turns.push(Turn::assistant(text));
        next.awaiting_reply = false;
        Ok(next)
    }

    pub fn reset() -> Self {
        Self::empty()
    }
}
