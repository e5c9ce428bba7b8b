//! UI-agnostic conversation types
//!
//! These are shared by every front end and don't depend on any specific UI
//! framework.

use serde::{Deserialize, Serialize};

/// Identity of a message within one conversation.
///
/// Allocated in insertion order, so ids compare the same way the messages
/// are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// A single chat turn. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
}

impl ChatMessage {
    /// Text split into display lines. A reply's embedded line breaks each
    /// become their own visual line.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }
}

/// Point-in-time view of a conversation, as handed to observers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    pub messages: Vec<ChatMessage>,
    pub busy: bool,
}

impl Conversation {
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}
