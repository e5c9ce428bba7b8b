//! Append-only conversation store with change notifications.

use std::sync::{Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::debug;

use crate::state::{ChatMessage, Conversation, MessageId, Sender};

/// Why a user turn was not appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("message is empty")]
    Blank,
    #[error("a reply is still pending")]
    Busy,
    #[error("identical message is already pending")]
    Duplicate,
}

struct Inner {
    conversation: Conversation,
    pending: Option<String>,
    next_id: u64,
}

impl Inner {
    fn push(&mut self, text: String, sender: Sender) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.conversation.messages.push(ChatMessage { id, text, sender });
        id
    }
}

/// Ordered, append-only sequence of messages plus the busy flag.
///
/// Every mutation publishes a fresh [`Conversation`] snapshot to subscribers.
pub struct ConversationStore {
    inner: Mutex<Inner>,
    tx: watch::Sender<Conversation>,
}

impl ConversationStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Conversation::default());
        Self {
            inner: Mutex::new(Inner {
                conversation: Conversation::default(),
                pending: None,
                next_id: 1,
            }),
            tx,
        }
    }

    /// Store seeded with a single assistant turn.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let store = Self::new();
        store.append_assistant(greeting);
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, inner: &Inner) {
        self.tx.send_replace(inner.conversation.clone());
    }

    /// Append a user turn and mark the conversation busy.
    ///
    /// Blank text, a send already in flight, or a repeat of the text that is
    /// currently pending leave the store untouched.
    pub fn append_user(&self, text: &str) -> Result<MessageId, Rejection> {
        let mut inner = self.lock();

        if text.trim().is_empty() {
            return Err(Rejection::Blank);
        }
        if inner.pending.as_deref() == Some(text) {
            return Err(Rejection::Duplicate);
        }
        if inner.conversation.busy {
            return Err(Rejection::Busy);
        }

        let id = inner.push(text.to_string(), Sender::User);
        inner.pending = Some(text.to_string());
        inner.conversation.busy = true;
        debug!(id = id.0, "appended user turn");
        self.publish(&inner);
        Ok(id)
    }

    pub fn append_assistant(&self, text: impl Into<String>) -> MessageId {
        let mut inner = self.lock();
        let id = inner.push(text.into(), Sender::Assistant);
        self.publish(&inner);
        id
    }

    /// Append the reply for the pending turn and go idle again.
    pub fn complete_turn(&self, text: impl Into<String>) -> MessageId {
        let mut inner = self.lock();
        let id = inner.push(text.into(), Sender::Assistant);
        inner.pending = None;
        inner.conversation.busy = false;
        debug!(id = id.0, "completed turn");
        self.publish(&inner);
        id
    }

    /// Go idle without appending anything.
    pub(crate) fn release(&self) {
        let mut inner = self.lock();
        if inner.conversation.busy {
            inner.pending = None;
            inner.conversation.busy = false;
            self.publish(&inner);
        }
    }

    pub fn is_busy(&self) -> bool {
        self.lock().conversation.busy
    }

    pub fn len(&self) -> usize {
        self.lock().conversation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Conversation {
        self.lock().conversation.clone()
    }

    /// Receiver that wakes on every change. Closes once the store is dropped.
    pub fn subscribe(&self) -> watch::Receiver<Conversation> {
        self.tx.subscribe()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
