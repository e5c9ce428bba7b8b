//! The send cycle shared by every input source.
//!
//! `begin_turn` validates and records the user turn synchronously so a UI can
//! clear its input and hand the returned [`PendingTurn`] to a task; awaiting
//! [`PendingTurn::complete`] performs the remote call and records the reply.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::ai::ChatBackend;
use crate::assistant::AssistantSession;
use crate::body_map::BodyRegion;
use crate::conversation::{ConversationStore, Rejection};
use crate::persona::GREETING;
use crate::state::{Conversation, MessageId};

/// State and session of one chat view. Dropping it ends the conversation.
pub struct ChatController {
    store: ConversationStore,
    assistant: AssistantSession,
}

impl ChatController {
    /// Fresh conversation seeded with the greeting.
    pub fn new(backend: Arc<dyn ChatBackend>) -> Arc<Self> {
        Self::with_session(AssistantSession::new(backend))
    }

    pub fn with_session(assistant: AssistantSession) -> Arc<Self> {
        info!("chat session started");
        Arc::new(Self {
            store: ConversationStore::with_greeting(GREETING),
            assistant,
        })
    }

    pub fn snapshot(&self) -> Conversation {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Conversation> {
        self.store.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.store.is_busy()
    }

    /// Record `text` as a user turn and mark the conversation busy.
    pub fn begin_turn(self: &Arc<Self>, text: &str) -> Result<PendingTurn, Rejection> {
        let user_id = self.store.append_user(text).inspect_err(|reason| {
            debug!(%reason, "submission dropped");
        })?;
        Ok(PendingTurn {
            chat: Arc::clone(self),
            text: text.to_string(),
            user_id,
            done: false,
        })
    }

    /// Run the full cycle for free text. Returns the assistant turn's id.
    pub async fn submit(self: &Arc<Self>, text: &str) -> Result<MessageId, Rejection> {
        Ok(self.begin_turn(text)?.complete().await)
    }

    /// Run the full cycle for a diagram selection.
    pub async fn select_region(
        self: &Arc<Self>,
        region: BodyRegion,
    ) -> Result<MessageId, Rejection> {
        self.submit(&region.prompt()).await
    }
}

impl Drop for ChatController {
    fn drop(&mut self) {
        info!(messages = self.store.len(), "chat session ended");
    }
}

/// A user turn that has been recorded and is waiting for its reply.
///
/// Dropping it without calling [`complete`](Self::complete) releases the busy
/// flag.
pub struct PendingTurn {
    chat: Arc<ChatController>,
    text: String,
    user_id: MessageId,
    done: bool,
}

impl PendingTurn {
    pub fn user_id(&self) -> MessageId {
        self.user_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Ask the assistant and append its reply (or the fallback).
    pub async fn complete(mut self) -> MessageId {
        let reply = self.chat.assistant.send(&self.text).await;
        self.done = true;
        self.chat.store.complete_turn(reply)
    }
}

impl Drop for PendingTurn {
    fn drop(&mut self) {
        if !self.done {
            debug!(id = self.user_id.0, "pending turn abandoned");
            self.chat.store.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{RemoteCallError, SessionHandle};
    use crate::assistant::tests::ScriptedBackend;
    use crate::persona::FALLBACK_REPLY;
    use crate::state::Sender;
    use async_trait::async_trait;
    use tokio::sync::{oneshot, Mutex};

    /// Backend that blocks until the test releases a reply.
    struct GatedBackend {
        gate: Mutex<Option<oneshot::Receiver<Result<String, RemoteCallError>>>>,
    }

    #[async_trait]
    impl ChatBackend for GatedBackend {
        async fn send_turn(
            &self,
            _session: &SessionHandle,
            _text: &str,
        ) -> Result<String, RemoteCallError> {
            let rx = self.gate.lock().await.take().expect("single use");
            rx.await.unwrap_or_else(|_| Err(RemoteCallError::Network("gate dropped".into())))
        }
    }

    fn scripted(replies: Vec<Result<String, RemoteCallError>>) -> Arc<ChatController> {
        ChatController::new(Arc::new(ScriptedBackend::new(replies)))
    }

    #[test]
    fn test_starts_with_greeting_and_idle() {
        let chat = scripted(vec![]);
        let snap = chat.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.messages[0].sender, Sender::Assistant);
        assert_eq!(snap.messages[0].text, GREETING);
        assert!(!snap.busy);
    }

    #[tokio::test]
    async fn test_successful_cycle_adds_two_turns() {
        let chat = scripted(vec![Ok("Keep a regular schedule.".into())]);
        chat.submit("What helps with sleep?").await.unwrap();

        let snap = chat.snapshot();
        assert_eq!(snap.len(), 3);
        assert_eq!(snap.messages[1].sender, Sender::User);
        assert_eq!(snap.messages[1].text, "What helps with sleep?");
        assert_eq!(snap.messages[2].text, "Keep a regular schedule.");
        assert!(!snap.busy);
    }

    #[tokio::test]
    async fn test_failed_cycle_appends_fallback() {
        let chat = scripted(vec![Err(RemoteCallError::Network("offline".into()))]);
        chat.submit("hello").await.unwrap();

        let snap = chat.snapshot();
        assert_eq!(snap.len(), 3);
        assert_eq!(snap.last().unwrap().text, FALLBACK_REPLY);
        assert!(!snap.busy);
    }

    #[tokio::test]
    async fn test_blank_submission_changes_nothing() {
        let chat = scripted(vec![]);
        assert_eq!(chat.submit("   ").await, Err(Rejection::Blank));
        assert_eq!(chat.snapshot().len(), 1);
        assert!(!chat.is_busy());
    }

    #[tokio::test]
    async fn test_region_selection_sends_template() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok("The chest...".into())]));
        let chat = ChatController::new(backend.clone());
        chat.select_region(BodyRegion::Chest).await.unwrap();

        let snap = chat.snapshot();
        assert_eq!(
            snap.messages[1].text,
            "Tell me about the Chest in the context of general health."
        );
        assert_eq!(snap.len(), 3);
        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].1, "Tell me about the Chest in the context of general health.");
    }

    #[tokio::test]
    async fn test_busy_while_reply_pending() {
        let (tx, rx) = oneshot::channel();
        let backend = Arc::new(GatedBackend {
            gate: Mutex::new(Some(rx)),
        });
        let chat = ChatController::new(backend);

        let pending = chat.begin_turn("What helps with sleep?").unwrap();
        assert!(chat.is_busy());
        assert_eq!(chat.snapshot().len(), 2);

        let task = tokio::spawn(pending.complete());

        assert!(matches!(chat.begin_turn("another"), Err(Rejection::Busy)));
        assert!(matches!(chat.begin_turn("What helps with sleep?"), Err(Rejection::Duplicate)));
        assert_eq!(chat.snapshot().len(), 2);

        tx.send(Ok("Dim the lights.".into())).unwrap();
        task.await.unwrap();

        let snap = chat.snapshot();
        assert_eq!(snap.len(), 3);
        assert_eq!(snap.last().unwrap().text, "Dim the lights.");
        assert!(!snap.busy);
    }

    #[tokio::test]
    async fn test_length_grows_by_two_per_cycle() {
        let chat = scripted(vec![
            Ok("a".into()),
            Err(RemoteCallError::Malformed("bad".into())),
            Ok("c".into()),
        ]);
        for (i, text) in ["one", "two", "three"].into_iter().enumerate() {
            chat.submit(text).await.unwrap();
            assert_eq!(chat.snapshot().len(), 1 + 2 * (i + 1));
        }
        chat.submit("").await.unwrap_err();
        assert_eq!(chat.snapshot().len(), 7);
    }

    #[tokio::test]
    async fn test_repeat_question_after_reply_is_allowed() {
        let chat = scripted(vec![Ok("x".into()), Ok("y".into())]);
        chat.submit("same").await.unwrap();
        chat.submit("same").await.unwrap();
        assert_eq!(chat.snapshot().len(), 5);
    }

    #[test]
    fn test_dropped_pending_turn_releases_busy() {
        let chat = scripted(vec![]);
        let pending = chat.begin_turn("never sent").unwrap();
        assert!(chat.is_busy());
        drop(pending);
        assert!(!chat.is_busy());
        assert_eq!(chat.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn test_observer_sees_busy_then_idle() {
        let chat = scripted(vec![Ok("reply".into())]);
        let mut rx = chat.subscribe();

        let pending = chat.begin_turn("q").unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().busy);

        pending.complete().await;
        rx.changed().await.unwrap();
        let snap = rx.borrow_and_update();
        assert!(!snap.busy);
        assert_eq!(snap.len(), 3);
    }
}
