//! The assistant side of a conversation: one remote session, one call at a time.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::ai::{ChatBackend, RemoteCallError, SessionHandle};
use crate::persona::{FALLBACK_REPLY, SYSTEM_INSTRUCTION};

pub struct AssistantSession {
    backend: Arc<dyn ChatBackend>,
    handle: Mutex<SessionHandle>,
}

impl AssistantSession {
    /// Session bound to the standard wellness persona.
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self::with_instruction(backend, SYSTEM_INSTRUCTION)
    }

    pub fn with_instruction(backend: Arc<dyn ChatBackend>, system_instruction: &str) -> Self {
        Self {
            backend,
            handle: Mutex::new(SessionHandle::new(system_instruction)),
        }
    }

    /// Send `text` and return the reply, or the fallback message if the
    /// remote call fails. Never errors.
    pub async fn send(&self, text: &str) -> String {
        match self.try_send(text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "assistant call failed, substituting fallback reply");
                FALLBACK_REPLY.to_string()
            }
        }
    }

    /// Like [`send`](Self::send) but hands the failure back.
    /// Only successful exchanges are added to the session history.
    pub async fn try_send(&self, text: &str) -> Result<String, RemoteCallError> {
        let mut handle = self.handle.lock().await;
        let reply = self.backend.send_turn(&handle, text).await?;
        handle.record(text, reply.clone());
        debug!(history = handle.history().len(), "assistant replied");
        Ok(reply)
    }

    pub async fn history_len(&self) -> usize {
        self.handle.lock().await.history().len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    /// Backend returning scripted results in order and recording what it saw.
    pub(crate) struct ScriptedBackend {
        replies: StdMutex<Vec<Result<String, RemoteCallError>>>,
        pub(crate) seen: StdMutex<Vec<(usize, String)>>,
    }

    impl ScriptedBackend {
        pub(crate) fn new(replies: Vec<Result<String, RemoteCallError>>) -> Self {
            Self {
                replies: StdMutex::new(replies.into_iter().rev().collect()),
                seen: StdMutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn send_turn(
            &self,
            session: &SessionHandle,
            text: &str,
        ) -> Result<String, RemoteCallError> {
            self.seen.lock().unwrap().push((session.history().len(), text.to_string()));
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(RemoteCallError::Network("script exhausted".into())))
        }
    }

    #[tokio::test]
    async fn test_send_returns_reply_verbatim() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok("Rest.\nHydrate.".into())]));
        let session = AssistantSession::new(backend);
        assert_eq!(session.send("tips?").await, "Rest.\nHydrate.");
    }

    #[tokio::test]
    async fn test_failure_substitutes_fallback() {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(RemoteCallError::Service {
            status: 503,
            body: "unavailable".into(),
        })]));
        let session = AssistantSession::new(backend);
        assert_eq!(session.send("tips?").await, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_history_only_records_successes() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok("one".into()),
            Err(RemoteCallError::Network("down".into())),
            Ok("three".into()),
        ]));
        let session = AssistantSession::new(backend.clone());

        session.send("a").await;
        session.send("b").await;
        session.send("c").await;

        assert_eq!(session.history_len().await, 2);
        let seen = backend.seen.lock().unwrap().clone();
        assert_eq!(seen, vec![(0, "a".to_string()), (1, "b".to_string()), (1, "c".to_string())]);
    }

    #[tokio::test]
    async fn test_session_carries_system_instruction() {
        struct InstructionEcho;

        #[async_trait]
        impl ChatBackend for InstructionEcho {
            async fn send_turn(
                &self,
                session: &SessionHandle,
                _text: &str,
            ) -> Result<String, RemoteCallError> {
                Ok(session.system_instruction().to_string())
            }
        }

        let session = AssistantSession::new(Arc::new(InstructionEcho));
        assert_eq!(session.send("hi").await, SYSTEM_INSTRUCTION);
    }
}
