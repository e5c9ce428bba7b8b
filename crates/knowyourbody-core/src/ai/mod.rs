pub mod gemini;

use async_trait::async_trait;

pub use gemini::GeminiClient;

/// A remote text-generation call failed.
///
/// The variants only describe the cause; callers treat them all the same.
#[derive(Debug, thiserror::Error)]
pub enum RemoteCallError {
    #[error("network error: {0}")]
    Network(String),
    #[error("service error {status}: {body}")]
    Service { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// One completed user/model exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub user: String,
    pub reply: String,
}

/// Remote-side context of one conversation: the system instruction it was
/// opened with and every exchange that succeeded so far.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    system_instruction: String,
    history: Vec<Exchange>,
}

impl SessionHandle {
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            history: Vec::new(),
        }
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn history(&self) -> &[Exchange] {
        &self.history
    }

    pub(crate) fn record(&mut self, user: impl Into<String>, reply: impl Into<String>) {
        self.history.push(Exchange {
            user: user.into(),
            reply: reply.into(),
        });
    }
}

/// Send one turn of a chat session to a text-generation service.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send_turn(
        &self,
        session: &SessionHandle,
        text: &str,
    ) -> Result<String, RemoteCallError>;
}
