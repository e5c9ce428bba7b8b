pub mod ai;
pub mod assistant;
pub mod body_map;
pub mod chat;
pub mod config;
pub mod conversation;
pub mod persona;
pub mod state;

// Re-export main types for convenience
pub use ai::{ChatBackend, GeminiClient, RemoteCallError, SessionHandle};
pub use assistant::AssistantSession;
pub use body_map::{region_at, BodyRegion};
pub use chat::{ChatController, PendingTurn};
pub use config::Config;
pub use conversation::{ConversationStore, Rejection};
pub use state::{ChatMessage, Conversation, MessageId, Sender};
