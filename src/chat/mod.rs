//! Conversations with the research backend and the state that follows them.

mod conversation;
mod error;
mod orchestrator;
mod storage;
mod transport;

pub use conversation::{Conversation, ConversationState, Message, Role, SelectionStatus};
pub use error::{ChatError, StorageError, TransportError};
pub use orchestrator::{ChatSession, ConversationSummary, PendingTurn, SEND_FAILED, TurnOutcome};
pub use storage::{BrowserStorage, ConversationStorage, MemoryStorage};
pub use transport::{ChatRequest, ChatResponse, ChatTransport, HttpTransport};
