use thiserror::Error;

/// Why a chat request produced no reply.
#[derive(Debug, Error)]
pub enum TransportError {
	/// Network failure or request never sent.
	#[error("request failed: {0}")]
	Http(String),
	/// Non-success HTTP status.
	#[error("server responded with status {0}")]
	Status(u16),
	/// Body was not a valid chat response.
	#[error("malformed response: {0}")]
	Decode(String),
}

impl From<reqwest::Error> for TransportError {
	fn from(e: reqwest::Error) -> Self {
		if e.is_decode() {
			TransportError::Decode(e.to_string())
		} else if let Some(status) = e.status() {
			TransportError::Status(status.as_u16())
		} else {
			TransportError::Http(e.to_string())
		}
	}
}

/// Conversation persistence failures.
#[derive(Debug, Error)]
pub enum StorageError {
	/// No window or `localStorage` disabled.
	#[error("browser storage is unavailable")]
	Unavailable,
	/// The backend threw.
	#[error("storage backend error: {0}")]
	Backend(String),
	/// Stored JSON did not parse, or state did not serialize.
	#[error(transparent)]
	Serde(#[from] serde_json::Error),
}

/// Errors surfaced to the chat view.
#[derive(Debug, Error)]
pub enum ChatError {
	/// The send failed.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// One reply at a time per conversation.
	#[error("a reply is still pending for this conversation")]
	TurnInFlight,
	/// Nothing to send after trimming.
	#[error("message is empty")]
	EmptyMessage,
}
