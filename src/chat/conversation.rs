use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graph::{Graph, Node};

const PREVIEW_CHARS: usize = 35;

/// Who wrote a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	/// The person at the keyboard.
	User,
	/// The research backend.
	Assistant,
}

/// Whether a node was selected when the message was recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionStatus {
	/// A node was selected.
	Selected,
	/// Nothing was selected.
	Unselected,
}

/// One chat message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
	/// Unique within the session.
	pub id: String,
	/// Message text.
	pub content: String,
	/// Author.
	pub role: Role,
	/// When the message was recorded.
	pub timestamp: DateTime<Utc>,
	/// Snapshot of the selection at send time.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub selected_node: Option<Node>,
	/// Mirrors whether `selected_node` is set.
	pub status: SelectionStatus,
}

impl Message {
	/// Stamps a message with the current time.
	pub fn new(id: String, content: String, role: Role, selected_node: Option<Node>) -> Self {
		let status = if selected_node.is_some() {
			SelectionStatus::Selected
		} else {
			SelectionStatus::Unselected
		};
		Self {
			id,
			content,
			role,
			timestamp: Utc::now(),
			selected_node,
			status,
		}
	}
}

/// What gets persisted per conversation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
	/// Messages in send order.
	#[serde(default)]
	pub messages: Vec<Message>,
	/// Graph as last shown for this conversation.
	#[serde(default, rename = "graphData")]
	pub graph: Option<Graph>,
}

/// A conversation held in memory by the session.
#[derive(Clone, Debug, PartialEq)]
pub struct Conversation {
	/// Server id, or a `local-` id until the first reply.
	pub id: String,
	/// Messages in send order.
	pub messages: Vec<Message>,
	/// Graph snapshot, `None` until a reply brings one.
	pub graph: Option<Graph>,
}

impl Conversation {
	/// An empty conversation.
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			messages: Vec::new(),
			graph: None,
		}
	}

	/// Rebuilds a conversation from its persisted form.
	pub fn from_state(id: impl Into<String>, state: ConversationState) -> Self {
		Self {
			id: id.into(),
			messages: state.messages,
			graph: state.graph,
		}
	}

	/// The persisted form.
	pub fn to_state(&self) -> ConversationState {
		ConversationState {
			messages: self.messages.clone(),
			graph: self.graph.clone(),
		}
	}

	/// Short label for conversation lists.
	pub fn preview(&self) -> String {
		match self.messages.first() {
			Some(message) => message.content.trim().chars().take(PREVIEW_CHARS).collect(),
			None => "New Chat".to_owned(),
		}
	}
}
