use std::collections::{BTreeMap, HashSet};

use log::{debug, error, info, warn};

use super::conversation::{Conversation, Message, Role};
use super::error::{ChatError, TransportError};
use super::storage::ConversationStorage;
use super::transport::{ChatRequest, ChatResponse, ChatTransport};
use crate::graph::{Graph, GraphStore, NodeId, merge};
use crate::selection::{SelectionTracker, suggested_prompt};

/// Shown to the user when a turn could not be delivered.
pub const SEND_FAILED: &str = "Failed to send message. Please try again.";

const LOCAL_PREFIX: &str = "local-";

/// A user turn that has been recorded locally and is waiting for the
/// server's reply.
#[derive(Debug)]
pub struct PendingTurn {
	conversation: String,
	request: ChatRequest,
}

impl PendingTurn {
	/// Conversation the reply belongs to.
	pub fn conversation_id(&self) -> &str {
		&self.conversation
	}

	/// Body to post to the backend.
	pub fn request(&self) -> &ChatRequest {
		&self.request
	}
}

/// What [`ChatSession::complete_turn`] did with a reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
	/// The reply landed in the active conversation.
	Applied {
		/// Server id of the conversation.
		conversation_id: String,
		/// Whether the reply replaced the graph.
		graph_updated: bool,
	},
	/// The user had moved on; the reply was dropped.
	Discarded {
		/// Conversation the reply was meant for.
		conversation_id: String,
	},
}

/// One row of the conversation list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationSummary {
	/// Conversation id.
	pub id: String,
	/// First user message, truncated.
	pub preview: String,
	/// Messages so far.
	pub message_count: usize,
	/// Whether this is the open conversation.
	pub active: bool,
}

/// Client-side chat state: conversations, the graph on screen, the node
/// selection, and persistence.
pub struct ChatSession {
	conversations: BTreeMap<String, Conversation>,
	active: Option<String>,
	graph: GraphStore,
	selection: SelectionTracker,
	storage: Box<dyn ConversationStorage>,
	in_flight: HashSet<String>,
	last_error: Option<String>,
	next_local: u64,
	next_message: u64,
}

impl ChatSession {
	/// An empty session over `storage`, nothing loaded.
	pub fn new(storage: Box<dyn ConversationStorage>) -> Self {
		Self::with_graph(storage, GraphStore::default())
	}

	/// Like [`ChatSession::new`] but starting from `graph`.
	pub fn with_graph(storage: Box<dyn ConversationStorage>, graph: GraphStore) -> Self {
		Self {
			conversations: BTreeMap::new(),
			active: None,
			graph,
			selection: SelectionTracker::new(),
			storage,
			in_flight: HashSet::new(),
			last_error: None,
			next_local: 0,
			next_message: 0,
		}
	}

	/// Builds a session from whatever the storage holds. Unreadable storage
	/// starts an empty session.
	pub fn restore(storage: Box<dyn ConversationStorage>) -> Self {
		let saved = match storage.load_all() {
			Ok(saved) => saved,
			Err(e) => {
				error!("could not load saved conversations: {e}");
				BTreeMap::new()
			}
		};
		let mut session = Self::new(storage);
		for (id, state) in saved {
			session
				.conversations
				.insert(id.clone(), Conversation::from_state(id, state));
		}
		session.next_local = session
			.conversations
			.keys()
			.filter_map(|id| id.strip_prefix(LOCAL_PREFIX)?.parse::<u64>().ok())
			.max()
			.unwrap_or(0);
		info!("restored {} conversations", session.conversations.len());
		session
	}

	/// The graph on screen.
	pub fn graph(&self) -> &GraphStore {
		&self.graph
	}

	/// Current selection and its history.
	pub fn selection(&self) -> &SelectionTracker {
		&self.selection
	}

	/// Id of the open conversation, if any.
	pub fn active_id(&self) -> Option<&str> {
		self.active.as_deref()
	}

	/// The open conversation.
	pub fn active_conversation(&self) -> Option<&Conversation> {
		self.active.as_ref().and_then(|id| self.conversations.get(id))
	}

	/// Looks a conversation up by id.
	pub fn conversation(&self, id: &str) -> Option<&Conversation> {
		self.conversations.get(id)
	}

	/// Messages of the open conversation, empty when none is open.
	pub fn messages(&self) -> &[Message] {
		self.active_conversation()
			.map(|c| c.messages.as_slice())
			.unwrap_or(&[])
	}

	/// List rows for every conversation, ordered by id.
	pub fn summaries(&self) -> Vec<ConversationSummary> {
		self.conversations
			.values()
			.map(|c| ConversationSummary {
				id: c.id.clone(),
				preview: c.preview(),
				message_count: c.messages.len(),
				active: self.active.as_deref() == Some(c.id.as_str()),
			})
			.collect()
	}

	/// Error from the most recent failed send.
	pub fn last_error(&self) -> Option<&str> {
		self.last_error.as_deref()
	}

	/// Dismisses the inline send error, as when the user edits the input.
	pub fn clear_error(&mut self) {
		self.last_error = None;
	}

	/// True while the active conversation waits for a reply.
	pub fn is_busy(&self) -> bool {
		self.active
			.as_ref()
			.is_some_and(|id| self.in_flight.contains(id))
	}

	/// Leaves the current conversation. The next message opens a new one.
	pub fn new_chat(&mut self) {
		self.active = None;
		self.graph.reset();
		self.selection.clear();
		self.last_error = None;
	}

	/// Makes `id` active and puts its graph on screen. Returns false for an
	/// unknown id.
	pub fn switch_to(&mut self, id: &str) -> bool {
		let Some(conversation) = self.conversations.get(id) else {
			warn!("no conversation {id}");
			return false;
		};
		match &conversation.graph {
			Some(graph) => self.graph.replace_all(graph.clone()),
			None => self.graph.reset(),
		}
		self.active = Some(id.to_owned());
		self.selection.clear();
		self.last_error = None;
		true
	}

	/// Removes a conversation from the session and storage. Deleting the
	/// open one starts a new chat.
	pub fn delete(&mut self, id: &str) {
		if self.conversations.remove(id).is_none() {
			return;
		}
		if let Err(e) = self.storage.delete(id) {
			error!("failed to delete conversation {id}: {e}");
		}
		if self.active.as_deref() == Some(id) {
			self.new_chat();
		}
	}

	/// Selects a node on screen and returns the prompt to prefill.
	pub fn select_node(&mut self, id: &str) -> Option<String> {
		let node = self.graph.node(id)?.clone();
		let prompt = suggested_prompt(&node);
		self.selection.select(node);
		Some(prompt)
	}

	/// Deselects without touching the graph.
	pub fn clear_selection(&mut self) {
		self.selection.clear();
	}

	/// Drops `id` from the selection history.
	pub fn forget_selection(&mut self, id: &str) {
		self.selection.forget(id);
	}

	/// Applies a local edit to the visible graph and writes the result back
	/// into the active conversation.
	pub fn edit_graph(&mut self, edit: impl FnOnce(&mut GraphStore)) {
		let before = self.graph.revision();
		edit(&mut self.graph);
		if self.graph.revision() == before {
			return;
		}
		if let Some(id) = self.active.clone() {
			if let Some(conversation) = self.conversations.get_mut(&id) {
				conversation.graph = Some(self.graph.graph().clone());
			}
			self.persist(&id);
		}
		let live = self.graph.graph().node_ids();
		let gone: Vec<NodeId> = self
			.selection
			.history()
			.iter()
			.map(|n| n.id.clone())
			.filter(|id| !live.contains(id))
			.collect();
		if self
			.selection
			.selected_id()
			.is_some_and(|id| !live.contains(id))
		{
			self.selection.clear();
		}
		for id in gone {
			self.selection.forget(id.as_str());
		}
	}

	/// Records the user's message and builds the request for it.
	pub fn begin_turn(&mut self, text: &str) -> Result<PendingTurn, ChatError> {
		let text = text.trim();
		if text.is_empty() {
			return Err(ChatError::EmptyMessage);
		}
		if self.is_busy() {
			return Err(ChatError::TurnInFlight);
		}

		let id = match &self.active {
			Some(id) => id.clone(),
			None => {
				let id = self.next_local_id();
				self.conversations
					.insert(id.clone(), Conversation::new(id.clone()));
				self.active = Some(id.clone());
				id
			}
		};

		let message = Message::new(
			self.next_message_id(),
			text.to_owned(),
			Role::User,
			self.selection.selected().cloned(),
		);
		let conversation = self
			.conversations
			.entry(id.clone())
			.or_insert_with(|| Conversation::new(id.clone()));
		conversation.messages.push(message);

		let request = if is_local(&id) {
			ChatRequest {
				chat_id: None,
				message: text.to_owned(),
				current_graph: None,
			}
		} else {
			ChatRequest {
				chat_id: Some(id.clone()),
				message: text.to_owned(),
				current_graph: Some(conversation.graph.clone().unwrap_or_default()),
			}
		};

		self.persist(&id);
		self.in_flight.insert(id.clone());
		self.last_error = None;
		debug!("turn started in {id}");
		Ok(PendingTurn {
			conversation: id,
			request,
		})
	}

	/// Folds the server's reply (or failure) into the session.
	pub fn complete_turn(
		&mut self,
		pending: PendingTurn,
		result: Result<ChatResponse, TransportError>,
	) -> Result<TurnOutcome, ChatError> {
		self.in_flight.remove(&pending.conversation);
		let response = match result {
			Ok(response) => response,
			Err(e) => {
				error!("turn in {} failed: {e}", pending.conversation);
				if self.active.as_deref() == Some(pending.conversation.as_str()) {
					self.last_error = Some(SEND_FAILED.to_owned());
				}
				return Err(e.into());
			}
		};

		let mut id = pending.conversation;
		if pending.request.chat_id.is_none() {
			self.rename(&id, &response.chat_id);
			id = response.chat_id.clone();
		} else if response.chat_id != id {
			warn!("reply for {id} came back tagged {}", response.chat_id);
		}

		if self.active.as_deref() != Some(id.as_str()) {
			warn!("discarding reply for inactive conversation {id}");
			return Ok(TurnOutcome::Discarded {
				conversation_id: id,
			});
		}

		let message = Message::new(
			self.next_message_id(),
			response.message,
			Role::Assistant,
			self.selection.selected().cloned(),
		);
		let Some(conversation) = self.conversations.get_mut(&id) else {
			warn!("conversation {id} disappeared before its reply");
			return Ok(TurnOutcome::Discarded {
				conversation_id: id,
			});
		};
		conversation.messages.push(message);

		let graph_updated = match response.new_graph {
			Some(fragment) => {
				let merged = merge(conversation.graph.as_ref(), Some(&fragment));
				conversation.graph = Some(merged.clone());
				self.graph.replace_all(merged);
				true
			}
			None => false,
		};

		self.persist(&id);
		Ok(TurnOutcome::Applied {
			conversation_id: id,
			graph_updated,
		})
	}

	/// Sends `text` in the active conversation and applies the reply.
	pub async fn send_message<T: ChatTransport>(
		&mut self,
		transport: &T,
		text: &str,
	) -> Result<TurnOutcome, ChatError> {
		let pending = self.begin_turn(text)?;
		let result = transport.send(pending.request()).await;
		self.complete_turn(pending, result)
	}

	/// Snapshot of the active conversation's graph, for callers that need
	/// to send it elsewhere.
	pub fn active_graph(&self) -> Option<&Graph> {
		self.active_conversation().and_then(|c| c.graph.as_ref())
	}

	fn rename(&mut self, from: &str, to: &str) {
		if from == to {
			return;
		}
		let Some(mut conversation) = self.conversations.remove(from) else {
			return;
		};
		conversation.id = to.to_owned();
		self.conversations.insert(to.to_owned(), conversation);
		if let Err(e) = self.storage.delete(from) {
			error!("failed to drop local conversation {from}: {e}");
		}
		if self.active.as_deref() == Some(from) {
			self.active = Some(to.to_owned());
		}
		debug!("conversation {from} is now {to}");
	}

	fn persist(&mut self, id: &str) {
		let Some(conversation) = self.conversations.get(id) else {
			return;
		};
		if let Err(e) = self.storage.save(id, &conversation.to_state()) {
			error!("failed to save conversation {id}: {e}");
		}
	}

	/// Temporary id for a conversation the server has not named yet. Never
	/// collides with a conversation already in the session.
	fn next_local_id(&mut self) -> String {
		loop {
			self.next_local += 1;
			let id = format!("{LOCAL_PREFIX}{}", self.next_local);
			if !self.conversations.contains_key(&id) {
				return id;
			}
		}
	}

	fn next_message_id(&mut self) -> String {
		self.next_message += 1;
		format!(
			"{}-{}",
			chrono::Utc::now().timestamp_millis(),
			self.next_message
		)
	}
}

fn is_local(id: &str) -> bool {
	id.starts_with(LOCAL_PREFIX)
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::collections::VecDeque;

	use futures::executor::block_on;

	use super::*;
	use crate::chat::error::StorageError;
	use crate::chat::storage::MemoryStorage;
	use crate::chat::ConversationState;
	use crate::graph::{Link, Node, NodePatch};

	#[derive(Default)]
	struct ScriptedTransport {
		replies: RefCell<VecDeque<Result<ChatResponse, TransportError>>>,
		requests: RefCell<Vec<ChatRequest>>,
	}

	impl ScriptedTransport {
		fn reply(self, chat_id: &str, message: &str, graph: Option<Graph>) -> Self {
			self.replies.borrow_mut().push_back(Ok(ChatResponse {
				chat_id: chat_id.into(),
				message: message.into(),
				new_graph: graph,
			}));
			self
		}

		fn fail(self) -> Self {
			self.replies
				.borrow_mut()
				.push_back(Err(TransportError::Status(500)));
			self
		}
	}

	impl ChatTransport for ScriptedTransport {
		async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
			self.requests.borrow_mut().push(request.clone());
			self.replies
				.borrow_mut()
				.pop_front()
				.unwrap_or(Err(TransportError::Http("no scripted reply".into())))
		}
	}

	struct BrokenStorage;

	impl ConversationStorage for BrokenStorage {
		fn save(&mut self, _: &str, _: &ConversationState) -> Result<(), StorageError> {
			Err(StorageError::Unavailable)
		}
		fn load_all(&self) -> Result<BTreeMap<String, ConversationState>, StorageError> {
			Err(StorageError::Unavailable)
		}
		fn delete(&mut self, _: &str) -> Result<(), StorageError> {
			Err(StorageError::Unavailable)
		}
	}

	fn fragment(ids: &[&str]) -> Graph {
		let nodes = ids.iter().map(|id| Node::paper(*id, id.to_uppercase())).collect();
		let links = ids.windows(2).map(|w| Link::new(w[0], w[1])).collect();
		Graph::new(nodes, links)
	}

	#[test]
	fn first_message_opens_conversation() {
		let storage = MemoryStorage::new();
		let mut session = ChatSession::new(Box::new(storage.clone()));
		let transport = ScriptedTransport::default().reply("srv-1", "hello", Some(fragment(&["a", "b"])));

		let outcome = block_on(session.send_message(&transport, "  find papers  ")).unwrap();
		assert_eq!(
			outcome,
			TurnOutcome::Applied {
				conversation_id: "srv-1".into(),
				graph_updated: true
			}
		);

		let sent = &transport.requests.borrow()[0];
		assert_eq!(sent.chat_id, None);
		assert_eq!(sent.message, "find papers");
		assert_eq!(sent.current_graph, None);

		assert_eq!(session.active_id(), Some("srv-1"));
		assert_eq!(session.messages().len(), 2);
		assert_eq!(session.messages()[1].role, Role::Assistant);
		assert!(session.graph().contains("a"));
		assert!(!session.graph().contains("1"));
		assert_eq!(storage.ids(), vec!["srv-1".to_owned()]);
		assert!(!session.is_busy());
	}

	#[test]
	fn follow_up_sends_current_graph_and_merges() {
		let mut session = ChatSession::new(Box::new(MemoryStorage::new()));
		let transport = ScriptedTransport::default()
			.reply("srv-1", "one", Some(fragment(&["a", "b"])))
			.reply("srv-1", "two", Some(fragment(&["b", "c"])));

		block_on(session.send_message(&transport, "first")).unwrap();
		block_on(session.send_message(&transport, "second")).unwrap();

		let requests = transport.requests.borrow();
		assert_eq!(requests[1].chat_id.as_deref(), Some("srv-1"));
		assert_eq!(requests[1].current_graph, Some(fragment(&["a", "b"])));

		let graph = session.active_graph().unwrap();
		let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["a", "b", "c"]);
		assert_eq!(graph.links.len(), 2);
		assert_eq!(session.graph().graph(), graph);
	}

	#[test]
	fn reply_without_graph_keeps_graph() {
		let mut session = ChatSession::new(Box::new(MemoryStorage::new()));
		let transport = ScriptedTransport::default().reply("srv-1", "just text", None);
		let outcome = block_on(session.send_message(&transport, "hi")).unwrap();
		assert_eq!(
			outcome,
			TurnOutcome::Applied {
				conversation_id: "srv-1".into(),
				graph_updated: false
			}
		);
		assert!(session.graph().contains("1"));
	}

	#[test]
	fn empty_message_is_rejected() {
		let mut session = ChatSession::new(Box::new(MemoryStorage::new()));
		assert!(matches!(session.begin_turn("   "), Err(ChatError::EmptyMessage)));
		assert!(session.active_id().is_none());
	}

	#[test]
	fn second_turn_waits_for_first() {
		let mut session = ChatSession::new(Box::new(MemoryStorage::new()));
		let pending = session.begin_turn("one").unwrap();
		assert!(session.is_busy());
		assert!(matches!(session.begin_turn("two"), Err(ChatError::TurnInFlight)));

		session
			.complete_turn(
				pending,
				Ok(ChatResponse {
					chat_id: "srv".into(),
					message: "ok".into(),
					new_graph: None,
				}),
			)
			.unwrap();
		assert!(!session.is_busy());
		assert!(session.begin_turn("two").is_ok());
	}

	#[test]
	fn failure_keeps_user_message() {
		let mut session = ChatSession::new(Box::new(MemoryStorage::new()));
		let transport = ScriptedTransport::default().fail();
		let result = block_on(session.send_message(&transport, "hello"));
		assert!(matches!(
			result,
			Err(ChatError::Transport(TransportError::Status(500)))
		));
		assert_eq!(session.messages().len(), 1);
		assert_eq!(session.messages()[0].content, "hello");
		assert_eq!(session.last_error(), Some(SEND_FAILED));
		assert!(!session.is_busy());
		session.clear_error();
		assert_eq!(session.last_error(), None);

		// A retry still opens the conversation on the server.
		let transport = ScriptedTransport::default().reply("srv-9", "back", None);
		block_on(session.send_message(&transport, "hello again")).unwrap();
		assert_eq!(transport.requests.borrow()[0].chat_id, None);
		assert_eq!(session.active_id(), Some("srv-9"));
		assert_eq!(session.messages().len(), 3);
		assert_eq!(session.last_error(), None);
	}

	#[test]
	fn late_reply_for_other_conversation_is_dropped() {
		let storage = MemoryStorage::new();
		let saved = ConversationState {
			messages: Vec::new(),
			graph: Some(fragment(&["x"])),
		};
		let mut writer = storage.clone();
		writer.save("old", &saved).unwrap();

		let mut session = ChatSession::restore(Box::new(storage));
		assert!(session.switch_to("old"));
		let pending = session.begin_turn("question").unwrap();
		session.new_chat();

		let outcome = session
			.complete_turn(
				pending,
				Ok(ChatResponse {
					chat_id: "old".into(),
					message: "late".into(),
					new_graph: Some(fragment(&["y"])),
				}),
			)
			.unwrap();
		assert_eq!(
			outcome,
			TurnOutcome::Discarded {
				conversation_id: "old".into()
			}
		);
		let old = session.conversation("old").unwrap();
		assert_eq!(old.messages.len(), 1);
		assert_eq!(old.graph, Some(fragment(&["x"])));
		assert!(!session.graph().contains("y"));
	}

	#[test]
	fn unsent_conversation_survives_restart() {
		let storage = MemoryStorage::new();
		let mut first = ChatSession::new(Box::new(storage.clone()));
		let transport = ScriptedTransport::default().fail();
		assert!(block_on(first.send_message(&transport, "offline question")).is_err());
		assert_eq!(storage.ids(), vec!["local-1".to_owned()]);

		let mut second = ChatSession::restore(Box::new(storage.clone()));
		let pending = second.begin_turn("brand new chat").unwrap();
		assert_eq!(pending.conversation_id(), "local-2");

		let old = second.conversation("local-1").unwrap();
		assert_eq!(old.messages.len(), 1);
		assert_eq!(old.messages[0].content, "offline question");
		let saved = storage.get("local-1").unwrap();
		assert_eq!(saved.messages[0].content, "offline question");
		assert_eq!(
			storage.get("local-2").unwrap().messages[0].content,
			"brand new chat"
		);
	}

	#[test]
	fn local_ids_skip_taken_ones() {
		let storage = MemoryStorage::new();
		let mut writer = storage.clone();
		writer.save("local-7", &ConversationState::default()).unwrap();
		writer.save("local-draft", &ConversationState::default()).unwrap();
		let mut session = ChatSession::restore(Box::new(storage));
		let pending = session.begin_turn("hi").unwrap();
		assert_eq!(pending.conversation_id(), "local-8");
	}

	#[test]
	fn late_reply_still_renames_new_conversation() {
		let mut session = ChatSession::new(Box::new(MemoryStorage::new()));
		let pending = session.begin_turn("question").unwrap();
		let local = pending.conversation_id().to_owned();
		session.new_chat();
		session
			.complete_turn(
				pending,
				Ok(ChatResponse {
					chat_id: "srv-2".into(),
					message: "late".into(),
					new_graph: None,
				}),
			)
			.unwrap();
		assert!(session.conversation(&local).is_none());
		assert_eq!(session.conversation("srv-2").unwrap().messages.len(), 1);
		assert_eq!(session.active_id(), None);
	}

	#[test]
	fn storage_failures_do_not_break_chat() {
		let mut session = ChatSession::restore(Box::new(BrokenStorage));
		let transport = ScriptedTransport::default().reply("srv", "fine", Some(fragment(&["a"])));
		let outcome = block_on(session.send_message(&transport, "hi")).unwrap();
		assert!(matches!(outcome, TurnOutcome::Applied { .. }));
		assert_eq!(session.messages().len(), 2);
	}

	#[test]
	fn switching_swaps_graph_and_clears_selection() {
		let mut session = ChatSession::new(Box::new(MemoryStorage::new()));
		let transport = ScriptedTransport::default()
			.reply("one", "r1", Some(fragment(&["a"])))
			.reply("two", "r2", Some(fragment(&["b"])));
		block_on(session.send_message(&transport, "first")).unwrap();
		session.new_chat();
		block_on(session.send_message(&transport, "second")).unwrap();

		assert!(session.select_node("b").is_some());
		assert!(session.switch_to("one"));
		assert!(session.graph().contains("a"));
		assert!(!session.graph().contains("b"));
		assert!(session.selection().selected().is_none());
		assert!(!session.switch_to("missing"));

		let summaries = session.summaries();
		assert_eq!(summaries.len(), 2);
		assert!(summaries.iter().any(|s| s.id == "one" && s.active && s.preview == "first"));
	}

	#[test]
	fn delete_active_starts_new_chat() {
		let storage = MemoryStorage::new();
		let mut session = ChatSession::new(Box::new(storage.clone()));
		let transport = ScriptedTransport::default().reply("srv", "r", Some(fragment(&["a"])));
		block_on(session.send_message(&transport, "hi")).unwrap();

		session.delete("srv");
		assert!(session.active_id().is_none());
		assert!(storage.ids().is_empty());
		assert!(session.graph().contains("1"));
	}

	#[test]
	fn selection_snapshots_into_messages() {
		let mut session = ChatSession::new(Box::new(MemoryStorage::new()));
		let prompt = session.select_node("1").unwrap();
		assert_eq!(prompt, "Tell me more papers like \"Machine Learning Basics\"");
		assert!(session.select_node("missing").is_none());

		let pending = session.begin_turn(&prompt).unwrap();
		let message = &session.messages()[0];
		assert_eq!(message.selected_node.as_ref().map(|n| n.id.as_str()), Some("1"));
		drop(pending);
	}

	#[test]
	fn edits_write_back_to_conversation() {
		let storage = MemoryStorage::new();
		let mut session = ChatSession::new(Box::new(storage.clone()));
		let transport = ScriptedTransport::default().reply("srv", "r", Some(fragment(&["a", "b"])));
		block_on(session.send_message(&transport, "hi")).unwrap();
		session.select_node("b");

		session.edit_graph(|store| {
			store.update_node(
				"a",
				&NodePatch {
					title: Some("Renamed".into()),
					..NodePatch::default()
				},
			);
			store.remove_node("b");
		});

		let saved = storage.get("srv").unwrap().graph.unwrap();
		assert_eq!(saved.nodes.len(), 1);
		assert_eq!(saved.nodes[0].title, "Renamed");
		assert!(saved.links.is_empty());
		assert!(session.selection().history().is_empty());
		assert!(session.selection().selected().is_none());
	}
}
