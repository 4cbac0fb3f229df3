//! Current node selection and a short most-recent-first history.

use crate::graph::{Node, NodeId};

/// Upper bound on remembered selections.
pub const HISTORY_LIMIT: usize = 5;

/// The selected node plus up to [`HISTORY_LIMIT`] recent ones.
#[derive(Clone, Debug, Default)]
pub struct SelectionTracker {
	selected: Option<Node>,
	history: Vec<Node>,
}

impl SelectionTracker {
	/// Nothing selected, empty history.
	pub fn new() -> Self {
		Self::default()
	}

	/// The current selection.
	pub fn selected(&self) -> Option<&Node> {
		self.selected.as_ref()
	}

	/// Id of the current selection.
	pub fn selected_id(&self) -> Option<&NodeId> {
		self.selected.as_ref().map(|n| &n.id)
	}

	/// Recent selections, newest first.
	pub fn history(&self) -> &[Node] {
		&self.history
	}

	fn in_history(&self, id: &str) -> bool {
		self.history.iter().any(|n| n.id.as_str() == id)
	}

	/// Makes `node` current. It is prepended to the history only when absent;
	/// an entry already present keeps its place.
	pub fn select(&mut self, node: Node) {
		if !self.in_history(node.id.as_str()) {
			self.history.insert(0, node.clone());
			self.history.truncate(HISTORY_LIMIT);
		}
		self.selected = Some(node);
	}

	/// Deselects. The history stays.
	pub fn clear(&mut self) {
		self.selected = None;
	}

	/// Drops one history entry; the current selection is unaffected.
	pub fn forget(&mut self, id: &str) {
		self.history.retain(|n| n.id.as_str() != id);
	}
}

/// Chat prompt suggested after picking a node in the graph.
pub fn suggested_prompt(node: &Node) -> String {
	format!("Tell me more papers like \"{}\"", node.title)
}
