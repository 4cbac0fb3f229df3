use log::debug;

use super::types::{Graph, Link, LinkKey, Node, NodeId, NodePatch};

/// Canonical graph for the active conversation.
///
/// Every operation is total: duplicates and unknown ids are ignored rather
/// than reported. `revision` increases on each effective mutation so the
/// layout can tell when it has to resynchronize.
#[derive(Clone, Debug)]
pub struct GraphStore {
	seed: Graph,
	graph: Graph,
	revision: u64,
}

impl Default for GraphStore {
	fn default() -> Self {
		Self::new(default_seed())
	}
}

impl GraphStore {
	/// A store showing `seed`, which [`GraphStore::reset`] returns to.
	pub fn new(seed: Graph) -> Self {
		Self {
			graph: seed.clone(),
			seed,
			revision: 0,
		}
	}

	/// A store with an empty seed.
	pub fn empty() -> Self {
		Self::new(Graph::default())
	}

	/// Current graph.
	pub fn graph(&self) -> &Graph {
		&self.graph
	}

	/// Current nodes.
	pub fn nodes(&self) -> &[Node] {
		&self.graph.nodes
	}

	/// Current links.
	pub fn links(&self) -> &[Link] {
		&self.graph.links
	}

	/// Looks a node up by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.graph.node(id)
	}

	/// Whether `id` is in the graph.
	pub fn contains(&self, id: &str) -> bool {
		self.graph.contains_node(id)
	}

	/// Mutation counter.
	pub fn revision(&self) -> u64 {
		self.revision
	}

	/// Ids linked to `id` in either direction.
	pub fn neighbors(&self, id: &str) -> Vec<&NodeId> {
		self.graph
			.links
			.iter()
			.filter_map(|l| l.other_end(id))
			.collect()
	}

	fn bump(&mut self) {
		self.revision += 1;
	}

	/// Adds a node unless its id is taken.
	pub fn add_node(&mut self, node: Node) {
		if self.contains(node.id.as_str()) {
			return;
		}
		self.graph.nodes.push(node);
		self.bump();
	}

	/// Removes the node and every link touching it.
	pub fn remove_node(&mut self, id: &str) {
		let before = self.graph.nodes.len();
		self.graph.nodes.retain(|n| n.id.as_str() != id);
		let links_before = self.graph.links.len();
		self.graph.links.retain(|l| !l.touches(id));
		if self.graph.nodes.len() != before || self.graph.links.len() != links_before {
			self.bump();
		}
	}

	/// Adds a link unless the pair is already linked.
	pub fn add_link(&mut self, link: Link) {
		let key = link.key();
		if self.graph.links.iter().any(|l| l.key() == key) {
			return;
		}
		self.graph.links.push(link);
		self.bump();
	}

	/// Removes the link between `source` and `target` in either orientation.
	pub fn remove_link(&mut self, source: &str, target: &str) {
		let key = LinkKey::new(&NodeId::from(source), &NodeId::from(target));
		let before = self.graph.links.len();
		self.graph.links.retain(|l| l.key() != key);
		if self.graph.links.len() != before {
			self.bump();
		}
	}

	/// Patches a node's attributes in place.
	pub fn update_node(&mut self, id: &str, patch: &NodePatch) {
		if let Some(node) = self.graph.nodes.iter_mut().find(|n| n.id.as_str() == id) {
			node.apply(patch);
			self.bump();
		}
	}

	/// Swaps in a whole new graph.
	pub fn replace_all(&mut self, graph: Graph) {
		debug!(
			"replacing graph: {} nodes, {} links",
			graph.nodes.len(),
			graph.links.len()
		);
		self.graph = graph;
		self.bump();
	}

	/// Restores the seed graph the store was created with.
	pub fn reset(&mut self) {
		self.graph = self.seed.clone();
		self.bump();
	}
}

/// Starter graph shown before the assistant has contributed anything.
pub fn default_seed() -> Graph {
	Graph::new(
		vec![
			Node::paper("1", "Machine Learning Basics")
				.with_relevance(0.95)
				.with_paper(|p| {
					p.citations = Some(1200);
					p.year = Some(2022);
				}),
			Node::paper("2", "Deep Learning")
				.with_relevance(0.85)
				.with_paper(|p| {
					p.citations = Some(800);
					p.year = Some(2023);
				}),
			Node::keyword("3", "Neural Networks"),
		],
		vec![
			Link::new("1", "3").with_strength(0.8),
			Link::new("2", "3").with_strength(0.6),
		],
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn store() -> GraphStore {
		GraphStore::new(Graph::new(
			vec![
				Node::paper("a", "A"),
				Node::paper("b", "B"),
				Node::keyword("c", "C"),
			],
			vec![Link::new("a", "b"), Link::new("c", "a"), Link::new("b", "c")],
		))
	}

	#[test]
	fn duplicate_nodes_are_ignored() {
		let mut s = store();
		let rev = s.revision();
		s.add_node(Node::paper("a", "Other"));
		assert_eq!(s.nodes().len(), 3);
		assert_eq!(s.node("a").unwrap().title, "A");
		assert_eq!(s.revision(), rev);
	}

	#[test]
	fn remove_node_cascades_to_links() {
		let mut s = store();
		s.remove_node("a");
		assert!(!s.contains("a"));
		assert_eq!(s.links().len(), 1);
		assert!(s.links().iter().all(|l| !l.touches("a")));

		s.add_link(Link::new("a", "b"));
		assert!(!s.contains("a"));
		assert_eq!(s.links().len(), 2);
		assert!(s.graph().dangling_links().all(|l| l.touches("a")));
	}

	#[test]
	fn undirected_duplicate_links_are_ignored() {
		let mut s = store();
		s.add_link(Link::new("b", "a"));
		assert_eq!(s.links().len(), 3);
	}

	#[test]
	fn remove_link_matches_either_orientation() {
		let mut s = store();
		s.remove_link("a", "c");
		assert_eq!(s.links().len(), 2);
		s.remove_link("x", "y");
		assert_eq!(s.links().len(), 2);
	}

	#[test]
	fn update_node_merges_in_place() {
		let mut s = store();
		s.update_node(
			"b",
			&NodePatch {
				citations: Some(7),
				..NodePatch::default()
			},
		);
		assert_eq!(s.node("b").unwrap().citations(), Some(7));
		assert_eq!(s.node("b").unwrap().title, "B");

		let rev = s.revision();
		s.update_node("missing", &NodePatch::default());
		assert_eq!(s.revision(), rev);
	}

	#[test]
	fn neighbors_follow_both_directions() {
		let s = store();
		let mut n: Vec<_> = s.neighbors("a").into_iter().map(|id| id.as_str()).collect();
		n.sort();
		assert_eq!(n, vec!["b", "c"]);
	}

	#[test]
	fn reset_restores_seed() {
		let mut s = store();
		s.remove_node("a");
		s.replace_all(Graph::default());
		assert!(s.nodes().is_empty());
		s.reset();
		assert_eq!(s.nodes().len(), 3);
		assert_eq!(s.links().len(), 3);
	}

	#[test]
	fn default_store_holds_starter_graph() {
		let s = GraphStore::default();
		assert_eq!(s.nodes().len(), 3);
		assert_eq!(s.neighbors("3").len(), 2);
	}
}
