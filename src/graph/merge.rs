use log::debug;

use super::types::Graph;

/// Combines the graph already shown with a fragment delivered by the
/// assistant, returning a fresh graph and leaving both inputs untouched.
///
/// Left-biased: when both sides carry the same node id the existing node is
/// kept as-is and the incoming one is dropped wholesale, even if its
/// attributes differ. Links are deduplicated by their undirected key. Links
/// pointing at unknown ids are passed through unvalidated.
pub fn merge(existing: Option<&Graph>, incoming: Option<&Graph>) -> Graph {
	let (existing, incoming) = match (existing, incoming) {
		(None, None) => return Graph::default(),
		(None, Some(incoming)) => return incoming.clone(),
		(Some(existing), None) => return existing.clone(),
		(Some(existing), Some(incoming)) => (existing, incoming),
	};

	let mut merged = existing.clone();

	let mut node_ids = existing.node_ids();
	let mut added_nodes = 0;
	for node in &incoming.nodes {
		if node_ids.insert(&node.id) {
			merged.nodes.push(node.clone());
			added_nodes += 1;
		}
	}

	let mut link_keys = existing.link_keys();
	let mut added_links = 0;
	for link in &incoming.links {
		if link_keys.insert(link.key()) {
			merged.links.push(link.clone());
			added_links += 1;
		}
	}

	debug!(
		"merged fragment: +{} nodes, +{} links ({} nodes, {} links total)",
		added_nodes,
		added_links,
		merged.nodes.len(),
		merged.links.len()
	);
	merged
}
