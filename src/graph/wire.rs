//! JSON shapes exchanged with the research assistant and with storage.
//!
//! Nodes travel flat with a `type` tag:
//! `{"id": "..", "type": "paper", "title": "..", "year": 2022, "abstract": ".."}`.

use std::collections::HashSet;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::types::{Graph, Link, LinkKey, Node, NodeDetails, NodeId, NodeKind, PaperDetails};

/// A wire record that cannot become a graph element.
#[derive(Debug, Error)]
pub enum WireError {
	/// Blank node id.
	#[error("node id must not be empty")]
	EmptyId,
	/// Blank link source or target.
	#[error("link endpoint must not be empty")]
	EmptyEndpoint,
}

/// Flat node record as the backend and storage see it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireNode {
	/// Node id.
	pub id: String,
	/// `type` tag.
	#[serde(rename = "type")]
	pub kind: NodeKind,
	/// Display label.
	pub title: String,
	/// Paper year.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub year: Option<i32>,
	/// Paper citation count.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub citations: Option<u32>,
	/// Relevance score.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub relevance: Option<f64>,
	/// Paper abstract, `abstract` on the wire.
	#[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
	pub abstract_text: Option<String>,
	/// Paper authors.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub authors: Option<Vec<String>>,
	/// Paper source.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source: Option<String>,
	/// Layout cluster.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cluster_id: Option<String>,
}

impl TryFrom<WireNode> for Node {
	type Error = WireError;

	fn try_from(wire: WireNode) -> Result<Self, Self::Error> {
		if wire.id.trim().is_empty() {
			return Err(WireError::EmptyId);
		}
		let details = match wire.kind {
			NodeKind::Paper => NodeDetails::Paper(PaperDetails {
				year: wire.year,
				citations: wire.citations,
				abstract_text: wire.abstract_text,
				authors: wire.authors.unwrap_or_default(),
				source: wire.source,
			}),
			NodeKind::Keyword => NodeDetails::Keyword,
		};
		Ok(Node {
			id: NodeId::new(wire.id),
			title: wire.title,
			relevance: wire.relevance.map(|r| r.clamp(0.0, 1.0)),
			cluster_id: wire.cluster_id,
			details,
		})
	}
}

impl From<Node> for WireNode {
	fn from(node: Node) -> Self {
		let kind = node.kind();
		let mut wire = WireNode {
			id: node.id.as_str().to_owned(),
			kind,
			title: node.title,
			year: None,
			citations: None,
			relevance: node.relevance,
			abstract_text: None,
			authors: None,
			source: None,
			cluster_id: node.cluster_id,
		};
		if let NodeDetails::Paper(details) = node.details {
			wire.year = details.year;
			wire.citations = details.citations;
			wire.abstract_text = details.abstract_text;
			wire.authors = (!details.authors.is_empty()).then_some(details.authors);
			wire.source = details.source;
		}
		wire
	}
}

/// Link endpoints arrive either as bare ids or as node objects carrying an
/// `id`, the latter being what a browser-side simulation writes back.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireEndpoint {
	Id(String),
	Node { id: String },
}

impl WireEndpoint {
	fn into_id(self) -> Result<NodeId, WireError> {
		let id = match self {
			WireEndpoint::Id(id) | WireEndpoint::Node { id } => id,
		};
		if id.trim().is_empty() {
			return Err(WireError::EmptyEndpoint);
		}
		Ok(NodeId::new(id))
	}
}

#[derive(Deserialize)]
struct WireLink {
	source: WireEndpoint,
	target: WireEndpoint,
	#[serde(default)]
	strength: Option<f64>,
}

impl TryFrom<WireLink> for Link {
	type Error = WireError;

	fn try_from(wire: WireLink) -> Result<Self, Self::Error> {
		Ok(Link {
			source: wire.source.into_id()?,
			target: wire.target.into_id()?,
			strength: wire.strength.map(|s| s.clamp(0.0, 1.0)),
		})
	}
}

/// Untyped graph payload; every entry is decoded on its own.
#[derive(Deserialize)]
pub struct RawGraph {
	#[serde(default)]
	nodes: Vec<Value>,
	#[serde(default)]
	links: Vec<Value>,
}

fn decode_node(value: Value) -> Option<Node> {
	let wire: WireNode = match serde_json::from_value(value) {
		Ok(wire) => wire,
		Err(e) => {
			warn!("dropping malformed node: {}", e);
			return None;
		}
	};
	match Node::try_from(wire) {
		Ok(node) => Some(node),
		Err(e) => {
			warn!("dropping malformed node: {}", e);
			None
		}
	}
}

fn decode_link(value: Value) -> Option<Link> {
	let wire: WireLink = match serde_json::from_value(value) {
		Ok(wire) => wire,
		Err(e) => {
			warn!("dropping malformed link: {}", e);
			return None;
		}
	};
	match Link::try_from(wire) {
		Ok(link) => Some(link),
		Err(e) => {
			warn!("dropping malformed link: {}", e);
			None
		}
	}
}

impl From<RawGraph> for Graph {
	fn from(raw: RawGraph) -> Self {
		let (raw_nodes, raw_links) = (raw.nodes.len(), raw.links.len());

		let mut seen_ids = HashSet::new();
		let nodes: Vec<Node> = raw
			.nodes
			.into_iter()
			.filter_map(decode_node)
			.filter(|n| seen_ids.insert(n.id.clone()))
			.collect();

		let mut seen_keys: HashSet<LinkKey> = HashSet::new();
		let links: Vec<Link> = raw
			.links
			.into_iter()
			.filter_map(decode_link)
			.filter(|l| seen_keys.insert(l.key()))
			.collect();

		if nodes.len() != raw_nodes || links.len() != raw_links {
			debug!(
				"graph decode kept {}/{} nodes, {}/{} links",
				nodes.len(),
				raw_nodes,
				links.len(),
				raw_links
			);
		}
		Graph { nodes, links }
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn decodes_flat_paper_nodes() {
		let node: Node = serde_json::from_value(json!({
			"id": "85128243165.0_scopus",
			"type": "paper",
			"title": "Ice cream sticks from banana powder",
			"year": 2022,
			"abstract": "Raw banana powder sticks.",
			"authors": ["Jittra Rukijkanpanich", "Sippothai Srininrat"],
			"source": "scopus",
			"clusterId": "banana"
		}))
		.unwrap();
		assert_eq!(node.kind(), NodeKind::Paper);
		assert_eq!(node.year(), Some(2022));
		assert_eq!(node.cluster_id.as_deref(), Some("banana"));
		let paper = node.paper_details().unwrap();
		assert_eq!(paper.authors.len(), 2);
		assert_eq!(paper.abstract_text.as_deref(), Some("Raw banana powder sticks."));
	}

	#[test]
	fn keywords_ignore_paper_fields() {
		let node: Node = serde_json::from_value(json!({
			"id": "chitosan-coating",
			"type": "keyword",
			"title": "Chitosan Coating",
			"year": 1999
		}))
		.unwrap();
		assert_eq!(node.kind(), NodeKind::Keyword);
		assert_eq!(node.year(), None);
	}

	#[test]
	fn serializes_with_type_tag() {
		let node = Node::paper("p1", "Deep Learning").with_paper(|p| p.citations = Some(800));
		let value = serde_json::to_value(&node).unwrap();
		assert_eq!(value["type"], "paper");
		assert_eq!(value["citations"], 800);
		assert!(value.get("authors").is_none());
	}

	#[test]
	fn malformed_entries_are_dropped() {
		let graph: Graph = serde_json::from_value(json!({
			"nodes": [
				{"id": "1", "type": "paper", "title": "X"},
				{"id": "2", "type": "keyword"},
				{"type": "keyword", "title": "no id"},
				{"id": "", "type": "keyword", "title": "empty id"},
				{"id": "3", "type": "dataset", "title": "unknown kind"},
				{"id": "4", "type": "keyword", "title": "Y"}
			],
			"links": [
				{"source": "1", "target": "4"},
				{"source": "1"},
				{"source": {"id": "4"}, "target": {"id": "1", "x": 3.0}},
				{"source": "", "target": "4"}
			]
		}))
		.unwrap();
		let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, vec!["1", "4"]);
		assert_eq!(graph.links.len(), 1);
	}

	#[test]
	fn duplicate_ids_keep_first_occurrence() {
		let graph: Graph = serde_json::from_value(json!({
			"nodes": [
				{"id": "1", "type": "paper", "title": "first"},
				{"id": "1", "type": "paper", "title": "second"}
			]
		}))
		.unwrap();
		assert_eq!(graph.nodes.len(), 1);
		assert_eq!(graph.nodes[0].title, "first");
		assert!(graph.links.is_empty());
	}

	#[test]
	fn graphs_survive_a_storage_round_trip() {
		let graph = Graph::new(
			vec![
				Node::paper("1", "X").with_relevance(0.9),
				Node::keyword("2", "Y").with_cluster("c"),
			],
			vec![Link::new("1", "2").with_strength(0.8)],
		);
		let text = serde_json::to_string(&graph).unwrap();
		let back: Graph = serde_json::from_str(&text).unwrap();
		assert_eq!(back, graph);
	}
}
