use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a node within one conversation's graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
	/// Wraps a raw id.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// Builds an id from a node kind and title, e.g. `keyword-neural-networks`.
	pub fn derive(kind: NodeKind, title: &str) -> Self {
		let slug: String = title
			.to_lowercase()
			.chars()
			.map(|c| {
				if c.is_ascii_lowercase() || c.is_ascii_digit() {
					c
				} else {
					'-'
				}
			})
			.collect();
		Self(format!("{}-{}", kind.as_str(), slug))
	}

	/// The id as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Borrow<str> for NodeId {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for NodeId {
	fn from(id: &str) -> Self {
		Self(id.to_owned())
	}
}

impl From<String> for NodeId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

/// The two kinds of vertex the backend produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
	/// A research paper.
	Paper,
	/// A topic keyword.
	Keyword,
}

impl NodeKind {
	/// Lowercase name, as used on the wire.
	pub fn as_str(self) -> &'static str {
		match self {
			NodeKind::Paper => "paper",
			NodeKind::Keyword => "keyword",
		}
	}
}

/// Bibliographic attributes only papers carry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PaperDetails {
	/// Publication year.
	pub year: Option<i32>,
	/// Citation count.
	pub citations: Option<u32>,
	/// Abstract, if the backend sent one.
	pub abstract_text: Option<String>,
	/// Authors in byline order.
	pub authors: Vec<String>,
	/// Where the paper was found.
	pub source: Option<String>,
}

/// Attributes that depend on the node kind.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeDetails {
	/// Paper with its bibliographic fields.
	Paper(PaperDetails),
	/// Keywords carry nothing extra.
	Keyword,
}

/// Domain record for a graph vertex. Positions live in the layout, not here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "super::wire::WireNode", into = "super::wire::WireNode")]
pub struct Node {
	/// Stable identity, the merge key.
	pub id: NodeId,
	/// Display label.
	pub title: String,
	/// Assistant-provided relevance in `[0, 1]`.
	pub relevance: Option<f64>,
	/// Grouping key used by the layout's cluster force.
	pub cluster_id: Option<String>,
	/// Kind-specific attributes.
	pub details: NodeDetails,
}

impl Node {
	/// A paper node with no optional attributes.
	pub fn paper(id: impl Into<NodeId>, title: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			title: title.into(),
			relevance: None,
			cluster_id: None,
			details: NodeDetails::Paper(PaperDetails::default()),
		}
	}

	/// A keyword node with no optional attributes.
	pub fn keyword(id: impl Into<NodeId>, title: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			title: title.into(),
			relevance: None,
			cluster_id: None,
			details: NodeDetails::Keyword,
		}
	}

	/// Sets the layout cluster.
	pub fn with_cluster(mut self, cluster_id: impl Into<String>) -> Self {
		self.cluster_id = Some(cluster_id.into());
		self
	}

	/// Sets relevance, clamped to `[0, 1]`.
	pub fn with_relevance(mut self, relevance: f64) -> Self {
		self.relevance = Some(relevance.clamp(0.0, 1.0));
		self
	}

	/// Applies `f` to the paper attributes; keywords are returned unchanged.
	pub fn with_paper(mut self, f: impl FnOnce(&mut PaperDetails)) -> Self {
		if let NodeDetails::Paper(details) = &mut self.details {
			f(details);
		}
		self
	}

	/// Paper or keyword.
	pub fn kind(&self) -> NodeKind {
		match self.details {
			NodeDetails::Paper(_) => NodeKind::Paper,
			NodeDetails::Keyword => NodeKind::Keyword,
		}
	}

	/// Bibliographic fields, for papers only.
	pub fn paper_details(&self) -> Option<&PaperDetails> {
		match &self.details {
			NodeDetails::Paper(details) => Some(details),
			NodeDetails::Keyword => None,
		}
	}

	/// Publication year of a paper.
	pub fn year(&self) -> Option<i32> {
		self.paper_details().and_then(|p| p.year)
	}

	/// Citation count of a paper.
	pub fn citations(&self) -> Option<u32> {
		self.paper_details().and_then(|p| p.citations)
	}

	/// Merges the set fields of `patch` into this node. Paper-only fields are
	/// ignored for keywords; the id never changes.
	pub fn apply(&mut self, patch: &NodePatch) {
		if let Some(title) = &patch.title {
			self.title = title.clone();
		}
		if let Some(relevance) = patch.relevance {
			self.relevance = Some(relevance.clamp(0.0, 1.0));
		}
		if let Some(cluster_id) = &patch.cluster_id {
			self.cluster_id = cluster_id.clone();
		}
		if let NodeDetails::Paper(details) = &mut self.details {
			if let Some(year) = patch.year {
				details.year = Some(year);
			}
			if let Some(citations) = patch.citations {
				details.citations = Some(citations);
			}
			if let Some(abstract_text) = &patch.abstract_text {
				details.abstract_text = Some(abstract_text.clone());
			}
			if let Some(authors) = &patch.authors {
				details.authors = authors.clone();
			}
			if let Some(source) = &patch.source {
				details.source = Some(source.clone());
			}
		}
	}
}

/// Partial attribute update for [`Node::apply`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodePatch {
	/// New title.
	pub title: Option<String>,
	/// New relevance.
	pub relevance: Option<f64>,
	/// `Some(None)` clears the cluster.
	pub cluster_id: Option<Option<String>>,
	/// New year (papers only).
	pub year: Option<i32>,
	/// New citation count (papers only).
	pub citations: Option<u32>,
	/// New abstract (papers only).
	pub abstract_text: Option<String>,
	/// New author list (papers only).
	pub authors: Option<Vec<String>>,
	/// New source (papers only).
	pub source: Option<String>,
}

/// Undirected edge between two node ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Link {
	/// One endpoint.
	pub source: NodeId,
	/// The other endpoint.
	pub target: NodeId,
	/// Link weight from the backend.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub strength: Option<f64>,
}

impl Link {
	/// A link without a strength.
	pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			strength: None,
		}
	}

	/// Sets the strength.
	pub fn with_strength(mut self, strength: f64) -> Self {
		self.strength = Some(strength.clamp(0.0, 1.0));
		self
	}

	/// Orientation-free identity.
	pub fn key(&self) -> LinkKey {
		LinkKey::new(&self.source, &self.target)
	}

	/// Whether either endpoint is `id`.
	pub fn touches(&self, id: &str) -> bool {
		self.source.as_str() == id || self.target.as_str() == id
	}

	/// The endpoint opposite `id`, if `id` is one of the endpoints.
	pub fn other_end(&self, id: &str) -> Option<&NodeId> {
		if self.source.as_str() == id {
			Some(&self.target)
		} else if self.target.as_str() == id {
			Some(&self.source)
		} else {
			None
		}
	}
}

/// Order-independent identity of a link: `(a, b)` and `(b, a)` are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkKey(NodeId, NodeId);

impl LinkKey {
	/// Key for the pair, in either order.
	pub fn new(a: &NodeId, b: &NodeId) -> Self {
		if a <= b {
			Self(a.clone(), b.clone())
		} else {
			Self(b.clone(), a.clone())
		}
	}
}

/// Nodes unique by id, links unique by [`LinkKey`].
///
/// Deserialization is lenient: malformed entries are dropped and duplicates
/// collapse onto their first occurrence (see [`super::wire`]).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "super::wire::RawGraph")]
pub struct Graph {
	/// Nodes, unique by id.
	pub nodes: Vec<Node>,
	/// Links, unique by unordered endpoint pair.
	pub links: Vec<Link>,
}

impl Graph {
	/// Builds a graph as given, without deduplication.
	pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
		Self { nodes, links }
	}

	/// Looks a node up by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id.as_str() == id)
	}

	/// Whether a node with `id` exists.
	pub fn contains_node(&self, id: &str) -> bool {
		self.node(id).is_some()
	}

	/// All node ids.
	pub fn node_ids(&self) -> HashSet<&NodeId> {
		self.nodes.iter().map(|n| &n.id).collect()
	}

	/// All link identities.
	pub fn link_keys(&self) -> HashSet<LinkKey> {
		self.links.iter().map(Link::key).collect()
	}

	/// Links with at least one endpoint missing from the node set.
	pub fn dangling_links(&self) -> impl Iterator<Item = &Link> {
		let ids = self.node_ids();
		self.links
			.iter()
			.filter(move |l| !ids.contains(&l.source) || !ids.contains(&l.target))
	}
}
