use std::cmp::Ordering;
use std::collections::HashSet;

use super::types::{Graph, Node, NodeKind};

/// Which node kinds pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KindFilter {
	/// Every kind.
	#[default]
	All,
	/// Just this kind.
	Only(NodeKind),
}

/// Ordering for filtered node lists, highest first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortBy {
	/// By relevance score.
	#[default]
	Relevance,
	/// By citation count.
	Citations,
	/// Newest first.
	Year,
}

/// View-side narrowing of a graph. Never touches the store.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphFilter {
	/// Kind restriction.
	pub kind: KindFilter,
	/// Case-insensitive title substring.
	pub search: String,
	/// Inclusive year bounds. Nodes without a year pass.
	pub year_range: (i32, i32),
	/// Nodes without a citation count pass.
	pub min_citations: u32,
	/// List order.
	pub sort_by: SortBy,
}

impl Default for GraphFilter {
	fn default() -> Self {
		Self {
			kind: KindFilter::All,
			search: String::new(),
			year_range: (2000, 2024),
			min_citations: 0,
			sort_by: SortBy::Relevance,
		}
	}
}

impl GraphFilter {
	/// Whether `node` passes every criterion.
	pub fn matches(&self, node: &Node) -> bool {
		let search = self.search.to_lowercase();
		if !node.title.to_lowercase().contains(&search) {
			return false;
		}
		if let KindFilter::Only(kind) = self.kind {
			if node.kind() != kind {
				return false;
			}
		}
		if let Some(year) = node.year() {
			if year < self.year_range.0 || year > self.year_range.1 {
				return false;
			}
		}
		if let Some(citations) = node.citations() {
			if citations < self.min_citations {
				return false;
			}
		}
		true
	}

	fn compare(&self, a: &Node, b: &Node) -> Ordering {
		match self.sort_by {
			SortBy::Relevance => {
				let (a, b) = (a.relevance.unwrap_or(0.0), b.relevance.unwrap_or(0.0));
				b.partial_cmp(&a).unwrap_or(Ordering::Equal)
			}
			SortBy::Citations => b.citations().unwrap_or(0).cmp(&a.citations().unwrap_or(0)),
			SortBy::Year => b.year().unwrap_or(0).cmp(&a.year().unwrap_or(0)),
		}
	}

	/// Visible nodes sorted descending by `sort_by`, plus the links whose two
	/// endpoints are both visible.
	pub fn apply(&self, graph: &Graph) -> Graph {
		let mut nodes: Vec<Node> = graph
			.nodes
			.iter()
			.filter(|n| self.matches(n))
			.cloned()
			.collect();
		nodes.sort_by(|a, b| self.compare(a, b));

		let visible: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
		let links = graph
			.links
			.iter()
			.filter(|l| visible.contains(l.source.as_str()) && visible.contains(l.target.as_str()))
			.cloned()
			.collect();
		Graph { nodes, links }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::Link;

	fn graph() -> Graph {
		Graph::new(
			vec![
				Node::paper("old", "Perceptrons").with_paper(|p| {
					p.year = Some(1969);
					p.citations = Some(5000);
				}),
				Node::paper("dl", "Deep Learning")
					.with_relevance(0.85)
					.with_paper(|p| {
						p.year = Some(2015);
						p.citations = Some(800);
					}),
				Node::paper("ml", "Machine Learning Basics")
					.with_relevance(0.95)
					.with_paper(|p| {
						p.year = Some(2022);
						p.citations = Some(1200);
					}),
				Node::keyword("nn", "Neural Networks"),
			],
			vec![
				Link::new("old", "nn"),
				Link::new("dl", "nn"),
				Link::new("ml", "nn"),
			],
		)
	}

	#[test]
	fn default_filter_drops_out_of_range_years_and_their_links() {
		let filtered = GraphFilter::default().apply(&graph());
		let ids: Vec<_> = filtered.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, vec!["ml", "dl", "nn"]);
		assert_eq!(filtered.links.len(), 2);
	}

	#[test]
	fn search_and_kind_narrow_the_view() {
		let filter = GraphFilter {
			search: "LEARNING".into(),
			kind: KindFilter::Only(NodeKind::Paper),
			sort_by: SortBy::Citations,
			..GraphFilter::default()
		};
		let filtered = filter.apply(&graph());
		let ids: Vec<_> = filtered.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, vec!["ml", "dl"]);
		assert!(filtered.links.is_empty());
	}

	#[test]
	fn min_citations_only_applies_to_nodes_with_counts() {
		let filter = GraphFilter {
			min_citations: 1000,
			sort_by: SortBy::Year,
			..GraphFilter::default()
		};
		let filtered = filter.apply(&graph());
		let ids: Vec<_> = filtered.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, vec!["ml", "nn"]);
	}
}
