//! Graph data model, merge and the canonical per-conversation store.

mod filter;
mod merge;
mod store;
mod types;
mod wire;

pub use filter::{GraphFilter, KindFilter, SortBy};
pub use merge::merge;
pub use store::{GraphStore, default_seed};
pub use types::{Graph, Link, LinkKey, Node, NodeDetails, NodeId, NodeKind, NodePatch, PaperDetails};
