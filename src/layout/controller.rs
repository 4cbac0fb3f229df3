use std::collections::HashSet;

use log::info;

use super::camera::{Camera, FOCUS_DURATION_MS, FOCUS_ZOOM, ViewTransform};
use super::config::ForceConfig;
use super::simulation::{BodyState, Simulation};
use crate::graph::{GraphStore, NodeId, NodeKind};

/// Drawn radius of papers.
pub const PAPER_RADIUS: f64 = 6.0;
/// Drawn radius of keywords.
pub const KEYWORD_RADIUS: f64 = 4.5;
/// Pointer hit radius, in graph space so it scales with zoom like the nodes.
pub const HIT_RADIUS: f64 = 12.0;
/// Screen distance a pointer must travel before a press counts as a drag.
const DRAG_THRESHOLD: f64 = 3.0;

/// Drawn radius for a node kind.
pub fn node_radius(kind: NodeKind) -> f64 {
	match kind {
		NodeKind::Paper => PAPER_RADIUS,
		NodeKind::Keyword => KEYWORD_RADIUS,
	}
}

#[derive(Clone, Debug, Default)]
struct DragState {
	node: Option<NodeId>,
	start_x: f64,
	start_y: f64,
	node_start_x: f64,
	node_start_y: f64,
	moved: bool,
	was_pinned: bool,
}

#[derive(Clone, Debug, Default)]
struct PanState {
	active: bool,
	last_x: f64,
	last_y: f64,
}

/// Hovered node and its neighbours.
#[derive(Clone, Debug, Default)]
struct HoverState {
	node: Option<NodeId>,
	neighbors: HashSet<NodeId>,
}

/// Per-node snapshot handed to the rendering surface.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeView<'a> {
	/// Node id.
	pub id: &'a NodeId,
	/// Graph-space x.
	pub x: f64,
	/// Graph-space y.
	pub y: f64,
	/// Paper or keyword.
	pub kind: NodeKind,
	/// Title to draw.
	pub label: &'a str,
	/// Layout cluster.
	pub cluster: Option<&'a str>,
	/// Currently selected.
	pub selected: bool,
	/// Under the pointer.
	pub hovered: bool,
	/// Hovered or a neighbour of the hovered node.
	pub highlighted: bool,
	/// Held in place.
	pub pinned: bool,
}

/// Per-link segment handed to the rendering surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkView {
	/// Source x.
	pub x1: f64,
	/// Source y.
	pub y1: f64,
	/// Target x.
	pub x2: f64,
	/// Target y.
	pub y2: f64,
	/// Link strength, 1.0 when the link carries none.
	pub strength: f64,
	/// Both endpoints highlighted.
	pub highlighted: bool,
}

/// Owns the simulation and camera for one graph view and translates pointer
/// input into pins, pans and zooms.
pub struct LayoutController {
	/// The force simulation behind the view.
	pub sim: Simulation,
	camera: Camera,
	drag: DragState,
	pan: PanState,
	hover: HoverState,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	synced_revision: Option<u64>,
}

impl LayoutController {
	/// A controller with nothing synced yet.
	pub fn new(config: ForceConfig, width: f64, height: f64) -> Self {
		Self {
			sim: Simulation::new(config),
			camera: Camera::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			synced_revision: None,
		}
	}

	/// Catches up with the store. Cheap when nothing changed since the last
	/// call; reheats the simulation when nodes or links came or went.
	pub fn sync(&mut self, store: &GraphStore) {
		if self.synced_revision == Some(store.revision()) {
			return;
		}
		self.synced_revision = Some(store.revision());
		if self.sim.sync(store.graph()) {
			let floor = self.sim.config().alpha_on_change;
			if self.sim.alpha() < floor {
				self.sim.reheat(floor);
			}
		}
		if let Some(id) = self.hover.node.clone() {
			if self.sim.body(id.as_str()).is_some() {
				self.set_hover(Some(id));
			} else {
				self.set_hover(None);
			}
		}
		if let Some(id) = &self.drag.node {
			if self.sim.body(id.as_str()).is_none() {
				self.drag = DragState::default();
			}
		}
	}

	/// One animation frame: a simulation step while it is still warm, plus
	/// camera transitions.
	pub fn tick(&mut self, dt_ms: f64) {
		if self.sim.is_active() {
			self.sim.tick();
		}
		self.camera.advance(dt_ms);
	}

	/// Re-seeds every node, clears pins, settles the layout synchronously and
	/// returns the camera to its default view.
	pub fn reset_positions(&mut self) {
		self.drag = DragState::default();
		self.sim.reset_positions();
		self.camera.reset_view();
		info!("layout reset for {} nodes", self.sim.bodies().len());
	}

	/// Camera transform for the current canvas size.
	pub fn view_transform(&self) -> ViewTransform {
		self.camera.view_transform(self.width, self.height)
	}

	/// Maps a canvas point into graph space.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		self.view_transform().screen_to_graph(sx, sy)
	}

	/// Where a node currently is.
	pub fn position(&self, id: &str) -> Option<(f64, f64)> {
		self.sim.body(id).and_then(|b| b.position())
	}

	/// Topmost node under a screen position.
	pub fn node_at(&self, sx: f64, sy: f64) -> Option<NodeId> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.sim
			.bodies()
			.iter()
			.rev()
			.find(|b| {
				let (dx, dy) = (b.x - gx, b.y - gy);
				(dx * dx + dy * dy).sqrt() < HIT_RADIUS
			})
			.map(|b| b.id.clone())
	}

	/// Hovers a node, highlighting it and its neighbours.
	pub fn set_hover(&mut self, node: Option<NodeId>) {
		self.hover.neighbors.clear();
		if let Some(id) = &node {
			for (a, b) in self.sim.link_pairs() {
				if &a.id == id {
					self.hover.neighbors.insert(b.id.clone());
				} else if &b.id == id {
					self.hover.neighbors.insert(a.id.clone());
				}
			}
		}
		self.hover.node = node;
	}

	/// Whether `id` is under the pointer.
	pub fn is_hovered(&self, id: &NodeId) -> bool {
		self.hover.node.as_ref() == Some(id)
	}

	/// Hovered or next to the hovered node.
	pub fn is_highlighted(&self, id: &NodeId) -> bool {
		self.is_hovered(id) || self.hover.neighbors.contains(id)
	}

	/// Whether anything is hovered.
	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some()
	}

	/// Starts dragging `id`; the node is held where it is until released.
	pub fn drag_start(&mut self, id: &NodeId) {
		let Some(body) = self.sim.body(id.as_str()) else {
			return;
		};
		self.drag = DragState {
			node: Some(id.clone()),
			node_start_x: body.x,
			node_start_y: body.y,
			was_pinned: body.state() == BodyState::Pinned,
			..DragState::default()
		};
		self.sim.pin_in_place(id.as_str());
	}

	/// Moves the dragged node to a graph-space position and keeps the
	/// simulation warm so its neighbours follow.
	pub fn drag_to(&mut self, id: &NodeId, x: f64, y: f64) {
		if self.drag.node.as_ref() != Some(id) {
			return;
		}
		self.drag.moved = true;
		self.sim.pin(id.as_str(), x, y);
		let floor = self.sim.config().alpha_on_change;
		if self.sim.alpha() < floor {
			self.sim.reheat(floor);
		}
	}

	/// Ends a drag. A node that actually moved stays pinned where it was
	/// dropped; a press without movement restores the previous pin state.
	pub fn drag_end(&mut self, id: &NodeId) {
		if self.drag.node.as_ref() != Some(id) {
			return;
		}
		if !self.drag.moved && !self.drag.was_pinned {
			self.sim.unpin(id.as_str());
		}
		self.drag = DragState::default();
	}

	/// Releases a pinned node back to the simulation.
	pub fn unpin(&mut self, id: &str) {
		self.sim.unpin(id);
		let floor = self.sim.config().alpha_on_change;
		if self.sim.alpha() < floor {
			self.sim.reheat(floor);
		}
	}

	/// Pointer pressed at a screen position: grabs a node or starts panning.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		match self.node_at(sx, sy) {
			Some(id) => {
				self.drag_start(&id);
				self.drag.start_x = sx;
				self.drag.start_y = sy;
			}
			None => {
				self.pan = PanState {
					active: true,
					last_x: sx,
					last_y: sy,
				};
			}
		}
	}

	/// Pointer moved: drags, pans or updates hover.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if let Some(id) = self.drag.node.clone() {
			let (dx, dy) = (sx - self.drag.start_x, sy - self.drag.start_y);
			if !self.drag.moved && (dx * dx + dy * dy).sqrt() < DRAG_THRESHOLD {
				return;
			}
			let k = self.camera.zoom();
			let (nx, ny) = (self.drag.node_start_x + dx / k, self.drag.node_start_y + dy / k);
			self.drag_to(&id, nx, ny);
		} else if self.pan.active {
			self.camera.pan_by(sx - self.pan.last_x, sy - self.pan.last_y);
			self.pan.last_x = sx;
			self.pan.last_y = sy;
		} else {
			let hovered = self.node_at(sx, sy);
			if hovered != self.hover.node {
				self.set_hover(hovered);
			}
		}
	}

	/// Pointer released. Returns the node that was clicked, if the press
	/// grabbed a node and did not turn into a drag.
	pub fn pointer_up(&mut self) -> Option<NodeId> {
		self.pan.active = false;
		let id = self.drag.node.clone()?;
		let clicked = !self.drag.moved;
		self.drag_end(&id);
		clicked.then_some(id)
	}

	/// Pointer left the canvas. Ends any drag or pan.
	pub fn pointer_leave(&mut self) {
		if let Some(id) = self.drag.node.clone() {
			self.drag_end(&id);
		}
		self.pan.active = false;
		self.set_hover(None);
	}

	/// Zooms around the pointer.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		self.camera.zoom_at(sx, sy, factor, self.width, self.height);
	}

	/// See [`Camera::center_on`].
	pub fn center_on(&mut self, x: f64, y: f64, duration_ms: f64) {
		self.camera.center_on(x, y, duration_ms);
	}

	/// See [`Camera::zoom_to`].
	pub fn zoom_to(&mut self, factor: f64, duration_ms: f64) {
		self.camera.zoom_to(factor, duration_ms);
	}

	/// See [`Camera::zoom_by`].
	pub fn zoom_by(&mut self, multiplier: f64) {
		self.camera.zoom_by(multiplier);
	}

	/// See [`Camera::reset_view`].
	pub fn reset_view(&mut self) {
		self.camera.reset_view();
	}

	/// Centers and zooms the camera on a node, as after a click.
	pub fn focus_node(&mut self, id: &str) {
		if let Some((x, y)) = self.position(id) {
			self.camera.center_on(x, y, FOCUS_DURATION_MS);
			self.camera.zoom_to(FOCUS_ZOOM, FOCUS_DURATION_MS);
		}
	}

	/// Canvas size changed.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Drawable nodes in store order. Nodes without a position are skipped.
	pub fn node_views<'a>(
		&self,
		store: &'a GraphStore,
		selected: Option<&NodeId>,
	) -> Vec<NodeView<'a>> {
		store
			.nodes()
			.iter()
			.filter_map(|node| {
				let body = self.sim.body(node.id.as_str())?;
				let (x, y) = body.position()?;
				Some(NodeView {
					id: &node.id,
					x,
					y,
					kind: node.kind(),
					label: &node.title,
					cluster: node.cluster_id.as_deref(),
					selected: selected == Some(&node.id),
					hovered: self.is_hovered(&node.id),
					highlighted: self.is_highlighted(&node.id),
					pinned: body.state() == BodyState::Pinned,
				})
			})
			.collect()
	}

	/// Drawable links. Links with an endpoint missing from the layout are inert
	/// and left out.
	pub fn link_views(&self, store: &GraphStore) -> Vec<LinkView> {
		store
			.links()
			.iter()
			.filter_map(|link| {
				let (x1, y1) = self.position(link.source.as_str())?;
				let (x2, y2) = self.position(link.target.as_str())?;
				Some(LinkView {
					x1,
					y1,
					x2,
					y2,
					strength: link.strength.unwrap_or(1.0),
					highlighted: self.is_highlighted(&link.source) && self.is_highlighted(&link.target),
				})
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{Graph, Link, Node};

	fn store() -> GraphStore {
		GraphStore::new(Graph::new(
			vec![
				Node::paper("a", "A"),
				Node::paper("b", "B"),
				Node::keyword("c", "C"),
			],
			vec![Link::new("a", "c"), Link::new("b", "c"), Link::new("c", "gone")],
		))
	}

	fn controller(store: &GraphStore) -> LayoutController {
		let mut layout = LayoutController::new(ForceConfig::default(), 800.0, 600.0);
		layout.sync(store);
		layout
	}

	#[test]
	fn sync_reheats_on_structural_change_only() {
		let mut store = store();
		let mut layout = controller(&store);
		layout.sim.step(400);
		assert!(!layout.sim.is_active());

		store.update_node("a", &crate::graph::NodePatch {
			title: Some("A2".into()),
			..Default::default()
		});
		layout.sync(&store);
		assert!(!layout.sim.is_active());

		store.add_node(Node::keyword("d", "D"));
		layout.sync(&store);
		assert!(layout.sim.is_active());
		assert!(layout.position("d").is_some());
	}

	#[test]
	fn link_edits_reheat_an_idle_layout() {
		let mut store = store();
		let mut layout = controller(&store);
		layout.sim.step(400);
		assert!(!layout.sim.is_active());

		store.add_link(Link::new("a", "b"));
		layout.sync(&store);
		assert!(layout.sim.is_active());
		assert_eq!(layout.sim.link_pairs().count(), 3);

		layout.sim.step(400);
		store.remove_link("b", "a");
		layout.sync(&store);
		assert!(layout.sim.is_active());
		assert_eq!(layout.sim.link_pairs().count(), 2);
	}

	#[test]
	fn dangling_links_are_not_drawn() {
		let store = store();
		let layout = controller(&store);
		assert_eq!(layout.link_views(&store).len(), 2);
		assert_eq!(layout.node_views(&store, None).len(), 3);
	}

	#[test]
	fn hover_highlights_neighbors() {
		let store = store();
		let mut layout = controller(&store);
		layout.set_hover(Some(NodeId::from("c")));
		assert!(layout.is_highlighted(&NodeId::from("a")));
		assert!(layout.is_highlighted(&NodeId::from("b")));
		assert!(layout.is_hovered(&NodeId::from("c")));
		let highlighted = layout.link_views(&store).iter().filter(|l| l.highlighted).count();
		assert_eq!(highlighted, 2);
	}

	#[test]
	fn click_selects_without_pinning() {
		let store = store();
		let mut layout = controller(&store);
		let (x, y) = layout.position("b").unwrap();
		let (sx, sy) = layout.view_transform().graph_to_screen(x, y);
		layout.pointer_down(sx, sy);
		assert_eq!(layout.pointer_up(), Some(NodeId::from("b")));
		assert_eq!(layout.sim.body("b").unwrap().state(), BodyState::Floating);
	}

	#[test]
	fn drag_pins_at_release_point() {
		let store = store();
		let mut layout = controller(&store);
		let (x, y) = layout.position("a").unwrap();
		let (sx, sy) = layout.view_transform().graph_to_screen(x, y);
		layout.pointer_down(sx, sy);
		layout.pointer_move(sx + 50.0, sy + 20.0);
		assert_eq!(layout.pointer_up(), None);

		layout.sim.step(5);
		let body = layout.sim.body("a").unwrap();
		assert_eq!(body.state(), BodyState::Pinned);
		assert_eq!(body.position(), Some((x + 50.0, y + 20.0)));

		layout.unpin("a");
		assert_eq!(layout.sim.body("a").unwrap().state(), BodyState::Floating);
	}

	#[test]
	fn background_drag_pans_the_camera() {
		let store = store();
		let mut layout = controller(&store);
		layout.pointer_down(5.0, 5.0);
		layout.pointer_move(25.0, 5.0);
		layout.pointer_up();
		assert_eq!(layout.camera.center(), (-20.0, 0.0));
	}

	#[test]
	fn focus_centers_on_node() {
		let store = store();
		let mut layout = controller(&store);
		let target = layout.position("c").unwrap();
		layout.focus_node("c");
		layout.tick(FOCUS_DURATION_MS);
		assert_eq!(layout.camera.center(), target);
		assert_eq!(layout.camera.zoom(), FOCUS_ZOOM);
	}

	#[test]
	fn reset_positions_unpins_everything() {
		let store = store();
		let mut layout = controller(&store);
		layout.drag_start(&NodeId::from("a"));
		layout.drag_to(&NodeId::from("a"), 300.0, 300.0);
		layout.drag_end(&NodeId::from("a"));
		layout.reset_positions();
		assert!(
			layout
				.sim
				.bodies()
				.iter()
				.all(|b| b.state() == BodyState::Floating)
		);
	}
}
