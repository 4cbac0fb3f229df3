use std::collections::{HashMap, HashSet};

use log::debug;

use super::config::ForceConfig;
use super::forces;
use super::seed::{cluster_layout, spiral_position};
use crate::graph::{Graph, LinkKey, NodeId, NodeKind};

/// Where a body is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyState {
	/// No position yet; the next sync seeds it.
	Unseeded,
	/// Moves freely under the simulation forces.
	Floating,
	/// Held at `fx, fy`.
	Pinned,
}

/// Physical state of one node, keyed by its id.
#[derive(Clone, Debug)]
pub struct Body {
	/// Node this body simulates.
	pub id: NodeId,
	/// Decides charge and collision radius.
	pub kind: NodeKind,
	/// Cluster the body is pulled toward.
	pub cluster: Option<String>,
	/// Position.
	pub x: f64,
	/// Position.
	pub y: f64,
	/// Velocity.
	pub vx: f64,
	/// Velocity.
	pub vy: f64,
	/// Pinned x.
	pub fx: Option<f64>,
	/// Pinned y.
	pub fy: Option<f64>,
	seeded: bool,
}

impl Body {
	/// An unseeded body at the origin.
	pub fn new(id: NodeId, kind: NodeKind, cluster: Option<String>) -> Self {
		Self {
			id,
			kind,
			cluster,
			x: 0.0,
			y: 0.0,
			vx: 0.0,
			vy: 0.0,
			fx: None,
			fy: None,
			seeded: false,
		}
	}

	/// Lifecycle state.
	pub fn state(&self) -> BodyState {
		if !self.seeded {
			BodyState::Unseeded
		} else if self.fx.is_some() || self.fy.is_some() {
			BodyState::Pinned
		} else {
			BodyState::Floating
		}
	}

	/// Position once seeded.
	pub fn position(&self) -> Option<(f64, f64)> {
		self.seeded.then_some((self.x, self.y))
	}

	/// Places the body at rest at `(x, y)`.
	pub(crate) fn place(&mut self, x: f64, y: f64) {
		self.x = x;
		self.y = y;
		self.vx = 0.0;
		self.vy = 0.0;
		self.seeded = true;
	}

	fn pin(&mut self, x: f64, y: f64) {
		self.fx = Some(x);
		self.fy = Some(y);
	}

	fn unpin(&mut self) {
		self.fx = None;
		self.fy = None;
	}
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct SimLink {
	pub source: usize,
	pub target: usize,
	pub strength: f64,
	/// Share of the correction applied to the target.
	pub bias: f64,
}

/// Force simulation over the bodies of one graph.
pub struct Simulation {
	config: ForceConfig,
	bodies: Vec<Body>,
	index: HashMap<NodeId, usize>,
	links: Vec<SimLink>,
	alpha: f64,
}

impl Simulation {
	/// An empty, fully hot simulation.
	pub fn new(config: ForceConfig) -> Self {
		Self {
			config,
			bodies: Vec::new(),
			index: HashMap::new(),
			links: Vec::new(),
			alpha: 1.0,
		}
	}

	/// Tunables in use.
	pub fn config(&self) -> &ForceConfig {
		&self.config
	}

	/// Bodies in node order.
	pub fn bodies(&self) -> &[Body] {
		&self.bodies
	}

	/// Looks a body up by node id.
	pub fn body(&self, id: &str) -> Option<&Body> {
		self.index.get(id).map(|&i| &self.bodies[i])
	}

	fn body_mut(&mut self, id: &str) -> Option<&mut Body> {
		self.index.get(id).map(|&i| &mut self.bodies[i])
	}

	/// Current temperature.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Whether the simulation is still above `alpha_min`.
	pub fn is_active(&self) -> bool {
		self.alpha >= self.config.alpha_min
	}

	/// Sets alpha, restarting a cooled simulation.
	pub fn reheat(&mut self, alpha: f64) {
		self.alpha = alpha;
	}

	/// Endpoint bodies of every simulated link.
	pub fn link_pairs(&self) -> impl Iterator<Item = (&Body, &Body)> {
		self.links
			.iter()
			.map(|l| (&self.bodies[l.source], &self.bodies[l.target]))
	}

	/// Reconciles bodies with `graph`: surviving ids keep their physical
	/// state, new ids start unseeded and are seeded on the spiral, vanished
	/// ids are dropped. Returns whether the node set or the set of simulated
	/// links changed.
	pub fn sync(&mut self, graph: &Graph) -> bool {
		let previous_links = self.link_keys();
		let mut previous: HashMap<NodeId, Body> = self
			.bodies
			.drain(..)
			.map(|b| (b.id.clone(), b))
			.collect();
		let previous_len = previous.len();

		let mut kept = 0;
		for node in &graph.nodes {
			let body = match previous.remove(&node.id) {
				Some(mut body) => {
					kept += 1;
					body.kind = node.kind();
					body.cluster = node.cluster_id.clone();
					body
				}
				None => Body::new(node.id.clone(), node.kind(), node.cluster_id.clone()),
			};
			self.bodies.push(body);
		}
		self.index = self
			.bodies
			.iter()
			.enumerate()
			.map(|(i, b)| (b.id.clone(), i))
			.collect();
		self.rebuild_links(graph);
		self.seed_unseeded();

		kept != previous_len || kept != self.bodies.len() || previous_links != self.link_keys()
	}

	fn link_keys(&self) -> HashSet<LinkKey> {
		self.links
			.iter()
			.map(|l| LinkKey::new(&self.bodies[l.source].id, &self.bodies[l.target].id))
			.collect()
	}

	fn rebuild_links(&mut self, graph: &Graph) {
		let mut resolved = Vec::with_capacity(graph.links.len());
		let mut degree = vec![0usize; self.bodies.len()];
		for link in &graph.links {
			// links with an absent endpoint stay inert
			let (Some(&s), Some(&t)) = (
				self.index.get(link.source.as_str()),
				self.index.get(link.target.as_str()),
			) else {
				continue;
			};
			if s == t {
				continue;
			}
			degree[s] += 1;
			degree[t] += 1;
			resolved.push((s, t, link.strength.unwrap_or(1.0)));
		}
		self.links = resolved
			.into_iter()
			.map(|(s, t, weight)| SimLink {
				source: s,
				target: t,
				strength: self.config.link_strength * weight / degree[s].min(degree[t]) as f64,
				bias: degree[s] as f64 / (degree[s] + degree[t]) as f64,
			})
			.collect();
	}

	fn seed_unseeded(&mut self) {
		let count = self.bodies.len();
		let spacing = self.config.spiral_spacing;
		for (i, body) in self.bodies.iter_mut().enumerate() {
			if body.state() == BodyState::Unseeded {
				let (x, y) = spiral_position(i, count, spacing);
				body.place(x, y);
			}
		}
	}

	/// Re-seeds every body cluster-aware, clears all pins, reheats and runs
	/// the configured number of ticks synchronously.
	pub fn reset_positions(&mut self) {
		let clusters: Vec<Option<&str>> = self.bodies.iter().map(|b| b.cluster.as_deref()).collect();
		let seeds = cluster_layout(
			&clusters,
			self.config.spiral_spacing,
			self.config.cluster_ring_radius,
		);
		for (body, (x, y)) in self.bodies.iter_mut().zip(seeds) {
			body.unpin();
			body.place(x, y);
		}
		self.alpha = 1.0;
		let ticks = self.config.reset_ticks;
		self.step(ticks);
		debug!("layout reset: {} bodies, {} ticks", self.bodies.len(), ticks);
	}

	/// Runs `ticks` ticks.
	pub fn step(&mut self, ticks: usize) {
		for _ in 0..ticks {
			self.tick();
		}
	}

	/// One synchronous step: cool, apply every force, integrate.
	pub fn tick(&mut self) {
		let config = &self.config;
		self.alpha += (config.alpha_target - self.alpha) * config.alpha_decay;
		let alpha = self.alpha;

		forces::apply_links(&mut self.bodies, &self.links, alpha, config);
		forces::apply_charge(&mut self.bodies, alpha, config);
		forces::apply_center(&mut self.bodies, alpha, config.center_strength);
		forces::apply_cluster(&mut self.bodies, alpha, config.cluster_strength);
		forces::apply_collision(&mut self.bodies, config);

		let keep = 1.0 - config.velocity_decay;
		for body in &mut self.bodies {
			match body.fx {
				Some(fx) => {
					body.x = fx;
					body.vx = 0.0;
				}
				None => {
					body.vx *= keep;
					body.x += body.vx;
				}
			}
			match body.fy {
				Some(fy) => {
					body.y = fy;
					body.vy = 0.0;
				}
				None => {
					body.vy *= keep;
					body.y += body.vy;
				}
			}
		}
	}

	/// Holds `id` at `(x, y)` until unpinned.
	pub fn pin(&mut self, id: &str, x: f64, y: f64) {
		if let Some(body) = self.body_mut(id) {
			body.pin(x, y);
		}
	}

	/// Pins `id` where it currently is.
	pub fn pin_in_place(&mut self, id: &str) {
		if let Some(body) = self.body_mut(id) {
			let (x, y) = (body.x, body.y);
			body.pin(x, y);
		}
	}

	/// Releases one body.
	pub fn unpin(&mut self, id: &str) {
		if let Some(body) = self.body_mut(id) {
			body.unpin();
		}
	}

	/// Releases every body.
	pub fn unpin_all(&mut self) {
		for body in &mut self.bodies {
			body.unpin();
		}
	}
}
