use serde::Deserialize;

use crate::graph::NodeKind;

/// Tunables for seeding and the force simulation.
///
/// Deserializes from partial JSON; missing fields keep their defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForceConfig {
	/// Spacing constant `k` of the golden-angle spiral.
	pub spiral_spacing: f64,
	/// Radius of the ring clusters are arranged on during a reset.
	pub cluster_ring_radius: f64,

	/// Many-body strength of papers. Negative repels.
	pub charge_paper: f64,
	/// Many-body strength of keywords.
	pub charge_keyword: f64,
	/// Pairs farther apart than this do not repel at all.
	pub charge_distance_max: f64,
	/// Distances are clamped up to this to bound the force.
	pub charge_distance_min: f64,

	/// Rest length of links.
	pub link_distance: f64,
	/// Spring stiffness, used when a link has no strength of its own.
	pub link_strength: f64,

	/// Pull toward the origin.
	pub center_strength: f64,
	/// Pull toward the cluster centroid.
	pub cluster_strength: f64,

	/// Collision radius of papers.
	pub collision_radius_paper: f64,
	/// Collision radius of keywords.
	pub collision_radius_keyword: f64,
	/// How hard overlaps are resolved per tick.
	pub collision_strength: f64,

	/// The simulation stops below this alpha.
	pub alpha_min: f64,
	/// Cooling rate per tick.
	pub alpha_decay: f64,
	/// Alpha cools toward this.
	pub alpha_target: f64,
	/// Friction applied to velocities each tick.
	pub velocity_decay: f64,
	/// Alpha a structural change reheats the simulation to, at least.
	pub alpha_on_change: f64,
	/// Synchronous ticks run after a full position reset.
	pub reset_ticks: usize,
}

impl Default for ForceConfig {
	fn default() -> Self {
		Self {
			spiral_spacing: 40.0,
			cluster_ring_radius: 150.0,
			charge_paper: -120.0,
			charge_keyword: -60.0,
			charge_distance_max: 400.0,
			charge_distance_min: 1.0,
			link_distance: 60.0,
			link_strength: 0.7,
			center_strength: 0.05,
			cluster_strength: 0.3,
			collision_radius_paper: 14.0,
			collision_radius_keyword: 10.0,
			collision_strength: 0.7,
			alpha_min: 0.001,
			// 1 - alpha_min^(1/300): cools to alpha_min in ~300 ticks
			alpha_decay: 0.0228,
			alpha_target: 0.0,
			velocity_decay: 0.4,
			alpha_on_change: 0.3,
			reset_ticks: 300,
		}
	}
}

impl ForceConfig {
	/// Charge for a node kind.
	pub fn charge(&self, kind: NodeKind) -> f64 {
		match kind {
			NodeKind::Paper => self.charge_paper,
			NodeKind::Keyword => self.charge_keyword,
		}
	}

	/// Collision radius for a node kind.
	pub fn collision_radius(&self, kind: NodeKind) -> f64 {
		match kind {
			NodeKind::Paper => self.collision_radius_paper,
			NodeKind::Keyword => self.collision_radius_keyword,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_overrides_keep_defaults() {
		let config: ForceConfig =
			serde_json::from_str(r#"{"clusterStrength": 0.5, "resetTicks": 50}"#).unwrap();
		assert_eq!(config.cluster_strength, 0.5);
		assert_eq!(config.reset_ticks, 50);
		assert_eq!(config.link_distance, ForceConfig::default().link_distance);
	}

	#[test]
	fn papers_repel_and_collide_harder_than_keywords() {
		let config = ForceConfig::default();
		assert!(config.charge(NodeKind::Paper) < config.charge(NodeKind::Keyword));
		assert!(
			config.collision_radius(NodeKind::Paper) > config.collision_radius(NodeKind::Keyword)
		);
		assert!(config.collision_strength < 1.0);
	}
}
