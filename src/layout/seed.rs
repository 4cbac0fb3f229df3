//! Deterministic golden-angle spiral seeding.

use std::collections::HashMap;

/// Fixed angular increment between consecutive spiral positions, in radians.
pub const GOLDEN_ANGLE: f64 = 2.4;

/// Position of the `index`-th of `count` nodes on the spiral.
///
/// The radius scale is `R = sqrt(count) * spacing`, so node `i` lands at
/// distance `sqrt(i) * R / sqrt(count)` from the origin.
pub fn spiral_position(index: usize, count: usize, spacing: f64) -> (f64, f64) {
	let count = count.max(1) as f64;
	let scale = count.sqrt() * spacing;
	let radius = (index as f64).sqrt() * scale / count.sqrt();
	let angle = index as f64 * GOLDEN_ANGLE;
	(radius * angle.cos(), radius * angle.sin())
}

/// Seeds for a whole ordering, one per node.
pub fn spiral_layout(count: usize, spacing: f64) -> Vec<(f64, f64)> {
	(0..count).map(|i| spiral_position(i, count, spacing)).collect()
}

/// Cluster-aware seeds: clusters (in order of first appearance) sit on a ring
/// of `ring_radius` at golden-angle steps, and each cluster's members spiral
/// around that spot. Unclustered nodes spiral around the origin.
pub fn cluster_layout(
	clusters: &[Option<&str>],
	spacing: f64,
	ring_radius: f64,
) -> Vec<(f64, f64)> {
	let mut cluster_index: HashMap<&str, usize> = HashMap::new();
	for cluster in clusters.iter().flatten() {
		let next = cluster_index.len();
		cluster_index.entry(*cluster).or_insert(next);
	}

	let mut members_seen: HashMap<&str, usize> = HashMap::new();
	let mut unclustered_seen = 0;
	let unclustered_count = clusters.iter().filter(|c| c.is_none()).count();

	clusters
		.iter()
		.map(|cluster| match cluster {
			Some(cluster) => {
				let angle = cluster_index[cluster] as f64 * GOLDEN_ANGLE;
				let (cx, cy) = (ring_radius * angle.cos(), ring_radius * angle.sin());
				let slot = members_seen.entry(*cluster).or_insert(0);
				let j = *slot;
				*slot += 1;
				let radius = (j as f64).sqrt() * spacing;
				let angle = j as f64 * GOLDEN_ANGLE;
				(cx + radius * angle.cos(), cy + radius * angle.sin())
			}
			None => {
				let i = unclustered_seen;
				unclustered_seen += 1;
				spiral_position(i, unclustered_count, spacing)
			}
		})
		.collect()
}
