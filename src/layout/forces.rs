//! Per-tick force passes. Each one nudges body velocities; positions are only
//! integrated afterwards by the simulation.

use std::collections::HashMap;

use super::config::ForceConfig;
use super::simulation::{Body, SimLink};

/// Tiny deterministic offset used to separate coincident bodies.
pub(crate) fn jiggle(seed: usize) -> f64 {
	((seed.wrapping_mul(7919) % 97) as f64 / 97.0 - 0.5) * 1e-6
}

/// Springs pulling linked bodies toward `link_distance`, split between the
/// endpoints by their degree.
pub(crate) fn apply_links(bodies: &mut [Body], links: &[SimLink], alpha: f64, config: &ForceConfig) {
	for link in links {
		let (s, t) = (link.source, link.target);
		let mut dx = bodies[t].x + bodies[t].vx - bodies[s].x - bodies[s].vx;
		let mut dy = bodies[t].y + bodies[t].vy - bodies[s].y - bodies[s].vy;
		if dx == 0.0 {
			dx = jiggle(s);
		}
		if dy == 0.0 {
			dy = jiggle(t);
		}
		let distance = (dx * dx + dy * dy).sqrt();
		let l = (distance - config.link_distance) / distance * alpha * link.strength;
		dx *= l;
		dy *= l;
		bodies[t].vx -= dx * link.bias;
		bodies[t].vy -= dy * link.bias;
		bodies[s].vx += dx * (1.0 - link.bias);
		bodies[s].vy += dy * (1.0 - link.bias);
	}
}

/// Pairwise inverse-square repulsion with a distance cutoff. The repelling
/// body's kind decides the strength.
pub(crate) fn apply_charge(bodies: &mut [Body], alpha: f64, config: &ForceConfig) {
	let max2 = config.charge_distance_max * config.charge_distance_max;
	let min2 = config.charge_distance_min * config.charge_distance_min;
	let strengths: Vec<f64> = bodies.iter().map(|b| config.charge(b.kind)).collect();

	for i in 0..bodies.len() {
		let (mut ax, mut ay) = (0.0, 0.0);
		for j in 0..bodies.len() {
			if i == j {
				continue;
			}
			let mut dx = bodies[j].x - bodies[i].x;
			let mut dy = bodies[j].y - bodies[i].y;
			if dx == 0.0 {
				dx = jiggle(i);
			}
			if dy == 0.0 {
				dy = jiggle(j);
			}
			let mut l = dx * dx + dy * dy;
			if l >= max2 {
				continue;
			}
			if l < min2 {
				l = (min2 * l).sqrt();
			}
			let w = strengths[j] * alpha / l;
			ax += dx * w;
			ay += dy * w;
		}
		bodies[i].vx += ax;
		bodies[i].vy += ay;
	}
}

/// Weak pull toward the origin.
pub(crate) fn apply_center(bodies: &mut [Body], alpha: f64, strength: f64) {
	for body in bodies {
		body.vx -= body.x * strength * alpha;
		body.vy -= body.y * strength * alpha;
	}
}

/// Pull every clustered body toward the current centroid of its cluster.
pub(crate) fn apply_cluster(bodies: &mut [Body], alpha: f64, strength: f64) {
	let mut sums: HashMap<&str, (f64, f64, usize)> = HashMap::new();
	for body in bodies.iter() {
		if let Some(cluster) = body.cluster.as_deref() {
			let entry = sums.entry(cluster).or_insert((0.0, 0.0, 0));
			entry.0 += body.x;
			entry.1 += body.y;
			entry.2 += 1;
		}
	}
	let centroids: HashMap<String, (f64, f64)> = sums
		.into_iter()
		.map(|(cluster, (sx, sy, n))| (cluster.to_owned(), (sx / n as f64, sy / n as f64)))
		.collect();

	for body in bodies.iter_mut() {
		let Some(&(cx, cy)) = body.cluster.as_deref().and_then(|c| centroids.get(c)) else {
			continue;
		};
		body.vx += (cx - body.x) * alpha * strength;
		body.vy += (cy - body.y) * alpha * strength;
	}
}

/// Soft minimum separation. Radii depend on kind; a strength below 1 lets
/// bodies overlap a little instead of bouncing apart.
pub(crate) fn apply_collision(bodies: &mut [Body], config: &ForceConfig) {
	let radii: Vec<f64> = bodies.iter().map(|b| config.collision_radius(b.kind)).collect();

	for i in 0..bodies.len() {
		let ri = radii[i];
		let ri2 = ri * ri;
		let xi = bodies[i].x + bodies[i].vx;
		let yi = bodies[i].y + bodies[i].vy;
		for j in i + 1..bodies.len() {
			let rj = radii[j];
			let r = ri + rj;
			let mut dx = xi - (bodies[j].x + bodies[j].vx);
			let mut dy = yi - (bodies[j].y + bodies[j].vy);
			let mut l = dx * dx + dy * dy;
			if l >= r * r {
				continue;
			}
			if dx == 0.0 {
				dx = jiggle(i);
				l = dx * dx + dy * dy;
			}
			if dy == 0.0 {
				dy = jiggle(j);
				l = dx * dx + dy * dy;
			}
			let l = l.sqrt();
			let push = (r - l) / l * config.collision_strength;
			dx *= push;
			dy *= push;
			let share = rj * rj / (ri2 + rj * rj);
			bodies[i].vx += dx * share;
			bodies[i].vy += dy * share;
			bodies[j].vx -= dx * (1.0 - share);
			bodies[j].vy -= dy * (1.0 - share);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{NodeId, NodeKind};

	fn body(id: &str, x: f64, y: f64, cluster: Option<&str>) -> Body {
		let mut b = Body::new(NodeId::from(id), NodeKind::Paper, cluster.map(str::to_owned));
		b.place(x, y);
		b
	}

	#[test]
	fn charge_pushes_bodies_apart() {
		let mut bodies = vec![body("a", -5.0, 0.0, None), body("b", 5.0, 0.0, None)];
		apply_charge(&mut bodies, 1.0, &ForceConfig::default());
		assert!(bodies[0].vx < 0.0);
		assert!(bodies[1].vx > 0.0);
	}

	#[test]
	fn charge_ignores_pairs_beyond_cutoff() {
		let config = ForceConfig::default();
		let far = config.charge_distance_max + 1.0;
		let mut bodies = vec![body("a", 0.0, 0.0, None), body("b", far, 0.0, None)];
		apply_charge(&mut bodies, 1.0, &config);
		assert_eq!(bodies[0].vx, 0.0);
		assert_eq!(bodies[1].vx, 0.0);
	}

	#[test]
	fn links_pull_distant_endpoints_together() {
		let mut bodies = vec![body("a", 0.0, 0.0, None), body("b", 200.0, 0.0, None)];
		let links = [SimLink {
			source: 0,
			target: 1,
			strength: 1.0,
			bias: 0.5,
		}];
		apply_links(&mut bodies, &links, 1.0, &ForceConfig::default());
		assert!(bodies[0].vx > 0.0);
		assert!(bodies[1].vx < 0.0);
	}

	#[test]
	fn cluster_force_points_at_centroid() {
		let mut bodies = vec![
			body("a", 0.0, 0.0, Some("c")),
			body("b", 10.0, 0.0, Some("c")),
			body("lonely", 50.0, 50.0, None),
		];
		apply_cluster(&mut bodies, 1.0, 0.5);
		assert!((bodies[0].vx - 2.5).abs() < 1e-9);
		assert!((bodies[1].vx + 2.5).abs() < 1e-9);
		assert_eq!(bodies[2].vx, 0.0);
	}

	#[test]
	fn collision_separates_overlapping_bodies() {
		let mut bodies = vec![body("a", 0.0, 0.0, None), body("b", 4.0, 0.0, None)];
		apply_collision(&mut bodies, &ForceConfig::default());
		assert!(bodies[0].vx < 0.0);
		assert!(bodies[1].vx > 0.0);
	}

	#[test]
	fn center_pulls_toward_origin() {
		let mut bodies = vec![body("a", 100.0, -100.0, None)];
		apply_center(&mut bodies, 1.0, 0.1);
		assert!(bodies[0].vx < 0.0);
		assert!(bodies[0].vy > 0.0);
	}
}
