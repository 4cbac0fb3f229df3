//! Force-directed layout: seeding, simulation, camera and pointer handling.

mod camera;
mod config;
mod controller;
mod forces;
mod seed;
mod simulation;

pub use camera::{
	Camera, DEFAULT_ZOOM, FOCUS_DURATION_MS, FOCUS_ZOOM, MAX_ZOOM, MIN_ZOOM, ViewTransform,
	ZOOM_DURATION_MS, ZOOM_STEP,
};
pub use config::ForceConfig;
pub use controller::{
	HIT_RADIUS, KEYWORD_RADIUS, LayoutController, LinkView, NodeView, PAPER_RADIUS, node_radius,
};
pub use seed::{GOLDEN_ANGLE, cluster_layout, spiral_layout, spiral_position};
pub use simulation::{Body, BodyState, Simulation};
