//! Animated view camera. Center and zoom animate independently; a new
//! command on either channel replaces whatever that channel was doing.

/// Zoom after a view reset.
pub const DEFAULT_ZOOM: f64 = 1.0;
/// Zoom when focusing a node.
pub const FOCUS_ZOOM: f64 = 2.0;
/// Multiplier of one zoom button press.
pub const ZOOM_STEP: f64 = 1.5;
/// Zoom floor.
pub const MIN_ZOOM: f64 = 0.1;
/// Zoom ceiling.
pub const MAX_ZOOM: f64 = 10.0;
/// Length of a centering animation.
pub const FOCUS_DURATION_MS: f64 = 1000.0;
/// Length of a zoom animation.
pub const ZOOM_DURATION_MS: f64 = 400.0;

pub(crate) fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Screen-space translation and scale: `screen = graph * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal offset in pixels.
	pub x: f64,
	/// Vertical offset in pixels.
	pub y: f64,
	/// Scale.
	pub k: f64,
}

impl ViewTransform {
	/// Inverse of [`ViewTransform::graph_to_screen`].
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Maps a graph-space point to pixels.
	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(gx * self.k + self.x, gy * self.k + self.y)
	}
}

#[derive(Clone, Copy, Debug)]
struct Tween<T> {
	from: T,
	to: T,
	elapsed: f64,
	duration: f64,
}

impl<T> Tween<T> {
	fn progress(&self) -> f64 {
		ease_out_cubic((self.elapsed / self.duration).clamp(0.0, 1.0))
	}

	fn finished(&self) -> bool {
		self.elapsed >= self.duration
	}
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
	a * (1.0 - t) + b * t
}

/// Center and zoom of the view, each with its own animation.
#[derive(Clone, Debug)]
pub struct Camera {
	center: (f64, f64),
	zoom: f64,
	center_tween: Option<Tween<(f64, f64)>>,
	zoom_tween: Option<Tween<f64>>,
}

impl Default for Camera {
	fn default() -> Self {
		Self {
			center: (0.0, 0.0),
			zoom: DEFAULT_ZOOM,
			center_tween: None,
			zoom_tween: None,
		}
	}
}

impl Camera {
	/// Graph-space point shown in the middle of the viewport.
	pub fn center(&self) -> (f64, f64) {
		self.center
	}

	/// Current zoom.
	pub fn zoom(&self) -> f64 {
		self.zoom
	}

	/// Whether either channel is still moving.
	pub fn is_animating(&self) -> bool {
		self.center_tween.is_some() || self.zoom_tween.is_some()
	}

	/// Animates the center to a graph point. A zero duration jumps.
	pub fn center_on(&mut self, x: f64, y: f64, duration_ms: f64) {
		if duration_ms <= 0.0 {
			self.center = (x, y);
			self.center_tween = None;
			return;
		}
		self.center_tween = Some(Tween {
			from: self.center,
			to: (x, y),
			elapsed: 0.0,
			duration: duration_ms,
		});
	}

	/// Animates the zoom to `factor`, clamped to the zoom bounds.
	pub fn zoom_to(&mut self, factor: f64, duration_ms: f64) {
		let factor = factor.clamp(MIN_ZOOM, MAX_ZOOM);
		if duration_ms <= 0.0 {
			self.zoom = factor;
			self.zoom_tween = None;
			return;
		}
		self.zoom_tween = Some(Tween {
			from: self.zoom,
			to: factor,
			elapsed: 0.0,
			duration: duration_ms,
		});
	}

	/// Scales the current zoom by `multiplier` over the default zoom duration.
	pub fn zoom_by(&mut self, multiplier: f64) {
		self.zoom_to(self.zoom * multiplier, ZOOM_DURATION_MS);
	}

	/// Back to the origin at the default zoom.
	pub fn reset_view(&mut self) {
		self.center_on(0.0, 0.0, FOCUS_DURATION_MS);
		self.zoom_to(DEFAULT_ZOOM, ZOOM_DURATION_MS);
	}

	/// Moves the view by a screen-space delta, cancelling any centering.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.center_tween = None;
		self.center.0 -= dx / self.zoom;
		self.center.1 -= dy / self.zoom;
	}

	/// Zooms immediately while keeping the graph point under the given screen
	/// position fixed, as a mouse wheel does.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64, width: f64, height: f64) {
		self.center_tween = None;
		self.zoom_tween = None;
		let before = self.view_transform(width, height).screen_to_graph(sx, sy);
		self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let after = self.view_transform(width, height).screen_to_graph(sx, sy);
		self.center.0 += before.0 - after.0;
		self.center.1 += before.1 - after.1;
	}

	/// Advances in-flight transitions by `dt_ms`.
	pub fn advance(&mut self, dt_ms: f64) {
		if let Some(tween) = &mut self.center_tween {
			tween.elapsed += dt_ms;
			let t = tween.progress();
			self.center = (
				lerp(tween.from.0, tween.to.0, t),
				lerp(tween.from.1, tween.to.1, t),
			);
			if tween.finished() {
				self.center_tween = None;
			}
		}
		if let Some(tween) = &mut self.zoom_tween {
			tween.elapsed += dt_ms;
			self.zoom = lerp(tween.from, tween.to, tween.progress());
			if tween.finished() {
				self.zoom_tween = None;
			}
		}
	}

	/// Transform for a viewport of the given size.
	pub fn view_transform(&self, width: f64, height: f64) -> ViewTransform {
		ViewTransform {
			x: width / 2.0 - self.center.0 * self.zoom,
			y: height / 2.0 - self.center.1 * self.zoom,
			k: self.zoom,
		}
	}
}
