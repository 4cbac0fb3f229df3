use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::graph::{GraphStore, NodeId, NodeKind};
use crate::layout::{LayoutController, NodeView, node_radius};

const BACKGROUND: &str = "#1a1a2e";
const PAPER_COLOR: &str = "#4f8ef7";
const KEYWORD_COLOR: &str = "#f7a64f";
/// Links weaker than this are drawn dashed.
const WEAK_LINK: f64 = 0.5;
const CLUSTER_PALETTE: [&str; 8] = [
	"#4f8ef7", "#e05d8a", "#4fc9a4", "#c59bf5", "#f2d05b", "#5bc0f2", "#f28a5b", "#9ad162",
];

fn node_color(node: &NodeView<'_>) -> &'static str {
	match (node.kind, node.cluster) {
		(NodeKind::Keyword, _) => KEYWORD_COLOR,
		(NodeKind::Paper, Some(cluster)) => {
			let hash = cluster
				.bytes()
				.fold(0usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize));
			CLUSTER_PALETTE[hash % CLUSTER_PALETTE.len()]
		}
		(NodeKind::Paper, None) => PAPER_COLOR,
	}
}

pub fn render(
	ctrl: &LayoutController,
	store: &GraphStore,
	selected: Option<&NodeId>,
	ctx: &CanvasRenderingContext2d,
) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, ctrl.width, ctrl.height);
	let transform = ctrl.view_transform();
	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);
	draw_links(ctrl, store, transform.k, ctx);
	draw_nodes(ctrl, store, selected, transform.k, ctx);
	ctx.restore();
}

fn draw_links(ctrl: &LayoutController, store: &GraphStore, k: f64, ctx: &CanvasRenderingContext2d) {
	let dim = ctrl.has_active_highlight();
	for link in ctrl.link_views(store) {
		let (alpha, width) = match (dim, link.highlighted) {
			(false, _) => (0.5, 1.2 / k),
			(true, true) => (0.9, 1.8 / k),
			(true, false) => (0.12, 1.0 / k),
		};
		ctx.set_stroke_style_str(&format!("rgba(100, 180, 255, {alpha})"));
		ctx.set_line_width(width);
		if link.strength < WEAK_LINK {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(6.0 / k),
				&JsValue::from_f64(4.0 / k),
			));
		}
		ctx.begin_path();
		ctx.move_to(link.x1, link.y1);
		ctx.line_to(link.x2, link.y2);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}
}

fn draw_nodes(
	ctrl: &LayoutController,
	store: &GraphStore,
	selected: Option<&NodeId>,
	k: f64,
	ctx: &CanvasRenderingContext2d,
) {
	let dim = ctrl.has_active_highlight();
	let mut views = ctrl.node_views(store, selected);
	// Highlighted nodes last so they sit on top.
	views.sort_by_key(|v| v.highlighted || v.selected);

	for node in &views {
		let base = node_radius(node.kind);
		let radius = if node.hovered { base * 1.35 } else { base };
		let alpha = if dim && !node.highlighted { 0.3 } else { 1.0 };

		if node.hovered || node.selected {
			let glow = radius * 2.6;
			if let Ok(gradient) = ctx.create_radial_gradient(node.x, node.y, radius * 0.3, node.x, node.y, glow) {
				let _ = gradient.add_color_stop(0.0, "rgba(255, 255, 255, 0.35)");
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(node.x, node.y, glow, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(node_color(node));
		ctx.fill();

		if node.selected || node.pinned {
			ctx.begin_path();
			let _ = ctx.arc(node.x, node.y, radius + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(if node.selected { "white" } else { "rgba(255, 255, 255, 0.5)" });
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		if node.kind == NodeKind::Paper || node.highlighted || k > 1.5 {
			ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", alpha * 0.85));
			ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
			let _ = ctx.fill_text(node.label, node.x + radius + 3.0, node.y + 3.0);
		}
		ctx.set_global_alpha(1.0);
	}
}
