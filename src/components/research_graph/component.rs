use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::html::Canvas;
use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render;
use crate::chat::ChatSession;
use crate::graph::NodeId;
use crate::layout::{ForceConfig, LayoutController, ZOOM_STEP};

type Shared<T> = Rc<RefCell<Option<T>>>;

const FALLBACK_SIZE: (f64, f64) = (800.0, 600.0);
const FRAME_MS: f64 = 16.0;

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|(w, h)| *w > 0.0 && *h > 0.0)
		.unwrap_or(FALLBACK_SIZE)
}

fn local_point(canvas_ref: NodeRef<Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?;
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn with_ctrl(ctrl: &Shared<LayoutController>, f: impl FnOnce(&mut LayoutController)) {
	if let Some(c) = ctrl.borrow_mut().as_mut() {
		f(c);
	}
}

/// Canvas view of the active conversation's graph. Clicking a node focuses
/// the camera on it and reports it through `on_select`.
#[component]
pub fn ResearchGraph(
	session: StoredValue<ChatSession, LocalStorage>,
	#[prop(into)] on_select: Callback<NodeId>,
	#[prop(optional)] config: ForceConfig,
) -> impl IntoView {
	let canvas_ref = NodeRef::<Canvas>::new();
	let ctrl: Shared<LayoutController> = Rc::new(RefCell::new(None));
	let animate: Shared<Closure<dyn FnMut(f64)>> = Rc::new(RefCell::new(None));
	let resize_cb: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let (ctrl_init, animate_init, resize_cb_init) = (ctrl.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("canvas has no 2d context");
			return;
		};

		let (w, h) = parent_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		*ctrl_init.borrow_mut() = Some(LayoutController::new(config.clone(), w, h));
		debug!("graph canvas ready at {w}x{h}");

		let (ctrl_resize, canvas_resize) = (ctrl_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = parent_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			with_ctrl(&ctrl_resize, |c| c.resize(nw, nh));
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (ctrl_anim, animate_inner) = (ctrl_init.clone(), animate_init.clone());
		let last_frame = Cell::new(None::<f64>);
		*animate_init.borrow_mut() = Some(Closure::new(move |now: f64| {
			let dt = last_frame.replace(Some(now)).map_or(FRAME_MS, |last| now - last);
			let alive = match ctrl_anim.borrow_mut().as_mut() {
				Some(c) => session
					.try_with_value(|s| {
						c.sync(s.graph());
						c.tick(dt);
						render::render(c, s.graph(), s.selection().selected_id(), &ctx);
					})
					.is_some(),
				None => true,
			};
			if !alive {
				debug!("session gone, stopping graph animation");
				return;
			}
			if let (Some(window), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let ctrl_md = ctrl.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = local_point(canvas_ref, &ev) {
			with_ctrl(&ctrl_md, |c| c.pointer_down(x, y));
		}
	};

	let ctrl_mm = ctrl.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = local_point(canvas_ref, &ev) {
			with_ctrl(&ctrl_mm, |c| c.pointer_move(x, y));
		}
	};

	let ctrl_mu = ctrl.clone();
	let on_mouseup = move |_: MouseEvent| {
		let clicked = ctrl_mu.borrow_mut().as_mut().and_then(|c| c.pointer_up());
		if let Some(id) = clicked {
			with_ctrl(&ctrl_mu, |c| c.focus_node(id.as_str()));
			on_select.run(id);
		}
	};

	let ctrl_dbl = ctrl.clone();
	let on_dblclick = move |ev: MouseEvent| {
		if let Some((x, y)) = local_point(canvas_ref, &ev) {
			with_ctrl(&ctrl_dbl, |c| {
				if let Some(id) = c.node_at(x, y) {
					c.unpin(id.as_str());
				}
			});
		}
	};

	let ctrl_ml = ctrl.clone();
	let on_mouseleave = move |_: MouseEvent| with_ctrl(&ctrl_ml, |c| c.pointer_leave());

	let ctrl_wh = ctrl.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = local_point(canvas_ref, &ev) {
			with_ctrl(&ctrl_wh, |c| c.wheel(x, y, ev.delta_y()));
		}
	};

	let (ctrl_in, ctrl_out, ctrl_home, ctrl_layout) = (ctrl.clone(), ctrl.clone(), ctrl.clone(), ctrl);
	let zoom_in = move |_: MouseEvent| with_ctrl(&ctrl_in, |c| c.zoom_by(ZOOM_STEP));
	let zoom_out = move |_: MouseEvent| with_ctrl(&ctrl_out, |c| c.zoom_by(1.0 / ZOOM_STEP));
	let reset_view = move |_: MouseEvent| with_ctrl(&ctrl_home, |c| c.reset_view());
	let relayout = move |_: MouseEvent| with_ctrl(&ctrl_layout, |c| c.reset_positions());

	view! {
		<div class="research-graph">
			<canvas
				node_ref=canvas_ref
				class="research-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:dblclick=on_dblclick
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div class="graph-controls">
				<button title="Zoom in" on:click=zoom_in>"+"</button>
				<button title="Zoom out" on:click=zoom_out>"−"</button>
				<button title="Reset view" on:click=reset_view>"⌂"</button>
				<button title="Re-layout" on:click=relayout>"↻"</button>
			</div>
		</div>
	}
}
