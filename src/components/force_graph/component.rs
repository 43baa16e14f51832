use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::export;
use super::interaction::PointerOutcome;
use super::render;
use super::scene::Scene;
use super::state::ForceGraphState;
use super::types::GraphData;

const DEFAULT_SIZE: (f64, f64) = (800.0, 600.0);

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

type BrowserCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Closures handed to the browser. Both are dropped, and the resize listener
/// removed, once the component goes away.
#[derive(Clone, Default)]
struct FrameHandles {
	animate: BrowserCallback,
	resize: BrowserCallback,
}

impl FrameHandles {
	fn listen_resize(&self, window: &Window) {
		if let Some(cb) = &*self.resize.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
	}

	fn request_frame(&self, window: &Window) {
		if let Some(cb) = &*self.animate.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	}

	fn release(&self, window: Option<&Window>) {
		let resize = self.resize.borrow_mut().take();
		if let (Some(cb), Some(window)) = (&resize, window) {
			let _ =
				window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
		// may run inside the animate closure itself, which ends the frame loop
		let _ = self.animate.borrow_mut().take();
	}

	#[cfg(all(test, target_arch = "wasm32"))]
	fn is_released(&self) -> bool {
		self.animate.borrow().is_none() && self.resize.borrow().is_none()
	}
}

fn set_cursor(canvas_ref: NodeRef<leptos::html::Canvas>, cursor: &str) {
	if let Some(canvas) = canvas_ref.get() {
		let canvas: HtmlCanvasElement = canvas.into();
		let _ = web_sys::HtmlElement::style(&canvas).set_property("cursor", cursor);
	}
}

fn local_position(
	canvas_ref: NodeRef<leptos::html::Canvas>,
	ev: &MouseEvent,
) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Interactive force-directed view of `data`.
///
/// Setting `export_request` to `Some(filename)` downloads a PNG of the
/// current view; the signal is reset to `None` once the export is scheduled.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(into)] highlighted: Signal<Option<String>>,
	#[prop(optional)] on_node_click: Option<Callback<String>>,
	#[prop(optional)] export_request: Option<RwSignal<Option<String>>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state = Rc::new(RefCell::new(ForceGraphState::new(
		DEFAULT_SIZE.0,
		DEFAULT_SIZE.1,
	)));
	let handles = FrameHandles::default();
	let alive = Arc::new(AtomicBool::new(true));

	let alive_cleanup = alive.clone();
	on_cleanup(move || alive_cleanup.store(false, Ordering::Relaxed));

	let (state_init, handles_init) = (state.clone(), handles.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if handles_init.animate.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			warn!("no window; graph canvas disabled");
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or(DEFAULT_SIZE)
		} else {
			let parent = canvas.parent_element();
			(
				width.unwrap_or_else(|| {
					parent
						.as_ref()
						.map(|p| p.client_width() as f64)
						.unwrap_or(DEFAULT_SIZE.0)
				}),
				height.unwrap_or_else(|| {
					parent
						.as_ref()
						.map(|p| p.client_height() as f64)
						.unwrap_or(DEFAULT_SIZE.1)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("2d canvas context unavailable");
			return;
		};
		state_init.borrow_mut().resize(w, h);

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*handles_init.resize.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				state_resize.borrow_mut().resize(nw, nh);
			}));
			handles_init.listen_resize(&window);
		}

		let (state_anim, handles_anim, alive_anim) =
			(state_init.clone(), handles_init.clone(), alive.clone());
		let mut last = js_sys::Date::now();
		*handles_init.animate.borrow_mut() = Some(Closure::new(move || {
			if !alive_anim.load(Ordering::Relaxed) {
				state_anim.borrow_mut().teardown();
				handles_anim.release(web_sys::window().as_ref());
				return;
			}
			let now = js_sys::Date::now();
			let dt = (now - last).clamp(0.0, 100.0);
			last = now;
			{
				let mut s = state_anim.borrow_mut();
				if s.frame(dt) {
					render::render(&Scene::capture(&s), &ctx);
				}
			}
			if let Some(win) = web_sys::window() {
				handles_anim.request_frame(&win);
			}
		}));
		handles_init.request_frame(&window);
	});

	let state_data = state.clone();
	Effect::new(move |_| {
		let graph = data.get();
		state_data.borrow_mut().set_data(&graph);
	});

	let state_hl = state.clone();
	Effect::new(move |_| {
		let id = highlighted.get();
		state_hl.borrow_mut().highlight(id.as_deref());
	});

	if let Some(request) = export_request {
		let state_export = state.clone();
		Effect::new(move |_| {
			let Some(filename) = request.get() else {
				return;
			};
			let scene = Scene::capture(&state_export.borrow());
			export::spawn_png_export(&scene, filename);
			request.set(None);
		});
	}

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = local_position(canvas_ref, &ev) {
			let cursor = {
				let mut s = state_md.borrow_mut();
				s.pointer_down(x, y);
				s.cursor()
			};
			set_cursor(canvas_ref, cursor);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = local_position(canvas_ref, &ev) {
			state_mm.borrow_mut().pointer_move(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		let (outcome, cursor) = {
			let mut s = state_mu.borrow_mut();
			(s.pointer_up(), s.cursor())
		};
		set_cursor(canvas_ref, cursor);
		if let PointerOutcome::NodeClicked(id) = outcome {
			if let Some(cb) = &on_node_click {
				cb.run(id);
			}
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let cursor = {
			let mut s = state_ml.borrow_mut();
			s.pointer_leave();
			s.cursor()
		};
		set_cursor(canvas_ref, cursor);
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = local_position(canvas_ref, &ev) {
			state_wh.borrow_mut().wheel(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
	use std::cell::Cell;

	use wasm_bindgen_test::*;
	use web_sys::Event;

	use super::*;

	wasm_bindgen_test_configure!(run_in_browser);

	#[wasm_bindgen_test]
	fn release_detaches_browser_callbacks() {
		let window = web_sys::window().unwrap();
		let handles = FrameHandles::default();
		let resizes = Rc::new(Cell::new(0));
		let counter = resizes.clone();
		*handles.resize.borrow_mut() = Some(Closure::new(move || counter.set(counter.get() + 1)));
		*handles.animate.borrow_mut() = Some(Closure::new(|| {}));
		handles.listen_resize(&window);

		window.dispatch_event(&Event::new("resize").unwrap()).unwrap();
		assert_eq!(resizes.get(), 1);

		handles.release(Some(&window));
		assert!(handles.is_released());
		window.dispatch_event(&Event::new("resize").unwrap()).unwrap();
		assert_eq!(resizes.get(), 1);
	}
}
