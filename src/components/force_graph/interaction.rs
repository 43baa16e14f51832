use log::debug;

use super::simulation::Simulation;

/// Screen pixels the pointer may travel before a press stops counting as a click.
pub const CLICK_THRESHOLD: f64 = 3.0;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;
/// Alpha the layout is held at while a node is being dragged.
pub const DRAG_ALPHA_TARGET: f64 = 0.3;
pub const CLICK_REHEAT_ALPHA: f64 = 0.3;

/// Maps graph coordinates to screen pixels: `screen = graph * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	#[cfg(test)]
	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(gx * self.k + self.x, gy * self.k + self.y)
	}

	/// Zoom by `factor`, keeping the graph point under `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}

	/// Transform that puts graph point `(gx, gy)` at the middle of a `width` x `height` view.
	pub fn centered_on(gx: f64, gy: f64, k: f64, width: f64, height: f64) -> Self {
		Self {
			x: width / 2.0 - gx * k,
			y: height / 2.0 - gy * k,
			k,
		}
	}

	pub fn lerp(&self, to: &ViewTransform, t: f64) -> Self {
		Self {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
			k: self.k + (to.k - self.k) * t,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
enum Gesture {
	#[default]
	Idle,
	Dragging {
		node: usize,
		origin: (f64, f64),
		/// Graph-space offset from the pointer to the node centre at grab time.
		grab: (f64, f64),
		moved: bool,
	},
	Panning {
		origin: (f64, f64),
		start: ViewTransform,
	},
}

#[derive(Clone, Debug, PartialEq)]
pub enum PointerOutcome {
	Ignored,
	/// The view or layout changed.
	Handled,
	NodeClicked(String),
}

/// Turns pointer events into node drags, clicks and view pans.
#[derive(Clone, Debug, Default)]
pub struct InteractionController {
	gesture: Gesture,
}

impl InteractionController {
	pub fn dragged_node(&self) -> Option<usize> {
		match self.gesture {
			Gesture::Dragging { node, .. } => Some(node),
			_ => None,
		}
	}

	pub fn is_panning(&self) -> bool {
		matches!(self.gesture, Gesture::Panning { .. })
	}

	/// Forget any gesture in flight, e.g. when the graph is replaced under it.
	pub fn reset(&mut self) {
		self.gesture = Gesture::Idle;
	}

	/// `hit` is the node under the pointer, if any.
	pub fn pointer_down(
		&mut self,
		sx: f64,
		sy: f64,
		hit: Option<usize>,
		sim: &mut Simulation,
		view: &ViewTransform,
	) -> PointerOutcome {
		if let Some((node, nx, ny)) = hit.and_then(|i| sim.node(i).map(|n| (i, n.x, n.y))) {
			let (gx, gy) = view.screen_to_graph(sx, sy);
			sim.pin(node, nx, ny);
			sim.set_alpha_target(DRAG_ALPHA_TARGET);
			sim.restart();
			self.gesture = Gesture::Dragging {
				node,
				origin: (sx, sy),
				grab: (nx - gx, ny - gy),
				moved: false,
			};
		} else {
			self.gesture = Gesture::Panning {
				origin: (sx, sy),
				start: *view,
			};
		}
		PointerOutcome::Handled
	}

	pub fn pointer_move(
		&mut self,
		sx: f64,
		sy: f64,
		sim: &mut Simulation,
		view: &mut ViewTransform,
	) -> PointerOutcome {
		let (node, grab) = match &mut self.gesture {
			Gesture::Idle => return PointerOutcome::Ignored,
			Gesture::Panning { origin, start } => {
				view.x = start.x + (sx - origin.0);
				view.y = start.y + (sy - origin.1);
				return PointerOutcome::Handled;
			}
			Gesture::Dragging {
				node,
				origin,
				grab,
				moved,
			} => {
				if !*moved && (sx - origin.0).hypot(sy - origin.1) > CLICK_THRESHOLD {
					*moved = true;
				}
				(*node, *grab)
			}
		};

		let (gx, gy) = view.screen_to_graph(sx, sy);
		if sim.pin(node, gx + grab.0, gy + grab.1) {
			PointerOutcome::Handled
		} else {
			debug!("dragged node {node} vanished");
			self.gesture = Gesture::Idle;
			PointerOutcome::Ignored
		}
	}

	pub fn pointer_up(&mut self, sim: &mut Simulation) -> PointerOutcome {
		match std::mem::take(&mut self.gesture) {
			Gesture::Idle => PointerOutcome::Ignored,
			Gesture::Panning { .. } => PointerOutcome::Handled,
			Gesture::Dragging { node, moved, .. } => {
				sim.set_alpha_target(0.0);
				if !sim.unpin(node) {
					return PointerOutcome::Ignored;
				}
				if moved {
					return PointerOutcome::Handled;
				}
				sim.reheat(CLICK_REHEAT_ALPHA);
				match sim.node(node) {
					Some(n) => PointerOutcome::NodeClicked(n.id.clone()),
					None => PointerOutcome::Handled,
				}
			}
		}
	}

	/// End the gesture without treating it as a click.
	pub fn cancel(&mut self, sim: &mut Simulation) {
		if let Gesture::Dragging { node, .. } = std::mem::take(&mut self.gesture) {
			sim.set_alpha_target(0.0);
			sim.unpin(node);
		}
	}

	pub fn wheel(&self, sx: f64, sy: f64, delta_y: f64, view: &mut ViewTransform) -> PointerOutcome {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		view.zoom_at(sx, sy, factor);
		PointerOutcome::Handled
	}
}
