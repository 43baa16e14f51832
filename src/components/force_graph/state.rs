use log::{debug, info};

use super::interaction::{InteractionController, PointerOutcome, ViewTransform};
use super::levels::assign_levels;
use super::sanitize::sanitize;
use super::search::{CameraTransition, focus_transform};
use super::simulation::{Simulation, SimulationConfig, TickOutcome};
use super::types::GraphData;

pub const NODE_RADIUS: f64 = 20.0;
pub const HIGHLIGHT_RADIUS: f64 = 28.0;

/// Everything the canvas needs: the graph, its live layout, the view
/// transform and the current highlight. The only place these are mutated.
pub struct ForceGraphState {
	pub data: GraphData,
	pub simulation: Simulation,
	pub transform: ViewTransform,
	pub controller: InteractionController,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	highlighted: Option<String>,
	camera: Option<CameraTransition>,
	dirty: bool,
}

impl ForceGraphState {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			data: GraphData::default(),
			simulation: Simulation::empty(),
			transform: ViewTransform::default(),
			controller: InteractionController::default(),
			width,
			height,
			animation_running: true,
			highlighted: None,
			camera: None,
			dirty: true,
		}
	}

	/// Replace the graph. The running simulation is stopped before its
	/// replacement is built; runtime positions are not carried over.
	pub fn set_data(&mut self, data: &GraphData) {
		self.simulation.stop();
		let graph = sanitize(data.clone()).graph;
		let levels = assign_levels(&graph);
		self.simulation = Simulation::new(
			&graph,
			&levels,
			(self.width / 2.0, self.height / 2.0),
			SimulationConfig::default(),
		);
		self.simulation.start();
		self.controller.reset();
		self.camera = None;
		info!(
			"graph loaded: {} nodes, {} links",
			graph.nodes.len(),
			graph.links.len()
		);
		self.data = graph;

		// keep the highlight only if its node survived the reload
		let kept = self
			.highlighted
			.take()
			.filter(|id| self.simulation.find(id).is_some());
		self.highlighted = kept;
		self.dirty = true;
	}

	pub fn highlighted_index(&self) -> Option<usize> {
		self.highlighted
			.as_deref()
			.and_then(|id| self.simulation.find(id))
	}

	/// Highlight a node and glide the view onto it. `None` clears the highlight
	/// and stops any glide in progress; unknown ids leave everything as it was.
	pub fn highlight(&mut self, id: Option<&str>) {
		let Some(id) = id else {
			self.highlighted = None;
			self.camera = None;
			self.dirty = true;
			return;
		};
		let Some(node) = self.simulation.find(id).and_then(|i| self.simulation.node(i)) else {
			debug!("highlight target `{id}` is not in the current graph");
			return;
		};
		self.dirty = true;
		let target = focus_transform(node.x, node.y, &self.transform, self.width, self.height);
		self.camera = Some(CameraTransition::new(self.transform, target));
		self.highlighted = Some(id.to_string());
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		self.transform.screen_to_graph(sx, sy)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let highlighted = self.highlighted_index();
		let mut found = None;
		for (i, node) in self.simulation.nodes().iter().enumerate() {
			let radius = if highlighted == Some(i) {
				HIGHLIGHT_RADIUS
			} else {
				NODE_RADIUS
			};
			// later nodes are drawn on top, so the last hit wins
			if (node.x - gx).hypot(node.y - gy) < radius {
				found = Some(i);
			}
		}
		// the highlighted node is drawn last of all
		match highlighted {
			Some(h) if found.is_some() && self.hits(h, gx, gy) => Some(h),
			_ => found,
		}
	}

	fn hits(&self, idx: usize, gx: f64, gy: f64) -> bool {
		self.simulation
			.node(idx)
			.is_some_and(|n| (n.x - gx).hypot(n.y - gy) < HIGHLIGHT_RADIUS)
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) -> PointerOutcome {
		let hit = self.node_at_position(sx, sy);
		if hit.is_none() {
			self.camera = None;
		}
		let outcome = self
			.controller
			.pointer_down(sx, sy, hit, &mut self.simulation, &self.transform);
		self.mark(outcome)
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) -> PointerOutcome {
		let outcome =
			self.controller
				.pointer_move(sx, sy, &mut self.simulation, &mut self.transform);
		self.mark(outcome)
	}

	pub fn pointer_up(&mut self) -> PointerOutcome {
		let outcome = self.controller.pointer_up(&mut self.simulation);
		self.mark(outcome)
	}

	pub fn pointer_leave(&mut self) {
		self.controller.cancel(&mut self.simulation);
	}

	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) -> PointerOutcome {
		self.camera = None;
		let outcome = self.controller.wheel(sx, sy, delta_y, &mut self.transform);
		self.mark(outcome)
	}

	/// CSS cursor for the gesture in progress.
	pub fn cursor(&self) -> &'static str {
		if self.controller.dragged_node().is_some() {
			"grabbing"
		} else if self.controller.is_panning() {
			"move"
		} else {
			"grab"
		}
	}

	fn mark(&mut self, outcome: PointerOutcome) -> PointerOutcome {
		if outcome != PointerOutcome::Ignored {
			self.dirty = true;
		}
		outcome
	}

	/// Advance one animation frame. Returns whether anything needs redrawing.
	pub fn frame(&mut self, dt_ms: f64) -> bool {
		let mut changed = std::mem::take(&mut self.dirty);
		if self.animation_running {
			let before = self.simulation.status();
			changed |= self.simulation.tick() == TickOutcome::Advanced;
			let after = self.simulation.status();
			if after != before {
				debug!(
					"layout {before:?} -> {after:?} at alpha {:.4}",
					self.simulation.alpha()
				);
			}
		}
		if let Some(camera) = &mut self.camera {
			self.transform = camera.advance(dt_ms);
			if camera.is_finished() {
				self.camera = None;
			}
			changed = true;
		}
		changed
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.simulation.set_center(width / 2.0, height / 2.0);
		self.dirty = true;
	}

	/// Stop all motion; used when the view goes away.
	pub fn teardown(&mut self) {
		self.animation_running = false;
		self.camera = None;
		self.simulation.stop();
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::components::force_graph::search::FOCUS_DURATION_MS;
	use crate::components::force_graph::simulation::SimulationStatus;
	use crate::components::force_graph::types::{GraphLink, GraphNode};

	fn data() -> GraphData {
		GraphData {
			nodes: vec![
				GraphNode::new("a", "Alpha"),
				GraphNode::new("b", "Beta"),
				GraphNode::new("c", "Gamma"),
			],
			links: vec![
				GraphLink::new("a", "b", "rel"),
				GraphLink::new("b", "c", "rel"),
				GraphLink::new("c", "missing", "rel"),
			],
		}
	}

	fn settled() -> ForceGraphState {
		let mut s = ForceGraphState::new(800.0, 600.0);
		s.set_data(&data());
		while s.simulation.status() != SimulationStatus::Converged {
			s.frame(16.0);
		}
		s
	}

	#[test]
	fn set_data_sanitizes_levels_and_restarts() {
		let mut s = ForceGraphState::new(800.0, 600.0);
		s.set_data(&data());
		assert_eq!(s.data.links.len(), 2);
		assert_eq!(s.simulation.status(), SimulationStatus::Running);
		let levels: Vec<_> = s.simulation.nodes().iter().map(|n| n.level).collect();
		assert_eq!(levels, vec![Some(1), Some(0), Some(1)]);
	}

	#[test]
	fn converged_state_stops_redrawing() {
		let mut s = settled();
		s.frame(16.0);
		assert!(!s.frame(16.0));
		s.pointer_down(-1000.0, -1000.0);
		assert_eq!(s.cursor(), "move");
		assert!(s.frame(16.0));
	}

	#[test]
	fn highlight_centers_the_view() {
		let mut s = settled();
		s.highlight(Some("c"));
		assert_eq!(s.highlighted_index(), Some(2));
		let mut elapsed = 0.0;
		while elapsed < FOCUS_DURATION_MS {
			s.frame(16.0);
			elapsed += 16.0;
		}
		s.frame(16.0);
		let node = s.simulation.node(2).unwrap();
		let (sx, sy) = s.transform.graph_to_screen(node.x, node.y);
		assert!((sx - 400.0).abs() < 1e-6 && (sy - 300.0).abs() < 1e-6);
		assert_eq!(s.transform.k, 1.5);
		assert_eq!(s.node_at_position(400.0, 300.0), Some(2));
	}

	#[test]
	fn unknown_highlight_is_ignored() {
		let mut s = settled();
		let before = s.transform;
		s.highlight(Some("nope"));
		assert_eq!(s.highlighted_index(), None);
		s.frame(16.0);
		assert_eq!(s.transform, before);
	}

	#[test]
	fn unknown_highlight_keeps_the_current_one() {
		let mut s = settled();
		s.highlight(Some("c"));
		s.highlight(Some("nope"));
		assert_eq!(s.highlighted_index(), Some(2));
	}

	#[test]
	fn clearing_highlight_stops_the_camera() {
		let mut s = settled();
		s.highlight(Some("c"));
		s.frame(16.0);
		s.highlight(None);
		assert_eq!(s.highlighted_index(), None);
		let before = s.transform;
		for _ in 0..50 {
			s.frame(16.0);
		}
		assert_eq!(s.transform, before);
		assert!(s.transform.k < 1.5);
	}

	#[test]
	fn click_on_node_reports_its_id() {
		let mut s = settled();
		let node = s.simulation.node(0).unwrap();
		let (sx, sy) = s.transform.graph_to_screen(node.x, node.y);
		s.pointer_down(sx, sy);
		assert_eq!(s.cursor(), "grabbing");
		assert_eq!(s.pointer_up(), PointerOutcome::NodeClicked("a".into()));
		assert_eq!(s.cursor(), "grab");
		assert_eq!(s.simulation.status(), SimulationStatus::Running);
	}

	#[test]
	fn reload_drops_gesture_and_stale_highlight() {
		let mut s = settled();
		s.highlight(Some("c"));
		let node = s.simulation.node(0).unwrap();
		let (sx, sy) = s.transform.graph_to_screen(node.x, node.y);
		s.pointer_down(sx, sy);

		s.set_data(&GraphData {
			nodes: vec![GraphNode::new("a", "Alpha")],
			links: vec![],
		});
		assert_eq!(s.controller.dragged_node(), None);
		assert_eq!(s.highlighted_index(), None);
		assert_eq!(s.pointer_up(), PointerOutcome::Ignored);
	}

	#[test]
	fn teardown_stops_the_simulation() {
		let mut s = ForceGraphState::new(800.0, 600.0);
		s.set_data(&data());
		s.teardown();
		assert_eq!(s.simulation.status(), SimulationStatus::Stopped);
		s.frame(16.0);
		assert!(!s.frame(16.0));
	}
}
