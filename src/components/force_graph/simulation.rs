//! Force-directed layout: link springs, many-body repulsion, centering and
//! collision, cooled by a decaying `alpha`.

use std::collections::HashMap;
use std::f64::consts::PI;

use log::debug;

use super::types::GraphData;

/// Below this alpha (with no target holding it up) the layout counts as cooling.
pub const COOLING_ALPHA: f64 = 0.1;

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
	pub link_distance: f64,
	/// Negative repels.
	pub charge_strength: f64,
	pub center_strength: f64,
	pub collision_radius: f64,
	pub collision_strength: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	pub velocity_decay: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			link_distance: 150.0,
			charge_strength: -400.0,
			center_strength: 0.1,
			collision_radius: 30.0,
			collision_strength: 1.0,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			velocity_decay: 0.4,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeNode {
	pub id: String,
	pub level: Option<u32>,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// While set, the node sits here and ignores forces.
	pub pin: Option<(f64, f64)>,
}

/// Link endpoints are indices into the simulation's node arena.
#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeLink {
	pub source: usize,
	pub target: usize,
	pub label: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationStatus {
	Stopped,
	Running,
	Cooling,
	Converged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
	/// Positions changed; the scene needs redrawing.
	Advanced,
	Idle,
}

pub struct Simulation {
	nodes: Vec<RuntimeNode>,
	links: Vec<RuntimeLink>,
	index: HashMap<String, usize>,
	config: SimulationConfig,
	center: (f64, f64),
	alpha: f64,
	alpha_target: f64,
	status: SimulationStatus,
}

impl Simulation {
	/// Build a stopped simulation for sanitized `data`. `levels` is indexed like `data.nodes`.
	pub fn new(
		data: &GraphData,
		levels: &[Option<u32>],
		center: (f64, f64),
		config: SimulationConfig,
	) -> Self {
		let golden_angle = PI * (3.0 - 5f64.sqrt());
		let nodes: Vec<RuntimeNode> = data
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				let (radius, angle) = (10.0 * (0.5 + i as f64).sqrt(), i as f64 * golden_angle);
				RuntimeNode {
					id: node.id.clone(),
					level: levels.get(i).copied().flatten(),
					x: center.0 + radius * angle.cos(),
					y: center.1 + radius * angle.sin(),
					vx: 0.0,
					vy: 0.0,
					pin: None,
				}
			})
			.collect();
		let index: HashMap<String, usize> = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), i))
			.collect();
		let links = data
			.links
			.iter()
			.filter_map(|link| {
				Some(RuntimeLink {
					source: *index.get(&link.source)?,
					target: *index.get(&link.target)?,
					label: link.label.clone(),
				})
			})
			.collect();

		Self {
			nodes,
			links,
			index,
			config,
			center,
			alpha: 1.0,
			alpha_target: 0.0,
			status: SimulationStatus::Stopped,
		}
	}

	pub fn empty() -> Self {
		Self::new(
			&GraphData::default(),
			&[],
			(0.0, 0.0),
			SimulationConfig::default(),
		)
	}

	pub fn nodes(&self) -> &[RuntimeNode] {
		&self.nodes
	}

	pub fn links(&self) -> &[RuntimeLink] {
		&self.links
	}

	pub fn node(&self, idx: usize) -> Option<&RuntimeNode> {
		self.nodes.get(idx)
	}

	pub fn find(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn status(&self) -> SimulationStatus {
		self.status
	}

	pub fn start(&mut self) {
		self.restart();
	}

	/// Resume ticking from the current alpha.
	pub fn restart(&mut self) {
		self.status = SimulationStatus::Running;
	}

	pub fn stop(&mut self) {
		if self.status != SimulationStatus::Stopped {
			debug!("stopping simulation ({} nodes)", self.nodes.len());
		}
		self.status = SimulationStatus::Stopped;
	}

	/// Raise alpha to at least `alpha` and restart.
	pub fn reheat(&mut self, alpha: f64) {
		self.alpha = self.alpha.max(alpha);
		self.restart();
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	pub fn set_center(&mut self, x: f64, y: f64) {
		self.center = (x, y);
	}

	/// Pin a node at `(x, y)`. The rendered position follows immediately.
	pub fn pin(&mut self, idx: usize, x: f64, y: f64) -> bool {
		let Some(node) = self.nodes.get_mut(idx) else {
			return false;
		};
		node.pin = Some((x, y));
		node.x = x;
		node.y = y;
		node.vx = 0.0;
		node.vy = 0.0;
		true
	}

	pub fn unpin(&mut self, idx: usize) -> bool {
		match self.nodes.get_mut(idx) {
			Some(node) => {
				node.pin = None;
				true
			}
			None => false,
		}
	}

	pub fn tick(&mut self) -> TickOutcome {
		if matches!(
			self.status,
			SimulationStatus::Stopped | SimulationStatus::Converged
		) {
			return TickOutcome::Idle;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		self.nodes = step(
			&self.nodes,
			&self.links,
			self.alpha,
			self.center,
			&self.config,
		);
		self.status = if self.alpha < self.config.alpha_min {
			SimulationStatus::Converged
		} else if self.alpha_target > 0.0 || self.alpha >= COOLING_ALPHA {
			SimulationStatus::Running
		} else {
			SimulationStatus::Cooling
		};
		TickOutcome::Advanced
	}
}

/// One integration step. Every force reads `nodes` as left by the previous
/// step; the per-node velocity deltas are summed and applied afterwards.
pub fn step(
	nodes: &[RuntimeNode],
	links: &[RuntimeLink],
	alpha: f64,
	center: (f64, f64),
	config: &SimulationConfig,
) -> Vec<RuntimeNode> {
	let mut dv = vec![(0.0, 0.0); nodes.len()];
	link_force(nodes, links, alpha, config, &mut dv);
	many_body_force(nodes, alpha, config, &mut dv);
	center_force(nodes, center, config, &mut dv);
	collision_force(nodes, config, &mut dv);

	let keep = 1.0 - config.velocity_decay;
	nodes
		.iter()
		.zip(dv)
		.map(|(node, (dvx, dvy))| {
			let mut next = node.clone();
			match node.pin {
				Some((fx, fy)) => {
					next.x = fx;
					next.y = fy;
					next.vx = 0.0;
					next.vy = 0.0;
				}
				None => {
					let (vx, vy) = (node.vx + dvx, node.vy + dvy);
					next.x = node.x + vx;
					next.y = node.y + vy;
					next.vx = vx * keep;
					next.vy = vy * keep;
				}
			}
			next
		})
		.collect()
}

fn link_force(
	nodes: &[RuntimeNode],
	links: &[RuntimeLink],
	alpha: f64,
	config: &SimulationConfig,
	dv: &mut [(f64, f64)],
) {
	let mut count = vec![0usize; nodes.len()];
	for link in links {
		count[link.source] += 1;
		count[link.target] += 1;
	}

	for (i, link) in links.iter().enumerate() {
		if link.source == link.target {
			continue;
		}
		let (s, t) = (&nodes[link.source], &nodes[link.target]);
		let (cs, ct) = (count[link.source] as f64, count[link.target] as f64);
		let strength = 1.0 / cs.min(ct);
		let bias = cs / (cs + ct);

		let mut x = t.x + t.vx - s.x - s.vx;
		let mut y = t.y + t.vy - s.y - s.vy;
		if x == 0.0 && y == 0.0 {
			x = jiggle(i);
			y = jiggle(i + 1);
		}
		let l = (x * x + y * y).sqrt();
		let k = (l - config.link_distance) / l * alpha * strength;
		x *= k;
		y *= k;
		dv[link.target].0 -= x * bias;
		dv[link.target].1 -= y * bias;
		dv[link.source].0 += x * (1.0 - bias);
		dv[link.source].1 += y * (1.0 - bias);
	}
}

fn many_body_force(
	nodes: &[RuntimeNode],
	alpha: f64,
	config: &SimulationConfig,
	dv: &mut [(f64, f64)],
) {
	if config.charge_strength == 0.0 {
		return;
	}
	for i in 0..nodes.len() {
		for j in (i + 1)..nodes.len() {
			let mut dx = nodes[j].x - nodes[i].x;
			let mut dy = nodes[j].y - nodes[i].y;
			if dx == 0.0 && dy == 0.0 {
				dx = jiggle(i + j);
				dy = jiggle(i + j + 1);
			}
			let mut l = dx * dx + dy * dy;
			if l < 1.0 {
				l = l.sqrt();
			}
			let w = config.charge_strength * alpha / l;
			dv[i].0 += dx * w;
			dv[i].1 += dy * w;
			dv[j].0 -= dx * w;
			dv[j].1 -= dy * w;
		}
	}
}

fn center_force(
	nodes: &[RuntimeNode],
	center: (f64, f64),
	config: &SimulationConfig,
	dv: &mut [(f64, f64)],
) {
	if nodes.is_empty() || config.center_strength == 0.0 {
		return;
	}
	let n = nodes.len() as f64;
	let mx = nodes.iter().map(|node| node.x).sum::<f64>() / n;
	let my = nodes.iter().map(|node| node.y).sum::<f64>() / n;
	let (sx, sy) = (
		(center.0 - mx) * config.center_strength,
		(center.1 - my) * config.center_strength,
	);
	for d in dv.iter_mut() {
		d.0 += sx;
		d.1 += sy;
	}
}

fn collision_force(nodes: &[RuntimeNode], config: &SimulationConfig, dv: &mut [(f64, f64)]) {
	if config.collision_radius <= 0.0 {
		return;
	}
	let r = config.collision_radius * 2.0;
	for i in 0..nodes.len() {
		for j in (i + 1)..nodes.len() {
			let (a, b) = (&nodes[i], &nodes[j]);
			let mut dx = (a.x + a.vx) - (b.x + b.vx);
			let mut dy = (a.y + a.vy) - (b.y + b.vy);
			let mut l2 = dx * dx + dy * dy;
			if l2 >= r * r {
				continue;
			}
			if l2 == 0.0 {
				dx = jiggle(i + j);
				dy = jiggle(i + j + 1);
				l2 = dx * dx + dy * dy;
			}
			let l = l2.sqrt();
			let k = (r - l) / l * config.collision_strength * 0.5;
			dv[i].0 += dx * k;
			dv[i].1 += dy * k;
			dv[j].0 -= dx * k;
			dv[j].1 -= dy * k;
		}
	}
}

/// Tiny deterministic offset used to separate coincident points.
fn jiggle(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64 / 233280.0 - 0.5) * 1e-6
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{GraphLink, GraphNode};

	fn sim(ids: &[&str], links: &[(&str, &str)], config: SimulationConfig) -> Simulation {
		let data = GraphData {
			nodes: ids.iter().map(|id| GraphNode::new(*id, *id)).collect(),
			links: links
				.iter()
				.map(|(s, t)| GraphLink::new(*s, *t, ""))
				.collect(),
		};
		let mut s = Simulation::new(&data, &[], (400.0, 300.0), config);
		s.start();
		s
	}

	fn distance(s: &Simulation, a: usize, b: usize) -> f64 {
		let (a, b) = (s.node(a).unwrap(), s.node(b).unwrap());
		((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
	}

	#[test]
	fn starts_stopped_and_idles() {
		let data = GraphData {
			nodes: vec![GraphNode::new("a", "a")],
			links: vec![],
		};
		let mut s = Simulation::new(&data, &[Some(0)], (0.0, 0.0), SimulationConfig::default());
		assert_eq!(s.status(), SimulationStatus::Stopped);
		assert_eq!(s.tick(), TickOutcome::Idle);
		assert_eq!(s.node(0).unwrap().level, Some(0));
	}

	#[test]
	fn cools_then_converges() {
		let mut s = sim(&["a", "b", "c"], &[("a", "b"), ("b", "c")], SimulationConfig::default());
		assert_eq!(s.tick(), TickOutcome::Advanced);
		assert_eq!(s.status(), SimulationStatus::Running);
		let mut saw_cooling = false;
		for _ in 0..400 {
			s.tick();
			saw_cooling |= s.status() == SimulationStatus::Cooling;
		}
		assert!(saw_cooling);
		assert_eq!(s.status(), SimulationStatus::Converged);
		assert_eq!(s.tick(), TickOutcome::Idle);

		s.reheat(0.3);
		assert_eq!(s.status(), SimulationStatus::Running);
		assert_eq!(s.tick(), TickOutcome::Advanced);
	}

	#[test]
	fn alpha_target_keeps_it_running() {
		let mut s = sim(&["a", "b"], &[("a", "b")], SimulationConfig::default());
		s.set_alpha_target(0.3);
		for _ in 0..1000 {
			s.tick();
		}
		assert_eq!(s.status(), SimulationStatus::Running);
		assert!((s.alpha() - 0.3).abs() < 0.01);
	}

	#[test]
	fn linked_pair_settles_near_link_distance() {
		let mut s = sim(&["a", "b"], &[("a", "b")], SimulationConfig::default());
		for _ in 0..400 {
			s.tick();
		}
		let d = distance(&s, 0, 1);
		assert!(d > 120.0 && d < 200.0, "distance {d}");
	}

	#[test]
	fn unlinked_nodes_repel() {
		let mut s = sim(&["a", "b"], &[], SimulationConfig::default());
		let before = distance(&s, 0, 1);
		for _ in 0..20 {
			s.tick();
		}
		assert!(distance(&s, 0, 1) > before);
	}

	#[test]
	fn collision_separates_overlapping_nodes() {
		let config = SimulationConfig {
			charge_strength: 0.0,
			center_strength: 0.0,
			..SimulationConfig::default()
		};
		let mut s = sim(&["a", "b"], &[], config);
		for _ in 0..50 {
			s.tick();
		}
		assert!(distance(&s, 0, 1) >= 60.0 - 1e-6);
	}

	#[test]
	fn pinned_node_holds_position_but_pushes_others() {
		let mut s = sim(&["a", "b"], &[("a", "b")], SimulationConfig::default());
		let b_start = (s.node(1).unwrap().x, s.node(1).unwrap().y);
		assert!(s.pin(0, 10.0, 20.0));
		for _ in 0..30 {
			s.tick();
			let a = s.node(0).unwrap();
			assert_eq!((a.x, a.y), (10.0, 20.0));
		}
		let b = s.node(1).unwrap();
		assert_ne!((b.x, b.y), b_start);

		assert!(s.unpin(0));
		assert_eq!(s.node(0).unwrap().pin, None);
		assert!(!s.pin(7, 0.0, 0.0));
	}

	#[test]
	fn step_reads_only_the_previous_state() {
		let s = sim(&["a", "b", "c"], &[("a", "b")], SimulationConfig::default());
		let config = SimulationConfig::default();
		let first = step(s.nodes(), s.links(), 0.5, (400.0, 300.0), &config);
		let second = step(s.nodes(), s.links(), 0.5, (400.0, 300.0), &config);
		assert_eq!(first, second);
	}

	#[test]
	fn self_loops_and_coincident_nodes_stay_finite() {
		let mut s = sim(&["a", "b"], &[("a", "a"), ("a", "b")], SimulationConfig::default());
		s.pin(0, 0.0, 0.0);
		s.pin(1, 0.0, 0.0);
		s.unpin(1);
		for _ in 0..10 {
			s.tick();
		}
		for n in s.nodes() {
			assert!(n.x.is_finite() && n.y.is_finite());
		}
	}
}
