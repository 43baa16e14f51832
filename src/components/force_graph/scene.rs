//! A flat description of what is on screen, shared by the canvas renderer
//! and the image export so both draw the same picture.

use super::codec::escape_xml;
use super::interaction::ViewTransform;
use super::levels::level_color;
use super::state::{ForceGraphState, HIGHLIGHT_RADIUS, NODE_RADIUS};

pub const BACKGROUND: &str = "#1a1a2e";
pub const LINK_COLOR: &str = "rgba(100, 180, 255, 0.6)";
pub const LABEL_COLOR: &str = "rgba(255, 255, 255, 0.85)";
pub const NODE_STROKE: &str = "#ffffff";
pub const HIGHLIGHT_STROKE: &str = "#ffd700";

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

#[derive(Clone, Debug, PartialEq)]
pub struct SceneLink {
	pub x1: f64,
	pub y1: f64,
	pub x2: f64,
	pub y2: f64,
	pub label: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
	pub x: f64,
	pub y: f64,
	pub radius: f64,
	pub fill: &'static str,
	pub stroke: &'static str,
	pub stroke_width: f64,
	pub label: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
	pub width: f64,
	pub height: f64,
	pub transform: ViewTransform,
	/// Line widths and font sizes are divided by the zoom so they stay
	/// constant on screen.
	pub line_width: f64,
	pub font_size: f64,
	pub links: Vec<SceneLink>,
	/// In paint order; the highlighted node comes last.
	pub nodes: Vec<SceneNode>,
}

impl Scene {
	pub fn capture(state: &ForceGraphState) -> Self {
		let k = state.transform.k;
		let sim = &state.simulation;
		let highlighted = state.highlighted_index();

		let links = sim
			.links()
			.iter()
			.filter_map(|link| {
				let (s, t) = (sim.node(link.source)?, sim.node(link.target)?);
				Some(SceneLink {
					x1: s.x,
					y1: s.y,
					x2: t.x,
					y2: t.y,
					label: link.label.clone(),
				})
			})
			.collect();

		let mut nodes = Vec::with_capacity(sim.nodes().len());
		let mut top = None;
		for (i, node) in sim.nodes().iter().enumerate() {
			let label = state
				.data
				.nodes
				.get(i)
				.map_or_else(|| node.id.clone(), |n| n.label.clone());
			let is_highlighted = highlighted == Some(i);
			let scene_node = SceneNode {
				x: node.x,
				y: node.y,
				radius: if is_highlighted {
					HIGHLIGHT_RADIUS
				} else {
					NODE_RADIUS
				},
				fill: level_color(node.level),
				stroke: if is_highlighted {
					HIGHLIGHT_STROKE
				} else {
					NODE_STROKE
				},
				stroke_width: if is_highlighted { 4.0 / k } else { 1.5 / k },
				label,
			};
			if is_highlighted {
				top = Some(scene_node);
			} else {
				nodes.push(scene_node);
			}
		}
		nodes.extend(top);

		Self {
			width: state.width,
			height: state.height,
			transform: state.transform,
			line_width: 1.5 / k,
			font_size: 10.0 / k.max(0.5),
			links,
			nodes,
		}
	}

	pub fn to_svg(&self) -> String {
		let t = &self.transform;
		let mut out = format!(
			"<svg xmlns=\"{SVG_NS}\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
			w = self.width,
			h = self.height,
		);
		out.push_str(&format!(
			"<rect width=\"100%\" height=\"100%\" fill=\"{BACKGROUND}\"/>"
		));
		out.push_str(&format!(
			"<g transform=\"translate({:.3},{:.3}) scale({:.5})\">",
			t.x, t.y, t.k
		));

		out.push_str(&format!(
			"<g stroke=\"{LINK_COLOR}\" stroke-width=\"{:.3}\">",
			self.line_width
		));
		for link in &self.links {
			out.push_str(&format!(
				"<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\"/>",
				link.x1, link.y1, link.x2, link.y2
			));
		}
		out.push_str("</g>");

		let font = format!(
			"font-family=\"sans-serif\" font-size=\"{:.2}\" fill=\"{LABEL_COLOR}\"",
			self.font_size
		);
		for link in self.links.iter().filter(|l| !l.label.is_empty()) {
			out.push_str(&format!(
				"<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" {font}>{}</text>",
				(link.x1 + link.x2) / 2.0,
				(link.y1 + link.y2) / 2.0,
				escape_xml(&link.label)
			));
		}

		for node in &self.nodes {
			out.push_str(&format!(
				"<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{:.3}\"/>",
				node.x, node.y, node.radius, node.fill, node.stroke, node.stroke_width
			));
			out.push_str(&format!(
				"<text x=\"{:.2}\" y=\"{:.2}\" {font}>{}</text>",
				node.x + node.radius + 3.0,
				node.y + 3.0,
				escape_xml(&node.label)
			));
		}
		out.push_str("</g></svg>");
		out
	}
}
