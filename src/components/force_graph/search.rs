use super::interaction::ViewTransform;
use super::types::GraphNode;

pub const MAX_SUGGESTIONS: usize = 10;
pub const FOCUS_DURATION_MS: f64 = 750.0;
/// Minimum zoom applied when centering on a highlighted node.
pub const FOCUS_SCALE: f64 = 1.5;

/// Nodes whose label contains `query` (case-insensitive), in input order.
/// A label equal to the query is treated as already chosen and left out.
pub fn suggestions<'a>(query: &str, nodes: &'a [GraphNode]) -> Vec<&'a GraphNode> {
	let q = query.to_lowercase();
	if q.is_empty() {
		return Vec::new();
	}
	nodes
		.iter()
		.filter(|n| {
			let label = n.label.to_lowercase();
			label != q && label.contains(&q)
		})
		.take(MAX_SUGGESTIONS)
		.collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct Suggestion {
	pub id: String,
	pub label: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchState {
	pub query: String,
	pub suggestions: Vec<Suggestion>,
	/// Id of the node currently highlighted.
	pub highlighted: Option<String>,
}

impl SearchState {
	/// Typing always drops the current highlight; an empty query also clears suggestions.
	pub fn set_query(&mut self, query: impl Into<String>, nodes: &[GraphNode]) {
		self.highlighted = None;
		self.query = query.into();
		self.suggestions = suggestions(&self.query, nodes)
			.into_iter()
			.map(|n| Suggestion {
				id: n.id.clone(),
				label: n.label.clone(),
			})
			.collect();
	}

	pub fn select(&mut self, node: &GraphNode) {
		self.query = node.label.clone();
		self.suggestions.clear();
		self.highlighted = Some(node.id.clone());
	}

	pub fn clear(&mut self) {
		*self = Self::default();
	}
}

fn ease_cubic_in_out(t: f64) -> f64 {
	if t < 0.5 {
		4.0 * t * t * t
	} else {
		1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
	}
}

/// View that centers `(gx, gy)` and zooms in to at least [`FOCUS_SCALE`].
pub fn focus_transform(gx: f64, gy: f64, current: &ViewTransform, width: f64, height: f64) -> ViewTransform {
	ViewTransform::centered_on(gx, gy, current.k.max(FOCUS_SCALE), width, height)
}

/// Animated move of the view between two transforms.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraTransition {
	from: ViewTransform,
	to: ViewTransform,
	elapsed_ms: f64,
	duration_ms: f64,
}

impl CameraTransition {
	pub fn new(from: ViewTransform, to: ViewTransform) -> Self {
		Self {
			from,
			to,
			elapsed_ms: 0.0,
			duration_ms: FOCUS_DURATION_MS,
		}
	}

	pub fn advance(&mut self, dt_ms: f64) -> ViewTransform {
		self.elapsed_ms = (self.elapsed_ms + dt_ms.max(0.0)).min(self.duration_ms);
		if self.is_finished() {
			return self.to;
		}
		self.from
			.lerp(&self.to, ease_cubic_in_out(self.elapsed_ms / self.duration_ms))
	}

	pub fn is_finished(&self) -> bool {
		self.elapsed_ms >= self.duration_ms
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn nodes(labels: &[&str]) -> Vec<GraphNode> {
		labels
			.iter()
			.enumerate()
			.map(|(i, l)| GraphNode::new(format!("n{i}"), *l))
			.collect()
	}

	#[test]
	fn caps_and_excludes_exact_match() {
		let list = nodes(&[
			"Caesar", "Gaul", "Cleopatra", "Caesarea", "CA", "Capua", "Carthage", "Cannae",
			"Cato", "Catiline", "Casca", "Cassius", "Calpurnia", "Camillus",
		]);
		let found: Vec<_> = suggestions("Ca", &list).iter().map(|n| n.label.as_str()).collect();
		assert_eq!(
			found,
			vec![
				"Caesar", "Caesarea", "Capua", "Carthage", "Cannae", "Cato", "Catiline", "Casca",
				"Cassius", "Calpurnia"
			]
		);
	}

	#[test]
	fn matching_is_case_insensitive_substring() {
		let list = nodes(&["Julius Caesar", "Gaul", "Pompey"]);
		let found: Vec<_> = suggestions("CAES", &list).iter().map(|n| n.id.as_str()).collect();
		assert_eq!(found, vec!["n0"]);
		assert!(suggestions("", &list).is_empty());
	}

	#[test]
	fn select_then_type_clears_highlight() {
		let list = nodes(&["Caesar", "Caesarea"]);
		let mut search = SearchState::default();
		search.set_query("caes", &list);
		assert_eq!(search.suggestions.len(), 2);

		search.select(&list[1]);
		assert_eq!(search.query, "Caesarea");
		assert!(search.suggestions.is_empty());
		assert_eq!(search.highlighted.as_deref(), Some("n1"));

		search.set_query("Caesare", &list);
		assert_eq!(search.highlighted, None);
		assert_eq!(search.suggestions.len(), 1);

		search.set_query("", &list);
		assert_eq!(search, SearchState::default());
	}

	#[test]
	fn camera_eases_to_focus() {
		let from = ViewTransform::default();
		let to = focus_transform(100.0, 50.0, &from, 800.0, 600.0);
		assert_eq!(to, ViewTransform { x: 250.0, y: 225.0, k: 1.5 });

		let mut cam = CameraTransition::new(from, to);
		let mid = cam.advance(FOCUS_DURATION_MS / 2.0);
		assert!((mid.k - 1.25).abs() < 1e-9);
		assert!(!cam.is_finished());
		assert_eq!(cam.advance(FOCUS_DURATION_MS), to);
		assert!(cam.is_finished());
	}

	#[test]
	fn focus_keeps_deeper_zoom() {
		let current = ViewTransform { x: 0.0, y: 0.0, k: 4.0 };
		assert_eq!(focus_transform(0.0, 0.0, &current, 100.0, 100.0).k, 4.0);
	}
}
