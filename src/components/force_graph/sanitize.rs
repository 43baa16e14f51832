use std::collections::HashSet;
use std::fmt;

use log::warn;
use serde_json::{Map, Value};

use super::error::GraphError;
use super::types::{GraphData, GraphLink, GraphNode};

/// A non-fatal problem found while sanitizing. The offending entry has been dropped.
#[derive(Clone, Debug, PartialEq)]
pub enum SanitizeWarning {
	InvalidNode { index: usize },
	DuplicateNode { id: String },
	InvalidLink { index: usize },
	DanglingLink { source: String, target: String, missing: String },
}

impl fmt::Display for SanitizeWarning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SanitizeWarning::InvalidNode { index } => {
				write!(f, "dropping node #{index}: missing or empty id")
			}
			SanitizeWarning::DuplicateNode { id } => {
				write!(f, "dropping duplicate node `{id}`")
			}
			SanitizeWarning::InvalidLink { index } => {
				write!(f, "dropping link #{index}: source/target are not node ids")
			}
			SanitizeWarning::DanglingLink {
				source,
				target,
				missing,
			} => write!(
				f,
				"dropping link `{source}` -> `{target}`: node `{missing}` does not exist"
			),
		}
	}
}

/// A graph that passed sanitization, plus what was dropped on the way.
#[derive(Clone, Debug, Default)]
pub struct Sanitized {
	pub graph: GraphData,
	pub warnings: Vec<SanitizeWarning>,
}

impl Sanitized {
	fn report(self) -> Self {
		for w in &self.warnings {
			warn!("{w}");
		}
		self
	}
}

/// Filter typed graph data down to unique, non-empty node ids and links whose
/// endpoints both exist.
pub fn sanitize(data: GraphData) -> Sanitized {
	let mut warnings = Vec::new();
	let mut ids = HashSet::new();
	let mut nodes = Vec::with_capacity(data.nodes.len());

	for (index, node) in data.nodes.into_iter().enumerate() {
		if node.id.is_empty() {
			warnings.push(SanitizeWarning::InvalidNode { index });
		} else if !ids.insert(node.id.clone()) {
			warnings.push(SanitizeWarning::DuplicateNode { id: node.id });
		} else {
			nodes.push(node);
		}
	}

	let links = data
		.links
		.into_iter()
		.filter(|link| match dangling_endpoint(link, &ids) {
			Some(missing) => {
				warnings.push(SanitizeWarning::DanglingLink {
					source: link.source.clone(),
					target: link.target.clone(),
					missing,
				});
				false
			}
			None => true,
		})
		.collect();

	Sanitized {
		graph: GraphData { nodes, links },
		warnings,
	}
	.report()
}

/// Sanitize untrusted JSON, e.g. the output of a generation service.
///
/// Only a missing `nodes`/`links` array is fatal. Individual entries that do
/// not look like nodes or links are dropped with a warning.
pub fn sanitize_value(value: &Value) -> Result<Sanitized, GraphError> {
	let root = value.as_object().ok_or(GraphError::NotAnObject)?;
	let raw_nodes = root
		.get("nodes")
		.and_then(Value::as_array)
		.ok_or(GraphError::MissingArray("nodes"))?;
	let raw_links = root
		.get("links")
		.and_then(Value::as_array)
		.ok_or(GraphError::MissingArray("links"))?;

	let mut warnings = Vec::new();
	let mut nodes = Vec::with_capacity(raw_nodes.len());
	for (index, raw) in raw_nodes.iter().enumerate() {
		match node_from_value(raw) {
			Some(node) => nodes.push(node),
			None => warnings.push(SanitizeWarning::InvalidNode { index }),
		}
	}

	let mut links = Vec::with_capacity(raw_links.len());
	for (index, raw) in raw_links.iter().enumerate() {
		match link_from_value(raw) {
			Some(link) => links.push(link),
			None => warnings.push(SanitizeWarning::InvalidLink { index }),
		}
	}

	for w in &warnings {
		warn!("{w}");
	}
	let mut sanitized = sanitize(GraphData { nodes, links });
	warnings.append(&mut sanitized.warnings);
	sanitized.warnings = warnings;
	Ok(sanitized)
}

fn dangling_endpoint(link: &GraphLink, ids: &HashSet<String>) -> Option<String> {
	if !ids.contains(&link.source) {
		Some(link.source.clone())
	} else if !ids.contains(&link.target) {
		Some(link.target.clone())
	} else {
		None
	}
}

fn node_from_value(raw: &Value) -> Option<GraphNode> {
	let obj = raw.as_object()?;
	let id = obj.get("id")?.as_str().filter(|id| !id.is_empty())?;
	let label = obj.get("label").and_then(Value::as_str).unwrap_or(id);
	let node_type = obj.get("type").and_then(Value::as_str).unwrap_or_default();
	let properties = obj
		.get("properties")
		.and_then(Value::as_object)
		.cloned()
		.unwrap_or_else(Map::new);
	Some(GraphNode {
		node_type: node_type.to_string(),
		properties,
		..GraphNode::new(id, label)
	})
}

fn link_from_value(raw: &Value) -> Option<GraphLink> {
	let obj = raw.as_object()?;
	let source = obj.get("source")?.as_str()?;
	let target = obj.get("target")?.as_str()?;
	let label = obj.get("label").and_then(Value::as_str).unwrap_or_default();
	Some(GraphLink::new(source, target, label))
}
