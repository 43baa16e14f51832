use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	pub id: String,
	pub label: String,
	#[serde(rename = "type", default)]
	pub node_type: String,
	/// Free-form attributes (summary, definition, source_context, references...)
	/// kept in insertion order.
	#[serde(default)]
	pub properties: Map<String, Value>,
}

impl GraphNode {
	pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			node_type: String::new(),
			properties: Map::new(),
		}
	}
}

/// Undirected relation between two node ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
	#[serde(default)]
	pub label: String,
}

impl GraphLink {
	pub fn new(source: impl Into<String>, target: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			label: label.into(),
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

impl GraphData {
	pub fn node_index(&self, id: &str) -> Option<usize> {
		self.nodes.iter().position(|n| n.id == id)
	}
}
