//! Text formats for moving graphs in and out of the app.

use super::error::GraphError;
use super::sanitize::{Sanitized, sanitize_value};
use super::types::GraphData;

/// Parse JSON text and run it through the sanitizer.
pub fn from_json(text: &str) -> Result<Sanitized, GraphError> {
	let value: serde_json::Value = serde_json::from_str(text)?;
	sanitize_value(&value)
}

pub fn to_json(data: &GraphData) -> Result<String, GraphError> {
	Ok(serde_json::to_string_pretty(data)?)
}

pub fn escape_xml(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&apos;"),
			c => out.push(c),
		}
	}
	out
}

/// GML strings cannot contain a raw `"`; it is written as an entity.
pub fn escape_gml(text: &str) -> String {
	text.replace('&', "&amp;").replace('"', "&quot;")
}

pub fn to_gml(data: &GraphData) -> String {
	let mut out = String::from("graph [\n  directed 0\n");
	for node in &data.nodes {
		out.push_str(&format!(
			"  node [\n    id \"{}\"\n    label \"{}\"\n    type \"{}\"\n  ]\n",
			escape_gml(&node.id),
			escape_gml(&node.label),
			escape_gml(&node.node_type),
		));
	}
	for link in &data.links {
		out.push_str(&format!(
			"  edge [\n    source \"{}\"\n    target \"{}\"\n    label \"{}\"\n  ]\n",
			escape_gml(&link.source),
			escape_gml(&link.target),
			escape_gml(&link.label),
		));
	}
	out.push_str("]\n");
	out
}

pub fn to_graphml(data: &GraphData) -> String {
	let mut out = String::from(concat!(
		"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
		"<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">\n",
		"  <key id=\"label\" for=\"node\" attr.name=\"label\" attr.type=\"string\"/>\n",
		"  <key id=\"type\" for=\"node\" attr.name=\"type\" attr.type=\"string\"/>\n",
		"  <key id=\"edge_label\" for=\"edge\" attr.name=\"label\" attr.type=\"string\"/>\n",
		"  <graph id=\"G\" edgedefault=\"undirected\">\n",
	));
	for node in &data.nodes {
		out.push_str(&format!(
			"    <node id=\"{}\"><data key=\"label\">{}</data><data key=\"type\">{}</data></node>\n",
			escape_xml(&node.id),
			escape_xml(&node.label),
			escape_xml(&node.node_type),
		));
	}
	for link in &data.links {
		out.push_str(&format!(
			"    <edge source=\"{}\" target=\"{}\"><data key=\"edge_label\">{}</data></edge>\n",
			escape_xml(&link.source),
			escape_xml(&link.target),
			escape_xml(&link.label),
		));
	}
	out.push_str("  </graph>\n</graphml>\n");
	out
}
