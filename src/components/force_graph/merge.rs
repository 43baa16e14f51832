use std::collections::HashSet;

use super::sanitize::{Sanitized, sanitize};
use super::types::GraphData;

/// Fold an expansion into an existing graph.
///
/// Nodes are deduplicated by id (the existing node wins) and links by
/// `(source, target, label)`. The result is sanitized again, so expansion
/// links may point at nodes from either side.
pub fn merge(existing: &GraphData, incoming: GraphData) -> Sanitized {
	let mut ids: HashSet<&str> = existing.nodes.iter().map(|n| n.id.as_str()).collect();
	let mut nodes = existing.nodes.clone();
	for node in &incoming.nodes {
		if ids.insert(node.id.as_str()) {
			nodes.push(node.clone());
		}
	}

	let mut seen: HashSet<(&str, &str, &str)> = existing
		.links
		.iter()
		.map(|l| (l.source.as_str(), l.target.as_str(), l.label.as_str()))
		.collect();
	let mut links = existing.links.clone();
	for link in &incoming.links {
		if seen.insert((link.source.as_str(), link.target.as_str(), link.label.as_str())) {
			links.push(link.clone());
		}
	}

	sanitize(GraphData { nodes, links })
}
