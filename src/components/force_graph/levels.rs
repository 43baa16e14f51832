use std::collections::{HashMap, VecDeque};

use super::types::GraphData;

/// Category palette used for depth banding.
pub const PALETTE: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

pub const DEFAULT_NODE_COLOR: &str = "#999999";

pub fn level_color(level: Option<u32>) -> &'static str {
	match level {
		Some(l) => PALETTE[l as usize % PALETTE.len()],
		None => DEFAULT_NODE_COLOR,
	}
}

/// Assign every node a BFS depth, indexed like `data.nodes`.
///
/// The first BFS starts from the highest-degree node (first one in input
/// order on ties). Nodes left unvisited then start their own BFS, again in
/// input order. Expects sanitized data; links to unknown ids are ignored.
pub fn assign_levels(data: &GraphData) -> Vec<Option<u32>> {
	let n = data.nodes.len();
	let index: HashMap<&str, usize> = data
		.nodes
		.iter()
		.enumerate()
		.map(|(i, node)| (node.id.as_str(), i))
		.collect();

	let mut adjacency = vec![Vec::new(); n];
	for link in &data.links {
		let (Some(&s), Some(&t)) = (
			index.get(link.source.as_str()),
			index.get(link.target.as_str()),
		) else {
			continue;
		};
		// a self-loop lands in its own list twice, so it counts twice toward degree
		adjacency[s].push(t);
		adjacency[t].push(s);
	}

	let mut levels = vec![None; n];
	let Some(root) = global_root(&adjacency) else {
		return levels;
	};
	bfs(root, &adjacency, &mut levels);
	for local_root in 0..n {
		if levels[local_root].is_none() {
			bfs(local_root, &adjacency, &mut levels);
		}
	}
	levels
}

fn global_root(adjacency: &[Vec<usize>]) -> Option<usize> {
	let mut best: Option<(usize, usize)> = None;
	for (i, neighbors) in adjacency.iter().enumerate() {
		let degree = neighbors.len();
		// strict comparison keeps the earliest node on ties
		if best.is_none_or(|(_, d)| degree > d) {
			best = Some((i, degree));
		}
	}
	best.map(|(i, _)| i)
}

fn bfs(root: usize, adjacency: &[Vec<usize>], levels: &mut [Option<u32>]) {
	let mut queue = VecDeque::from([root]);
	levels[root] = Some(0);
	while let Some(current) = queue.pop_front() {
		let next = levels[current].map_or(0, |l| l + 1);
		for &neighbor in &adjacency[current] {
			if levels[neighbor].is_none() {
				levels[neighbor] = Some(next);
				queue.push_back(neighbor);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::components::force_graph::types::{GraphLink, GraphNode};

	fn graph(ids: &[&str], links: &[(&str, &str)]) -> GraphData {
		GraphData {
			nodes: ids.iter().map(|id| GraphNode::new(*id, *id)).collect(),
			links: links
				.iter()
				.map(|(s, t)| GraphLink::new(*s, *t, ""))
				.collect(),
		}
	}

	#[test]
	fn four_cycle_roots_at_first_node() {
		let g = graph(
			&["A", "B", "C", "D"],
			&[("A", "B"), ("B", "C"), ("C", "D"), ("A", "D")],
		);
		assert_eq!(
			assign_levels(&g),
			vec![Some(0), Some(1), Some(2), Some(1)]
		);
	}

	#[test]
	fn root_is_highest_degree() {
		let g = graph(&["A", "B", "C", "D"], &[("A", "B"), ("C", "B"), ("D", "B")]);
		assert_eq!(
			assign_levels(&g),
			vec![Some(1), Some(0), Some(1), Some(1)]
		);
	}

	#[test]
	fn self_loops_count_twice() {
		// C has a single neighbor plus a self-loop: degree 3 beats A's 2
		let g = graph(&["A", "B", "C"], &[("A", "B"), ("A", "C"), ("C", "C")]);
		assert_eq!(assign_levels(&g), vec![Some(1), Some(2), Some(0)]);
	}

	#[test]
	fn disconnected_components_level_independently() {
		let g = graph(&["A", "B", "C", "D"], &[("A", "B"), ("C", "D")]);
		assert_eq!(
			assign_levels(&g),
			vec![Some(0), Some(1), Some(0), Some(1)]
		);
	}

	#[test]
	fn isolated_nodes_become_roots() {
		let g = graph(&["A", "B", "C"], &[("B", "C")]);
		assert_eq!(assign_levels(&g), vec![Some(0), Some(0), Some(1)]);
	}

	#[test]
	fn links_never_span_more_than_one_level() {
		let g = graph(
			&["a", "b", "c", "d", "e", "f", "g", "h"],
			&[
				("a", "b"),
				("b", "c"),
				("c", "d"),
				("d", "e"),
				("e", "a"),
				("c", "f"),
				("f", "g"),
				("g", "h"),
				("h", "c"),
				("b", "g"),
			],
		);
		let levels = assign_levels(&g);
		for link in &g.links {
			let s = levels[g.node_index(&link.source).unwrap()].unwrap() as i64;
			let t = levels[g.node_index(&link.target).unwrap()].unwrap() as i64;
			assert!((s - t).abs() <= 1, "{} -> {}", link.source, link.target);
		}
	}

	#[test]
	fn colors_wrap_around_the_palette() {
		assert_eq!(level_color(Some(0)), PALETTE[0]);
		assert_eq!(level_color(Some(PALETTE.len() as u32 + 2)), PALETTE[2]);
		assert_eq!(level_color(None), DEFAULT_NODE_COLOR);
	}

	#[test]
	fn empty_graph_has_no_levels() {
		assert!(assign_levels(&GraphData::default()).is_empty());
	}
}

#[cfg(test)]
mod proptests {
	use proptest::prelude::*;

	use super::*;
	use crate::components::force_graph::types::{GraphLink, GraphNode};

	fn arb_graph() -> impl Strategy<Value = GraphData> {
		(1usize..12).prop_flat_map(|n| {
			prop::collection::vec((0..n, 0..n), 0..24).prop_map(move |edges| GraphData {
				nodes: (0..n)
					.map(|i| GraphNode::new(format!("n{i}"), format!("n{i}")))
					.collect(),
				links: edges
					.into_iter()
					.map(|(s, t)| GraphLink::new(format!("n{s}"), format!("n{t}"), ""))
					.collect(),
			})
		})
	}

	proptest! {
		#![proptest_config(ProptestConfig::with_cases(200))]

		#[test]
		fn levels_are_bfs_layers(g in arb_graph()) {
			let levels = assign_levels(&g);
			prop_assert_eq!(levels.len(), g.nodes.len());
			prop_assert!(levels.iter().all(Option::is_some));
			let level = |id: &str| g.node_index(id).and_then(|i| levels[i]);

			for link in &g.links {
				let (s, t) = (level(&link.source), level(&link.target));
				prop_assert!(s.zip(t).is_some_and(|(s, t)| s.abs_diff(t) <= 1));
			}

			for (node, l) in g.nodes.iter().zip(&levels) {
				let Some(l) = *l else { continue };
				if l == 0 {
					continue;
				}
				let has_parent = g.links.iter().any(|link| {
					let other = if link.source == node.id {
						&link.target
					} else if link.target == node.id {
						&link.source
					} else {
						return false;
					};
					level(other) == Some(l - 1)
				});
				prop_assert!(has_parent, "{} at level {} has no parent", node.id, l);
			}
		}

		#[test]
		fn first_highest_degree_node_is_a_root(g in arb_graph()) {
			let mut degree = vec![0usize; g.nodes.len()];
			for link in &g.links {
				for end in [&link.source, &link.target] {
					if let Some(i) = g.node_index(end) {
						degree[i] += 1;
					}
				}
			}
			let max = degree.iter().copied().max().unwrap_or(0);
			let root = degree.iter().position(|&d| d == max).unwrap();
			prop_assert_eq!(assign_levels(&g)[root], Some(0));
		}
	}
}
