use leptos::prelude::*;

use crate::components::force_graph::GraphData;
use crate::components::force_graph::search::SearchState;

/// Query box with a suggestion list. Picking a suggestion highlights its node.
#[component]
pub fn SearchBar(search: RwSignal<SearchState>, graph: RwSignal<GraphData>) -> impl IntoView {
	let on_input = move |ev: leptos::ev::Event| {
		let value = event_target_value(&ev);
		graph.with_untracked(|g| search.update(|s| s.set_query(value, &g.nodes)));
	};

	let select = move |id: String| {
		let node = graph.with_untracked(|g| g.node_index(&id).map(|i| g.nodes[i].clone()));
		if let Some(node) = node {
			search.update(|s| s.select(&node));
		}
	};

	view! {
		<div class="search-bar">
			<input
				type="search"
				placeholder="Search nodes"
				prop:value=move || search.with(|s| s.query.clone())
				on:input=on_input
			/>
			<ul class="suggestions">
				{move || {
					search
						.with(|s| s.suggestions.clone())
						.into_iter()
						.map(|suggestion| {
							let id = suggestion.id;
							view! {
								<li on:click=move |_| select(id.clone())>{suggestion.label}</li>
							}
						})
						.collect_view()
				}}
			</ul>
		</div>
	}
}
