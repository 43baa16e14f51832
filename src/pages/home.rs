use leptos::ev::MouseEvent;
use leptos::prelude::*;
use log::{error, info};
use serde_json::json;

use crate::components::force_graph::search::SearchState;
use crate::components::force_graph::{
	ForceGraphCanvas, GraphData, codec, export, merge, sanitize,
};
use crate::components::search_bar::SearchBar;

/// Built-in example so the page has something to explore before an import.
fn sample_graph() -> GraphData {
	let raw = json!({
		"nodes": [
			{ "id": "caesar", "label": "Julius Caesar", "type": "person",
				"properties": { "summary": "Roman general and statesman." } },
			{ "id": "gaul", "label": "Gaul", "type": "place",
				"properties": { "summary": "Region conquered in the Gallic Wars." } },
			{ "id": "gallic_wars", "label": "Gallic Wars", "type": "event",
				"properties": { "summary": "Campaigns of 58-50 BC." } },
			{ "id": "rubicon", "label": "Crossing the Rubicon", "type": "event",
				"properties": { "summary": "Start of the civil war, 49 BC." } },
			{ "id": "pompey", "label": "Pompey", "type": "person",
				"properties": { "summary": "Rival and former ally." } },
			{ "id": "crassus", "label": "Crassus", "type": "person",
				"properties": { "summary": "Member of the First Triumvirate." } },
			{ "id": "triumvirate", "label": "First Triumvirate", "type": "concept",
				"properties": { "summary": "Informal alliance of three politicians." } },
			{ "id": "cleopatra", "label": "Cleopatra", "type": "person",
				"properties": { "summary": "Ptolemaic queen of Egypt." } },
			{ "id": "egypt", "label": "Egypt", "type": "place",
				"properties": { "summary": "Ptolemaic kingdom." } },
			{ "id": "brutus", "label": "Brutus", "type": "person",
				"properties": { "summary": "One of the assassins." } },
			{ "id": "ides", "label": "Ides of March", "type": "event",
				"properties": { "summary": "Assassination, 44 BC." } },
			{ "id": "augustus", "label": "Augustus", "type": "person",
				"properties": { "summary": "Heir and first emperor." } },
			{ "id": "calendar", "label": "Julian calendar", "type": "concept",
				"properties": { "summary": "Calendar reform of 46 BC." } }
		],
		"links": [
			{ "source": "caesar", "target": "gallic_wars", "label": "led" },
			{ "source": "gallic_wars", "target": "gaul", "label": "fought in" },
			{ "source": "caesar", "target": "rubicon", "label": "crossed" },
			{ "source": "rubicon", "target": "pompey", "label": "provoked war with" },
			{ "source": "caesar", "target": "triumvirate", "label": "member of" },
			{ "source": "pompey", "target": "triumvirate", "label": "member of" },
			{ "source": "crassus", "target": "triumvirate", "label": "member of" },
			{ "source": "caesar", "target": "cleopatra", "label": "allied with" },
			{ "source": "cleopatra", "target": "egypt", "label": "ruled" },
			{ "source": "brutus", "target": "ides", "label": "conspired in" },
			{ "source": "ides", "target": "caesar", "label": "killed" },
			{ "source": "augustus", "target": "caesar", "label": "adopted by" },
			{ "source": "caesar", "target": "calendar", "label": "introduced" }
		]
	});
	sanitize::sanitize_value(&raw)
		.map(|s| s.graph)
		.unwrap_or_default()
}

fn save_text(filename: &str, mime: &str, contents: &str) {
	match export::download_text(filename, mime, contents) {
		Ok(()) => info!("saved {filename}"),
		Err(e) => error!("could not save {filename}: {e}"),
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let graph = RwSignal::new(sample_graph());
	let search = RwSignal::new(SearchState::default());
	let export_request = RwSignal::new(None::<String>);
	let import_text = RwSignal::new(String::new());
	let import_error = RwSignal::new(None::<String>);

	let data = Signal::derive(move || graph.get());
	let highlighted = Signal::derive(move || search.with(|s| s.highlighted.clone()));

	let on_node_click = Callback::new(move |id: String| {
		let node = graph.with_untracked(|g| g.node_index(&id).map(|i| g.nodes[i].clone()));
		if let Some(node) = node {
			search.update(|s| s.select(&node));
		}
	});

	let import = move |merge_into: bool| {
		match codec::from_json(&import_text.get_untracked()) {
			Ok(sanitized) => {
				let next = if merge_into {
					graph.with_untracked(|g| merge::merge(g, sanitized.graph).graph)
				} else {
					sanitized.graph
				};
				search.update(SearchState::clear);
				graph.set(next);
				import_error.set(None);
			}
			Err(e) => {
				error!("import failed: {e}");
				import_error.set(Some(e.to_string()));
			}
		}
	};

	let save_json = move |_: MouseEvent| {
		graph.with_untracked(|g| match codec::to_json(g) {
			Ok(text) => save_text("graph.json", "application/json", &text),
			Err(e) => error!("could not serialize graph: {e}"),
		})
	};
	let save_gml = move |_: MouseEvent| {
		graph.with_untracked(|g| save_text("graph.gml", "text/plain", &codec::to_gml(g)))
	};
	let save_graphml = move |_: MouseEvent| {
		graph.with_untracked(|g| {
			save_text("graph.graphml", "application/xml", &codec::to_graphml(g))
		})
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<ForceGraphCanvas
					data=data
					highlighted=highlighted
					on_node_click=on_node_click
					export_request=export_request
					fullscreen=true
				/>
				<div class="graph-overlay">
					<h1>"Graph Explorer"</h1>
					<p class="subtitle">"Drag nodes to reposition. Scroll to zoom. Drag background to pan."</p>
					<SearchBar search=search graph=graph />
					<div class="toolbar">
						<button on:click=move |_| export_request.set(Some("graph.png".into()))>"PNG"</button>
						<button on:click=save_json>"JSON"</button>
						<button on:click=save_gml>"GML"</button>
						<button on:click=save_graphml>"GraphML"</button>
					</div>
					<textarea
						placeholder="Paste graph JSON"
						prop:value=move || import_text.get()
						on:input=move |ev| import_text.set(event_target_value(&ev))
					/>
					<div class="toolbar">
						<button on:click=move |_| import(false)>"Load"</button>
						<button on:click=move |_| import(true)>"Merge"</button>
					</div>
					{move || import_error.get().map(|e| view! { <p class="error">{e}</p> })}
				</div>
			</div>
		</ErrorBoundary>
	}
}
