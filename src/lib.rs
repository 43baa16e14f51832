//! Leptos client-side app wiring and routes.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

mod components;
mod pages;

use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize browser console logging and the panic hook.
///
/// Debug builds log simulation lifecycle events; release builds stop at `info`.
pub fn init_logging() {
	let level = if cfg!(debug_assertions) {
		Level::Debug
	} else {
		Level::Info
	};
	if console_log::init_with_level(level).is_err() {
		return;
	}
	console_error_panic_hook::set_once();
	info!("graph explorer starting (log level {level})");
}

/// An app router which renders the graph explorer and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />

		// sets the document title
		<Title text="Graph Explorer" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
