//! vis-surface: configuration and event-overlay layer for vis.js surfaces.
//!
//! Wraps a network or timeline renderer with option snapshots, entity
//! reconciliation, click disambiguation and orb badges drawn around nodes.
//! The browser backend binds the global `vis` library through wasm-bindgen;
//! the headless backend runs the same surfaces in memory.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::vis_surface::*;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("vis-surface: logging initialized");
}

/// Load graph data from a script element with id="graph-data".
/// Expected format: JSON with { nodes, edges, nodeOptions, edgeOptions }
fn load_graph_data() -> Option<NetworkData> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("graph-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<NetworkData>(&json_text) {
		Ok(data) => {
			info!(
				"vis-surface: loaded {} nodes, {} edges",
				data.nodes.as_ref().map_or(0, Vec::len),
				data.edges.as_ref().map_or(0, Vec::len)
			);
			Some(data)
		}
		Err(e) => {
			warn!("vis-surface: failed to parse graph data: {}", e);
			None
		}
	}
}

/// Main application component.
/// Loads graph data from the DOM and renders it in a graph container.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph_data = load_graph_data().unwrap_or_default();
	let graph_signal = Signal::derive(move || graph_data.clone());

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="vis-surface" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<VisGraph data=graph_signal />
		</div>
	}
}
