//! Browser backend: vis.js through wasm-bindgen.
//!
//! vis.js must be loaded as the global `vis` before a surface is constructed;
//! [`WebBackend::capabilities`] probes for it at construction time.

mod canvas;
mod dom;
mod fetch;
mod render;
mod timer;
pub mod vis;

use std::rc::Rc;

use serde_json::Value;
use wasm_bindgen::JsValue;
use web_sys::Element;

use super::backend::{Backend, Capabilities};
use super::clicks::Scheduler;
use super::error::{Result, SurfaceError};

pub use canvas::CanvasContext;
pub use dom::{DomHost, DomSelect, DomToggle};
pub use fetch::HttpFetcher;
pub use render::{WebNetwork, WebStore, WebTimeline};
pub use timer::TimeoutScheduler;

use render::{pair, to_js};

/// [`Backend`] over the global vis.js library.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebBackend;

impl Backend for WebBackend {
	type Mount = Element;
	type Store = WebStore;
	type Network = WebNetwork;
	type Timeline = WebTimeline;

	fn capabilities(&self) -> Capabilities {
		vis::capabilities()
	}

	fn create_store(&self) -> WebStore {
		WebStore::new()
	}

	fn create_network(
		&self,
		mount: &Element,
		nodes: &WebStore,
		edges: &WebStore,
		options: &Value,
	) -> Result<WebNetwork> {
		let nodes: &JsValue = nodes.raw();
		let edges: &JsValue = edges.raw();
		let data = pair(("nodes", nodes), ("edges", edges));
		let network = vis::Network::new(mount, &data, &to_js(options))
			.map_err(|err| SurfaceError::Construction(format!("vis.Network: {:?}", err)))?;
		Ok(WebNetwork::new(network))
	}

	fn create_timeline(
		&self,
		mount: &Element,
		items: &WebStore,
		groups: &WebStore,
		options: &Value,
	) -> Result<WebTimeline> {
		let timeline = vis::Timeline::new(mount, items.raw(), groups.raw(), &to_js(options))
			.map_err(|err| SurfaceError::Construction(format!("vis.Timeline: {:?}", err)))?;
		Ok(WebTimeline::new(timeline))
	}

	fn scheduler(&self) -> Rc<dyn Scheduler> {
		Rc::new(TimeoutScheduler)
	}
}
