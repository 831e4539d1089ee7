//! Leptos component hosting a graph container.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use web_sys::Element;

use super::backend::Backend;
use super::graph::{DEFAULT_TEMPLATE_URI, GraphConfig, GraphManager, TemplateHost};
use super::types::NetworkData;
use super::web::{DomHost, HttpFetcher, WebBackend};

type WebGraph = GraphManager<WebBackend, DomHost>;

/// Binds a graph container into a `div` and keeps it in sync with `data`.
///
/// The first run binds the container; once bound, every change of `data` is
/// reconciled into the network. Changes arriving while a remote template is
/// still loading are held, and the latest one is pushed when binding
/// completes. `template_uri` defaults to the built-in template, `styling`
/// selects a `<styling>-style` class on its root.
#[component]
pub fn VisGraph(
	#[prop(into)] data: Signal<NetworkData>,
	#[prop(optional, into)] template_uri: Option<String>,
	#[prop(optional, into)] styling: Option<String>,
) -> impl IntoView {
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let graph: Rc<RefCell<Option<WebGraph>>> = Rc::new(RefCell::new(None));
	let latest = Rc::new(RefCell::new(NetworkData::default()));

	Effect::new(move |_| {
		let Some(container) = container_ref.get() else {
			return;
		};
		let data = data.get();

		if let Some(ref bound) = *graph.borrow() {
			forward(bound, &latest, data);
			return;
		}
		*latest.borrow_mut() = data;

		let container: Element = container.into();
		let config = GraphConfig {
			template_uri: template_uri
				.clone()
				.unwrap_or_else(|| DEFAULT_TEMPLATE_URI.to_string()),
			..GraphConfig::default()
		};
		let styling = styling.clone();
		let pending = latest.clone();
		let bound = GraphManager::bind(
			WebBackend,
			DomHost::new(container),
			config,
			&HttpFetcher,
			move |manager: &WebGraph| {
				if let Some(styling) = &styling {
					if let Err(err) = manager.set_styling(styling) {
						warn!("vis-surface: {}", err);
					}
				}
				flush(manager, &pending);
			},
			|err| warn!("vis-surface: {}", err),
		);
		*graph.borrow_mut() = Some(bound);
	});

	view! {
		<div node_ref=container_ref class="vis-graph-container" style="width: 100%; height: 100%;" />
	}
}

/// Records `data` as the latest and pushes it once the container is bound.
fn forward<B, H>(graph: &GraphManager<B, H>, latest: &RefCell<NetworkData>, data: NetworkData)
where
	B: Backend + 'static,
	H: TemplateHost<Mount = B::Mount> + 'static,
{
	*latest.borrow_mut() = data;
	if graph.is_bound() {
		flush(graph, latest);
	} else {
		debug!("vis-surface: graph template still loading, holding data");
	}
}

fn flush<B, H>(graph: &GraphManager<B, H>, latest: &RefCell<NetworkData>)
where
	B: Backend + 'static,
	H: TemplateHost<Mount = B::Mount> + 'static,
{
	let data = latest.borrow().clone();
	if let Err(err) = graph.set_data(Some(data)) {
		warn!("vis-surface: {}", err);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::vis_surface::headless::{MemoryHost, StaticTemplates};
	use crate::components::vis_surface::{
		DEFAULT_TEMPLATE, Entity, EntityId, EntityStore, MemoryBackend,
	};

	fn nodes(ids: &[i64]) -> NetworkData {
		NetworkData {
			nodes: Some(ids.iter().map(|id| Entity::new(*id)).collect()),
			..Default::default()
		}
	}

	#[test]
	fn data_changed_during_the_fetch_is_pushed_on_bind() {
		let fetcher = StaticTemplates::new().with("remote.html", DEFAULT_TEMPLATE);
		let latest = Rc::new(RefCell::new(nodes(&[1])));
		let pending = latest.clone();
		let graph = GraphManager::bind(
			MemoryBackend::new(),
			MemoryHost::new(),
			GraphConfig {
				template_uri: "remote.html".into(),
				..GraphConfig::default()
			},
			&fetcher,
			move |manager: &GraphManager<MemoryBackend, MemoryHost>| flush(manager, &pending),
			|err| panic!("unexpected failure: {err}"),
		);

		forward(&graph, &latest, nodes(&[2, 3]));
		assert!(!graph.is_bound());

		fetcher.complete_all();
		let network = graph.network().expect("bound after fetch");
		assert_eq!(network.nodes().ids(), vec![EntityId::Int(2), EntityId::Int(3)]);

		forward(&graph, &latest, nodes(&[3]));
		assert_eq!(network.nodes().ids(), vec![EntityId::Int(3)]);
	}
}
