//! Graph container: a network surface plus physics and layout controls,
//! instantiated from an HTML template.
//!
//! The template is resolved from a cache, the built-in markup, or a fetch, and
//! inserted into a [`TemplateHost`]. Binding then looks for exactly one
//! renderer mount and, optionally, one physics toggle and one layout selector.
//! Problems with the template are reported through the failure callback; a
//! missing control does not stop the network from binding.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::{info, warn};

use super::backend::Backend;
use super::error::{Result, SurfaceError};
use super::layout::Layout;
use super::network::NetworkManager;
use super::options::SurfaceDefaults;
use super::types::NetworkData;

/// URI naming the built-in template.
pub const DEFAULT_TEMPLATE_URI: &str = "vis-surface/graph.html";

/// Built-in template markup.
pub const DEFAULT_TEMPLATE: &str = include_str!("graph.html");

/// A checkbox-like control.
pub trait ToggleControl {
	/// Current state.
	fn checked(&self) -> bool;
	/// Sets the state without firing the change handler.
	fn set_checked(&self, checked: bool);
	/// Installs the handler run with the new state when the user flips it.
	fn on_change(&self, handler: Box<dyn Fn(bool)>);
}

/// A select-like control.
pub trait SelectControl {
	/// Currently selected value.
	fn value(&self) -> String;
	/// Selects `value` without firing the change handler.
	fn set_value(&self, value: &str);
	/// Installs the handler run with the new value when the user picks one.
	fn on_change(&self, handler: Box<dyn Fn(String)>);
}

/// The container a graph template is instantiated into.
pub trait TemplateHost {
	/// Renderer mount handed to the backend.
	type Mount;
	/// Physics toggle type.
	type Toggle: ToggleControl;
	/// Layout selector type.
	type Select: SelectControl;

	/// Replaces the container's content with `html`.
	fn insert_template(&self, html: &str);
	/// Renderer mounts (`vis-network` elements) in the content.
	fn mounts(&self) -> Vec<Self::Mount>;
	/// `input[name="physicsEnabled"]` controls.
	fn physics_toggles(&self) -> Vec<Self::Toggle>;
	/// `select[name="layout"]` controls.
	fn layout_selectors(&self) -> Vec<Self::Select>;
	/// Class attribute of the content's root element, if there is one.
	fn root_class(&self) -> Option<String>;
	/// Replaces the class attribute of the content's root element.
	fn set_root_class(&self, class: &str);
}

/// Loads template markup; `done` receives the body or a failure message.
pub trait TemplateFetcher {
	/// Starts loading `uri`. `done` runs exactly once.
	fn fetch(&self, uri: &str, done: Box<dyn FnOnce(std::result::Result<String, String>)>);
}

/// Template markup keyed by URI. Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct TemplateCache {
	entries: Rc<RefCell<HashMap<String, String>>>,
}

impl TemplateCache {
	/// Empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Cached markup for `uri`.
	pub fn get(&self, uri: &str) -> Option<String> {
		self.entries.borrow().get(uri).cloned()
	}

	/// Stores `template` under `uri`.
	pub fn put(&self, uri: &str, template: &str) {
		self.entries
			.borrow_mut()
			.insert(uri.to_string(), template.to_string());
	}
}

/// Where the template comes from and what the network starts with.
#[derive(Clone)]
pub struct GraphConfig {
	/// Template location; [`DEFAULT_TEMPLATE_URI`] selects the built-in one.
	pub template_uri: String,
	/// Shared template cache, if any.
	pub cache: Option<TemplateCache>,
	/// Defaults the bound network starts from.
	pub defaults: Rc<SurfaceDefaults>,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			template_uri: DEFAULT_TEMPLATE_URI.to_string(),
			cache: None,
			defaults: Rc::new(SurfaceDefaults::default()),
		}
	}
}

type FailFn = Rc<dyn Fn(SurfaceError)>;

struct GraphInner<B: Backend, H> {
	host: H,
	defaults: Rc<SurfaceDefaults>,
	backend: RefCell<Option<B>>,
	network: RefCell<Option<NetworkManager<B>>>,
	template: RefCell<Option<String>>,
	styling: RefCell<Option<String>>,
}

/// Handle to a graph container. Clones refer to the same container.
pub struct GraphManager<B: Backend, H> {
	inner: Rc<GraphInner<B, H>>,
}

impl<B: Backend, H> Clone for GraphManager<B, H> {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<B, H> GraphManager<B, H>
where
	B: Backend + 'static,
	H: TemplateHost<Mount = B::Mount> + 'static,
{
	/// Resolves the template and binds a network inside `host`.
	///
	/// `done` runs once the network is bound, which is immediately for cached
	/// and built-in templates and after the fetch otherwise. `fail` receives
	/// every problem found along the way.
	pub fn bind(
		backend: B,
		host: H,
		config: GraphConfig,
		fetcher: &dyn TemplateFetcher,
		done: impl FnOnce(&Self) + 'static,
		fail: impl Fn(SurfaceError) + 'static,
	) -> Self {
		let manager = Self {
			inner: Rc::new(GraphInner {
				host,
				defaults: config.defaults,
				backend: RefCell::new(Some(backend)),
				network: RefCell::new(None),
				template: RefCell::new(None),
				styling: RefCell::new(None),
			}),
		};
		let fail: FailFn = Rc::new(fail);
		let uri = config.template_uri;
		let cache = config.cache;

		if let Some(template) = cache.as_ref().and_then(|cache| cache.get(&uri)) {
			manager.init_container(template, done, &fail);
		} else if uri == DEFAULT_TEMPLATE_URI {
			if let Some(cache) = &cache {
				cache.put(&uri, DEFAULT_TEMPLATE);
			}
			manager.init_container(DEFAULT_TEMPLATE.to_string(), done, &fail);
		} else {
			info!("vis-surface: fetching graph template {}", uri);
			let pending = manager.clone();
			let key = uri.clone();
			fetcher.fetch(
				&uri,
				Box::new(move |response: std::result::Result<String, String>| match response {
					Ok(template) => {
						if let Some(cache) = &cache {
							cache.put(&key, &template);
						}
						pending.init_container(template, done, &fail);
					}
					Err(reason) => fail(SurfaceError::Fetch(reason)),
				}),
			);
		}
		manager
	}

	fn init_container(&self, template: String, done: impl FnOnce(&Self), fail: &FailFn) {
		let inner = &self.inner;
		inner.host.insert_template(&template);
		*inner.template.borrow_mut() = Some(template);

		let mounts = inner.host.mounts();
		let mount = match mounts.as_slice() {
			[mount] => mount,
			[] => return fail(binding("no vis-network found in the graph template")),
			_ => return fail(binding("only one vis-network supported in the graph template")),
		};
		let Some(backend) = inner.backend.borrow_mut().take() else {
			return fail(SurfaceError::Misuse("graph container is already bound".into()));
		};
		let network = match NetworkManager::with_defaults(backend, mount, inner.defaults.clone()) {
			Ok(network) => network,
			Err(err) => return fail(err),
		};
		*inner.network.borrow_mut() = Some(network.clone());

		match inner.host.physics_toggles().as_slice() {
			[toggle] => {
				toggle.set_checked(network.physics());
				let network = network.clone();
				toggle.on_change(Box::new(move |checked: bool| network.set_physics(Some(checked))));
			}
			[] => fail(binding("no physicsEnabled input found in the graph template")),
			_ => fail(binding("only one physicsEnabled input supported in the graph template")),
		}

		match inner.host.layout_selectors().as_slice() {
			[select] => {
				select.set_value(network.layout().as_str());
				let network = network.clone();
				select.on_change(Box::new(move |value: String| match value.parse::<Layout>() {
					Ok(layout) => network.set_layout(Some(layout)),
					Err(err) => warn!("vis-surface: ignoring layout selection: {}", err),
				}));
			}
			[] => fail(binding("no layout selector found in the graph template")),
			_ => fail(binding("only one layout selector supported in the graph template")),
		}

		info!("vis-surface: graph bound");
		done(self);
	}

	fn bound_network(&self) -> Result<NetworkManager<B>> {
		self.inner
			.network
			.borrow()
			.clone()
			.ok_or_else(|| SurfaceError::Misuse("graph container is not bound yet".into()))
	}

	/// Sets the physics toggle and forwards to the network. Does nothing when
	/// the template has no single physics toggle.
	pub fn set_physics(&self, physics: bool) -> Result<()> {
		let network = self.bound_network()?;
		if let [toggle] = self.inner.host.physics_toggles().as_slice() {
			toggle.set_checked(physics);
			network.set_physics(Some(physics));
		}
		Ok(())
	}

	/// Sets the layout selector and forwards to the network. Does nothing when
	/// the template has no single layout selector.
	pub fn set_layout(&self, layout: Layout) -> Result<()> {
		let network = self.bound_network()?;
		if let [select] = self.inner.host.layout_selectors().as_slice() {
			select.set_value(layout.as_str());
			network.set_layout(Some(layout));
		}
		Ok(())
	}

	/// Replaces any `*-style` class on the template's root element with
	/// `<styling>-style`.
	pub fn set_styling(&self, styling: &str) -> Result<()> {
		let current = self
			.inner
			.host
			.root_class()
			.ok_or_else(|| SurfaceError::Misuse("graph template has no root element".into()))?;
		let mut classes: Vec<&str> = current
			.split_whitespace()
			.filter(|class| !class.contains("-style"))
			.collect();
		let styled = format!("{styling}-style");
		classes.push(&styled);
		self.inner.host.set_root_class(&classes.join(" "));
		*self.inner.styling.borrow_mut() = Some(styling.to_string());
		Ok(())
	}

	/// Pushes data to the bound network.
	pub fn set_data(&self, data: Option<NetworkData>) -> Result<()> {
		self.bound_network()?.set_data(data);
		Ok(())
	}

	/// The bound network, `None` until binding completed.
	pub fn network(&self) -> Option<NetworkManager<B>> {
		self.inner.network.borrow().clone()
	}

	/// Whether binding completed.
	pub fn is_bound(&self) -> bool {
		self.inner.network.borrow().is_some()
	}

	/// Host the template lives in.
	pub fn host(&self) -> &H {
		&self.inner.host
	}

	/// Markup the container was instantiated from.
	pub fn template(&self) -> Option<String> {
		self.inner.template.borrow().clone()
	}

	/// Last styling applied through [`GraphManager::set_styling`].
	pub fn styling(&self) -> Option<String> {
		self.inner.styling.borrow().clone()
	}
}

fn binding(message: &str) -> SurfaceError {
	SurfaceError::Binding(message.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cache_clones_share_entries() {
		let cache = TemplateCache::new();
		let other = cache.clone();
		cache.put("a.html", "<p></p>");
		assert_eq!(other.get("a.html").as_deref(), Some("<p></p>"));
		assert_eq!(other.get("b.html"), None);
	}

	#[test]
	fn built_in_template_has_one_of_each_control() {
		assert_eq!(DEFAULT_TEMPLATE.matches("<vis-network").count(), 1);
		assert_eq!(DEFAULT_TEMPLATE.matches(r#"name="physicsEnabled""#).count(), 1);
		assert_eq!(DEFAULT_TEMPLATE.matches(r#"name="layout""#).count(), 1);
		for layout in ["standard", "hierarchyTop", "hierarchyBottom", "hierarchyLeft", "hierarchyRight"] {
			assert!(layout.parse::<Layout>().is_ok());
			assert!(DEFAULT_TEMPLATE.contains(&format!(r#"value="{layout}""#)));
		}
	}
}
