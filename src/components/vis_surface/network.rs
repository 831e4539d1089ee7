//! Network surface: nodes, edges, orbs and layout controls over a network
//! renderer.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, info};
use serde_json::{Map, Value, json};

use super::backend::{Backend, EventPayload, NetworkRenderer, Renderer};
use super::clicks::ClickDisambiguator;
use super::dataset::{EntityStore, reconcile};
use super::error::{Result, SurfaceError};
use super::events::{Callback, Events, NETWORK_EVENTS, ONLOAD, SurfaceRef, register};
use super::layout::{Layout, Solver};
use super::options::{SurfaceDefaults, as_patch, ensure_map, merge_into};
use super::orbs::{Compass, DrawContext, OrbColors, draw_orbs};
use super::types::NetworkData;

/// Mutable configuration of a bound network.
struct NetworkState {
	options: Map<String, Value>,
	orb_colors: OrbColors,
	physics: bool,
	solver: Solver,
	layout: Layout,
}

struct NetworkInner<B: Backend> {
	backend: B,
	defaults: Rc<SurfaceDefaults>,
	network: B::Network,
	nodes: RefCell<B::Store>,
	edges: RefCell<B::Store>,
	state: RefCell<NetworkState>,
	clicks: ClickDisambiguator,
}

/// Handle to a network surface. Clones refer to the same surface.
pub struct NetworkManager<B: Backend> {
	inner: Rc<NetworkInner<B>>,
}

impl<B: Backend> Clone for NetworkManager<B> {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<B: Backend + 'static> NetworkManager<B> {
	/// Binds a network renderer to `mount` using the built-in defaults.
	pub fn new(backend: B, mount: &B::Mount) -> Result<Self> {
		Self::with_defaults(backend, mount, Rc::new(SurfaceDefaults::default()))
	}

	/// Binds a network renderer to `mount`.
	///
	/// Fails with [`SurfaceError::Construction`] when the backend cannot
	/// provide collections or a network renderer.
	pub fn with_defaults(backend: B, mount: &B::Mount, defaults: Rc<SurfaceDefaults>) -> Result<Self> {
		let caps = backend.capabilities();
		if !(caps.data_set && caps.network) {
			return Err(SurfaceError::Construction(
				"DataSet and Network not found, required by vis-surface".into(),
			));
		}

		let nodes = backend.create_store();
		let edges = backend.create_store();
		let options = defaults.network_options.clone();
		let network = backend.create_network(mount, &nodes, &edges, &Value::Object(options.clone()))?;
		let clicks = ClickDisambiguator::new(backend.scheduler());

		let state = NetworkState {
			options,
			orb_colors: defaults.orb_colors.clone(),
			physics: defaults.physics,
			solver: defaults.solver,
			layout: defaults.layout,
		};
		let manager = Self {
			inner: Rc::new(NetworkInner {
				backend,
				defaults,
				network,
				nodes: RefCell::new(nodes),
				edges: RefCell::new(edges),
				state: RefCell::new(state),
				clicks,
			}),
		};

		manager.set_events(None);
		manager.set_layout(None);
		manager.set_physics(None);
		manager.set_solver(None);

		info!("vis-surface: network bound");
		Ok(manager)
	}

	fn downgrade(&self) -> Weak<NetworkInner<B>> {
		Rc::downgrade(&self.inner)
	}

	fn surface_ref(&self) -> SurfaceRef<Self> {
		let weak = self.downgrade();
		Rc::new(move || weak.upgrade().map(|inner| NetworkManager { inner }))
	}

	/// Synchronises the node and edge collections.
	///
	/// With `Some`, each supplied list is reconciled into its collection and
	/// its field options applied; omitted lists leave their collection alone.
	/// With `None`, both collections are replaced by fresh empty ones and the
	/// view is refit.
	pub fn set_data(&self, data: Option<NetworkData>) {
		let inner = &self.inner;
		match data {
			Some(data) => {
				if let Some(nodes) = data.nodes {
					let store = inner.nodes.borrow();
					reconcile(&*store, &nodes);
					if let Some(options) = &data.node_options {
						store.set_options(options);
					}
				}
				if let Some(edges) = data.edges {
					let store = inner.edges.borrow();
					reconcile(&*store, &edges);
					if let Some(options) = &data.edge_options {
						store.set_options(options);
					}
				}
			}
			None => {
				let nodes = inner.backend.create_store();
				let edges = inner.backend.create_store();
				inner.network.set_data(&nodes, &edges);
				*inner.nodes.borrow_mut() = nodes;
				*inner.edges.borrow_mut() = edges;
				inner.network.fit();
				debug!("vis-surface: network data reset");
			}
		}
	}

	/// Replaces the event callbacks.
	///
	/// `None` first unregisters every known network event. `stabilized` and
	/// `afterDrawing` always get a callback; `afterDrawing` paints the orbs
	/// before running the caller's callback. `onload` runs right away.
	pub fn set_events(&self, events: Option<Events<Self>>) {
		let network = &self.inner.network;
		let events = match events {
			Some(events) => events,
			None => {
				for event in NETWORK_EVENTS {
					network.off(event);
				}
				Events::new()
			}
		};
		let events = events.or_default("stabilized").or_default("afterDrawing");

		for (event, callback) in events {
			match event.as_str() {
				"afterDrawing" => self.bind_after_drawing(callback),
				ONLOAD => callback(self, EventPayload::Loaded),
				_ => register(
					network,
					&event,
					callback,
					self.surface_ref(),
					&self.inner.clicks,
				),
			}
		}
	}

	fn bind_after_drawing(&self, callback: Callback<Self>) {
		let weak = self.downgrade();
		self.inner.network.on(
			"afterDrawing",
			Rc::new(move |payload: EventPayload<'_>| {
				let Some(inner) = weak.upgrade() else {
					return;
				};
				let this = NetworkManager { inner };
				match payload {
					EventPayload::Canvas(ctx) => {
						this.draw_orbs(&mut *ctx);
						callback(&this, EventPayload::Canvas(ctx));
					}
					other => callback(&this, other),
				}
			}),
		);
	}

	/// Paints the orbs of every positioned node onto `ctx`.
	pub fn draw_orbs(&self, ctx: &mut dyn DrawContext) -> usize {
		let positions = self.inner.network.positions();
		let nodes = self.inner.nodes.borrow().entities();
		let colors = self.inner.state.borrow().orb_colors.clone();
		draw_orbs(ctx, &nodes, &positions, &colors)
	}

	/// Merges `options` into the held snapshot, or resets it with `None`, then
	/// pushes the whole snapshot to the renderer.
	pub fn set_options(&self, options: Option<Value>) -> Result<()> {
		let snapshot = {
			let mut state = self.inner.state.borrow_mut();
			match &options {
				Some(options) => merge_into(&mut state.options, as_patch(options)?),
				None => state.options = self.inner.defaults.network_options.clone(),
			}
			Value::Object(state.options.clone())
		};
		self.inner.network.set_options(&snapshot);
		Ok(())
	}

	/// Overwrites the given orb colours, or restores the defaults with `None`.
	pub fn set_orb_colors(&self, colors: Option<Vec<(Compass, String)>>) {
		{
			let mut state = self.inner.state.borrow_mut();
			match colors {
				Some(colors) => state.orb_colors.extend(colors),
				None => state.orb_colors = self.inner.defaults.orb_colors.clone(),
			}
		}
		self.inner.network.redraw();
	}

	/// Turns the simulation on or off; `None` restores the default.
	pub fn set_physics(&self, physics: Option<bool>) {
		let enabled = {
			let mut state = self.inner.state.borrow_mut();
			state.physics = physics.unwrap_or(self.inner.defaults.physics);
			let enabled = state.physics;
			ensure_map(&mut state.options, "physics").insert("enabled".into(), enabled.into());
			enabled
		};
		self.inner
			.network
			.set_options(&json!({ "physics": { "enabled": enabled } }));
		if enabled {
			self.inner.network.stabilize();
		}
	}

	/// Selects the physics solver; `None` restores the default. Hierarchical
	/// layout is enabled exactly when the solver is hierarchical.
	pub fn set_solver(&self, solver: Option<Solver>) {
		let solver = {
			let mut state = self.inner.state.borrow_mut();
			state.solver = solver.unwrap_or(self.inner.defaults.solver);
			let solver = state.solver;
			ensure_map(&mut state.options, "physics").insert("solver".into(), solver.as_str().into());
			let layout = ensure_map(&mut state.options, "layout");
			ensure_map(layout, "hierarchical").insert("enabled".into(), solver.is_hierarchical().into());
			solver
		};
		self.inner.network.set_options(&json!({
			"physics": { "solver": solver.as_str() },
			"layout": { "hierarchical": { "enabled": solver.is_hierarchical() } }
		}));
		self.inner.network.stabilize();
	}

	/// Switches between the free layout and the four hierarchical directions;
	/// `None` restores the default.
	pub fn set_layout(&self, layout: Option<Layout>) {
		let push = {
			let mut state = self.inner.state.borrow_mut();
			let layout = layout.unwrap_or(self.inner.defaults.layout);
			state.layout = layout;

			match layout.direction() {
				None => {
					let layout = ensure_map(&mut state.options, "layout");
					ensure_map(layout, "hierarchical").insert("enabled".into(), false.into());
				}
				Some(direction) => {
					state.solver = Solver::HierarchicalRepulsion;
					ensure_map(&mut state.options, "layout").insert(
						"hierarchical".into(),
						json!({ "enabled": true, "direction": direction, "sortMethod": "directed" }),
					);
				}
			}
			if let Some(flow) = layout.edge_flow() {
				let (from, to) = flow.smooth_swap();
				let smooth = state
					.options
					.get_mut("edges")
					.and_then(|edges| edges.get_mut("smooth"))
					.and_then(Value::as_object_mut);
				if let Some(smooth) = smooth {
					if smooth.get("type").and_then(Value::as_str) == Some(from) {
						smooth.insert("type".into(), to.into());
					}
				}
			}

			let solver = state.solver;
			ensure_map(&mut state.options, "physics").insert("solver".into(), solver.as_str().into());

			let mut push = json!({
				"physics": { "solver": solver.as_str() },
				"layout": { "hierarchical": state.options["layout"]["hierarchical"].clone() }
			});
			if let Some(smooth) = state.options.get("edges").and_then(|edges| edges.get("smooth")) {
				push["edges"] = json!({ "smooth": smooth.clone() });
			}
			push
		};
		self.inner.network.set_options(&push);
		self.inner.network.stabilize();
	}

	/// Current options snapshot.
	pub fn options(&self) -> Value {
		Value::Object(self.inner.state.borrow().options.clone())
	}

	/// Whether physics is enabled.
	pub fn physics(&self) -> bool {
		self.inner.state.borrow().physics
	}

	/// Active solver.
	pub fn solver(&self) -> Solver {
		self.inner.state.borrow().solver
	}

	/// Active layout.
	pub fn layout(&self) -> Layout {
		self.inner.state.borrow().layout
	}

	/// Current orb colours.
	pub fn orb_colors(&self) -> OrbColors {
		self.inner.state.borrow().orb_colors.clone()
	}

	/// Handle to the current node collection.
	pub fn nodes(&self) -> B::Store {
		self.inner.nodes.borrow().clone()
	}

	/// Handle to the current edge collection.
	pub fn edges(&self) -> B::Store {
		self.inner.edges.borrow().clone()
	}

	/// The underlying renderer.
	pub fn network(&self) -> &B::Network {
		&self.inner.network
	}

	/// Backend the surface was built with.
	pub fn backend(&self) -> &B {
		&self.inner.backend
	}
}
