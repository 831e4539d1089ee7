//! Capability surface consumed from the rendering library.
//!
//! Surfaces never talk to a renderer directly; they go through a [`Backend`]
//! that constructs collections and renderers and reports which of them it can
//! provide. The browser backend binds vis.js, the headless backend records
//! calls in memory.

use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use super::clicks::Scheduler;
use super::dataset::EntityStore;
use super::error::Result;
use super::orbs::DrawContext;
use super::types::Position;

/// Argument of an event emitted by a renderer.
pub enum EventPayload<'a> {
	/// Event parameters as reported by the renderer.
	Params(Value),
	/// Drawing context of a draw cycle (`beforeDrawing`, `afterDrawing`).
	Canvas(&'a mut dyn DrawContext),
	/// Passed to `onload` once the surface is bound.
	Loaded,
}

impl EventPayload<'_> {
	/// Event parameters, if this payload carries any.
	pub fn params(&self) -> Option<&Value> {
		match self {
			EventPayload::Params(value) => Some(value),
			_ => None,
		}
	}

	/// Event parameters, or `Null` for canvases and `onload`.
	pub fn into_params(self) -> Value {
		match self {
			EventPayload::Params(value) => value,
			_ => Value::Null,
		}
	}
}

/// Handler registered on a renderer.
pub type EventHandler = Rc<dyn Fn(EventPayload<'_>)>;

/// Operations shared by every renderer.
pub trait Renderer {
	/// Adds a handler; earlier handlers for the same event stay registered.
	fn on(&self, event: &str, handler: EventHandler);
	/// Removes every handler of `event`.
	fn off(&self, event: &str);
	/// Applies a partial options map.
	fn set_options(&self, options: &Value);
	/// Fits the whole content into view.
	fn fit(&self);
	/// Repaints without recomputing layout.
	fn redraw(&self);
}

/// A node/edge network renderer.
pub trait NetworkRenderer: Renderer {
	/// Collection type the renderer displays.
	type Store: EntityStore;

	/// Replaces both collections.
	fn set_data(&self, nodes: &Self::Store, edges: &Self::Store);
	/// Re-runs the physics simulation until stable.
	fn stabilize(&self);
	/// Rendered node positions keyed by the string form of the node id.
	fn positions(&self) -> HashMap<String, Position>;
}

/// An item/group timeline renderer.
pub trait TimelineRenderer: Renderer {
	/// Collection type the renderer displays.
	type Store: EntityStore;

	/// Replaces both collections.
	fn set_data(&self, items: &Self::Store, groups: &Self::Store);
}

/// Which constructible types a backend can actually provide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
	/// `DataSet` is available.
	pub data_set: bool,
	/// `Network` is available.
	pub network: bool,
	/// `Timeline` is available.
	pub timeline: bool,
}

/// A rendering library as seen by the surfaces.
pub trait Backend {
	/// Where a renderer is mounted (a DOM element in the browser).
	type Mount;
	/// Keyed entity collection.
	type Store: EntityStore + Clone;
	/// Node/edge renderer.
	type Network: NetworkRenderer<Store = Self::Store>;
	/// Item/group renderer.
	type Timeline: TimelineRenderer<Store = Self::Store>;

	/// Reports what this backend can construct.
	fn capabilities(&self) -> Capabilities;

	/// Creates an empty collection.
	fn create_store(&self) -> Self::Store;

	/// Mounts a network renderer over `nodes` and `edges`.
	fn create_network(
		&self,
		mount: &Self::Mount,
		nodes: &Self::Store,
		edges: &Self::Store,
		options: &Value,
	) -> Result<Self::Network>;

	/// Mounts a timeline renderer over `items` and `groups`.
	fn create_timeline(
		&self,
		mount: &Self::Mount,
		items: &Self::Store,
		groups: &Self::Store,
		options: &Value,
	) -> Result<Self::Timeline>;

	/// Timer used for the click window.
	fn scheduler(&self) -> Rc<dyn Scheduler>;
}
