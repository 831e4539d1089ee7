//! Renderer and collection wrappers over the vis bindings.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use js_sys::{Array, Object, Reflect};
use log::{debug, warn};
use serde::Serialize;
use serde_json::{Map, Value};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::CanvasRenderingContext2d;

use super::super::backend::{EventHandler, EventPayload, NetworkRenderer, Renderer, TimelineRenderer};
use super::super::dataset::EntityStore;
use super::super::types::{Entity, EntityId, Position};
use super::canvas::CanvasContext;
use super::vis;

/// Converts a JSON value for the JS side; maps become plain objects.
pub(super) fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
	let serializer = serde_wasm_bindgen::Serializer::json_compatible();
	value.serialize(&serializer).unwrap_or_else(|err| {
		warn!("vis-surface: cannot convert value for the renderer: {}", err);
		JsValue::UNDEFINED
	})
}

/// Converts a value coming from the JS side into JSON.
///
/// Event parameters carry members that are not JSON (the Hammer input event
/// with its function properties and DOM targets). When the whole object does
/// not convert, it is rebuilt member by member and those members are left out.
pub(super) fn from_js(value: JsValue) -> Value {
	match serde_wasm_bindgen::from_value(value.clone()) {
		Ok(json) => json,
		Err(err) if value.is_object() && !Array::is_array(&value) => {
			let object: &Object = value.unchecked_ref();
			let entries = Object::entries(object);
			let members = entries.iter().map(|entry| {
				let entry: Array = entry.unchecked_into();
				let key = entry.get(0).as_string().unwrap_or_default();
				let member = serde_wasm_bindgen::from_value::<Value>(entry.get(1));
				(key, member)
			});
			debug!("vis-surface: converting params member by member: {}", err);
			json_members(members)
		}
		Err(err) => {
			warn!("vis-surface: cannot convert value from the renderer: {}", err);
			Value::Null
		}
	}
}

/// Collects converted members into a JSON object, dropping failed ones.
fn json_members<E: fmt::Display>(members: impl IntoIterator<Item = (String, Result<Value, E>)>) -> Value {
	let mut object = Map::new();
	for (key, member) in members {
		match member {
			Ok(value) => {
				object.insert(key, value);
			}
			Err(err) => debug!("vis-surface: dropping `{}` from params: {}", key, err),
		}
	}
	Value::Object(object)
}

/// `{ <first>: a, <second>: b }` with the collections as-is.
pub(super) fn pair(first: (&str, &JsValue), second: (&str, &JsValue)) -> JsValue {
	let data = Object::new();
	let _ = Reflect::set(&data, &JsValue::from_str(first.0), first.1);
	let _ = Reflect::set(&data, &JsValue::from_str(second.0), second.1);
	data.into()
}

/// Routes a renderer callback argument: drawing contexts become canvases,
/// everything else JSON parameters.
fn dispatch(handler: &EventHandler, arg: JsValue) {
	match arg.dyn_into::<CanvasRenderingContext2d>() {
		Ok(ctx) => {
			let mut canvas = CanvasContext::new(ctx);
			handler(EventPayload::Canvas(&mut canvas));
		}
		Err(arg) => handler(EventPayload::Params(from_js(arg))),
	}
}

type Listeners = RefCell<HashMap<String, Vec<Closure<dyn FnMut(JsValue)>>>>;

fn listen(handler: EventHandler) -> Closure<dyn FnMut(JsValue)> {
	Closure::new(move |arg: JsValue| dispatch(&handler, arg))
}

/// [`EntityStore`] over a `vis.DataSet`.
#[derive(Clone, Debug)]
pub struct WebStore {
	set: vis::DataSet,
}

impl WebStore {
	/// Fresh `vis.DataSet`.
	pub fn new() -> Self {
		Self {
			set: vis::DataSet::new(),
		}
	}

	/// Underlying `vis.DataSet`.
	pub fn raw(&self) -> &vis::DataSet {
		&self.set
	}
}

impl Default for WebStore {
	fn default() -> Self {
		Self::new()
	}
}

impl EntityStore for WebStore {
	fn ids(&self) -> Vec<EntityId> {
		self.set
			.get_ids()
			.iter()
			.filter_map(|id| serde_json::from_value(from_js(id)).ok())
			.collect()
	}

	fn update(&self, entities: &[Entity]) {
		self.set.update(&to_js(entities));
	}

	fn remove(&self, ids: &[EntityId]) {
		self.set.remove(&to_js(ids));
	}

	fn set_options(&self, options: &Value) {
		self.set.set_options(&to_js(options));
	}

	fn entities(&self) -> Vec<Entity> {
		self.set
			.get()
			.iter()
			.filter_map(|item| serde_json::from_value(from_js(item)).ok())
			.collect()
	}
}

/// Network renderer over `vis.Network`.
pub struct WebNetwork {
	network: vis::Network,
	listeners: Listeners,
}

impl WebNetwork {
	pub(crate) fn new(network: vis::Network) -> Self {
		Self {
			network,
			listeners: RefCell::new(HashMap::new()),
		}
	}

	/// Underlying `vis.Network`.
	pub fn raw(&self) -> &vis::Network {
		&self.network
	}
}

impl Renderer for WebNetwork {
	fn on(&self, event: &str, handler: EventHandler) {
		let closure = listen(handler);
		self.network.on(event, closure.as_ref().unchecked_ref());
		self.listeners
			.borrow_mut()
			.entry(event.to_string())
			.or_default()
			.push(closure);
	}

	fn off(&self, event: &str) {
		self.network.off(event);
		self.listeners.borrow_mut().remove(event);
	}

	fn set_options(&self, options: &Value) {
		self.network.set_options(&to_js(options));
	}

	fn fit(&self) {
		self.network.fit();
	}

	fn redraw(&self) {
		self.network.redraw();
	}
}

impl NetworkRenderer for WebNetwork {
	type Store = WebStore;

	fn set_data(&self, nodes: &WebStore, edges: &WebStore) {
		let nodes: &JsValue = nodes.raw();
		let edges: &JsValue = edges.raw();
		self.network.set_data(&pair(("nodes", nodes), ("edges", edges)));
	}

	fn stabilize(&self) {
		self.network.stabilize();
	}

	fn positions(&self) -> HashMap<String, Position> {
		serde_json::from_value(from_js(self.network.get_positions())).unwrap_or_default()
	}
}

/// Timeline renderer over `vis.Timeline`.
pub struct WebTimeline {
	timeline: vis::Timeline,
	listeners: Listeners,
}

impl WebTimeline {
	pub(crate) fn new(timeline: vis::Timeline) -> Self {
		Self {
			timeline,
			listeners: RefCell::new(HashMap::new()),
		}
	}

	/// Underlying `vis.Timeline`.
	pub fn raw(&self) -> &vis::Timeline {
		&self.timeline
	}
}

impl Renderer for WebTimeline {
	fn on(&self, event: &str, handler: EventHandler) {
		let closure = listen(handler);
		self.timeline.on(event, closure.as_ref().unchecked_ref());
		self.listeners
			.borrow_mut()
			.entry(event.to_string())
			.or_default()
			.push(closure);
	}

	fn off(&self, event: &str) {
		self.timeline.off(event);
		self.listeners.borrow_mut().remove(event);
	}

	fn set_options(&self, options: &Value) {
		self.timeline.set_options(&to_js(options));
	}

	fn fit(&self) {
		self.timeline.fit();
	}

	fn redraw(&self) {
		self.timeline.redraw();
	}
}

impl TimelineRenderer for WebTimeline {
	type Store = WebStore;

	fn set_data(&self, items: &WebStore, groups: &WebStore) {
		let items: &JsValue = items.raw();
		let groups: &JsValue = groups.raw();
		self.timeline.set_data(&pair(("items", items), ("groups", groups)));
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn members_that_do_not_convert_are_left_out() {
		let members = vec![
			("nodes".to_string(), Ok(json!([4]))),
			("event".to_string(), Err("invalid type: function")),
			("pointer".to_string(), Ok(json!({ "DOM": { "x": 1, "y": 2 } }))),
		];
		assert_eq!(
			json_members(members),
			json!({ "nodes": [4], "pointer": { "DOM": { "x": 1, "y": 2 } } })
		);
	}

	#[test]
	fn no_members_give_an_empty_object() {
		let members: Vec<(String, Result<Value, String>)> = Vec::new();
		assert_eq!(json_members(members), json!({}));
	}
}
