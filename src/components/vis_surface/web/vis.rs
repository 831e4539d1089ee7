//! Bindings to the global `vis` namespace.

use js_sys::{Array, Function, Reflect};
use wasm_bindgen::prelude::*;
use web_sys::Element;

use super::super::backend::Capabilities;

#[wasm_bindgen(js_namespace = vis)]
extern "C" {
	/// `vis.DataSet`
	#[derive(Clone, Debug)]
	pub type DataSet;

	/// `new vis.DataSet()`
	#[wasm_bindgen(constructor)]
	pub fn new() -> DataSet;

	/// `getIds()`
	#[wasm_bindgen(method, js_name = getIds)]
	pub fn get_ids(this: &DataSet) -> Array;

	/// `get()`, every entity
	#[wasm_bindgen(method)]
	pub fn get(this: &DataSet) -> Array;

	/// `update(data)`
	#[wasm_bindgen(method)]
	pub fn update(this: &DataSet, data: &JsValue);

	/// `remove(ids)`
	#[wasm_bindgen(method)]
	pub fn remove(this: &DataSet, ids: &JsValue);

	/// `setOptions(options)`
	#[wasm_bindgen(method, js_name = setOptions)]
	pub fn set_options(this: &DataSet, options: &JsValue);

	/// `vis.Network`
	#[derive(Clone, Debug)]
	pub type Network;

	/// `new vis.Network(container, data, options)`
	#[wasm_bindgen(constructor, catch)]
	pub fn new(container: &Element, data: &JsValue, options: &JsValue) -> Result<Network, JsValue>;

	/// `on(event, callback)`
	#[wasm_bindgen(method)]
	pub fn on(this: &Network, event: &str, callback: &Function);

	/// `off(event)`, every callback of `event`
	#[wasm_bindgen(method)]
	pub fn off(this: &Network, event: &str);

	/// `setOptions(options)`
	#[wasm_bindgen(method, js_name = setOptions)]
	pub fn set_options(this: &Network, options: &JsValue);

	/// `setData(data)`
	#[wasm_bindgen(method, js_name = setData)]
	pub fn set_data(this: &Network, data: &JsValue);

	/// `stabilize()`
	#[wasm_bindgen(method)]
	pub fn stabilize(this: &Network);

	/// `fit()`
	#[wasm_bindgen(method)]
	pub fn fit(this: &Network);

	/// `redraw()`
	#[wasm_bindgen(method)]
	pub fn redraw(this: &Network);

	/// `getPositions()`
	#[wasm_bindgen(method, js_name = getPositions)]
	pub fn get_positions(this: &Network) -> JsValue;

	/// `vis.Timeline`
	#[derive(Clone, Debug)]
	pub type Timeline;

	/// `new vis.Timeline(container, items, groups, options)`
	#[wasm_bindgen(constructor, catch)]
	pub fn new(
		container: &Element,
		items: &DataSet,
		groups: &DataSet,
		options: &JsValue,
	) -> Result<Timeline, JsValue>;

	/// `on(event, callback)`
	#[wasm_bindgen(method)]
	pub fn on(this: &Timeline, event: &str, callback: &Function);

	/// `off(event)`
	#[wasm_bindgen(method)]
	pub fn off(this: &Timeline, event: &str);

	/// `setOptions(options)`
	#[wasm_bindgen(method, js_name = setOptions)]
	pub fn set_options(this: &Timeline, options: &JsValue);

	/// `setData(data)`
	#[wasm_bindgen(method, js_name = setData)]
	pub fn set_data(this: &Timeline, data: &JsValue);

	/// `fit()`
	#[wasm_bindgen(method)]
	pub fn fit(this: &Timeline);

	/// `redraw()`
	#[wasm_bindgen(method)]
	pub fn redraw(this: &Timeline);
}

/// Probes the global object for the constructors the surfaces need.
pub fn capabilities() -> Capabilities {
	let vis = Reflect::get(&js_sys::global(), &JsValue::from_str("vis"))
		.ok()
		.filter(JsValue::is_object);
	let has = |name: &str| {
		vis.as_ref()
			.and_then(|vis| Reflect::get(vis, &JsValue::from_str(name)).ok())
			.is_some_and(|ctor| ctor.is_function())
	};
	Capabilities {
		data_set: has("DataSet"),
		network: has("Network"),
		timeline: has("Timeline"),
	}
}
