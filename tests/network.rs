// Integration tests reuse lib deps only.
#![allow(unused_crate_dependencies)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde_json::{Value, json};
use vis_surface::headless::{DrawCall, RecordingCanvas};
use vis_surface::{
	Capabilities, Compass, DataSet, DrawContext, Entity, EntityId, EntityStore, EventPayload,
	Events, Layout, MemoryBackend, MountPoint, NetworkData, NetworkManager, SurfaceDefaults,
	SurfaceError,
};

fn bind(backend: &MemoryBackend) -> NetworkManager<MemoryBackend> {
	NetworkManager::new(backend.clone(), &MountPoint("network".into())).expect("network binds")
}

fn nodes(entities: Vec<Entity>) -> Option<NetworkData> {
	Some(NetworkData {
		nodes: Some(entities),
		..Default::default()
	})
}

fn ids(store: &DataSet) -> Vec<EntityId> {
	store.ids()
}

#[test]
fn replaced_nodes_disappear_from_the_overlay() {
	let backend = MemoryBackend::new();
	let net = bind(&backend);
	net.set_data(nodes(vec![
		Entity::new(1).with("edgeCount", 3),
		Entity::new(2).with("edgeCount", 5),
	]));
	for (id, x) in [(1, 0.0), (2, 100.0), (3, 200.0)] {
		net.network().place(id, x, 0.0);
	}

	net.set_data(nodes(vec![
		Entity::new(1).with("edgeCount", 3),
		Entity::new(3).with("edgeCount", 7),
	]));
	assert_eq!(ids(&net.nodes()), vec![EntityId::Int(1), EntityId::Int(3)]);

	let mut canvas = RecordingCanvas::new();
	net.network().recorder.draw(&mut canvas);
	assert_eq!(canvas.texts(), vec!["3", "7"]);
	assert_eq!(canvas.circles(), vec![(-22.0, -22.0, 10.0), (178.0, -22.0, 10.0)]);
}

#[test]
fn declared_north_orb_sits_above_the_node() {
	let backend = MemoryBackend::new();
	let net = bind(&backend);
	net.set_data(nodes(vec![
		Entity::new("a").with("orbs", json!({ "N": { "label": "hi" } })),
	]));
	net.network().place("a", 50.0, 80.0);

	let mut canvas = RecordingCanvas::new();
	assert_eq!(net.draw_orbs(&mut canvas), 1);
	assert_eq!(canvas.circles(), vec![(50.0, 50.0, 10.0)]);
	assert!(canvas.calls.contains(&DrawCall::Text {
		text: "hi".into(),
		x: 50.0,
		y: 46.0,
	}));
}

#[test]
fn edge_count_badge_is_drawn_next_to_declared_orbs() {
	let backend = MemoryBackend::new();
	let net = bind(&backend);
	net.set_data(nodes(vec![
		Entity::new(1)
			.with("edgeCount", 3)
			.with("orbs", json!({ "N": { "label": "n" } })),
	]));
	net.network().place(1, 0.0, 0.0);

	let mut canvas = RecordingCanvas::new();
	assert_eq!(net.draw_orbs(&mut canvas), 2);
	assert_eq!(canvas.texts(), vec!["n", "3"]);
	assert_eq!(canvas.circles(), vec![(0.0, -30.0, 10.0), (-22.0, -22.0, 10.0)]);
}

#[test]
fn reset_swaps_in_fresh_collections_and_refits() {
	let backend = MemoryBackend::new();
	let net = bind(&backend);
	net.set_data(nodes(vec![Entity::new(1), Entity::new(2)]));
	let old = net.nodes();

	net.set_data(None);

	let fresh = net.nodes();
	assert!(fresh.is_empty());
	assert!(net.edges().is_empty());
	assert!(!fresh.same_as(&old));
	assert!(fresh.same_as(&net.network().nodes()));
	assert_eq!(net.network().recorder.fit_count(), 1);
}

#[test]
fn omitted_lists_are_left_alone_and_empty_lists_clear() {
	let backend = MemoryBackend::new();
	let net = bind(&backend);
	net.set_data(Some(NetworkData {
		nodes: Some(vec![Entity::new(1)]),
		edges: Some(vec![Entity::new("e1").with("from", 1).with("to", 1)]),
		..Default::default()
	}));

	net.set_data(Some(NetworkData {
		edges: Some(vec![]),
		..Default::default()
	}));
	assert_eq!(net.nodes().len(), 1);
	assert!(net.edges().is_empty());
}

#[test]
fn collection_options_apply_with_their_entities() {
	let backend = MemoryBackend::new();
	let net = bind(&backend);
	net.set_data(Some(NetworkData {
		nodes: Some(vec![Entity::new(1)]),
		node_options: Some(json!({ "fieldId": "id" })),
		edge_options: Some(json!({ "ignored": true })),
		..Default::default()
	}));
	assert_eq!(net.nodes().options(), json!({ "fieldId": "id" }));
	assert_eq!(net.edges().options(), Value::Null);
}

fn click_log(net: &NetworkManager<MemoryBackend>) -> Rc<RefCell<Vec<String>>> {
	let log = Rc::new(RefCell::new(Vec::new()));
	let (on_click, on_double) = (log.clone(), log.clone());
	net.set_events(Some(
		Events::new()
			.on("click", move |_, payload: EventPayload<'_>| {
				let node = payload.into_params()["nodes"][0].clone();
				on_click.borrow_mut().push(format!("click {node}"));
			})
			.on("doubleClick", move |_, _| on_double.borrow_mut().push("double".into())),
	));
	log
}

#[test]
fn single_click_waits_for_the_window() {
	let backend = MemoryBackend::new();
	let clock = backend.clock();
	let net = bind(&backend);
	let log = click_log(&net);

	net.network().recorder.emit("click", json!({ "nodes": [4] }));
	clock.advance(Duration::from_millis(299));
	assert!(log.borrow().is_empty());
	clock.advance(Duration::from_millis(1));
	assert_eq!(*log.borrow(), vec!["click 4"]);
}

#[test]
fn double_click_swallows_the_pending_click() {
	let backend = MemoryBackend::new();
	let clock = backend.clock();
	let net = bind(&backend);
	let log = click_log(&net);

	let recorder = &net.network().recorder;
	recorder.emit("click", json!({ "nodes": [4] }));
	clock.advance(Duration::from_millis(50));
	recorder.emit("doubleClick", json!({ "nodes": [4] }));
	assert_eq!(*log.borrow(), vec!["double"]);

	clock.advance(Duration::from_secs(1));
	assert_eq!(*log.borrow(), vec!["double"]);
}

#[test]
fn double_click_on_another_node_swallows_the_pending_click() {
	let backend = MemoryBackend::new();
	let clock = backend.clock();
	let net = bind(&backend);
	let log = click_log(&net);

	let recorder = &net.network().recorder;
	recorder.emit("click", json!({ "nodes": [1] }));
	clock.advance(Duration::from_millis(100));
	recorder.emit("doubleClick", json!({ "nodes": [2] }));

	clock.advance(Duration::from_secs(1));
	assert_eq!(*log.borrow(), vec!["double"]);
}

#[test]
fn delayed_click_is_dropped_with_its_surface() {
	let backend = MemoryBackend::new();
	let clock = backend.clock();
	let net = bind(&backend);
	let log = click_log(&net);

	net.network().recorder.emit("click", json!({ "nodes": [1] }));
	drop(net);
	clock.advance(Duration::from_secs(1));
	assert!(log.borrow().is_empty());
}

#[test]
fn onload_runs_immediately_with_the_surface() {
	let backend = MemoryBackend::new();
	let net = bind(&backend);
	let loaded = Rc::new(RefCell::new(None));
	let sink = loaded.clone();
	net.set_events(Some(Events::new().on(
		"onload",
		move |surface: &NetworkManager<MemoryBackend>, payload| {
			assert!(matches!(payload, EventPayload::Loaded));
			*sink.borrow_mut() = Some(surface.physics());
		},
	)));
	assert_eq!(*loaded.borrow(), Some(true));
}

#[test]
fn reset_events_unregisters_everything_but_the_defaults() {
	let backend = MemoryBackend::new();
	let net = bind(&backend);
	net.set_events(Some(Events::new().on("select", |_, _| {}).on("hoverNode", |_, _| {})));
	let recorder = &net.network().recorder;
	assert_eq!(recorder.handler_count("select"), 1);

	net.set_events(None);
	assert_eq!(recorder.handler_count("select"), 0);
	assert_eq!(recorder.handler_count("hoverNode"), 0);
	assert_eq!(recorder.handler_count("afterDrawing"), 1);
	assert_eq!(recorder.handler_count("stabilized"), 1);
}

#[test]
fn caller_after_drawing_runs_after_the_orbs() {
	let backend = MemoryBackend::new();
	let net = bind(&backend);
	net.set_events(Some(Events::new().on("afterDrawing", |_, payload| {
		if let EventPayload::Canvas(ctx) = payload {
			ctx.fill_text("caller", 0.0, 0.0);
		}
	})));
	net.set_data(nodes(vec![Entity::new(1).with("linkCount", 2)]));
	net.network().place(1, 0.0, 0.0);

	let mut canvas = RecordingCanvas::new();
	net.network().recorder.draw(&mut canvas);
	// Handlers from construction stay registered, so orbs paint twice.
	assert_eq!(canvas.texts(), vec!["2", "2", "caller"]);
}

#[test]
fn orb_colors_override_and_reset() {
	let backend = MemoryBackend::new();
	let net = bind(&backend);
	net.set_data(nodes(vec![Entity::new(1).with("edgeCount", 1)]));
	net.network().place(1, 0.0, 0.0);

	net.set_orb_colors(Some(vec![(Compass::NW, "red".to_string())]));
	assert_eq!(net.network().recorder.redraw_count(), 1);
	let mut canvas = RecordingCanvas::new();
	net.draw_orbs(&mut canvas);
	assert!(canvas.calls.contains(&DrawCall::FillStyle("red".into())));

	net.set_orb_colors(None);
	assert_eq!(net.orb_colors().get(Compass::NW), Compass::NW.default_color());
}

#[test]
fn options_merge_then_reset() {
	let backend = MemoryBackend::new();
	let net = bind(&backend);
	net.set_options(Some(json!({ "height": "300px", "nodes": { "size": 10 } })))
		.expect("map patch");
	let options = net.options();
	assert_eq!(options["height"], json!("300px"));
	assert_eq!(options["nodes"]["size"], json!(10));
	assert_eq!(options["nodes"]["borderWidth"], json!(2));
	assert_eq!(net.network().recorder.last_options(), Some(options));

	net.set_options(None).expect("reset");
	assert_eq!(net.options()["height"], json!("500px"));
	assert!(matches!(
		net.set_options(Some(json!(["height"]))),
		Err(SurfaceError::Misuse(_))
	));
}

#[test]
fn layouts_bend_edges_both_ways() {
	let backend = MemoryBackend::new();
	let net = bind(&backend);
	net.set_options(Some(json!({ "edges": { "smooth": { "type": "horizontal" } } })))
		.expect("map patch");

	net.set_layout(Some(Layout::HierarchyLeft));
	assert_eq!(net.options()["edges"]["smooth"]["type"], json!("vertical"));
	assert_eq!(net.options()["layout"]["hierarchical"]["direction"], json!("LR"));

	net.set_layout(Some(Layout::HierarchyBottom));
	assert_eq!(net.options()["edges"]["smooth"]["type"], json!("horizontal"));

	net.set_layout(Some(Layout::Standard));
	assert_eq!(net.options()["layout"]["hierarchical"]["enabled"], json!(false));
	assert_eq!(net.layout(), Layout::Standard);
}

#[test]
fn missing_capabilities_fail_construction() {
	let backend = MemoryBackend::with_capabilities(Capabilities {
		data_set: false,
		network: true,
		timeline: true,
	});
	let result = NetworkManager::new(backend, &MountPoint::default());
	assert!(matches!(result, Err(SurfaceError::Construction(_))));
}

#[test]
fn defaults_come_from_configuration() {
	let defaults: SurfaceDefaults = serde_json::from_value(json!({
		"physics": false,
		"layout": "hierarchyRight",
		"orbColors": { "NW": "black" }
	}))
	.expect("defaults parse");
	let net = NetworkManager::with_defaults(
		MemoryBackend::new(),
		&MountPoint::default(),
		Rc::new(defaults),
	)
	.expect("network binds");

	assert!(!net.physics());
	assert_eq!(net.layout(), Layout::HierarchyRight);
	assert_eq!(net.orb_colors().get(Compass::NW), "black");
	assert_eq!(net.options()["height"], json!("500px"));
}
