// Integration tests reuse lib deps only.
#![allow(unused_crate_dependencies)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde_json::json;
use vis_surface::{
	Entity, EntityId, EntityStore, EventPayload, Events, MemoryBackend, MountPoint, TimelineData,
	TimelineManager,
};

fn bind(backend: &MemoryBackend) -> TimelineManager<MemoryBackend> {
	TimelineManager::new(backend.clone(), &MountPoint("timeline".into())).expect("timeline binds")
}

#[test]
fn items_and_groups_reconcile_independently() {
	let backend = MemoryBackend::new();
	let timeline = bind(&backend);
	timeline.set_data(Some(TimelineData {
		items: Some(vec![
			Entity::new(1).with("content", "one").with("start", "2024-01-01"),
			Entity::new(2).with("content", "two").with("start", "2024-02-01"),
		]),
		groups: Some(vec![Entity::new("g").with("content", "G")]),
		item_options: Some(json!({ "type": { "start": "ISODate" } })),
		..Default::default()
	}));

	timeline.set_data(Some(TimelineData {
		items: Some(vec![Entity::new(2).with("content", "TWO")]),
		..Default::default()
	}));

	let items = timeline.items();
	assert_eq!(items.ids(), vec![EntityId::Int(2)]);
	let two = items.get(&EntityId::Int(2)).expect("item 2 kept");
	assert_eq!(two.field("content"), Some(&json!("TWO")));
	assert_eq!(two.field("start"), Some(&json!("2024-02-01")));
	assert_eq!(items.options(), json!({ "type": { "start": "ISODate" } }));
	assert_eq!(timeline.groups().len(), 1);
}

#[test]
fn reset_replaces_both_collections() {
	let backend = MemoryBackend::new();
	let timeline = bind(&backend);
	timeline.set_data(Some(TimelineData {
		items: Some(vec![Entity::new(1)]),
		..Default::default()
	}));

	timeline.set_data(None);
	assert!(timeline.items().is_empty());
	assert!(timeline.items().same_as(&timeline.timeline().items()));
	assert!(timeline.groups().same_as(&timeline.timeline().groups()));
	assert_eq!(timeline.timeline().recorder.fit_count(), 1);
}

#[test]
fn clicks_are_disambiguated_like_the_network() {
	let backend = MemoryBackend::new();
	let clock = backend.clock();
	let timeline = bind(&backend);
	let log = Rc::new(RefCell::new(Vec::new()));
	let (clicks, doubles, loads) = (log.clone(), log.clone(), log.clone());
	timeline.set_events(Some(
		Events::new()
			.on("click", move |_, _| clicks.borrow_mut().push("click"))
			.on("doubleClick", move |_, _| doubles.borrow_mut().push("double"))
			.on("onload", move |_, payload: EventPayload<'_>| {
				if matches!(payload, EventPayload::Loaded) {
					loads.borrow_mut().push("load");
				}
			}),
	));
	assert_eq!(*log.borrow(), vec!["load"]);

	let recorder = &timeline.timeline().recorder;
	recorder.emit("click", json!({ "item": 1 }));
	clock.advance(Duration::from_millis(300));
	recorder.emit("click", json!({ "item": 1 }));
	recorder.emit("doubleClick", json!({ "item": 1 }));
	clock.advance(Duration::from_millis(300));
	assert_eq!(*log.borrow(), vec!["load", "click", "double"]);
}

#[test]
fn reset_events_clears_timeline_handlers_without_orb_defaults() {
	let backend = MemoryBackend::new();
	let timeline = bind(&backend);
	timeline.set_events(Some(Events::new().on("rangechanged", |_, _| {})));
	let recorder = &timeline.timeline().recorder;
	assert_eq!(recorder.handler_count("rangechanged"), 1);
	assert_eq!(recorder.handler_count("afterDrawing"), 0);

	timeline.set_events(None);
	assert_eq!(recorder.handler_count("rangechanged"), 0);
}

#[test]
fn options_reset_to_the_configured_defaults() {
	let backend = MemoryBackend::new();
	let timeline = bind(&backend);
	timeline
		.set_options(Some(json!({ "editable": true })))
		.expect("map patch");
	timeline.set_options(None).expect("reset");
	assert_eq!(timeline.options(), json!({}));
	assert_eq!(timeline.timeline().recorder.last_options(), Some(json!({})));
}
