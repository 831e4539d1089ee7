//! Timeline surface: items and groups over a timeline renderer.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};
use serde_json::{Map, Value};

use super::backend::{Backend, EventPayload, Renderer, TimelineRenderer};
use super::clicks::ClickDisambiguator;
use super::dataset::{EntityStore, reconcile};
use super::error::{Result, SurfaceError};
use super::events::{Events, ONLOAD, SurfaceRef, TIMELINE_EVENTS, register};
use super::options::{SurfaceDefaults, as_patch, merge_into};
use super::types::TimelineData;

struct TimelineInner<B: Backend> {
	backend: B,
	defaults: Rc<SurfaceDefaults>,
	timeline: B::Timeline,
	items: RefCell<B::Store>,
	groups: RefCell<B::Store>,
	options: RefCell<Map<String, Value>>,
	clicks: ClickDisambiguator,
}

/// Handle to a timeline surface. Clones refer to the same surface.
pub struct TimelineManager<B: Backend> {
	inner: Rc<TimelineInner<B>>,
}

impl<B: Backend> Clone for TimelineManager<B> {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<B: Backend + 'static> TimelineManager<B> {
	/// Binds a timeline renderer to `mount` using the built-in defaults.
	pub fn new(backend: B, mount: &B::Mount) -> Result<Self> {
		Self::with_defaults(backend, mount, Rc::new(SurfaceDefaults::default()))
	}

	/// Binds a timeline renderer to `mount`.
	pub fn with_defaults(backend: B, mount: &B::Mount, defaults: Rc<SurfaceDefaults>) -> Result<Self> {
		let caps = backend.capabilities();
		if !(caps.data_set && caps.timeline) {
			return Err(SurfaceError::Construction(
				"DataSet and Timeline not found, required by vis-surface".into(),
			));
		}

		let items = backend.create_store();
		let groups = backend.create_store();
		let options = defaults.timeline_options.clone();
		let timeline =
			backend.create_timeline(mount, &items, &groups, &Value::Object(options.clone()))?;
		let clicks = ClickDisambiguator::new(backend.scheduler());

		let manager = Self {
			inner: Rc::new(TimelineInner {
				backend,
				defaults,
				timeline,
				items: RefCell::new(items),
				groups: RefCell::new(groups),
				options: RefCell::new(options),
				clicks,
			}),
		};
		manager.set_events(None);

		info!("vis-surface: timeline bound");
		Ok(manager)
	}

	fn surface_ref(&self) -> SurfaceRef<Self> {
		let weak = Rc::downgrade(&self.inner);
		Rc::new(move || weak.upgrade().map(|inner| TimelineManager { inner }))
	}

	/// Synchronises items and groups; `None` swaps in fresh empty collections
	/// and refits the view.
	pub fn set_data(&self, data: Option<TimelineData>) {
		let inner = &self.inner;
		let Some(data) = data else {
			let items = inner.backend.create_store();
			let groups = inner.backend.create_store();
			inner.timeline.set_data(&items, &groups);
			*inner.items.borrow_mut() = items;
			*inner.groups.borrow_mut() = groups;
			inner.timeline.fit();
			debug!("vis-surface: timeline data reset");
			return;
		};

		if let Some(items) = data.items {
			let store = inner.items.borrow();
			reconcile(&*store, &items);
			if let Some(options) = &data.item_options {
				store.set_options(options);
			}
		}
		if let Some(groups) = data.groups {
			let store = inner.groups.borrow();
			reconcile(&*store, &groups);
			if let Some(options) = &data.group_options {
				store.set_options(options);
			}
		}
	}

	/// Replaces the event callbacks. `None` first unregisters every known
	/// timeline event.
	pub fn set_events(&self, events: Option<Events<Self>>) {
		let timeline = &self.inner.timeline;
		let events = events.unwrap_or_else(|| {
			for event in TIMELINE_EVENTS {
				timeline.off(event);
			}
			Events::new()
		});

		for (event, callback) in events {
			if event == ONLOAD {
				callback(self, EventPayload::Loaded);
			} else {
				register(
					timeline,
					&event,
					callback,
					self.surface_ref(),
					&self.inner.clicks,
				);
			}
		}
	}

	/// Merges `options` into the held snapshot, or resets it with `None`, then
	/// pushes the whole snapshot.
	pub fn set_options(&self, options: Option<Value>) -> Result<()> {
		let snapshot = {
			let mut held = self.inner.options.borrow_mut();
			match &options {
				Some(options) => merge_into(&mut held, as_patch(options)?),
				None => *held = self.inner.defaults.timeline_options.clone(),
			}
			Value::Object(held.clone())
		};
		self.inner.timeline.set_options(&snapshot);
		Ok(())
	}

	/// Current options snapshot.
	pub fn options(&self) -> Value {
		Value::Object(self.inner.options.borrow().clone())
	}

	/// Item collection.
	pub fn items(&self) -> B::Store {
		self.inner.items.borrow().clone()
	}

	/// Group collection.
	pub fn groups(&self) -> B::Store {
		self.inner.groups.borrow().clone()
	}

	/// Underlying renderer.
	pub fn timeline(&self) -> &B::Timeline {
		&self.inner.timeline
	}
}
