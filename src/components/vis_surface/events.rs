//! Caller-facing event maps and their registration on a renderer.

use std::rc::Rc;

use log::debug;

use super::backend::{EventHandler, EventPayload, Renderer};
use super::clicks::ClickDisambiguator;

/// Events a network renderer emits. `set_events(None)` unregisters all of them.
pub const NETWORK_EVENTS: &[&str] = &[
	"afterDrawing",
	"animationFinished",
	"beforeDrawing",
	"blurEdge",
	"blurNode",
	"click",
	"configChange",
	"deselectEdge",
	"deselectNode",
	"doubleClick",
	"dragEnd",
	"dragging",
	"dragStart",
	"hidePopup",
	"hold",
	"hoverEdge",
	"hoverNode",
	"initRedraw",
	"oncontext",
	"release",
	"resize",
	"select",
	"selectEdge",
	"selectNode",
	"showPopup",
	"stabilizationIterationsDone",
	"stabilizationProgress",
	"stabilized",
	"startStabilizing",
	"zoom",
];

/// Events a timeline renderer emits.
pub const TIMELINE_EVENTS: &[&str] = &[
	"currentTimeTick",
	"click",
	"contextmenu",
	"doubleClick",
	"drop",
	"mouseOver",
	"mouseDown",
	"mouseUp",
	"mouseMove",
	"groupDragged",
	"changed",
	"rangechange",
	"rangechanged",
	"select",
	"itemover",
	"itemout",
	"timechange",
	"timechanged",
];

/// Pseudo-event fired synchronously by `set_events` with the surface itself.
pub const ONLOAD: &str = "onload";

/// Caller callback: receives the surface and the event payload.
pub type Callback<S> = Rc<dyn Fn(&S, EventPayload<'_>)>;

/// Callbacks keyed by event name, kept in registration order.
pub struct Events<S> {
	handlers: Vec<(String, Callback<S>)>,
}

impl<S> Default for Events<S> {
	fn default() -> Self {
		Self {
			handlers: Vec::new(),
		}
	}
}

impl<S> Events<S> {
	/// Empty event map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the callback for `event`, replacing an earlier one.
	pub fn on(mut self, event: &str, callback: impl Fn(&S, EventPayload<'_>) + 'static) -> Self {
		let callback: Callback<S> = Rc::new(callback);
		match self.handlers.iter_mut().find(|(name, _)| name == event) {
			Some(slot) => slot.1 = callback,
			None => self.handlers.push((event.to_string(), callback)),
		}
		self
	}

	/// Whether a callback is set for `event`.
	pub fn contains(&self, event: &str) -> bool {
		self.handlers.iter().any(|(name, _)| name == event)
	}

	/// Adds a do-nothing callback for `event` unless one is set.
	pub(crate) fn or_default(self, event: &str) -> Self {
		if self.contains(event) {
			self
		} else {
			self.on(event, |_, _| {})
		}
	}

	/// Number of events with a callback.
	pub fn len(&self) -> usize {
		self.handlers.len()
	}

	/// Whether no callback is set.
	pub fn is_empty(&self) -> bool {
		self.handlers.is_empty()
	}
}

impl<S> IntoIterator for Events<S> {
	type Item = (String, Callback<S>);
	type IntoIter = std::vec::IntoIter<(String, Callback<S>)>;

	fn into_iter(self) -> Self::IntoIter {
		self.handlers.into_iter()
	}
}

/// Resolves the surface a handler belongs to; `None` once it has been dropped.
pub(crate) type SurfaceRef<S> = Rc<dyn Fn() -> Option<S>>;

/// Registers `callback` on `renderer`, routing clicks through `clicks`.
///
/// `click` is delayed by the double-click window, `doubleClick` delivered at
/// once; every other event is passed straight through.
pub(crate) fn register<S: 'static, R: Renderer + ?Sized>(
	renderer: &R,
	event: &str,
	callback: Callback<S>,
	surface: SurfaceRef<S>,
	clicks: &ClickDisambiguator,
) {
	debug!("vis-surface: binding `{}`", event);
	let handler: EventHandler = match event {
		"click" => {
			let clicks = clicks.clone();
			Rc::new(move |payload: EventPayload<'_>| {
				let params = payload.into_params();
				let (surface, callback) = (surface.clone(), callback.clone());
				clicks.click(move || {
					if let Some(this) = surface() {
						callback(&this, EventPayload::Params(params));
					}
				});
			})
		}
		"doubleClick" => {
			let clicks = clicks.clone();
			Rc::new(move |payload: EventPayload<'_>| {
				clicks.double_click(|| {
					if let Some(this) = surface() {
						callback(&this, payload);
					}
				});
			})
		}
		_ => Rc::new(move |payload: EventPayload<'_>| {
			if let Some(this) = surface() {
				callback(&this, payload);
			}
		}),
	};
	renderer.on(event, handler);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn on_replaces_and_keeps_order() {
		let events: Events<()> = Events::new()
			.on("click", |_, _| {})
			.on("select", |_, _| {})
			.on("click", |_, _| {});
		let names: Vec<String> = events.into_iter().map(|(name, _)| name).collect();
		assert_eq!(names, vec!["click", "select"]);
	}

	#[test]
	fn or_default_only_fills_gaps() {
		let events: Events<()> = Events::new().on("stabilized", |_, _| {});
		let events = events.or_default("stabilized").or_default("afterDrawing");
		assert_eq!(events.len(), 2);
		assert!(events.contains("afterDrawing"));
	}

	#[test]
	fn known_event_lists_cover_clicks() {
		for list in [NETWORK_EVENTS, TIMELINE_EVENTS] {
			assert!(list.contains(&"click"));
			assert!(list.contains(&"doubleClick"));
		}
		assert!(NETWORK_EVENTS.contains(&"afterDrawing"));
	}
}
