//! In-memory backend.
//!
//! Runs the surfaces without a browser: collections are [`DataSet`]s,
//! renderers record every call they receive and can emit events on demand,
//! time only moves when [`ManualScheduler::advance`] is called, and drawing is
//! captured as a list of [`DrawCall`]s. The template host understands just
//! enough markup to find the renderer mount and the two controls.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use serde_json::Value;

use super::backend::{
	Backend, Capabilities, EventHandler, EventPayload, NetworkRenderer, Renderer, TimelineRenderer,
};
use super::clicks::Scheduler;
use super::dataset::{DataSet, EntityStore};
use super::error::Result;
use super::graph::{SelectControl, TemplateFetcher, TemplateHost, ToggleControl};
use super::orbs::{DrawContext, TextMeasure, TextMetrics};
use super::types::Position;

/// Named mount point standing in for a DOM element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MountPoint(pub String);

/// Backend whose renderers record calls instead of drawing.
#[derive(Clone)]
pub struct MemoryBackend {
	capabilities: Capabilities,
	clock: Rc<ManualScheduler>,
}

impl Default for MemoryBackend {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryBackend {
	/// A backend providing every capability.
	pub fn new() -> Self {
		Self::with_capabilities(Capabilities {
			data_set: true,
			network: true,
			timeline: true,
		})
	}

	/// Backend reporting only the given capabilities.
	pub fn with_capabilities(capabilities: Capabilities) -> Self {
		Self {
			capabilities,
			clock: Rc::new(ManualScheduler::new()),
		}
	}

	/// The scheduler shared by every surface built on this backend.
	pub fn clock(&self) -> Rc<ManualScheduler> {
		self.clock.clone()
	}
}

impl Backend for MemoryBackend {
	type Mount = MountPoint;
	type Store = DataSet;
	type Network = RecordingNetwork;
	type Timeline = RecordingTimeline;

	fn capabilities(&self) -> Capabilities {
		self.capabilities
	}

	fn create_store(&self) -> DataSet {
		DataSet::new()
	}

	fn create_network(
		&self,
		mount: &MountPoint,
		nodes: &DataSet,
		edges: &DataSet,
		options: &Value,
	) -> Result<RecordingNetwork> {
		Ok(RecordingNetwork {
			recorder: Recorder::new(mount, options),
			data: RefCell::new((nodes.clone(), edges.clone())),
			positions: RefCell::new(HashMap::new()),
			stabilizations: Cell::new(0),
		})
	}

	fn create_timeline(
		&self,
		mount: &MountPoint,
		items: &DataSet,
		groups: &DataSet,
		options: &Value,
	) -> Result<RecordingTimeline> {
		Ok(RecordingTimeline {
			recorder: Recorder::new(mount, options),
			data: RefCell::new((items.clone(), groups.clone())),
		})
	}

	fn scheduler(&self) -> Rc<dyn Scheduler> {
		self.clock.clone()
	}
}

/// Call log shared by both recording renderers.
pub struct Recorder {
	mount: MountPoint,
	initial_options: Value,
	handlers: RefCell<Vec<(String, EventHandler)>>,
	option_pushes: RefCell<Vec<Value>>,
	fits: Cell<usize>,
	redraws: Cell<usize>,
}

impl Recorder {
	fn new(mount: &MountPoint, options: &Value) -> Self {
		Self {
			mount: mount.clone(),
			initial_options: options.clone(),
			handlers: RefCell::new(Vec::new()),
			option_pushes: RefCell::new(Vec::new()),
			fits: Cell::new(0),
			redraws: Cell::new(0),
		}
	}

	/// Where the renderer was mounted.
	pub fn mount(&self) -> &MountPoint {
		&self.mount
	}

	/// Options the renderer was constructed with.
	pub fn initial_options(&self) -> &Value {
		&self.initial_options
	}

	/// Every partial options map received through `set_options`, oldest first.
	pub fn option_pushes(&self) -> Vec<Value> {
		self.option_pushes.borrow().clone()
	}

	/// Most recent options push.
	pub fn last_options(&self) -> Option<Value> {
		self.option_pushes.borrow().last().cloned()
	}

	/// Number of handlers registered for `event`.
	pub fn handler_count(&self, event: &str) -> usize {
		self.handlers
			.borrow()
			.iter()
			.filter(|(name, _)| name == event)
			.count()
	}

	/// Number of `fit` calls.
	pub fn fit_count(&self) -> usize {
		self.fits.get()
	}

	/// Number of `redraw` calls.
	pub fn redraw_count(&self) -> usize {
		self.redraws.get()
	}

	fn handlers_for(&self, event: &str) -> Vec<EventHandler> {
		self.handlers
			.borrow()
			.iter()
			.filter(|(name, _)| name == event)
			.map(|(_, handler)| handler.clone())
			.collect()
	}

	/// Emits `event` with `params` to every handler registered for it.
	pub fn emit(&self, event: &str, params: Value) {
		for handler in self.handlers_for(event) {
			handler(EventPayload::Params(params.clone()));
		}
	}

	/// Runs one draw cycle: `afterDrawing` handlers receive `ctx`.
	pub fn draw(&self, ctx: &mut dyn DrawContext) {
		for handler in self.handlers_for("afterDrawing") {
			handler(EventPayload::Canvas(&mut *ctx));
		}
	}
}

impl Renderer for Recorder {
	fn on(&self, event: &str, handler: EventHandler) {
		self.handlers.borrow_mut().push((event.to_string(), handler));
	}

	fn off(&self, event: &str) {
		self.handlers.borrow_mut().retain(|(name, _)| name != event);
	}

	fn set_options(&self, options: &Value) {
		self.option_pushes.borrow_mut().push(options.clone());
	}

	fn fit(&self) {
		self.fits.set(self.fits.get() + 1);
	}

	fn redraw(&self) {
		self.redraws.set(self.redraws.get() + 1);
	}
}

/// Recording network renderer.
pub struct RecordingNetwork {
	/// Shared call log.
	pub recorder: Recorder,
	data: RefCell<(DataSet, DataSet)>,
	positions: RefCell<HashMap<String, Position>>,
	stabilizations: Cell<usize>,
}

impl RecordingNetwork {
	/// Places node `id` at `(x, y)`.
	pub fn place(&self, id: impl ToString, x: f64, y: f64) {
		self.positions
			.borrow_mut()
			.insert(id.to_string(), Position { x, y });
	}

	/// Node collection the renderer currently displays.
	pub fn nodes(&self) -> DataSet {
		self.data.borrow().0.clone()
	}

	/// Edge collection the renderer currently displays.
	pub fn edges(&self) -> DataSet {
		self.data.borrow().1.clone()
	}

	/// Number of `stabilize` calls.
	pub fn stabilize_count(&self) -> usize {
		self.stabilizations.get()
	}
}

impl Renderer for RecordingNetwork {
	fn on(&self, event: &str, handler: EventHandler) {
		self.recorder.on(event, handler);
	}

	fn off(&self, event: &str) {
		self.recorder.off(event);
	}

	fn set_options(&self, options: &Value) {
		self.recorder.set_options(options);
	}

	fn fit(&self) {
		self.recorder.fit();
	}

	fn redraw(&self) {
		self.recorder.redraw();
	}
}

impl NetworkRenderer for RecordingNetwork {
	type Store = DataSet;

	fn set_data(&self, nodes: &DataSet, edges: &DataSet) {
		*self.data.borrow_mut() = (nodes.clone(), edges.clone());
	}

	fn stabilize(&self) {
		self.stabilizations.set(self.stabilizations.get() + 1);
	}

	/// Only nodes still in the displayed collection have a position.
	fn positions(&self) -> HashMap<String, Position> {
		let shown: Vec<String> = self
			.nodes()
			.ids()
			.iter()
			.map(ToString::to_string)
			.collect();
		self.positions
			.borrow()
			.iter()
			.filter(|(id, _)| shown.contains(id))
			.map(|(id, pos)| (id.clone(), *pos))
			.collect()
	}
}

/// Recording timeline renderer.
pub struct RecordingTimeline {
	/// Shared call log.
	pub recorder: Recorder,
	data: RefCell<(DataSet, DataSet)>,
}

impl RecordingTimeline {
	/// Item collection the renderer currently displays.
	pub fn items(&self) -> DataSet {
		self.data.borrow().0.clone()
	}

	/// Group collection the renderer currently displays.
	pub fn groups(&self) -> DataSet {
		self.data.borrow().1.clone()
	}
}

impl Renderer for RecordingTimeline {
	fn on(&self, event: &str, handler: EventHandler) {
		self.recorder.on(event, handler);
	}

	fn off(&self, event: &str) {
		self.recorder.off(event);
	}

	fn set_options(&self, options: &Value) {
		self.recorder.set_options(options);
	}

	fn fit(&self) {
		self.recorder.fit();
	}

	fn redraw(&self) {
		self.recorder.redraw();
	}
}

impl TimelineRenderer for RecordingTimeline {
	type Store = DataSet;

	fn set_data(&self, items: &DataSet, groups: &DataSet) {
		*self.data.borrow_mut() = (items.clone(), groups.clone());
	}
}

struct Pending {
	due: Duration,
	seq: u64,
	task: Box<dyn FnOnce()>,
}

/// Virtual clock. Scheduled tasks run only inside [`ManualScheduler::advance`].
#[derive(Default)]
pub struct ManualScheduler {
	now: Cell<Duration>,
	seq: Cell<u64>,
	queue: RefCell<Vec<Pending>>,
}

impl ManualScheduler {
	/// Clock at zero with nothing scheduled.
	pub fn new() -> Self {
		Self::default()
	}

	/// Time elapsed since creation.
	pub fn now(&self) -> Duration {
		self.now.get()
	}

	/// Tasks still waiting.
	pub fn pending(&self) -> usize {
		self.queue.borrow().len()
	}

	/// Moves the clock forward, running due tasks in deadline order. Tasks
	/// scheduled by running tasks run too if they fall due in time.
	pub fn advance(&self, by: Duration) {
		let target = self.now.get() + by;
		loop {
			let next = {
				let mut queue = self.queue.borrow_mut();
				let due = queue
					.iter()
					.enumerate()
					.filter(|(_, p)| p.due <= target)
					.min_by_key(|(_, p)| (p.due, p.seq))
					.map(|(i, _)| i);
				due.map(|i| queue.remove(i))
			};
			let Some(pending) = next else {
				break;
			};
			self.now.set(pending.due);
			(pending.task)();
		}
		self.now.set(target);
	}
}

impl Scheduler for ManualScheduler {
	fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
		let seq = self.seq.get();
		self.seq.set(seq + 1);
		self.queue.borrow_mut().push(Pending {
			due: self.now.get() + delay,
			seq,
			task,
		});
	}
}

/// One call made on a [`RecordingCanvas`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
	/// `strokeStyle = ..`
	StrokeStyle(String),
	/// `fillStyle = ..`
	FillStyle(String),
	/// `lineWidth = ..`
	LineWidth(f64),
	/// `font = ..`
	Font(String),
	/// Full circle path.
	Circle {
		/// Centre x.
		x: f64,
		/// Centre y.
		y: f64,
		/// Radius.
		radius: f64,
	},
	/// `fill()`
	Fill,
	/// `stroke()`
	Stroke,
	/// `fillText(..)`
	Text {
		/// Drawn text.
		text: String,
		/// Anchor x.
		x: f64,
		/// Anchor y.
		y: f64,
	},
	/// `drawImage(..)` with an explicit size.
	Image {
		/// Image URL.
		src: String,
		/// Left edge.
		x: f64,
		/// Top edge.
		y: f64,
		/// Drawn width.
		width: f64,
		/// Drawn height.
		height: f64,
	},
}

/// Draw context that records calls. Text is measured as a fixed width per
/// character and a fixed line height.
#[derive(Clone, Debug)]
pub struct RecordingCanvas {
	/// Calls in the order they were made.
	pub calls: Vec<DrawCall>,
	/// Measured width of one character.
	pub char_width: f64,
	/// Measured height of any text.
	pub line_height: f64,
}

impl Default for RecordingCanvas {
	fn default() -> Self {
		Self {
			calls: Vec::new(),
			char_width: 6.0,
			line_height: 12.0,
		}
	}
}

impl RecordingCanvas {
	/// Canvas measuring 6px per character and 12px per line.
	pub fn new() -> Self {
		Self::default()
	}

	/// Centre and radius of every circle drawn.
	pub fn circles(&self) -> Vec<(f64, f64, f64)> {
		self.calls
			.iter()
			.filter_map(|call| match call {
				DrawCall::Circle { x, y, radius } => Some((*x, *y, *radius)),
				_ => None,
			})
			.collect()
	}

	/// Text of every `fill_text` call.
	pub fn texts(&self) -> Vec<String> {
		self.calls
			.iter()
			.filter_map(|call| match call {
				DrawCall::Text { text, .. } => Some(text.clone()),
				_ => None,
			})
			.collect()
	}
}

impl TextMeasure for RecordingCanvas {
	fn measure_text(&mut self, text: &str, _font: &str) -> TextMetrics {
		TextMetrics {
			width: self.char_width * text.chars().count() as f64,
			height: self.line_height,
		}
	}
}

impl DrawContext for RecordingCanvas {
	fn set_stroke_style(&mut self, style: &str) {
		self.calls.push(DrawCall::StrokeStyle(style.to_string()));
	}

	fn set_fill_style(&mut self, style: &str) {
		self.calls.push(DrawCall::FillStyle(style.to_string()));
	}

	fn set_line_width(&mut self, width: f64) {
		self.calls.push(DrawCall::LineWidth(width));
	}

	fn set_font(&mut self, font: &str) {
		self.calls.push(DrawCall::Font(font.to_string()));
	}

	fn circle(&mut self, x: f64, y: f64, radius: f64) {
		self.calls.push(DrawCall::Circle { x, y, radius });
	}

	fn fill(&mut self) {
		self.calls.push(DrawCall::Fill);
	}

	fn stroke(&mut self) {
		self.calls.push(DrawCall::Stroke);
	}

	fn fill_text(&mut self, text: &str, x: f64, y: f64) {
		self.calls.push(DrawCall::Text {
			text: text.to_string(),
			x,
			y,
		});
	}

	fn draw_image(&mut self, src: &str, x: f64, y: f64, width: f64, height: f64) {
		self.calls.push(DrawCall::Image {
			src: src.to_string(),
			x,
			y,
			width,
			height,
		});
	}
}

/// Checkbox stand-in. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryToggle {
	checked: Rc<Cell<bool>>,
	handler: Rc<RefCell<Option<Rc<dyn Fn(bool)>>>>,
}

impl MemoryToggle {
	/// Simulates the user flipping the checkbox.
	pub fn change(&self, checked: bool) {
		self.checked.set(checked);
		let handler = self.handler.borrow().clone();
		if let Some(handler) = handler {
			handler(checked);
		}
	}
}

impl ToggleControl for MemoryToggle {
	fn checked(&self) -> bool {
		self.checked.get()
	}

	fn set_checked(&self, checked: bool) {
		self.checked.set(checked);
	}

	fn on_change(&self, handler: Box<dyn Fn(bool)>) {
		*self.handler.borrow_mut() = Some(Rc::from(handler));
	}
}

/// Select box stand-in. Clones share state.
#[derive(Clone, Default)]
pub struct MemorySelect {
	value: Rc<RefCell<String>>,
	handler: Rc<RefCell<Option<Rc<dyn Fn(String)>>>>,
}

impl MemorySelect {
	/// Simulates the user picking `value`.
	pub fn change(&self, value: &str) {
		*self.value.borrow_mut() = value.to_string();
		let handler = self.handler.borrow().clone();
		if let Some(handler) = handler {
			handler(value.to_string());
		}
	}
}

impl SelectControl for MemorySelect {
	fn value(&self) -> String {
		self.value.borrow().clone()
	}

	fn set_value(&self, value: &str) {
		*self.value.borrow_mut() = value.to_string();
	}

	fn on_change(&self, handler: Box<dyn Fn(String)>) {
		*self.handler.borrow_mut() = Some(Rc::from(handler));
	}
}

#[derive(Default)]
struct HostInner {
	template: RefCell<Option<String>>,
	mounts: RefCell<Vec<MountPoint>>,
	toggles: RefCell<Vec<MemoryToggle>>,
	selects: RefCell<Vec<MemorySelect>>,
	root_class: RefCell<Option<String>>,
}

/// Template host that finds mounts and controls by scanning the markup.
#[derive(Clone, Default)]
pub struct MemoryHost {
	inner: Rc<HostInner>,
}

impl MemoryHost {
	/// Empty host.
	pub fn new() -> Self {
		Self::default()
	}

	/// Markup inserted by the last `insert_template` call.
	pub fn template(&self) -> Option<String> {
		self.inner.template.borrow().clone()
	}
}

impl TemplateHost for MemoryHost {
	type Mount = MountPoint;
	type Toggle = MemoryToggle;
	type Select = MemorySelect;

	fn insert_template(&self, html: &str) {
		let inner = &self.inner;
		*inner.template.borrow_mut() = Some(html.to_string());
		*inner.mounts.borrow_mut() = (0..html.matches("<vis-network").count())
			.map(|i| MountPoint(format!("vis-network-{i}")))
			.collect();
		*inner.toggles.borrow_mut() = (0..html.matches(r#"name="physicsEnabled""#).count())
			.map(|_| MemoryToggle::default())
			.collect();
		*inner.selects.borrow_mut() = (0..html.matches(r#"name="layout""#).count())
			.map(|_| MemorySelect::default())
			.collect();
		*inner.root_class.borrow_mut() = html
			.split_once(r#"class=""#)
			.and_then(|(_, rest)| rest.split_once('"'))
			.map(|(class, _)| class.to_string());
	}

	fn mounts(&self) -> Vec<MountPoint> {
		self.inner.mounts.borrow().clone()
	}

	fn physics_toggles(&self) -> Vec<MemoryToggle> {
		self.inner.toggles.borrow().clone()
	}

	fn layout_selectors(&self) -> Vec<MemorySelect> {
		self.inner.selects.borrow().clone()
	}

	fn root_class(&self) -> Option<String> {
		self.inner.root_class.borrow().clone()
	}

	fn set_root_class(&self, class: &str) {
		*self.inner.root_class.borrow_mut() = Some(class.to_string());
	}
}

type FetchDone = Box<dyn FnOnce(std::result::Result<String, String>)>;

/// Fetcher answering from a fixed table. Requests stay in flight until
/// [`StaticTemplates::complete_all`] is called.
#[derive(Default)]
pub struct StaticTemplates {
	responses: HashMap<String, String>,
	in_flight: RefCell<Vec<(String, FetchDone)>>,
}

impl StaticTemplates {
	/// Fetcher knowing no templates.
	pub fn new() -> Self {
		Self::default()
	}

	/// Serves `template` for `uri`.
	pub fn with(mut self, uri: &str, template: &str) -> Self {
		self.responses.insert(uri.to_string(), template.to_string());
		self
	}

	/// Requests waiting for [`StaticTemplates::complete_all`].
	pub fn in_flight(&self) -> usize {
		self.in_flight.borrow().len()
	}

	/// Answers every in-flight request; unknown URIs fail with a 404.
	pub fn complete_all(&self) {
		let requests: Vec<_> = self.in_flight.borrow_mut().drain(..).collect();
		for (uri, done) in requests {
			match self.responses.get(&uri) {
				Some(template) => done(Ok(template.clone())),
				None => done(Err(format!("404 Not Found: {uri}"))),
			}
		}
	}
}

impl TemplateFetcher for StaticTemplates {
	fn fetch(&self, uri: &str, done: FetchDone) {
		self.in_flight.borrow_mut().push((uri.to_string(), done));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn manual_scheduler_runs_tasks_in_deadline_order() {
		let clock = ManualScheduler::new();
		let log = Rc::new(RefCell::new(Vec::new()));
		for (delay, tag) in [(30, "c"), (10, "a"), (20, "b")] {
			let log = log.clone();
			clock.schedule(
				Duration::from_millis(delay),
				Box::new(move || log.borrow_mut().push(tag)),
			);
		}
		clock.advance(Duration::from_millis(20));
		assert_eq!(*log.borrow(), vec!["a", "b"]);
		assert_eq!(clock.pending(), 1);
		clock.advance(Duration::from_millis(10));
		assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
		assert_eq!(clock.now(), Duration::from_millis(30));
	}

	#[test]
	fn host_counts_mounts_and_controls() {
		let host = MemoryHost::new();
		host.insert_template(
			r#"<div class="graph plain-style"><vis-network></vis-network><input name="physicsEnabled"></div>"#,
		);
		assert_eq!(host.mounts().len(), 1);
		assert_eq!(host.physics_toggles().len(), 1);
		assert!(host.layout_selectors().is_empty());
		assert_eq!(host.root_class().as_deref(), Some("graph plain-style"));
	}
}
