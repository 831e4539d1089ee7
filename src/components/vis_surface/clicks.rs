//! Single/double click disambiguation.
//!
//! Renderers fire `click` for both clicks of a double click, followed by
//! `doubleClick`. Single clicks are therefore held back for a fixed window and
//! dropped when a double click arrives first.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// How long a single click is held back waiting for a double click.
pub const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(300);

/// Runs a task once after a delay, on the same thread.
pub trait Scheduler {
	/// Runs `task` once `delay` has elapsed.
	fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>);
}

/// Shared click state of one surface.
///
/// There is a single flag per surface rather than per click target: a double
/// click anywhere on the surface suppresses whichever single click is pending.
#[derive(Clone)]
pub struct ClickDisambiguator {
	double_clicked: Rc<Cell<bool>>,
	scheduler: Rc<dyn Scheduler>,
	window: Duration,
}

impl ClickDisambiguator {
	/// Uses the default [`DOUBLE_CLICK_WINDOW`].
	pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
		Self::with_window(scheduler, DOUBLE_CLICK_WINDOW)
	}

	/// Uses a custom hold-back window.
	pub fn with_window(scheduler: Rc<dyn Scheduler>, window: Duration) -> Self {
		Self {
			double_clicked: Rc::new(Cell::new(false)),
			scheduler,
			window,
		}
	}

	/// Raw click: `deliver` runs after the window unless a double click lands
	/// first.
	pub fn click(&self, deliver: impl FnOnce() + 'static) {
		self.double_clicked.set(false);
		let flag = self.double_clicked.clone();
		self.scheduler.schedule(
			self.window,
			Box::new(move || {
				if !flag.get() {
					deliver();
				}
			}),
		);
	}

	/// Raw double click: suppresses the pending single click and runs
	/// `deliver` immediately.
	pub fn double_click(&self, deliver: impl FnOnce()) {
		self.double_clicked.set(true);
		deliver();
	}
}
