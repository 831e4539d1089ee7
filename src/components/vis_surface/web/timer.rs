//! Click-window timer over `window.setTimeout`.

use std::time::Duration;

use log::warn;
use wasm_bindgen::prelude::*;

use super::super::clicks::Scheduler;

/// [`Scheduler`] backed by `window.setTimeout`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeoutScheduler;

impl Scheduler for TimeoutScheduler {
	fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
		let Some(window) = web_sys::window() else {
			warn!("vis-surface: no window, dropping delayed task");
			return;
		};
		let callback = Closure::once_into_js(move || task());
		let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
		if let Err(err) = window
			.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
		{
			warn!("vis-surface: setTimeout failed: {:?}", err);
		}
	}
}
