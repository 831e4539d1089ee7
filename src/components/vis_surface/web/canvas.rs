//! [`DrawContext`] over a 2D canvas context.

use std::cell::RefCell;
use std::collections::HashMap;
use std::f64::consts::PI;

use log::warn;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::super::orbs::{DrawContext, TextMeasure, TextMetrics};

thread_local! {
	static IMAGES: RefCell<HashMap<String, HtmlImageElement>> = RefCell::new(HashMap::new());
}

/// Returns the cached image for `src`, starting its load on first use.
fn image(src: &str) -> Option<HtmlImageElement> {
	IMAGES.with(|images| {
		if let Some(img) = images.borrow().get(src) {
			return Some(img.clone());
		}
		let img = match HtmlImageElement::new() {
			Ok(img) => img,
			Err(err) => {
				warn!("vis-surface: cannot create image for {}: {:?}", src, err);
				return None;
			}
		};
		img.set_src(src);
		images.borrow_mut().insert(src.to_string(), img.clone());
		Some(img)
	})
}

/// Canvas handed to `afterDrawing` by the network renderer.
pub struct CanvasContext {
	ctx: CanvasRenderingContext2d,
}

impl CanvasContext {
	/// Wraps a 2D canvas context.
	pub fn new(ctx: CanvasRenderingContext2d) -> Self {
		Self { ctx }
	}
}

impl TextMeasure for CanvasContext {
	fn measure_text(&mut self, text: &str, font: &str) -> TextMetrics {
		self.ctx.save();
		self.ctx.set_font(font);
		let metrics = self.ctx.measure_text(text).ok();
		self.ctx.restore();
		match metrics {
			Some(m) => TextMetrics {
				width: m.width(),
				height: m.font_bounding_box_ascent() + m.font_bounding_box_descent(),
			},
			None => TextMetrics::default(),
		}
	}
}

impl DrawContext for CanvasContext {
	fn set_stroke_style(&mut self, style: &str) {
		self.ctx.set_stroke_style_str(style);
	}

	fn set_fill_style(&mut self, style: &str) {
		self.ctx.set_fill_style_str(style);
	}

	fn set_line_width(&mut self, width: f64) {
		self.ctx.set_line_width(width);
	}

	fn set_font(&mut self, font: &str) {
		self.ctx.set_font(font);
	}

	fn circle(&mut self, x: f64, y: f64, radius: f64) {
		self.ctx.begin_path();
		let _ = self.ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		self.ctx.close_path();
	}

	fn fill(&mut self) {
		self.ctx.fill();
	}

	fn stroke(&mut self) {
		self.ctx.stroke();
	}

	fn fill_text(&mut self, text: &str, x: f64, y: f64) {
		let _ = self.ctx.fill_text(text, x, y);
	}

	/// Images still loading are skipped; the next redraw picks them up.
	fn draw_image(&mut self, src: &str, x: f64, y: f64, width: f64, height: f64) {
		let Some(img) = image(src) else {
			return;
		};
		if img.complete() {
			let _ = self
				.ctx
				.draw_image_with_html_image_element_and_dw_and_dh(&img, x, y, width, height);
		}
	}
}
