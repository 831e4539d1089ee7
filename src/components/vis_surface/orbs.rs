//! Orb badges: small decorated circles drawn around rendered nodes.
//!
//! Each node may declare up to eight orbs keyed by compass position. On every
//! draw cycle the overlay is planned from the node's rendered position into a
//! list of [`Badge`]s, which are then painted through a [`DrawContext`].
//! Planning is separate from painting so geometry can be inspected without a
//! canvas.
//!
//! Nodes with a positive `edgeCount` (or `linkCount`) and no NW orb get one
//! synthesized, labelled with the count.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::SurfaceError;
use super::types::{Entity, Position};

/// Offset for a badge on a single axis (N, E, S, W).
const AXIS_OFFSET: f64 = 30.0;
/// Offset on each axis for a diagonal badge. Smaller than [`AXIS_OFFSET`] so
/// diagonal badges sit on roughly the same circle as the axis ones.
const DIAGONAL_OFFSET: f64 = 22.0;
/// Size assumed for an orb with no label and no explicit dimensions.
const DEFAULT_SIZE: f64 = 10.0;
const MIN_RADIUS: f64 = 10.0;
const RADIUS_PADDING: f64 = 2.0;
const DEFAULT_FONT: &str = "10px Ludica";
const DEFAULT_LINE_STYLE: &str = "white";
const DEFAULT_TEXT_COLOR: &str = "white";
const DEFAULT_LINE_WIDTH: f64 = 1.0;

/// Badge position around a node.
///
/// Variants are ordered clockwise from north; badges are painted in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Compass {
	/// Above.
	N,
	/// Above right.
	NE,
	/// Right.
	E,
	/// Below right.
	SE,
	/// Below.
	S,
	/// Below left.
	SW,
	/// Left.
	W,
	/// Above left; also where the edge count goes.
	NW,
}

impl Compass {
	/// Drawing order.
	pub const ALL: [Compass; 8] = [
		Compass::N,
		Compass::NE,
		Compass::E,
		Compass::SE,
		Compass::S,
		Compass::SW,
		Compass::W,
		Compass::NW,
	];

	/// Key as written in an entity's `orbs` map.
	pub fn as_str(self) -> &'static str {
		match self {
			Compass::N => "N",
			Compass::NE => "NE",
			Compass::E => "E",
			Compass::SE => "SE",
			Compass::S => "S",
			Compass::SW => "SW",
			Compass::W => "W",
			Compass::NW => "NW",
		}
	}

	/// Pixel offset of the badge centre from the node centre. Screen y grows
	/// downwards, so north is negative.
	pub fn offset(self) -> (f64, f64) {
		let (d, a) = (DIAGONAL_OFFSET, AXIS_OFFSET);
		match self {
			Compass::N => (0.0, -a),
			Compass::NE => (d, -d),
			Compass::E => (a, 0.0),
			Compass::SE => (d, d),
			Compass::S => (0.0, a),
			Compass::SW => (-d, d),
			Compass::W => (-a, 0.0),
			Compass::NW => (-d, -d),
		}
	}

	/// Built-in fill colour: light tones on the diagonals, dark on the axes.
	pub fn default_color(self) -> &'static str {
		match self {
			Compass::NW => "#848484",
			Compass::NE => "#428484",
			Compass::SW => "#844284",
			Compass::SE => "#848442",
			Compass::N => "#424284",
			Compass::E => "#428442",
			Compass::S => "#844242",
			Compass::W => "#424242",
		}
	}
}

impl fmt::Display for Compass {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Compass {
	type Err = SurfaceError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Compass::ALL
			.into_iter()
			.find(|c| c.as_str() == s)
			.ok_or_else(|| SurfaceError::Misuse(format!("unknown compass key `{s}`")))
	}
}

/// Fill colour per compass key, used when an orb has no `background`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrbColors(BTreeMap<Compass, String>);

impl Default for OrbColors {
	fn default() -> Self {
		Self(
			Compass::ALL
				.into_iter()
				.map(|c| (c, c.default_color().to_string()))
				.collect(),
		)
	}
}

impl OrbColors {
	/// Colour for `compass`.
	pub fn get(&self, compass: Compass) -> &str {
		self.0
			.get(&compass)
			.map(String::as_str)
			.unwrap_or_else(|| compass.default_color())
	}

	/// Overrides the colour for `compass`.
	pub fn set(&mut self, compass: Compass, color: impl Into<String>) {
		self.0.insert(compass, color.into());
	}
}

impl<S: Into<String>> Extend<(Compass, S)> for OrbColors {
	fn extend<T: IntoIterator<Item = (Compass, S)>>(&mut self, iter: T) {
		for (compass, color) in iter {
			self.set(compass, color);
		}
	}
}

/// Accepts numbers and booleans as labels, rendering them as text.
fn label_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
	Ok(match Option::<Value>::deserialize(d)? {
		Some(Value::String(s)) => Some(s),
		Some(Value::Number(n)) => Some(n.to_string()),
		Some(Value::Bool(b)) => Some(b.to_string()),
		_ => None,
	})
}

/// Badge descriptor as declared on an entity's `orbs` field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Orb {
	/// Text shown in the badge; numbers are accepted.
	#[serde(default, deserialize_with = "label_text")]
	pub label: Option<String>,
	/// Image URL, drawn when there is no label.
	pub image: Option<String>,
	/// Canvas font, `10px Ludica` when unset.
	pub font: Option<String>,
	/// Badge width, used for the radius and image size.
	pub width: Option<f64>,
	/// Badge height, used when there is no label.
	pub height: Option<f64>,
	/// Stroke colour of the circle.
	pub line_style: Option<String>,
	/// Fill colour of the circle.
	pub background: Option<String>,
	/// Stroke width, 1 when unset.
	pub line_width: Option<f64>,
	/// Label colour, `white` when unset.
	pub text_color: Option<String>,
}

impl Orb {
	/// Badge showing `text`.
	pub fn label(text: impl Into<String>) -> Self {
		Self {
			label: Some(text.into()),
			..Self::default()
		}
	}

	/// Badge showing the image at `src`.
	pub fn image(src: impl Into<String>) -> Self {
		Self {
			image: Some(src.into()),
			..Self::default()
		}
	}

	fn text(&self) -> Option<&str> {
		self.label.as_deref().filter(|l| !l.is_empty())
	}
}

/// Zero and NaN count as "not set", like an unset dimension.
fn set(value: Option<f64>) -> Option<f64> {
	value.filter(|v| *v != 0.0 && !v.is_nan())
}

/// Width and height of a piece of text in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextMetrics {
	/// Advance width in pixels.
	pub width: f64,
	/// Ascent plus descent in pixels.
	pub height: f64,
}

/// Text measurement, provided by the drawing backend.
pub trait TextMeasure {
	/// Measures `text` drawn with `font`.
	fn measure_text(&mut self, text: &str, font: &str) -> TextMetrics;
}

/// The drawing surface handed to `afterDrawing` handlers.
pub trait DrawContext: TextMeasure {
	/// Sets the stroke colour.
	fn set_stroke_style(&mut self, style: &str);
	/// Sets the fill colour.
	fn set_fill_style(&mut self, style: &str);
	/// Sets the stroke width.
	fn set_line_width(&mut self, width: f64);
	/// Sets the font used by text calls.
	fn set_font(&mut self, font: &str);
	/// Starts a new path holding one full circle.
	fn circle(&mut self, x: f64, y: f64, radius: f64);
	/// Fills the current path.
	fn fill(&mut self);
	/// Strokes the current path.
	fn stroke(&mut self);
	/// Draws `text` at `(x, y)` with the current fill style.
	fn fill_text(&mut self, text: &str, x: f64, y: f64);
	/// Best effort: an image that is not loaded (yet) draws nothing.
	fn draw_image(&mut self, src: &str, x: f64, y: f64, width: f64, height: f64);
}

/// What is drawn inside a badge circle.
#[derive(Clone, Debug, PartialEq)]
pub enum BadgeContent {
	/// Circle only.
	Empty,
	/// Text label.
	Label {
		/// Label text.
		text: String,
		/// Canvas font.
		font: String,
		/// Fill colour of the text.
		color: String,
		/// Text anchor x.
		x: f64,
		/// Text anchor y, lifted by a third of the text height.
		y: f64,
	},
	/// Image scaled to the badge.
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

/// A fully resolved badge, ready to paint.
#[derive(Clone, Debug, PartialEq)]
pub struct Badge {
	/// Position key the badge belongs to.
	pub compass: Compass,
	/// Centre x.
	pub x: f64,
	/// Centre y.
	pub y: f64,
	/// Circle radius.
	pub radius: f64,
	/// Circle fill colour.
	pub fill: String,
	/// Circle stroke colour.
	pub stroke: String,
	/// Circle stroke width.
	pub line_width: f64,
	/// What is drawn inside the circle.
	pub content: BadgeContent,
}

/// Orbs declared on `entity`, plus the synthesized edge-count orb.
///
/// Keys that are not compass positions and descriptors that do not parse are
/// skipped.
pub fn entity_orbs(entity: &Entity) -> BTreeMap<Compass, Orb> {
	let mut orbs = BTreeMap::new();
	if let Some(Value::Object(declared)) = entity.field("orbs") {
		for (key, value) in declared {
			let Ok(compass) = key.parse::<Compass>() else {
				debug!("vis-surface: ignoring orb `{}` on {}", key, entity.id);
				continue;
			};
			match serde_json::from_value::<Orb>(value.clone()) {
				Ok(orb) => {
					orbs.insert(compass, orb);
				}
				Err(e) => debug!("vis-surface: bad orb {} on {}: {}", key, entity.id, e),
			}
		}
	}

	if let Some(count) = entity.edge_count() {
		orbs.entry(Compass::NW)
			.or_insert_with(|| Orb::label(format_count(count)));
	}
	orbs
}

fn format_count(count: f64) -> String {
	if count.fract() == 0.0 && count.abs() < i64::MAX as f64 {
		format!("{}", count as i64)
	} else {
		count.to_string()
	}
}

/// Resolves one orb at `compass` around `center` into a [`Badge`].
pub fn plan_badge<M: TextMeasure + ?Sized>(
	compass: Compass,
	orb: &Orb,
	center: Position,
	colors: &OrbColors,
	measure: &mut M,
) -> Badge {
	let (dx, dy) = compass.offset();
	let (x, y) = (center.x + dx, center.y + dy);
	let font = orb.font.clone().unwrap_or_else(|| DEFAULT_FONT.to_string());

	let metrics = match orb.text() {
		Some(text) => measure.measure_text(text, &font),
		None => TextMetrics {
			width: set(orb.width).unwrap_or(DEFAULT_SIZE),
			height: set(orb.height).unwrap_or(DEFAULT_SIZE),
		},
	};
	let span = set(orb.width)
		.or_else(|| set(Some(metrics.width.max(metrics.height))))
		.unwrap_or(DEFAULT_SIZE);
	let radius = (span / 2.0).round() + RADIUS_PADDING;

	let content = if let Some(text) = orb.text() {
		BadgeContent::Label {
			text: text.to_string(),
			font,
			color: orb
				.text_color
				.clone()
				.unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string()),
			x,
			y: y - metrics.height / 3.0,
		}
	} else if let Some(src) = orb.image.as_deref().filter(|s| !s.is_empty()) {
		BadgeContent::Image {
			src: src.to_string(),
			x: x - metrics.width / 2.0,
			y: y - metrics.height / 2.0,
			width: metrics.width,
			height: metrics.height,
		}
	} else {
		BadgeContent::Empty
	};

	Badge {
		compass,
		x,
		y,
		radius: radius.max(MIN_RADIUS),
		fill: orb
			.background
			.clone()
			.unwrap_or_else(|| colors.get(compass).to_string()),
		stroke: orb
			.line_style
			.clone()
			.unwrap_or_else(|| DEFAULT_LINE_STYLE.to_string()),
		line_width: set(orb.line_width).unwrap_or(DEFAULT_LINE_WIDTH),
		content,
	}
}

/// All badges of one node rendered at `center`, in compass order.
pub fn plan_badges<M: TextMeasure + ?Sized>(
	entity: &Entity,
	center: Position,
	colors: &OrbColors,
	measure: &mut M,
) -> Vec<Badge> {
	entity_orbs(entity)
		.iter()
		.map(|(compass, orb)| plan_badge(*compass, orb, center, colors, measure))
		.collect()
}

/// Circle first, then its label or image on top.
pub fn paint_badge(ctx: &mut dyn DrawContext, badge: &Badge) {
	ctx.set_stroke_style(&badge.stroke);
	ctx.set_fill_style(&badge.fill);
	ctx.set_line_width(badge.line_width);
	ctx.circle(badge.x, badge.y, badge.radius);
	ctx.fill();
	ctx.stroke();

	match &badge.content {
		BadgeContent::Empty => {}
		BadgeContent::Label {
			text,
			font,
			color,
			x,
			y,
		} => {
			ctx.set_font(font);
			ctx.set_fill_style(color);
			ctx.fill_text(text, *x, *y);
		}
		BadgeContent::Image {
			src,
			x,
			y,
			width,
			height,
		} => ctx.draw_image(src, *x, *y, *width, *height),
	}
}

/// Paints the orbs of every node that has a rendered position.
///
/// `positions` is keyed by the string form of the entity id, as renderers
/// report it. Returns the number of badges painted.
pub fn draw_orbs<'a>(
	ctx: &mut dyn DrawContext,
	nodes: impl IntoIterator<Item = &'a Entity>,
	positions: &HashMap<String, Position>,
	colors: &OrbColors,
) -> usize {
	let mut painted = 0;
	for node in nodes {
		let Some(center) = positions.get(&node.id.to_string()) else {
			continue;
		};
		for badge in plan_badges(node, *center, colors, &mut *ctx) {
			paint_badge(ctx, &badge);
			painted += 1;
		}
	}
	painted
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	/// Every character is 6px wide, text is 12px tall.
	struct FixedMeasure;

	impl TextMeasure for FixedMeasure {
		fn measure_text(&mut self, text: &str, _font: &str) -> TextMetrics {
			TextMetrics {
				width: 6.0 * text.chars().count() as f64,
				height: 12.0,
			}
		}
	}

	fn at(x: f64, y: f64) -> Position {
		Position { x, y }
	}

	#[test]
	fn offsets_are_longer_on_pure_axes() {
		assert_eq!(Compass::N.offset(), (0.0, -30.0));
		assert_eq!(Compass::E.offset(), (30.0, 0.0));
		assert_eq!(Compass::SW.offset(), (-22.0, 22.0));
		assert_eq!(Compass::NW.offset(), (-22.0, -22.0));
	}

	#[test]
	fn edge_count_synthesizes_a_north_west_label() {
		let node = Entity::new("a").with("edgeCount", 3);
		let badges = plan_badges(&node, at(100.0, 100.0), &OrbColors::default(), &mut FixedMeasure);
		assert_eq!(badges.len(), 1);
		let badge = &badges[0];
		assert_eq!(badge.compass, Compass::NW);
		assert_eq!((badge.x, badge.y), (78.0, 78.0));
		assert_eq!(badge.fill, "#848484");
		match &badge.content {
			BadgeContent::Label { text, .. } => assert_eq!(text, "3"),
			other => panic!("expected label, got {other:?}"),
		}
	}

	#[test]
	fn declared_north_west_orb_wins_over_edge_count() {
		let node = Entity::new("a")
			.with("edgeCount", 3)
			.with("orbs", json!({ "NW": { "label": "x" } }));
		let orbs = entity_orbs(&node);
		assert_eq!(orbs.len(), 1);
		assert_eq!(orbs[&Compass::NW].label.as_deref(), Some("x"));
	}

	#[test]
	fn edge_count_badge_joins_other_declared_orbs() {
		let node = Entity::new("a")
			.with("edgeCount", 3)
			.with("orbs", json!({ "N": { "label": "n" } }));
		let badges = plan_badges(&node, at(0.0, 0.0), &OrbColors::default(), &mut FixedMeasure);
		let compasses: Vec<Compass> = badges.iter().map(|badge| badge.compass).collect();
		assert_eq!(compasses, vec![Compass::N, Compass::NW]);
		assert!(matches!(&badges[1].content, BadgeContent::Label { text, .. } if text == "3"));
	}

	#[test]
	fn north_label_is_centred_thirty_pixels_up() {
		let node = Entity::new(1).with("orbs", json!({ "N": { "label": "x" } }));
		let badges = plan_badges(&node, at(50.0, 80.0), &OrbColors::default(), &mut FixedMeasure);
		assert_eq!((badges[0].x, badges[0].y), (50.0, 50.0));
		assert_eq!(
			badges[0].content,
			BadgeContent::Label {
				text: "x".into(),
				font: "10px Ludica".into(),
				color: "white".into(),
				x: 50.0,
				y: 46.0,
			}
		);
	}

	#[test]
	fn radius_tracks_label_width_with_a_floor() {
		let colors = OrbColors::default();
		let short = plan_badge(Compass::E, &Orb::label("1"), at(0.0, 0.0), &colors, &mut FixedMeasure);
		let long = plan_badge(
			Compass::E,
			&Orb::label("12345678"),
			at(0.0, 0.0),
			&colors,
			&mut FixedMeasure,
		);
		assert_eq!(short.radius, 10.0);
		// 48px wide label: 24 + 2
		assert_eq!(long.radius, 26.0);
	}

	#[test]
	fn image_orb_uses_declared_size() {
		let orb = Orb {
			width: Some(16.0),
			height: Some(8.0),
			..Orb::image("icon.png")
		};
		let badge = plan_badge(Compass::S, &orb, at(0.0, 0.0), &OrbColors::default(), &mut FixedMeasure);
		assert_eq!(
			badge.content,
			BadgeContent::Image {
				src: "icon.png".into(),
				x: -8.0,
				y: 26.0,
				width: 16.0,
				height: 8.0,
			}
		);
	}

	#[test]
	fn overrides_replace_palette_defaults() {
		let mut colors = OrbColors::default();
		colors.set(Compass::W, "#000000");
		let plain = plan_badge(Compass::W, &Orb::default(), at(0.0, 0.0), &colors, &mut FixedMeasure);
		assert_eq!(plain.fill, "#000000");
		assert_eq!(plain.stroke, "white");
		assert_eq!(plain.content, BadgeContent::Empty);

		let styled: Orb = serde_json::from_value(json!({
			"label": 7,
			"background": "red",
			"lineStyle": "black",
			"lineWidth": 3,
			"textColor": "yellow"
		}))
		.unwrap();
		let badge = plan_badge(Compass::W, &styled, at(0.0, 0.0), &colors, &mut FixedMeasure);
		assert_eq!(badge.fill, "red");
		assert_eq!(badge.stroke, "black");
		assert_eq!(badge.line_width, 3.0);
		assert!(matches!(badge.content, BadgeContent::Label { ref text, ref color, .. } if text == "7" && color == "yellow"));
	}

	#[test]
	fn unknown_compass_keys_are_skipped() {
		let node = Entity::new(1).with("orbs", json!({ "UP": { "label": "?" }, "S": {} }));
		let orbs = entity_orbs(&node);
		assert_eq!(orbs.keys().copied().collect::<Vec<_>>(), vec![Compass::S]);
	}
}
