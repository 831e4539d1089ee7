//! Configuration snapshots: built-in defaults and the one-level option merge.
//!
//! Options are plain JSON maps handed to the renderer as-is; keys are never
//! validated here. A patch is merged into the held snapshot one level deep:
//! when both the patch value and the held value are maps, the patch's direct
//! children replace the held children verbatim. Any other patch value replaces
//! the held value wholesale.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::error::{Result, SurfaceError};
use super::layout::{Layout, Solver};
use super::orbs::OrbColors;

/// Merges `patch` over `base` without touching either.
pub fn merge(base: &Map<String, Value>, patch: &Map<String, Value>) -> Map<String, Value> {
	let mut merged = base.clone();
	merge_into(&mut merged, patch);
	merged
}

/// In-place form of [`merge`].
pub fn merge_into(base: &mut Map<String, Value>, patch: &Map<String, Value>) {
	for (key, value) in patch {
		match (base.get_mut(key), value) {
			(Some(Value::Object(held)), Value::Object(children)) => {
				for (child, child_value) in children {
					held.insert(child.clone(), child_value.clone());
				}
			}
			_ => {
				base.insert(key.clone(), value.clone());
			}
		}
	}
}

/// Borrows `value` as an options map, rejecting scalars and sequences.
pub fn as_patch(value: &Value) -> Result<&Map<String, Value>> {
	value
		.as_object()
		.ok_or_else(|| SurfaceError::Misuse(format!("options must be a map, got {value}")))
}

/// Returns the map stored under `key`, replacing anything else found there
/// (missing, `false`, a scalar) with an empty map.
pub(crate) fn ensure_map<'a>(
	options: &'a mut Map<String, Value>,
	key: &str,
) -> &'a mut Map<String, Value> {
	let slot = options
		.entry(key.to_string())
		.or_insert_with(|| Value::Object(Map::new()));
	if !slot.is_object() {
		*slot = Value::Object(Map::new());
	}
	match slot {
		Value::Object(map) => map,
		_ => unreachable!("slot was just made a map"),
	}
}

/// Renderer options a network surface starts from.
pub fn network_options() -> Map<String, Value> {
	let options = json!({
		"layout": {
			"hierarchical": false,
			"randomSeed": 2
		},
		"manipulation": {
			"enabled": false
		},
		"interaction": {
			"navigationButtons": true
		},
		"height": "500px",
		"nodes": {
			"size": 30,
			"borderWidth": 2,
			"shadow": true,
			"borderWidthSelected": 6,
			"color": {
				"background": "white"
			},
			"font": {
				"size": 12
			}
		},
		"physics": {
			"enabled": true,
			"solver": Solver::default().as_str(),
			"forceAtlas2Based": {
				"gravitationalConstant": -200,
				"centralGravity": 0.01,
				"springLength": 100,
				"springConstant": 0.08,
				"damping": 0.4,
				"avoidOverlap": 0
			},
			"maxVelocity": 150,
			"minVelocity": 6,
			"stabilization": {
				"enabled": true,
				"iterations": 1000,
				"updateInterval": 100,
				"onlyDynamicEdges": false,
				"fit": false
			},
			"timestep": 0.5,
			"adaptiveTimestep": true
		},
		"edges": {
			"width": 2,
			"shadow": true,
			"arrows": {
				"to": {
					"enabled": true,
					"scaleFactor": 0.75
				}
			},
			"font": {
				"size": 10,
				"align": "top"
			},
			"smooth": {
				"type": "curvedCW",
				"roundness": 0.1
			}
		}
	});
	match options {
		Value::Object(map) => map,
		_ => Map::new(),
	}
}

/// Immutable defaults handed to each surface at construction.
///
/// Surfaces deep-copy what they need, so one value can be shared by any
/// number of surfaces. Deserializes from camelCase JSON; missing fields take
/// the built-in values.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurfaceDefaults {
	/// Options a network renderer starts with.
	pub network_options: Map<String, Value>,
	/// Options a timeline renderer starts with.
	pub timeline_options: Map<String, Value>,
	/// Orb colour per compass key.
	pub orb_colors: OrbColors,
	/// Initial physics flag.
	pub physics: bool,
	/// Initial solver.
	pub solver: Solver,
	/// Initial layout.
	pub layout: Layout,
}

impl Default for SurfaceDefaults {
	fn default() -> Self {
		Self {
			network_options: network_options(),
			timeline_options: Map::new(),
			orb_colors: OrbColors::default(),
			physics: true,
			solver: Solver::default(),
			layout: Layout::default(),
		}
	}
}
