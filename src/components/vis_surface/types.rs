//! Entity records and data payloads accepted by the surfaces.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of an entity. The renderer accepts both numbers and strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
	/// Numeric id.
	Int(i64),
	/// String id.
	Str(String),
}

impl fmt::Display for EntityId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EntityId::Int(n) => write!(f, "{n}"),
			EntityId::Str(s) => f.write_str(s),
		}
	}
}

impl From<&str> for EntityId {
	fn from(s: &str) -> Self {
		EntityId::Str(s.to_string())
	}
}

impl From<String> for EntityId {
	fn from(s: String) -> Self {
		EntityId::Str(s)
	}
}

impl From<i64> for EntityId {
	fn from(n: i64) -> Self {
		EntityId::Int(n)
	}
}

impl From<i32> for EntityId {
	fn from(n: i32) -> Self {
		EntityId::Int(n.into())
	}
}

/// A node, edge, timeline item or group.
///
/// Apart from `id`, every field is caller-defined and passed through to the
/// renderer untouched. Two fields are read by the overlay renderer: `orbs`
/// (compass key to badge descriptor) and `edgeCount`/`linkCount`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
	/// Identifier, unique within a collection.
	pub id: EntityId,
	/// Every other field, passed through to the renderer.
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}

impl Entity {
	/// Entity with `id` and no other fields.
	pub fn new(id: impl Into<EntityId>) -> Self {
		Self {
			id: id.into(),
			fields: Map::new(),
		}
	}

	/// Builder-style field setter.
	pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
		self.fields.insert(key.to_string(), value.into());
		self
	}

	/// Field `key`, if present.
	pub fn field(&self, key: &str) -> Option<&Value> {
		self.fields.get(key)
	}

	/// Positive `edgeCount`, falling back to `linkCount`.
	pub fn edge_count(&self) -> Option<f64> {
		["edgeCount", "linkCount"]
			.iter()
			.filter_map(|key| self.fields.get(*key).and_then(Value::as_f64))
			.find(|n| *n != 0.0)
			.filter(|n| *n > 0.0)
	}

	/// Overwrites the fields `other` carries, keeping the rest.
	pub(crate) fn absorb(&mut self, other: &Entity) {
		for (key, value) in &other.fields {
			self.fields.insert(key.clone(), value.clone());
		}
	}
}

/// Rendered position of an entity, as reported by the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	/// Horizontal canvas coordinate.
	pub x: f64,
	/// Vertical canvas coordinate.
	pub y: f64,
}

/// Payload of a network `set_data` call.
///
/// A `None` collection leaves that collection alone; `Some(vec![])` clears it.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkData {
	/// Nodes; `None` leaves the collection alone.
	pub nodes: Option<Vec<Entity>>,
	/// Field options for the node collection.
	pub node_options: Option<Value>,
	/// Edges; `None` leaves the collection alone.
	pub edges: Option<Vec<Entity>>,
	/// Field options for the edge collection.
	pub edge_options: Option<Value>,
}

/// Payload of a timeline `set_data` call. Same semantics as [`NetworkData`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineData {
	/// Items; `None` leaves the collection alone.
	pub items: Option<Vec<Entity>>,
	/// Field options for the item collection.
	pub item_options: Option<Value>,
	/// Groups; `None` leaves the collection alone.
	pub groups: Option<Vec<Entity>>,
	/// Field options for the group collection.
	pub group_options: Option<Value>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn ids_deserialize_from_numbers_and_strings() {
		let a: Entity = serde_json::from_value(json!({ "id": 7, "label": "seven" })).unwrap();
		let b: Entity = serde_json::from_value(json!({ "id": "x" })).unwrap();
		assert_eq!(a.id, EntityId::Int(7));
		assert_eq!(a.field("label"), Some(&json!("seven")));
		assert_eq!(b.id, EntityId::Str("x".into()));
		assert_eq!(a.id.to_string(), "7");
	}

	#[test]
	fn edge_count_falls_back_to_link_count() {
		assert_eq!(Entity::new(1).with("edgeCount", 3).edge_count(), Some(3.0));
		assert_eq!(Entity::new(1).with("linkCount", 2).edge_count(), Some(2.0));
		assert_eq!(
			Entity::new(1)
				.with("edgeCount", 0)
				.with("linkCount", 4)
				.edge_count(),
			Some(4.0)
		);
		assert_eq!(Entity::new(1).with("edgeCount", -1).edge_count(), None);
		assert_eq!(Entity::new(1).edge_count(), None);
	}

	#[test]
	fn absorb_overwrites_only_supplied_fields() {
		let mut held = Entity::new("a").with("label", "old").with("group", "g1");
		held.absorb(&Entity::new("a").with("label", "new"));
		assert_eq!(held.field("label"), Some(&json!("new")));
		assert_eq!(held.field("group"), Some(&json!("g1")));
	}
}
