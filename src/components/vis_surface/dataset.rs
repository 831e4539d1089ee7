//! Keyed entity collections and the reconcile operation.
//!
//! A collection is a shared handle: the surface and its renderer hold the same
//! collection, so changes made through the surface are seen by the renderer
//! without an explicit push.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use log::debug;
use serde_json::Value;

use super::types::{Entity, EntityId};

/// A keyed, ordered collection of entities shared with a renderer.
pub trait EntityStore {
	/// Ids in insertion order.
	fn ids(&self) -> Vec<EntityId>;
	/// Inserts unseen ids, overwrites the supplied fields of known ones.
	fn update(&self, entities: &[Entity]);
	/// Removes the given ids; unknown ids are ignored.
	fn remove(&self, ids: &[EntityId]);
	/// Per-field options of the collection (e.g. value converters).
	fn set_options(&self, options: &Value);
	/// Snapshot of the current entities in insertion order.
	fn entities(&self) -> Vec<Entity>;

	/// Number of entities held.
	fn len(&self) -> usize {
		self.ids().len()
	}

	/// Whether no entity is held.
	fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Outcome of a [`reconcile`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reconciled {
	/// Ids dropped because they were not in the incoming list.
	pub removed: usize,
	/// Incoming entities inserted or overwritten.
	pub upserted: usize,
}

/// Makes the id-set of `store` equal to the id-set of `incoming`.
///
/// Ids missing from `incoming` are removed, everything in `incoming` is
/// upserted. An empty `incoming` clears the store. Which fields actually changed
/// is not reported.
pub fn reconcile<S: EntityStore + ?Sized>(store: &S, incoming: &[Entity]) -> Reconciled {
	let wanted: HashSet<&EntityId> = incoming.iter().map(|e| &e.id).collect();
	let missing: Vec<EntityId> = store
		.ids()
		.into_iter()
		.filter(|id| !wanted.contains(id))
		.collect();

	if !missing.is_empty() {
		store.remove(&missing);
	}
	store.update(incoming);

	debug!(
		"vis-surface: reconciled {} entities, removed {}",
		incoming.len(),
		missing.len()
	);
	Reconciled {
		removed: missing.len(),
		upserted: incoming.len(),
	}
}

#[derive(Debug, Default)]
struct DataSetInner {
	order: Vec<EntityId>,
	entries: HashMap<EntityId, Entity>,
	options: Value,
}

/// In-memory [`EntityStore`]. Cloning yields another handle to the same data.
#[derive(Clone, Debug, Default)]
pub struct DataSet {
	inner: Rc<RefCell<DataSetInner>>,
}

impl DataSet {
	/// Empty collection.
	pub fn new() -> Self {
		Self::default()
	}

	/// Collection holding `entities`.
	pub fn from_entities(entities: &[Entity]) -> Self {
		let set = Self::new();
		set.update(entities);
		set
	}

	/// Entity with `id`, cloned.
	pub fn get(&self, id: &EntityId) -> Option<Entity> {
		self.inner.borrow().entries.get(id).cloned()
	}

	/// Last options set on the collection, `Null` if none.
	pub fn options(&self) -> Value {
		self.inner.borrow().options.clone()
	}

	/// True when both handles point at the same collection.
	pub fn same_as(&self, other: &DataSet) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl EntityStore for DataSet {
	fn ids(&self) -> Vec<EntityId> {
		self.inner.borrow().order.clone()
	}

	fn update(&self, entities: &[Entity]) {
		let mut inner = self.inner.borrow_mut();
		for entity in entities {
			match inner.entries.get_mut(&entity.id) {
				Some(held) => held.absorb(entity),
				None => {
					inner.order.push(entity.id.clone());
					inner.entries.insert(entity.id.clone(), entity.clone());
				}
			}
		}
	}

	fn remove(&self, ids: &[EntityId]) {
		let mut inner = self.inner.borrow_mut();
		let gone: HashSet<&EntityId> = ids.iter().collect();
		inner.order.retain(|id| !gone.contains(id));
		for id in ids {
			inner.entries.remove(id);
		}
	}

	fn set_options(&self, options: &Value) {
		self.inner.borrow_mut().options = options.clone();
	}

	fn entities(&self) -> Vec<Entity> {
		let inner = self.inner.borrow();
		inner
			.order
			.iter()
			.filter_map(|id| inner.entries.get(id).cloned())
			.collect()
	}

	fn len(&self) -> usize {
		self.inner.borrow().order.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	fn ids(store: &DataSet) -> Vec<EntityId> {
		store.ids()
	}

	#[test]
	fn reconcile_removes_missing_and_upserts_the_rest() {
		let store = DataSet::from_entities(&[
			Entity::new("a").with("label", "A"),
			Entity::new("b").with("label", "B"),
		]);
		let outcome = reconcile(
			&store,
			&[Entity::new("b").with("label", "B2"), Entity::new("c")],
		);

		assert_eq!(outcome, Reconciled { removed: 1, upserted: 2 });
		assert_eq!(ids(&store), vec!["b".into(), "c".into()]);
		assert_eq!(
			store.get(&"b".into()).unwrap().field("label"),
			Some(&json!("B2"))
		);
	}

	#[test]
	fn reconcile_with_empty_incoming_clears() {
		let store = DataSet::from_entities(&[Entity::new(1), Entity::new(2)]);
		reconcile(&store, &[]);
		assert!(store.is_empty());
	}

	#[test]
	fn update_keeps_unsupplied_fields() {
		let store = DataSet::from_entities(&[Entity::new(1).with("x", 1).with("y", 2)]);
		store.update(&[Entity::new(1).with("x", 5)]);
		let held = store.get(&1.into()).unwrap();
		assert_eq!(held.field("x"), Some(&json!(5)));
		assert_eq!(held.field("y"), Some(&json!(2)));
	}

	#[test]
	fn clones_share_contents() {
		let a = DataSet::new();
		let b = a.clone();
		a.update(&[Entity::new("n")]);
		assert_eq!(b.len(), 1);
		assert!(a.same_as(&b));
		assert!(!a.same_as(&DataSet::new()));
	}

	proptest! {
		#[test]
		fn reconcile_leaves_exactly_the_incoming_ids(
			held in prop::collection::btree_set(0i64..20, 0..10),
			incoming in prop::collection::btree_set(0i64..20, 0..10),
		) {
			let store = DataSet::from_entities(
				&held.iter().map(|id| Entity::new(*id).with("v", "old")).collect::<Vec<_>>(),
			);
			let incoming: Vec<Entity> =
				incoming.iter().map(|id| Entity::new(*id).with("v", "new")).collect();
			reconcile(&store, &incoming);

			let got: HashSet<EntityId> = store.ids().into_iter().collect();
			let want: HashSet<EntityId> = incoming.iter().map(|e| e.id.clone()).collect();
			prop_assert_eq!(got, want);
			for entity in store.entities() {
				prop_assert_eq!(entity.field("v"), Some(&json!("new")));
			}
		}
	}
}
