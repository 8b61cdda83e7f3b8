//! Run-scoped index of inserted primary keys.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Primary keys inserted so far in a run, per model, in insertion order.
///
/// Append-only while a run is in progress. Relation resolution reads it by
/// reference, so a record can point at any record inserted before it,
/// including earlier records of its own model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InsertedRecords {
	keys: IndexMap<String, Vec<Value>>,
}

impl InsertedRecords {
	/// Creates an empty index.
	pub fn new() -> Self {
		Self::default()
	}

	/// Makes sure `model` has an entry, even if nothing gets inserted.
	pub fn ensure(&mut self, model: &str) {
		if !self.keys.contains_key(model) {
			self.keys.insert(model.to_string(), Vec::new());
		}
	}

	/// Appends a key for `model`.
	pub fn push(&mut self, model: &str, pk: Value) {
		match self.keys.get_mut(model) {
			Some(keys) => keys.push(pk),
			None => {
				self.keys.insert(model.to_string(), vec![pk]);
			}
		}
	}

	/// Keys inserted for `model`, empty if none.
	pub fn get(&self, model: &str) -> &[Value] {
		self.keys.get(model).map(Vec::as_slice).unwrap_or(&[])
	}

	/// Returns true if at least one `model` record was inserted.
	pub fn has_any(&self, model: &str) -> bool {
		!self.get(model).is_empty()
	}

	/// Number of keys for `model`.
	pub fn count(&self, model: &str) -> usize {
		self.get(model).len()
	}

	/// Models in first-seen order.
	pub fn models(&self) -> impl Iterator<Item = &str> {
		self.keys.keys().map(String::as_str)
	}

	/// Iterates `(model, keys)` pairs in first-seen order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
		self.keys.iter().map(|(m, k)| (m.as_str(), k.as_slice()))
	}

	/// Total number of keys across all models.
	pub fn total(&self) -> usize {
		self.keys.values().map(Vec::len).sum()
	}

	/// Consumes the index into its underlying map.
	pub fn into_inner(self) -> IndexMap<String, Vec<Value>> {
		self.keys
	}
}
