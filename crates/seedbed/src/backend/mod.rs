//! Persistence backends.
//!
//! The engine never talks to storage directly. It hands fully resolved
//! attribute maps to a [`SeedBackend`], asks it to apply many-to-many
//! relation sets, and fetches related records by key.

pub mod memory;

pub use memory::MemoryBackend;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SeedingResult;

/// Alias used when neither the caller nor the schema names a backend.
pub const DEFAULT_ALIAS: &str = "default";

/// A stored record, as returned by [`SeedBackend::query_by_keys`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
	/// Model identifier (e.g., "auth.User").
	pub model: String,

	/// Primary key.
	pub pk: Value,

	/// Field values.
	#[serde(default)]
	pub fields: serde_json::Map<String, Value>,
}

impl Record {
	/// Creates a new record.
	pub fn new(model: impl Into<String>, pk: Value) -> Self {
		Self {
			model: model.into(),
			pk,
			fields: serde_json::Map::new(),
		}
	}

	/// Gets a field value.
	pub fn get_field(&self, name: &str) -> Option<&Value> {
		self.fields.get(name)
	}
}

/// Handle to a record that was just inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedRecord {
	/// Model identifier.
	pub model: String,

	/// Primary key assigned by the backend.
	pub pk: Value,
}

impl CreatedRecord {
	/// Creates a new handle.
	pub fn new(model: impl Into<String>, pk: Value) -> Self {
		Self {
			model: model.into(),
			pk,
		}
	}
}

/// A single create-insert.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertRequest {
	/// Model identifier.
	pub model: String,

	/// Resolved attributes in schema order. Fields without a value are absent.
	pub attributes: IndexMap<String, Value>,

	/// Auto-timestamp fields the backend must not stamp for this insert.
	pub suppress_auto_timestamps: Vec<String>,
}

impl InsertRequest {
	/// Creates a request with no attributes.
	pub fn new(model: impl Into<String>) -> Self {
		Self {
			model: model.into(),
			attributes: IndexMap::new(),
			suppress_auto_timestamps: Vec::new(),
		}
	}
}

/// Storage the seeder writes into.
///
/// Implement this for each storage layer that should receive seeded data.
/// Calls are made one at a time, in order; an implementation does not need
/// to be re-entrant.
#[async_trait]
pub trait SeedBackend: Send + Sync {
	/// Alias this backend is registered under (e.g., "default").
	fn alias(&self) -> &str;

	/// Inserts one record and returns its primary key.
	async fn insert(&self, request: InsertRequest) -> SeedingResult<Value>;

	/// Replaces the `relation` set of `record` with `keys`.
	async fn update_relation_set(
		&self,
		record: &CreatedRecord,
		relation: &str,
		keys: Vec<Value>,
	) -> SeedingResult<()>;

	/// Fetches `model` records by primary key.
	///
	/// Keys with no matching record are skipped.
	async fn query_by_keys(&self, model: &str, keys: &[Value]) -> SeedingResult<Vec<Record>>;
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_record_deserialize() {
		let record: Record = serde_json::from_value(json!({
			"model": "auth.User",
			"pk": 1,
			"fields": {"username": "admin"}
		}))
		.unwrap();

		assert_eq!(record.pk, json!(1));
		assert_eq!(record.get_field("username"), Some(&json!("admin")));
		assert_eq!(record.get_field("email"), None);
	}

	#[rstest]
	fn test_insert_request_starts_empty() {
		let request = InsertRequest::new("auth.User");
		assert!(request.attributes.is_empty());
		assert!(request.suppress_auto_timestamps.is_empty());
	}
}
