//! In-memory backend.
//!
//! Keeps every model in an ordered table with auto-increment integer keys.
//! Useful for development and for tests that only care about what the
//! seeder would have written.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::{Value, json};

use super::{CreatedRecord, DEFAULT_ALIAS, InsertRequest, Record, SeedBackend};
use crate::error::{SeedingError, SeedingResult};

#[derive(Debug, Default)]
struct Table {
	next_id: i64,
	rows: IndexMap<i64, Record>,
}

/// [`SeedBackend`] that stores records in memory.
///
/// # Example
///
/// ```
/// use seedbed::backend::{InsertRequest, MemoryBackend, SeedBackend};
///
/// # tokio_test::block_on(async {
/// let backend = MemoryBackend::new();
/// let pk = backend.insert(InsertRequest::new("auth.User")).await.unwrap();
/// assert_eq!(pk, serde_json::json!(1));
/// assert_eq!(backend.count("auth.User"), 1);
/// # });
/// ```
#[derive(Debug)]
pub struct MemoryBackend {
	alias: String,
	tables: RwLock<HashMap<String, Table>>,
	auto_timestamps: HashMap<String, Vec<String>>,
	requests: RwLock<Vec<InsertRequest>>,
}

impl MemoryBackend {
	/// Creates a backend registered as `"default"`.
	pub fn new() -> Self {
		Self::with_alias(DEFAULT_ALIAS)
	}

	/// Creates a backend registered under `alias`.
	pub fn with_alias(alias: impl Into<String>) -> Self {
		Self {
			alias: alias.into(),
			tables: RwLock::new(HashMap::new()),
			auto_timestamps: HashMap::new(),
			requests: RwLock::new(Vec::new()),
		}
	}

	/// Declares `field` of `model` as stamped with the current time on insert.
	pub fn with_auto_timestamp(mut self, model: impl Into<String>, field: impl Into<String>) -> Self {
		self.auto_timestamps
			.entry(model.into())
			.or_default()
			.push(field.into());
		self
	}

	/// Number of stored `model` records.
	pub fn count(&self, model: &str) -> usize {
		self.tables.read().get(model).map_or(0, |t| t.rows.len())
	}

	/// All stored `model` records in insertion order.
	pub fn records(&self, model: &str) -> Vec<Record> {
		self.tables
			.read()
			.get(model)
			.map(|t| t.rows.values().cloned().collect())
			.unwrap_or_default()
	}

	/// Every insert request received so far.
	pub fn requests(&self) -> Vec<InsertRequest> {
		self.requests.read().clone()
	}

	/// Drops all data.
	pub fn clear(&self) {
		self.tables.write().clear();
		self.requests.write().clear();
	}

	fn key_of(pk: &Value) -> SeedingResult<i64> {
		pk.as_i64()
			.ok_or_else(|| SeedingError::DatabaseError(format!("Invalid primary key: {}", pk)))
	}
}

impl Default for MemoryBackend {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl SeedBackend for MemoryBackend {
	fn alias(&self) -> &str {
		&self.alias
	}

	async fn insert(&self, request: InsertRequest) -> SeedingResult<Value> {
		let mut fields: serde_json::Map<String, Value> = request
			.attributes
			.iter()
			.map(|(k, v)| (k.clone(), v.clone()))
			.collect();

		if let Some(stamped) = self.auto_timestamps.get(&request.model) {
			let now = Utc::now().to_rfc3339();
			for field in stamped {
				if !request.suppress_auto_timestamps.contains(field) {
					fields.insert(field.clone(), json!(now));
				}
			}
		}

		let pk = {
			let mut tables = self.tables.write();
			let table = tables.entry(request.model.clone()).or_default();
			table.next_id += 1;
			let id = table.next_id;
			let mut record = Record::new(request.model.clone(), json!(id));
			record.fields = fields;
			table.rows.insert(id, record);
			json!(id)
		};

		self.requests.write().push(request);
		Ok(pk)
	}

	async fn update_relation_set(
		&self,
		record: &CreatedRecord,
		relation: &str,
		keys: Vec<Value>,
	) -> SeedingResult<()> {
		let id = Self::key_of(&record.pk)?;
		let mut tables = self.tables.write();
		let row = tables
			.get_mut(&record.model)
			.and_then(|t| t.rows.get_mut(&id))
			.ok_or_else(|| {
				SeedingError::DatabaseError(format!(
					"No '{}' record with primary key {}",
					record.model, record.pk
				))
			})?;

		row.fields.insert(relation.to_string(), Value::Array(keys));
		Ok(())
	}

	async fn query_by_keys(&self, model: &str, keys: &[Value]) -> SeedingResult<Vec<Record>> {
		let tables = self.tables.read();
		let Some(table) = tables.get(model) else {
			return Ok(Vec::new());
		};

		let mut found = Vec::with_capacity(keys.len());
		for key in keys {
			if let Some(record) = table.rows.get(&Self::key_of(key)?) {
				found.push(record.clone());
			}
		}
		Ok(found)
	}
}
