//! Schema registry.
//!
//! Holds the entity schemas known to a seeding session and computes a
//! dependency-respecting insertion order for a selection of them.

use indexmap::IndexMap;

use super::EntitySchema;
use crate::error::{SeedingError, SeedingResult};

/// Registry of entity schemas, keyed by model identifier.
///
/// Iteration follows registration order.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
	schemas: IndexMap<String, EntitySchema>,
}

impl SchemaRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a registry from a list of schemas.
	pub fn from_schemas(schemas: impl IntoIterator<Item = EntitySchema>) -> Self {
		let mut registry = Self::new();
		for schema in schemas {
			registry.register(schema);
		}
		registry
	}

	/// Registers a schema, replacing any previous one with the same model.
	pub fn register(&mut self, schema: EntitySchema) {
		self.schemas.insert(schema.model.clone(), schema);
	}

	/// Gets a schema by model identifier.
	pub fn get(&self, model_id: &str) -> Option<&EntitySchema> {
		self.schemas.get(model_id)
	}

	/// Gets a schema by model identifier, failing with [`SeedingError::ModelNotFound`].
	pub fn require(&self, model_id: &str) -> SeedingResult<&EntitySchema> {
		self.get(model_id)
			.ok_or_else(|| SeedingError::ModelNotFound(model_id.to_string()))
	}

	/// Checks if a schema is registered.
	pub fn has(&self, model_id: &str) -> bool {
		self.schemas.contains_key(model_id)
	}

	/// Returns all registered model identifiers in registration order.
	pub fn model_ids(&self) -> Vec<String> {
		self.schemas.keys().cloned().collect()
	}

	/// Returns the schemas whose app label is in `app_labels`.
	pub fn filter_by_app(&self, app_labels: &[&str]) -> Vec<&EntitySchema> {
		self.schemas
			.values()
			.filter(|schema| {
				schema
					.app_label()
					.map(|app| app_labels.contains(&app))
					.unwrap_or(false)
			})
			.collect()
	}

	/// Clears all registered schemas.
	pub fn clear(&mut self) {
		self.schemas.clear();
	}

	/// Returns the number of registered schemas.
	pub fn len(&self) -> usize {
		self.schemas.len()
	}

	/// Returns true if no schemas are registered.
	pub fn is_empty(&self) -> bool {
		self.schemas.is_empty()
	}

	/// Orders `models` so that every model comes after the models it points at.
	///
	/// Relations to models outside `models` and self-references are ignored.
	/// The order is stable: among models that are ready at the same time the
	/// one listed first wins. When only nullable relations form a cycle they
	/// are dropped for ordering purposes; a cycle of required relations is a
	/// configuration error.
	pub fn insertion_order(&self, models: &[String]) -> SeedingResult<Vec<String>> {
		let mut pending: Vec<&EntitySchema> = models
			.iter()
			.map(|model| self.require(model))
			.collect::<SeedingResult<_>>()?;
		let mut ordered: Vec<String> = Vec::with_capacity(pending.len());

		let ready = |schema: &EntitySchema, placed: &[String], required_only: bool| {
			schema
				.dependencies(required_only)
				.into_iter()
				.filter(|dep| models.iter().any(|m| m == dep))
				.all(|dep| placed.iter().any(|p| p == dep))
		};

		while !pending.is_empty() {
			let next = pending
				.iter()
				.position(|schema| ready(schema, &ordered, false))
				.or_else(|| {
					pending
						.iter()
						.position(|schema| ready(schema, &ordered, true))
				});

			match next {
				Some(idx) => {
					let schema = pending.remove(idx);
					ordered.push(schema.model.clone());
				}
				None => {
					let stuck: Vec<&str> = pending.iter().map(|s| s.model.as_str()).collect();
					return Err(SeedingError::configuration(format!(
						"Required relations form a cycle between: {}",
						stuck.join(", ")
					)));
				}
			}
		}

		Ok(ordered)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schema::{FieldSchema, FieldType};
	use rstest::{fixture, rstest};

	#[fixture]
	fn registry() -> SchemaRegistry {
		SchemaRegistry::from_schemas([
			EntitySchema::new(
				"blog.Comment",
				vec![
					FieldSchema::foreign_key("post", "blog.Post"),
					FieldSchema::foreign_key("author", "auth.User"),
					FieldSchema::foreign_key("parent", "blog.Comment").nullable(),
				],
			),
			EntitySchema::new(
				"blog.Post",
				vec![
					FieldSchema::foreign_key("author", "auth.User"),
					FieldSchema::many_to_many("tags", "blog.Tag"),
				],
			),
			EntitySchema::new("blog.Tag", vec![FieldSchema::new("name", FieldType::Slug)]),
			EntitySchema::new(
				"auth.User",
				vec![FieldSchema::new("email", FieldType::Email)],
			),
		])
	}

	#[rstest]
	fn test_register_and_get(registry: SchemaRegistry) {
		assert_eq!(registry.len(), 4);
		assert!(registry.has("blog.Post"));
		assert!(!registry.has("blog.Missing"));
		assert!(registry.get("auth.User").is_some());
		assert!(matches!(
			registry.require("blog.Missing"),
			Err(SeedingError::ModelNotFound(_))
		));
	}

	#[rstest]
	fn test_register_replaces_existing(mut registry: SchemaRegistry) {
		registry.register(EntitySchema::new("blog.Tag", vec![]));
		assert_eq!(registry.len(), 4);
		assert!(registry.get("blog.Tag").unwrap().fields.is_empty());
		// Position is kept.
		assert_eq!(registry.model_ids()[2], "blog.Tag");
	}

	#[rstest]
	fn test_filter_by_app(registry: SchemaRegistry) {
		let blog = registry.filter_by_app(&["blog"]);
		assert_eq!(blog.len(), 3);
		assert!(registry.filter_by_app(&["shop"]).is_empty());
	}

	#[rstest]
	fn test_insertion_order_respects_dependencies(registry: SchemaRegistry) {
		let order = registry.insertion_order(&registry.model_ids()).unwrap();
		assert_eq!(order, vec!["blog.Tag", "auth.User", "blog.Post", "blog.Comment"]);
	}

	#[rstest]
	fn test_insertion_order_ignores_unselected_models(registry: SchemaRegistry) {
		let order = registry
			.insertion_order(&["blog.Post".to_string(), "blog.Tag".to_string()])
			.unwrap();
		assert_eq!(order, vec!["blog.Tag", "blog.Post"]);
	}

	#[rstest]
	fn test_insertion_order_breaks_nullable_cycle() {
		let registry = SchemaRegistry::from_schemas([
			EntitySchema::new(
				"org.Team",
				vec![FieldSchema::foreign_key("lead", "org.Member").nullable()],
			),
			EntitySchema::new(
				"org.Member",
				vec![FieldSchema::foreign_key("team", "org.Team")],
			),
		]);

		let order = registry.insertion_order(&registry.model_ids()).unwrap();
		assert_eq!(order, vec!["org.Team", "org.Member"]);
	}

	#[rstest]
	fn test_insertion_order_rejects_required_cycle() {
		let registry = SchemaRegistry::from_schemas([
			EntitySchema::new("a.A", vec![FieldSchema::foreign_key("b", "a.B")]),
			EntitySchema::new("a.B", vec![FieldSchema::one_to_one("a", "a.A")]),
		]);

		let result = registry.insertion_order(&registry.model_ids());
		assert!(matches!(result, Err(SeedingError::Configuration(_))));
	}

	#[rstest]
	fn test_clear(mut registry: SchemaRegistry) {
		registry.clear();
		assert!(registry.is_empty());
	}
}
