//! Single record materialisation.

use indexmap::IndexMap;
use rand::rngs::StdRng;
use serde_json::Value;
use tracing::debug;

use crate::backend::{CreatedRecord, InsertRequest, SeedBackend};
use crate::error::{SeedingError, SeedingResult};
use crate::faker::ValueGenerator;
use crate::formatter::{EntityFormatters, FieldFormatter};
use crate::inserted::InsertedRecords;
use crate::relation::RelationBuilder;
use crate::schema::EntitySchema;
use crate::unique::UniquenessTracker;

/// Builds and inserts one record at a time.
pub struct RecordBuilder<'a> {
	generator: &'a mut dyn ValueGenerator,
	relations: RelationBuilder<'a>,
}

impl<'a> RecordBuilder<'a> {
	/// Creates a builder writing through `backend`.
	pub fn new(
		backend: &'a dyn SeedBackend,
		generator: &'a mut dyn ValueGenerator,
		tracker: &'a UniquenessTracker,
		rng: &'a mut StdRng,
	) -> Self {
		Self {
			generator,
			relations: RelationBuilder::new(backend, tracker, rng),
		}
	}

	/// Builds one `schema` record and returns its primary key.
	///
	/// Attributes are resolved in order, then inserted in a single call with
	/// the schema's auto-timestamp fields suppressed. Relation sets are
	/// applied afterwards, in order.
	///
	/// # Errors
	///
	/// Fails on the first formatter that cannot be resolved. A relation set
	/// formatter that is neither [`FieldFormatter::ManyToMany`] nor
	/// [`FieldFormatter::Link`] is a [`SeedingError::Configuration`] error.
	pub async fn build(
		&mut self,
		schema: &EntitySchema,
		formatters: &EntityFormatters,
		inserted: &InsertedRecords,
	) -> SeedingResult<Value> {
		let mut attributes = IndexMap::with_capacity(formatters.attributes.len());
		for (name, formatter) in &formatters.attributes {
			if let Some(value) = self.resolve(schema, name, formatter, inserted).await? {
				attributes.insert(name.clone(), value);
			}
		}

		let request = InsertRequest {
			model: schema.model.clone(),
			attributes,
			suppress_auto_timestamps: schema.auto_timestamp_fields(),
		};
		let pk = self.relations.backend().insert(request).await?;
		debug!(model = %schema.model, pk = %pk, "Inserted record");

		let created = CreatedRecord::new(&schema.model, pk.clone());
		for (name, formatter) in &formatters.relation_sets {
			match formatter {
				FieldFormatter::ManyToMany(target) => {
					self.relations
						.many_to_many(target, &created, inserted)
						.await?;
				}
				FieldFormatter::Link(link) => {
					let keys = link(&created, inserted);
					self.relations.apply(&created, name, keys).await?;
				}
				other => {
					return Err(SeedingError::configuration(format!(
						"Many-to-many field '{}' of '{}' has a {} formatter, which cannot populate a relation set",
						name,
						schema.model,
						other.kind()
					)));
				}
			}
		}

		Ok(pk)
	}

	async fn resolve(
		&mut self,
		schema: &EntitySchema,
		name: &str,
		formatter: &FieldFormatter,
		inserted: &InsertedRecords,
	) -> SeedingResult<Option<Value>> {
		match formatter {
			FieldFormatter::Constant(value) => Ok(Some(value.clone())),
			FieldFormatter::Fake(hint) => self.generator.generate(hint).map(Some),
			FieldFormatter::ManyToOne(target) => self.relations.many_to_one(target, inserted).await,
			FieldFormatter::OneToOne(target) => self.relations.one_to_one(target, inserted).await,
			FieldFormatter::Computed(compute) => Ok(compute(inserted)),
			FieldFormatter::ManyToMany(_) | FieldFormatter::Link(_) => {
				Err(SeedingError::configuration(format!(
					"Field '{}' of '{}' has a {} formatter but is not many-to-many",
					name,
					schema.model,
					formatter.kind()
				)))
			}
		}
	}
}
