//! Seeding orchestration.
//!
//! A [`Seeder`] collects registrations, each an entity schema with a record
//! count and optional overrides, and inserts them in registration order.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::backend::{DEFAULT_ALIAS, SeedBackend};
use crate::error::{SeedingError, SeedingResult};
use crate::faker::{FakeGenerator, ValueGenerator};
use crate::formatter::{EntityFormatters, FormatterResolver, Overrides};
use crate::inserted::InsertedRecords;
use crate::record::RecordBuilder;
use crate::schema::EntitySchema;
use crate::unique::UniquenessTracker;

/// One registered entity: what to build and how many.
#[derive(Debug, Clone)]
pub struct EntityPlan {
	/// Entity description.
	pub schema: EntitySchema,
	/// Number of records to insert per run.
	pub count: usize,
	/// Resolved formatters, overrides included.
	pub formatters: EntityFormatters,
}

/// Inserts synthetic records for registered entities.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use seedbed::backend::MemoryBackend;
/// use seedbed::schema::{EntitySchema, FieldSchema, FieldType};
/// use seedbed::Seeder;
///
/// # tokio_test::block_on(async {
/// let backend = Arc::new(MemoryBackend::new());
/// let mut seeder = Seeder::with_fake(42).with_backend(backend.clone());
///
/// seeder
///     .register(
///         EntitySchema::new("auth.User", vec![FieldSchema::new("email", FieldType::Email)]),
///         3,
///         None,
///         None,
///     )
///     .unwrap();
///
/// let inserted = seeder.run(None).await.unwrap();
/// assert_eq!(inserted.count("auth.User"), 3);
/// assert_eq!(backend.count("auth.User"), 3);
/// # });
/// ```
pub struct Seeder {
	generator: Box<dyn ValueGenerator>,
	rng: StdRng,
	tracker: UniquenessTracker,
	backends: IndexMap<String, Arc<dyn SeedBackend>>,
	plans: IndexMap<String, EntityPlan>,
}

impl Seeder {
	/// Creates a seeder using `generator` for attribute values.
	pub fn new(generator: impl ValueGenerator + 'static) -> Self {
		Self {
			generator: Box::new(generator),
			rng: StdRng::from_entropy(),
			tracker: UniquenessTracker::new(),
			backends: IndexMap::new(),
			plans: IndexMap::new(),
		}
	}

	/// Creates a fully deterministic seeder backed by [`FakeGenerator`].
	pub fn with_fake(seed: u64) -> Self {
		Self::new(FakeGenerator::seeded(seed)).with_seed(seed)
	}

	/// Seeds the random source used for relation picks.
	pub fn with_seed(mut self, seed: u64) -> Self {
		self.rng = StdRng::seed_from_u64(seed);
		self
	}

	/// Adds a backend, see [`add_backend`](Self::add_backend).
	pub fn with_backend(mut self, backend: Arc<dyn SeedBackend>) -> Self {
		self.add_backend(backend);
		self
	}

	/// Registers `backend` under its alias, replacing any previous one.
	pub fn add_backend(&mut self, backend: Arc<dyn SeedBackend>) {
		self.backends.insert(backend.alias().to_string(), backend);
	}

	/// This seeder's uniqueness tracker.
	///
	/// Claims only live for the duration of one [`run`](Self::run).
	pub fn tracker(&self) -> &UniquenessTracker {
		&self.tracker
	}

	/// Registers `count` records of `schema` for the next run.
	///
	/// Formatters are resolved now. `overrides` replace guessed formatters
	/// by field name, and `many_to_many_counts` fix the set size of
	/// many-to-many fields. Registering a model again replaces its previous
	/// plan entirely but keeps its original position in the run order.
	///
	/// # Errors
	///
	/// Returns [`SeedingError::Configuration`] for overrides or counts that
	/// do not fit the schema.
	pub fn register(
		&mut self,
		schema: EntitySchema,
		count: usize,
		overrides: Option<Overrides>,
		many_to_many_counts: Option<HashMap<String, usize>>,
	) -> SeedingResult<()> {
		let mut formatters = FormatterResolver::resolve(&schema);
		if let Some(overrides) = overrides {
			formatters.apply_overrides(&schema, overrides)?;
		}
		if let Some(counts) = many_to_many_counts {
			formatters.apply_many_to_many_counts(&schema, counts)?;
		}

		let replaced = self.plans.contains_key(&schema.model);
		debug!(
			model = %schema.model,
			count,
			replaced,
			attributes = formatters.attributes.len(),
			relation_sets = formatters.relation_sets.len(),
			"Registered entity"
		);

		self.plans.insert(
			schema.model.clone(),
			EntityPlan {
				schema,
				count,
				formatters,
			},
		);
		Ok(())
	}

	/// Registered model identifiers, in run order.
	pub fn registered_models(&self) -> Vec<&str> {
		self.plans.keys().map(String::as_str).collect()
	}

	/// Requested count for `model`.
	pub fn quantity(&self, model: &str) -> Option<usize> {
		self.plans.get(model).map(|plan| plan.count)
	}

	/// Registered plan for `model`.
	pub fn plan(&self, model: &str) -> Option<&EntityPlan> {
		self.plans.get(model)
	}

	/// Inserts every registered entity, in registration order.
	///
	/// `target` selects the backend by alias. Without one, the first
	/// registered entity's database is used, falling back to `"default"`.
	/// The uniqueness tracker is reset before and after the run, also when
	/// the run fails, so one-to-one claims never outlive a run.
	///
	/// # Errors
	///
	/// Returns [`SeedingError::Configuration`] when nothing is registered or
	/// no backend matches the alias. Otherwise the first failing record
	/// aborts the run.
	pub async fn run(&mut self, target: Option<&str>) -> SeedingResult<InsertedRecords> {
		let first = self.plans.values().next().ok_or_else(|| {
			SeedingError::configuration("No entities registered. Did you add entities to the seeder?")
		})?;

		let alias = target
			.or(first.schema.database.as_deref())
			.unwrap_or(DEFAULT_ALIAS)
			.to_string();
		let backend = self.backends.get(&alias).cloned().ok_or_else(|| {
			SeedingError::configuration(format!("No backend registered under alias '{}'", alias))
		})?;

		info!(
			backend = %alias,
			entities = self.plans.len(),
			"Starting seeding run"
		);

		self.tracker.reset();
		let result = self.populate(backend.as_ref()).await;
		self.tracker.reset();

		if let Ok(inserted) = &result {
			info!(total = inserted.total(), "Seeding run complete");
		}
		result
	}

	async fn populate(&mut self, backend: &dyn SeedBackend) -> SeedingResult<InsertedRecords> {
		let mut inserted = InsertedRecords::new();
		let mut builder = RecordBuilder::new(
			backend,
			self.generator.as_mut(),
			&self.tracker,
			&mut self.rng,
		);

		for plan in self.plans.values() {
			let model = plan.schema.model.as_str();
			inserted.ensure(model);
			info!(model, count = plan.count, "Seeding entity");

			for _ in 0..plan.count {
				let pk = builder.build(&plan.schema, &plan.formatters, &inserted).await?;
				inserted.push(model, pk);
			}
		}

		Ok(inserted)
	}
}

impl std::fmt::Debug for Seeder {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Seeder")
			.field("backends", &self.backends.keys().collect::<Vec<_>>())
			.field("plans", &self.plans)
			.finish_non_exhaustive()
	}
}
