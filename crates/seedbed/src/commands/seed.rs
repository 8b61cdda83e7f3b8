//! seed command implementation.
//!
//! This command fills the models of the selected apps with fake records.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::backend::SeedBackend;
use crate::error::{SeedingError, SeedingResult};
use crate::faker::FakeGenerator;
use crate::inserted::InsertedRecords;
use crate::logging::init_tracing;
use crate::schema::SchemaRegistry;
use crate::seeder::Seeder;

/// Default number of records per model.
pub const DEFAULT_NUMBER: usize = 10;

/// Arguments for the seed command.
#[derive(Debug, Clone, Default)]
pub struct SeedArgs {
	/// App labels whose models are seeded.
	pub app_labels: Vec<String>,
}

/// Options for the seed command.
#[derive(Debug, Clone)]
pub struct SeedOptions {
	/// Records per model, unless overridden in `per_model`.
	pub number: usize,

	/// Seed for reproducible output.
	pub seed: Option<u64>,

	/// Backend alias to write into.
	pub database: Option<String>,

	/// Verbosity level.
	pub verbosity: u8,

	/// Record counts for specific models.
	pub per_model: HashMap<String, usize>,
}

impl Default for SeedOptions {
	fn default() -> Self {
		Self {
			number: DEFAULT_NUMBER,
			seed: None,
			database: None,
			verbosity: 0,
			per_model: HashMap::new(),
		}
	}
}

impl SeedOptions {
	/// Creates new default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets records per model.
	pub fn with_number(mut self, number: usize) -> Self {
		self.number = number;
		self
	}

	/// Sets the random seed.
	pub fn with_seed(mut self, seed: u64) -> Self {
		self.seed = Some(seed);
		self
	}

	/// Sets database alias.
	pub fn with_database(mut self, db: impl Into<String>) -> Self {
		self.database = Some(db.into());
		self
	}

	/// Sets verbosity level.
	pub fn with_verbosity(mut self, level: u8) -> Self {
		self.verbosity = level;
		self
	}

	/// Sets the record count for one model.
	pub fn with_model_count(mut self, model: impl Into<String>, count: usize) -> Self {
		self.per_model.insert(model.into(), count);
		self
	}

	fn count_for(&self, model: &str) -> usize {
		self.per_model.get(model).copied().unwrap_or(self.number)
	}
}

/// Result of a seed command.
#[derive(Debug, Clone, Default)]
pub struct SeedResult {
	/// Records created per model, in insertion order.
	pub counts: IndexMap<String, usize>,

	/// Keys created per model.
	pub inserted: InsertedRecords,
}

impl SeedResult {
	/// Total number of records created.
	pub fn total(&self) -> usize {
		self.counts.values().sum()
	}
}

/// The seed command for filling apps with fake data.
///
/// Models are taken from a [`SchemaRegistry`], put in dependency order and
/// handed to a fresh [`Seeder`].
///
/// # Example
///
/// ```ignore
/// let command = SeedCommand::new();
/// let args = SeedArgs {
///     app_labels: vec!["blog".to_string()],
/// };
/// let options = SeedOptions::new().with_number(20).with_seed(7);
/// let result = command.execute(&registry, backends, args, options).await?;
/// println!("Created {} records", result.total());
/// ```
#[derive(Debug, Default)]
pub struct SeedCommand;

impl SeedCommand {
	/// Creates a new seed command.
	pub fn new() -> Self {
		Self
	}

	/// Returns the command name.
	pub fn name(&self) -> &str {
		"seed"
	}

	/// Returns the command description.
	pub fn description(&self) -> &str {
		"Seeds the models of the named app(s) with fake data"
	}

	/// Returns the command help text.
	pub fn help(&self) -> &str {
		r#"
Usage: seed [options] app_label [app_label ...]

Seeds the models of the named app(s) with fake data.

Arguments:
  app_label            One or more app labels to seed

Options:
  --number, -n N       Number of records per model (default: 10)
  --seed N             Seed for reproducible data
  --database DB        Database alias to seed into
  --verbosity LEVEL    Verbosity level (0=minimal, 1=normal, 2=verbose)
"#
	}

	/// Executes the seed command.
	///
	/// # Arguments
	///
	/// * `registry` - Schemas to choose models from
	/// * `backends` - Backends the seeder may write into
	/// * `args` - Command arguments (app labels)
	/// * `options` - Command options
	///
	/// # Returns
	///
	/// Returns the number of records created per model.
	pub async fn execute(
		&self,
		registry: &SchemaRegistry,
		backends: Vec<Arc<dyn SeedBackend>>,
		args: SeedArgs,
		options: SeedOptions,
	) -> SeedingResult<SeedResult> {
		if args.app_labels.is_empty() {
			return Err(SeedingError::ValidationError {
				field: "app_labels".to_string(),
				message: "At least one app label must be specified".to_string(),
			});
		}

		if options.verbosity > 0 {
			init_tracing(options.verbosity);
		}

		let labels: Vec<&str> = args.app_labels.iter().map(String::as_str).collect();
		let selected: Vec<String> = registry
			.filter_by_app(&labels)
			.into_iter()
			.map(|schema| schema.model.clone())
			.collect();
		if selected.is_empty() {
			return Err(SeedingError::ValidationError {
				field: "app_labels".to_string(),
				message: format!("No models found for app(s): {}", labels.join(", ")),
			});
		}

		let mut seeder = match options.seed {
			Some(seed) => Seeder::with_fake(seed),
			None => Seeder::new(FakeGenerator::new()),
		};
		for backend in backends {
			seeder.add_backend(backend);
		}

		for model in registry.insertion_order(&selected)? {
			let schema = registry.require(&model)?.clone();
			seeder.register(schema, options.count_for(&model), None, None)?;
		}

		let inserted = seeder.run(options.database.as_deref()).await?;
		let result = SeedResult {
			counts: inserted
				.iter()
				.map(|(model, keys)| (model.to_string(), keys.len()))
				.collect(),
			inserted,
		};

		if options.verbosity > 0 {
			self.print_result(&result);
		}

		Ok(result)
	}

	/// Prints the seed result summary.
	fn print_result(&self, result: &SeedResult) {
		for (model, count) in &result.counts {
			println!("  {}: {} object(s)", model, count);
		}
		println!("Seeded {} object(s)", result.total());
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::backend::MemoryBackend;
	use crate::schema::{EntitySchema, FieldSchema, FieldType};
	use rstest::{fixture, rstest};

	#[fixture]
	fn registry() -> SchemaRegistry {
		SchemaRegistry::from_schemas([
			EntitySchema::new(
				"blog.Post",
				vec![
					FieldSchema::auto_id("id"),
					FieldSchema::foreign_key("author", "auth.User"),
					FieldSchema::new("title", FieldType::Char { max_length: 100 }),
				],
			),
			EntitySchema::new(
				"auth.User",
				vec![
					FieldSchema::auto_id("id"),
					FieldSchema::new("email", FieldType::Email),
				],
			),
		])
	}

	#[rstest]
	fn test_command_metadata() {
		let cmd = SeedCommand::new();
		assert_eq!(cmd.name(), "seed");
		assert!(!cmd.description().is_empty());
		assert!(!cmd.help().is_empty());
	}

	#[rstest]
	fn test_options_builder() {
		let options = SeedOptions::new()
			.with_number(3)
			.with_seed(9)
			.with_database("secondary")
			.with_verbosity(2)
			.with_model_count("auth.User", 1);

		assert_eq!(options.number, 3);
		assert_eq!(options.seed, Some(9));
		assert_eq!(options.database, Some("secondary".to_string()));
		assert_eq!(options.verbosity, 2);
		assert_eq!(options.count_for("auth.User"), 1);
		assert_eq!(options.count_for("blog.Post"), 3);
		assert_eq!(SeedOptions::new().number, DEFAULT_NUMBER);
	}

	#[rstest]
	#[tokio::test]
	async fn test_execute_empty_app_labels(registry: SchemaRegistry) {
		let cmd = SeedCommand::new();

		let result = cmd
			.execute(&registry, vec![], SeedArgs::default(), SeedOptions::new())
			.await;

		assert!(matches!(result, Err(SeedingError::ValidationError { .. })));
	}

	#[rstest]
	#[tokio::test]
	async fn test_execute_unknown_app(registry: SchemaRegistry) {
		let cmd = SeedCommand::new();
		let args = SeedArgs {
			app_labels: vec!["shop".to_string()],
		};

		let result = cmd
			.execute(&registry, vec![], args, SeedOptions::new())
			.await;

		assert!(matches!(result, Err(SeedingError::ValidationError { .. })));
	}

	#[rstest]
	#[tokio::test]
	async fn test_execute_orders_dependencies(registry: SchemaRegistry) {
		// Arrange
		let backend = Arc::new(MemoryBackend::new());
		let cmd = SeedCommand::new();
		let args = SeedArgs {
			app_labels: vec!["blog".to_string(), "auth".to_string()],
		};
		let options = SeedOptions::new()
			.with_number(4)
			.with_seed(1)
			.with_model_count("auth.User", 2);

		// Act
		let result = cmd
			.execute(&registry, vec![backend.clone() as Arc<dyn SeedBackend>], args, options)
			.await
			.unwrap();

		// Assert
		assert_eq!(
			result.counts.keys().collect::<Vec<_>>(),
			vec!["auth.User", "blog.Post"]
		);
		assert_eq!(result.total(), 6);
		let users = result.inserted.get("auth.User");
		for post in backend.records("blog.Post") {
			assert!(users.contains(post.get_field("author").unwrap()));
		}
	}
}
