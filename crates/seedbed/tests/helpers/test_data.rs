//! Schema test data loader.
//!
//! Loads the schema files kept under `tests/data`.

use std::path::{Path, PathBuf};

use seedbed::schema::{EntitySchema, SchemaParser, SchemaRegistry};

/// Loader for schema files used by the integration tests.
pub struct SchemaDataLoader {
	base_path: PathBuf,
}

impl SchemaDataLoader {
	/// Create a loader for the crate's `tests/data` directory.
	pub fn new() -> Self {
		Self {
			base_path: Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data"),
		}
	}

	/// Create a loader with a custom base path.
	pub fn with_base<P: AsRef<Path>>(base_path: P) -> Self {
		Self {
			base_path: base_path.as_ref().to_path_buf(),
		}
	}

	/// Get the full path to a test data file.
	pub fn path(&self, name: &str) -> PathBuf {
		self.base_path.join(name)
	}

	/// Parse a JSON schema file by name (without extension).
	///
	/// # Panics
	///
	/// Panics if the file cannot be read or parsed.
	pub fn load_schemas(&self, name: &str) -> Vec<EntitySchema> {
		let path = self.path(&format!("{}.json", name));
		SchemaParser::new()
			.parse_file(&path)
			.unwrap_or_else(|e| panic!("Failed to load schema data {:?}: {}", path, e))
	}

	/// Parse a JSON schema file into a registry.
	pub fn load_registry(&self, name: &str) -> SchemaRegistry {
		SchemaRegistry::from_schemas(self.load_schemas(name))
	}

	/// Look up one schema from a file.
	///
	/// # Panics
	///
	/// Panics if the model is not in the file.
	pub fn schema(&self, name: &str, model: &str) -> EntitySchema {
		self.load_registry(name)
			.get(model)
			.cloned()
			.unwrap_or_else(|| panic!("Model {} not found in {}", model, name))
	}
}

impl Default for SchemaDataLoader {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[rstest::rstest]
	fn test_loader_with_base() {
		let loader = SchemaDataLoader::with_base("/custom/path");
		assert_eq!(loader.path("blog.json"), PathBuf::from("/custom/path/blog.json"));
	}

	#[rstest::rstest]
	fn test_load_blog_registry() {
		let registry = SchemaDataLoader::new().load_registry("blog");
		assert_eq!(
			registry.model_ids(),
			vec!["auth.User", "auth.Profile", "blog.Tag", "blog.Post", "blog.Comment"]
		);
	}
}
