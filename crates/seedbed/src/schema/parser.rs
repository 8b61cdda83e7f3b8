//! Schema file parsing.
//!
//! Schema files hold either a single entity object or a list of them, in
//! JSON or (with the `yaml` feature) YAML.

use std::collections::HashSet;
use std::path::Path;

use super::EntitySchema;
use crate::error::{SeedingError, SeedingResult};

/// Supported schema file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum SchemaFormat {
	/// JSON format (default).
	#[default]
	Json,

	/// YAML format (requires `yaml` feature).
	Yaml,
}

impl SchemaFormat {
	/// Determines the schema format from a file extension.
	///
	/// # Example
	///
	/// ```
	/// # use seedbed::schema::SchemaFormat;
	/// assert_eq!(SchemaFormat::from_extension("json"), Some(SchemaFormat::Json));
	/// assert_eq!(SchemaFormat::from_extension("yml"), Some(SchemaFormat::Yaml));
	/// assert_eq!(SchemaFormat::from_extension("xml"), None);
	/// ```
	pub fn from_extension(ext: &str) -> Option<Self> {
		match ext.to_lowercase().as_str() {
			"json" => Some(Self::Json),
			"yaml" | "yml" => Some(Self::Yaml),
			_ => None,
		}
	}

	/// Determines the schema format from a file path.
	pub fn from_path(path: &Path) -> Option<Self> {
		path.extension()
			.and_then(|ext| ext.to_str())
			.and_then(Self::from_extension)
	}
}

impl std::fmt::Display for SchemaFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Json => write!(f, "JSON"),
			Self::Yaml => write!(f, "YAML"),
		}
	}
}

/// Parser for entity schema files.
#[derive(Debug, Default)]
pub struct SchemaParser;

impl SchemaParser {
	/// Creates a new schema parser.
	pub fn new() -> Self {
		Self
	}

	/// Parses a schema file, detecting the format from its extension.
	///
	/// # Errors
	///
	/// Returns an error if:
	/// - The file cannot be read
	/// - The file extension is not recognized
	/// - The file content is invalid
	pub fn parse_file(&self, path: &Path) -> SeedingResult<Vec<EntitySchema>> {
		let format = SchemaFormat::from_path(path).ok_or_else(|| {
			SeedingError::UnsupportedExtension(
				path.extension()
					.and_then(|e| e.to_str())
					.unwrap_or("(none)")
					.to_string(),
			)
		})?;

		let content = std::fs::read_to_string(path).map_err(|e| {
			if e.kind() == std::io::ErrorKind::NotFound {
				SeedingError::FileNotFound(path.display().to_string())
			} else {
				SeedingError::IoError(e)
			}
		})?;

		self.parse_string(&content, format)
	}

	/// Parses schema definitions from a string.
	pub fn parse_string(
		&self,
		content: &str,
		format: SchemaFormat,
	) -> SeedingResult<Vec<EntitySchema>> {
		let schemas = match format {
			SchemaFormat::Json => self.parse_json(content)?,
			SchemaFormat::Yaml => self.parse_yaml(content)?,
		};
		for schema in &schemas {
			self.validate_schema(schema)?;
		}
		Ok(schemas)
	}

	/// Parses several files, concatenating their entities in order.
	pub fn parse_files(&self, paths: &[&Path]) -> SeedingResult<Vec<EntitySchema>> {
		let mut all = Vec::new();
		for path in paths {
			all.extend(self.parse_file(path)?);
		}
		Ok(all)
	}

	fn parse_json(&self, content: &str) -> SeedingResult<Vec<EntitySchema>> {
		let value: serde_json::Value = serde_json::from_str(content)?;

		match value {
			serde_json::Value::Array(arr) => arr
				.into_iter()
				.enumerate()
				.map(|(idx, item)| {
					serde_json::from_value(item).map_err(|e| {
						SeedingError::ParseError(format!("Invalid entity at index {}: {}", idx, e))
					})
				})
				.collect(),
			serde_json::Value::Object(_) => Ok(vec![serde_json::from_value(value)?]),
			_ => Err(SeedingError::ParseError(
				"Expected array or object".to_string(),
			)),
		}
	}

	#[cfg(feature = "yaml")]
	fn parse_yaml(&self, content: &str) -> SeedingResult<Vec<EntitySchema>> {
		let value: serde_yaml::Value = serde_yaml::from_str(content)?;

		match value {
			serde_yaml::Value::Sequence(seq) => seq
				.into_iter()
				.enumerate()
				.map(|(idx, item)| {
					serde_yaml::from_value(item).map_err(|e| {
						SeedingError::ParseError(format!("Invalid entity at index {}: {}", idx, e))
					})
				})
				.collect(),
			serde_yaml::Value::Mapping(_) => Ok(vec![serde_yaml::from_value(value)?]),
			_ => Err(SeedingError::ParseError(
				"Expected sequence or mapping".to_string(),
			)),
		}
	}

	#[cfg(not(feature = "yaml"))]
	fn parse_yaml(&self, _content: &str) -> SeedingResult<Vec<EntitySchema>> {
		Err(SeedingError::UnsupportedExtension(
			"YAML support requires the 'yaml' feature".to_string(),
		))
	}

	fn validate_schema(&self, schema: &EntitySchema) -> SeedingResult<()> {
		if schema.app_label().is_none_or(str::is_empty)
			|| schema.model_name().is_none_or(str::is_empty)
		{
			return Err(SeedingError::ValidationError {
				field: "model".to_string(),
				message: format!(
					"Model identifier '{}' must be in 'app.Model' format",
					schema.model
				),
			});
		}

		let mut seen = HashSet::new();
		for field in &schema.fields {
			if !seen.insert(field.name.as_str()) {
				return Err(SeedingError::ValidationError {
					field: field.name.clone(),
					message: format!("Duplicate field in '{}'", schema.model),
				});
			}
			if field.kind.related_model().is_some_and(str::is_empty) {
				return Err(SeedingError::ValidationError {
					field: field.name.clone(),
					message: format!("Relation in '{}' has no target model", schema.model),
				});
			}
		}

		Ok(())
	}
}
