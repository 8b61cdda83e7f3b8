//! Error types for the seeding engine.
//!
//! Three variants describe modeling mistakes and are raised by the engine
//! itself: [`SeedingError::Configuration`], [`SeedingError::UnsatisfiableRelation`]
//! and [`SeedingError::RelationExhausted`]. The remaining variants wrap
//! failures reported by collaborators (backends, schema files, generators).

use thiserror::Error;

/// Errors that can occur during seeding operations.
#[derive(Debug, Error)]
pub enum SeedingError {
	/// The seeder was configured in a way that can never succeed.
	#[error("Configuration error: {0}")]
	Configuration(String),

	/// A non-nullable relation field has no related records to point at.
	#[error(
		"Field '{field}' of '{model}' cannot be null: no '{related}' records have been inserted yet"
	)]
	UnsatisfiableRelation {
		/// Model that owns the relation field.
		model: String,
		/// Relation field name.
		field: String,
		/// Related model identifier.
		related: String,
	},

	/// A one-to-one field has claimed every available related record.
	#[error("Field '{field}' of '{model}' needs more unique values of related model '{related}'")]
	RelationExhausted {
		/// Model that owns the one-to-one field.
		model: String,
		/// One-to-one field name.
		field: String,
		/// Related model identifier.
		related: String,
	},

	/// Model was not found in the registry.
	#[error("Model not found: {0}")]
	ModelNotFound(String),

	/// Error parsing a schema file.
	#[error("Parse error: {0}")]
	ParseError(String),

	/// Backend operation failed.
	#[error("Database error: {0}")]
	DatabaseError(String),

	/// I/O operation failed.
	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),

	/// Faker data generation failed.
	#[error("Faker error: {0}")]
	FakerError(String),

	/// Validation failed for a specific field.
	#[error("Validation error: {field}: {message}")]
	ValidationError {
		/// Field that failed validation.
		field: String,
		/// Validation error message.
		message: String,
	},

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	JsonError(#[from] serde_json::Error),

	/// YAML serialization/deserialization error (when yaml feature is enabled).
	#[cfg(feature = "yaml")]
	#[error("YAML error: {0}")]
	YamlError(#[from] serde_yaml::Error),

	/// Schema file not found.
	#[error("Schema file not found: {0}")]
	FileNotFound(String),

	/// Unsupported file extension.
	#[error("Unsupported file extension: {0}")]
	UnsupportedExtension(String),
}

impl SeedingError {
	/// Shorthand for a [`SeedingError::Configuration`] error.
	pub fn configuration(message: impl Into<String>) -> Self {
		Self::Configuration(message.into())
	}

	/// Returns true for the errors caused by relation resolution.
	pub fn is_relation_error(&self) -> bool {
		matches!(
			self,
			Self::UnsatisfiableRelation { .. } | Self::RelationExhausted { .. }
		)
	}
}

/// Result type alias for seeding operations.
pub type SeedingResult<T> = Result<T, SeedingError>;
