//! Convenience re-exports for common usage.
//!
//! # Example
//!
//! ```
//! use seedbed::prelude::*;
//!
//! let seeder = Seeder::with_fake(1);
//! assert!(seeder.registered_models().is_empty());
//! ```

// Error types
pub use crate::error::{SeedingError, SeedingResult};

// Schema types
pub use crate::schema::{
	EntitySchema, FieldIdentity, FieldKind, FieldSchema, FieldType, SchemaFormat, SchemaParser,
	SchemaRegistry,
};

// Engine types
pub use crate::formatter::{
	EntityFormatters, FieldFormatter, FormatterResolver, ManyToManyTarget, Overrides,
	RelationTarget,
};
pub use crate::inserted::InsertedRecords;
pub use crate::seeder::{EntityPlan, Seeder};
pub use crate::unique::UniquenessTracker;

// Value generation
pub use crate::faker::{FakeGenerator, FakerHint, ValueGenerator};

// Backends
pub use crate::backend::{CreatedRecord, InsertRequest, MemoryBackend, Record, SeedBackend};

// Command types
pub use crate::commands::{SeedArgs, SeedCommand, SeedOptions, SeedResult};
