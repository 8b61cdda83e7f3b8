//! Relation-aware synthetic data seeding.
//!
//! This crate fills development databases and test fixtures with fake
//! records that respect the relations between entities:
//!
//! - **Heuristic values**: Every field gets a fake value chosen from its name
//!   (`email`, `created_at`, `is_active`, ...) or its declared type
//! - **Relations**: Many-to-one, one-to-one and many-to-many fields point at
//!   records inserted earlier in the same run
//! - **One-to-one exclusivity**: A related record is claimed by at most one
//!   owning record
//! - **Commands**: A `seed` management command working from schema files
//!
//! # Features
//!
//! - `json` - JSON schema file support (enabled by default)
//! - `yaml` - YAML schema file support
//! - `full` - All features enabled
//!
//! # Quick Start
//!
//! Describe your entities, register them in dependency order and run:
//!
//! ```
//! use std::sync::Arc;
//! use seedbed::prelude::*;
//!
//! # tokio_test::block_on(async {
//! let backend = Arc::new(MemoryBackend::new());
//! let mut seeder = Seeder::with_fake(7).with_backend(backend.clone());
//!
//! let user = EntitySchema::new(
//!     "auth.User",
//!     vec![
//!         FieldSchema::auto_id("id"),
//!         FieldSchema::new("username", FieldType::Char { max_length: 30 }),
//!     ],
//! );
//! let profile = EntitySchema::new(
//!     "auth.Profile",
//!     vec![
//!         FieldSchema::auto_id("id"),
//!         FieldSchema::one_to_one("user", "auth.User"),
//!         FieldSchema::new("bio", FieldType::Text),
//!     ],
//! );
//!
//! seeder.register(user, 5, None, None).unwrap();
//! seeder.register(profile, 5, None, None).unwrap();
//!
//! let inserted = seeder.run(None).await.unwrap();
//! assert_eq!(inserted.count("auth.Profile"), 5);
//! # });
//! ```
//!
//! ## Overriding fields
//!
//! ```ignore
//! let mut overrides = Overrides::new();
//! overrides.insert("is_staff".to_string(), FieldFormatter::constant(false));
//! overrides.insert(
//!     "tags".to_string(),
//!     FieldFormatter::link(|_, inserted| inserted.get("blog.Tag")[..1].to_vec()),
//! );
//! seeder.register(post_schema, 20, Some(overrides), None)?;
//! ```
//!
//! # Architecture
//!
//! - [`FormatterResolver`](formatter::FormatterResolver) - Picks a [`FieldFormatter`] per field
//! - [`RelationBuilder`](relation::RelationBuilder) - Resolves relation formatters
//! - [`UniquenessTracker`] - Keeps one-to-one picks exclusive
//! - [`RecordBuilder`](record::RecordBuilder) - Builds and inserts one record
//! - [`Seeder`] - Runs registrations in order and collects inserted keys
//! - [`SeedBackend`](backend::SeedBackend) - Storage the seeder writes into
//! - [`SeedCommand`](commands::SeedCommand) - Seeds whole apps from a [`SchemaRegistry`](schema::SchemaRegistry)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backend;
pub mod commands;
pub mod error;
pub mod faker;
pub mod formatter;
pub mod inserted;
pub mod logging;
pub mod prelude;
pub mod record;
pub mod relation;
pub mod schema;
pub mod seeder;
pub mod unique;

// Re-export commonly used types at crate root
pub use error::{SeedingError, SeedingResult};
pub use formatter::{FieldFormatter, Overrides};
pub use inserted::InsertedRecords;
pub use seeder::Seeder;
pub use unique::UniquenessTracker;
