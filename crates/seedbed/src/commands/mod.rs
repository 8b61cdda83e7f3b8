//! Management commands.
//!
//! - [`SeedCommand`] - Seed the models of one or more apps with fake data

mod seed;

pub use seed::{SeedArgs, SeedCommand, SeedOptions, SeedResult};
