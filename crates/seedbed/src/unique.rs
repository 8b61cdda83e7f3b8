//! One-to-one exclusivity tracking.

use std::collections::HashMap;

use parking_lot::Mutex;
use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::Value;

use crate::error::{SeedingError, SeedingResult};
use crate::schema::FieldIdentity;

/// Remembers which related keys each one-to-one field has already claimed.
///
/// Claims persist across every record of every entity that owns the field
/// until [`reset`](Self::reset) is called. Each [`Seeder`](crate::Seeder)
/// owns its tracker and resets it when a run starts and when it ends,
/// whatever the outcome, so claims are scoped to a single run.
#[derive(Debug, Default)]
pub struct UniquenessTracker {
	claimed: Mutex<HashMap<FieldIdentity, Vec<Value>>>,
}

impl UniquenessTracker {
	/// Creates an empty tracker.
	pub fn new() -> Self {
		Self::default()
	}

	/// Picks a candidate not yet claimed for `field` and claims it.
	///
	/// The pick is uniform over the unclaimed candidates.
	///
	/// # Errors
	///
	/// Returns [`SeedingError::RelationExhausted`], naming `related`, when
	/// every candidate has already been claimed.
	pub fn choose_unique<R: Rng + ?Sized>(
		&self,
		field: &FieldIdentity,
		related: &str,
		candidates: &[Value],
		rng: &mut R,
	) -> SeedingResult<Value> {
		let mut claimed = self.claimed.lock();
		let taken = claimed.entry(field.clone()).or_default();

		let available: Vec<&Value> = candidates
			.iter()
			.filter(|candidate| !taken.contains(candidate))
			.collect();

		let choice = available
			.choose(rng)
			.map(|value| (*value).clone())
			.ok_or_else(|| SeedingError::RelationExhausted {
				model: field.model.clone(),
				field: field.field.clone(),
				related: related.to_string(),
			})?;

		taken.push(choice.clone());
		Ok(choice)
	}

	/// Returns the keys claimed so far for `field`, in claim order.
	pub fn claimed(&self, field: &FieldIdentity) -> Vec<Value> {
		self.claimed.lock().get(field).cloned().unwrap_or_default()
	}

	/// Forgets every claim.
	pub fn reset(&self) {
		self.claimed.lock().clear();
	}

	/// Returns true if no field has claimed anything.
	pub fn is_empty(&self) -> bool {
		self.claimed.lock().values().all(Vec::is_empty)
	}
}
