//! Relation resolution against the records inserted so far.
//!
//! All random picks are uniform over the candidates present at call time.

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::{CreatedRecord, Record, SeedBackend};
use crate::error::{SeedingError, SeedingResult};
use crate::formatter::{ManyToManyTarget, RelationTarget};
use crate::inserted::InsertedRecords;
use crate::schema::FieldIdentity;
use crate::unique::UniquenessTracker;

/// Resolves relation formatters for one run.
pub struct RelationBuilder<'a> {
	backend: &'a dyn SeedBackend,
	tracker: &'a UniquenessTracker,
	rng: &'a mut StdRng,
}

impl<'a> RelationBuilder<'a> {
	/// Creates a builder writing through `backend`.
	pub fn new(
		backend: &'a dyn SeedBackend,
		tracker: &'a UniquenessTracker,
		rng: &'a mut StdRng,
	) -> Self {
		Self {
			backend,
			tracker,
			rng,
		}
	}

	/// Backend the builder writes through.
	pub fn backend(&self) -> &'a dyn SeedBackend {
		self.backend
	}

	/// Picks one inserted record of the related model.
	///
	/// Returns `Ok(None)` when nothing has been inserted and the field is
	/// nullable.
	pub async fn many_to_one(
		&mut self,
		target: &RelationTarget,
		inserted: &InsertedRecords,
	) -> SeedingResult<Option<Value>> {
		let candidates = inserted.get(&target.related);
		let Some(pk) = candidates.choose(self.rng).cloned() else {
			return Self::empty_pool(&target.field, &target.related, target.nullable);
		};

		let record = self.fetch(&target.related, pk).await?;
		Ok(Some(record.pk))
	}

	/// Picks one inserted record of the related model not yet claimed by this field.
	///
	/// # Errors
	///
	/// Returns [`SeedingError::RelationExhausted`] once every inserted
	/// related record has been claimed.
	pub async fn one_to_one(
		&mut self,
		target: &RelationTarget,
		inserted: &InsertedRecords,
	) -> SeedingResult<Option<Value>> {
		let candidates = inserted.get(&target.related);
		if candidates.is_empty() {
			return Self::empty_pool(&target.field, &target.related, target.nullable);
		}

		let pk = self.tracker.choose_unique(
			&target.field,
			&target.related,
			candidates,
			&mut *self.rng,
		)?;
		let record = self.fetch(&target.related, pk).await?;
		Ok(Some(record.pk))
	}

	/// Links `created` to a random subset of the related model's records.
	///
	/// The subset size is `target.count` clamped to the pool, or uniform in
	/// `1..=pool` when no count is set.
	pub async fn many_to_many(
		&mut self,
		target: &ManyToManyTarget,
		created: &CreatedRecord,
		inserted: &InsertedRecords,
	) -> SeedingResult<()> {
		let pool = inserted.get(&target.related);
		if pool.is_empty() {
			return Self::empty_pool(&target.field, &target.related, target.nullable).map(|_| ());
		}

		let size = match target.count {
			Some(count) => count.min(pool.len()),
			None => self.rng.gen_range(1..=pool.len()),
		};
		let keys: Vec<Value> = pool.choose_multiple(self.rng, size).cloned().collect();

		debug!(
			field = %target.field,
			pk = %created.pk,
			size,
			"Applying many-to-many relation set"
		);
		self.apply(created, &target.field.field, keys).await
	}

	/// Replaces the `relation` set of `created` with `keys`.
	pub async fn apply(
		&self,
		created: &CreatedRecord,
		relation: &str,
		keys: Vec<Value>,
	) -> SeedingResult<()> {
		self.backend
			.update_relation_set(created, relation, keys)
			.await
	}

	async fn fetch(&self, model: &str, pk: Value) -> SeedingResult<Record> {
		self.backend
			.query_by_keys(model, std::slice::from_ref(&pk))
			.await?
			.into_iter()
			.next()
			.ok_or_else(|| {
				SeedingError::DatabaseError(format!(
					"'{}' record with primary key {} was inserted but cannot be found",
					model, pk
				))
			})
	}

	fn empty_pool(
		field: &FieldIdentity,
		related: &str,
		nullable: bool,
	) -> SeedingResult<Option<Value>> {
		if !nullable {
			return Err(SeedingError::UnsatisfiableRelation {
				model: field.model.clone(),
				field: field.field.clone(),
				related: related.to_string(),
			});
		}

		warn!(
			field = %field,
			related,
			"Nullable relation left empty: no related records inserted yet"
		);
		Ok(None)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::backend::{InsertRequest, MemoryBackend};
	use rand::SeedableRng;
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn target() -> RelationTarget {
		RelationTarget {
			field: FieldIdentity::new("auth.Profile", "user"),
			related: "auth.User".to_string(),
			nullable: false,
		}
	}

	async fn backend_with_users(n: usize) -> (MemoryBackend, InsertedRecords) {
		let backend = MemoryBackend::new();
		let mut inserted = InsertedRecords::new();
		for _ in 0..n {
			let pk = backend.insert(InsertRequest::new("auth.User")).await.unwrap();
			inserted.push("auth.User", pk);
		}
		(backend, inserted)
	}

	#[rstest]
	#[tokio::test]
	async fn test_many_to_one_picks_inserted_key(target: RelationTarget) {
		// Arrange
		let (backend, inserted) = backend_with_users(3).await;
		let tracker = UniquenessTracker::new();
		let mut rng = StdRng::seed_from_u64(1);
		let mut builder = RelationBuilder::new(&backend, &tracker, &mut rng);

		// Act
		let value = builder.many_to_one(&target, &inserted).await.unwrap();

		// Assert
		assert!(inserted.get("auth.User").contains(&value.unwrap()));
	}

	#[rstest]
	#[tokio::test]
	async fn test_many_to_one_unsatisfiable(target: RelationTarget) {
		let (backend, inserted) = backend_with_users(0).await;
		let tracker = UniquenessTracker::new();
		let mut rng = StdRng::seed_from_u64(1);
		let mut builder = RelationBuilder::new(&backend, &tracker, &mut rng);

		let result = builder.many_to_one(&target, &inserted).await;

		match result {
			Err(SeedingError::UnsatisfiableRelation { model, field, .. }) => {
				assert_eq!(model, "auth.Profile");
				assert_eq!(field, "user");
			}
			other => panic!("Expected UnsatisfiableRelation, got {:?}", other),
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_nullable_relation_yields_none(mut target: RelationTarget) {
		target.nullable = true;
		let (backend, inserted) = backend_with_users(0).await;
		let tracker = UniquenessTracker::new();
		let mut rng = StdRng::seed_from_u64(1);
		let mut builder = RelationBuilder::new(&backend, &tracker, &mut rng);

		assert_eq!(builder.many_to_one(&target, &inserted).await.unwrap(), None);
		assert_eq!(builder.one_to_one(&target, &inserted).await.unwrap(), None);
	}

	#[rstest]
	#[tokio::test]
	async fn test_one_to_one_exhausts_after_pool(target: RelationTarget) {
		let (backend, inserted) = backend_with_users(2).await;
		let tracker = UniquenessTracker::new();
		let mut rng = StdRng::seed_from_u64(2);
		let mut builder = RelationBuilder::new(&backend, &tracker, &mut rng);

		let first = builder.one_to_one(&target, &inserted).await.unwrap();
		let second = builder.one_to_one(&target, &inserted).await.unwrap();
		let third = builder.one_to_one(&target, &inserted).await;

		assert_ne!(first, second);
		assert!(matches!(
			third,
			Err(SeedingError::RelationExhausted { ref related, .. }) if related == "auth.User"
		));
	}

	#[rstest]
	#[case(Some(10), 4)]
	#[case(Some(2), 2)]
	#[case(Some(0), 0)]
	#[tokio::test]
	async fn test_many_to_many_clamps_count(#[case] count: Option<usize>, #[case] expected: usize) {
		// Arrange
		let (backend, inserted) = backend_with_users(4).await;
		let group = backend.insert(InsertRequest::new("auth.Group")).await.unwrap();
		let created = CreatedRecord::new("auth.Group", group);
		let target = ManyToManyTarget {
			field: FieldIdentity::new("auth.Group", "members"),
			related: "auth.User".to_string(),
			nullable: false,
			count,
		};
		let tracker = UniquenessTracker::new();
		let mut rng = StdRng::seed_from_u64(3);
		let mut builder = RelationBuilder::new(&backend, &tracker, &mut rng);

		// Act
		builder
			.many_to_many(&target, &created, &inserted)
			.await
			.unwrap();

		// Assert
		let record = &backend.records("auth.Group")[0];
		let members = record.get_field("members").unwrap().as_array().unwrap();
		assert_eq!(members.len(), expected);
		let mut unique = members.clone();
		unique.sort_by_key(|v| v.as_i64());
		unique.dedup();
		assert_eq!(unique.len(), expected);
	}

	#[rstest]
	#[tokio::test]
	async fn test_many_to_many_random_size_within_pool() {
		let (backend, inserted) = backend_with_users(5).await;
		let tracker = UniquenessTracker::new();
		let mut rng = StdRng::seed_from_u64(4);
		let target = ManyToManyTarget {
			field: FieldIdentity::new("auth.Group", "members"),
			related: "auth.User".to_string(),
			nullable: false,
			count: None,
		};

		for _ in 0..10 {
			let group = backend.insert(InsertRequest::new("auth.Group")).await.unwrap();
			let created = CreatedRecord::new("auth.Group", group);
			let mut builder = RelationBuilder::new(&backend, &tracker, &mut rng);
			builder
				.many_to_many(&target, &created, &inserted)
				.await
				.unwrap();
		}

		for record in backend.records("auth.Group") {
			let size = record.get_field("members").unwrap().as_array().unwrap().len();
			assert!((1..=5).contains(&size));
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_many_to_many_empty_pool() {
		let backend = MemoryBackend::new();
		let inserted = InsertedRecords::new();
		let tracker = UniquenessTracker::new();
		let mut rng = StdRng::seed_from_u64(5);
		let created = CreatedRecord::new("auth.Group", json!(1));
		let mut target = ManyToManyTarget {
			field: FieldIdentity::new("auth.Group", "members"),
			related: "auth.User".to_string(),
			nullable: true,
			count: None,
		};
		let mut builder = RelationBuilder::new(&backend, &tracker, &mut rng);

		// Nullable: nothing is applied, so the missing record is never touched.
		assert!(
			builder
				.many_to_many(&target, &created, &inserted)
				.await
				.is_ok()
		);

		target.nullable = false;
		let result = builder.many_to_many(&target, &created, &inserted).await;
		assert!(matches!(
			result,
			Err(SeedingError::UnsatisfiableRelation { .. })
		));
	}
}
