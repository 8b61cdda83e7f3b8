//! Per-field value strategies.
//!
//! Every field of a registered entity gets at most one [`FieldFormatter`].
//! Formatters are plain data: relation formatters describe *what* to look
//! up, and the [`RecordBuilder`](crate::record::RecordBuilder) performs the
//! lookup against the run's [`InsertedRecords`] when a record is built.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::backend::CreatedRecord;
use crate::error::{SeedingError, SeedingResult};
use crate::faker::{FakerHint, NameGuesser, TypeGuesser};
use crate::inserted::InsertedRecords;
use crate::schema::{EntitySchema, FieldIdentity, FieldKind, FieldSchema, FieldType};

/// Caller-supplied attribute strategy.
pub type ComputeFn = Arc<dyn Fn(&InsertedRecords) -> Option<Value> + Send + Sync>;

/// Caller-supplied relation set strategy, returning the keys to link.
pub type LinkFn = Arc<dyn Fn(&CreatedRecord, &InsertedRecords) -> Vec<Value> + Send + Sync>;

/// Caller overrides, by field name.
pub type Overrides = IndexMap<String, FieldFormatter>;

/// A single-valued relation to resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationTarget {
	/// Field owning the relation.
	pub field: FieldIdentity,
	/// Related model identifier.
	pub related: String,
	/// Whether the field may stay empty.
	pub nullable: bool,
}

impl RelationTarget {
	fn from_field(model: &str, field: &FieldSchema, related: &str) -> Self {
		Self {
			field: FieldIdentity::new(model, &field.name),
			related: related.to_string(),
			nullable: field.nullable,
		}
	}
}

/// A many-to-many relation set to populate.
#[derive(Debug, Clone, PartialEq)]
pub struct ManyToManyTarget {
	/// Field owning the relation.
	pub field: FieldIdentity,
	/// Related model identifier.
	pub related: String,
	/// Whether the set may stay empty.
	pub nullable: bool,
	/// Fixed set size, clamped to the available records. Random when `None`.
	pub count: Option<usize>,
}

/// How a field's value, or relation set, is produced.
#[derive(Clone)]
pub enum FieldFormatter {
	/// Always the same value.
	Constant(Value),
	/// A fresh value from the value generator.
	Fake(FakerHint),
	/// A key drawn from the related model's inserted records.
	ManyToOne(RelationTarget),
	/// A key drawn from the related model's inserted records, never reused.
	OneToOne(RelationTarget),
	/// A random subset of the related model's inserted records.
	ManyToMany(ManyToManyTarget),
	/// Caller-computed attribute. `None` leaves the field unset.
	Computed(ComputeFn),
	/// Caller-computed relation set.
	Link(LinkFn),
}

impl FieldFormatter {
	/// Wraps a constant value.
	pub fn constant(value: impl Into<Value>) -> Self {
		Self::Constant(value.into())
	}

	/// Wraps an attribute closure.
	pub fn computed<F>(f: F) -> Self
	where
		F: Fn(&InsertedRecords) -> Option<Value> + Send + Sync + 'static,
	{
		Self::Computed(Arc::new(f))
	}

	/// Wraps a relation set closure.
	pub fn link<F>(f: F) -> Self
	where
		F: Fn(&CreatedRecord, &InsertedRecords) -> Vec<Value> + Send + Sync + 'static,
	{
		Self::Link(Arc::new(f))
	}

	/// Returns true for formatters applied after the record exists.
	pub fn is_relation_set(&self) -> bool {
		matches!(self, Self::ManyToMany(_) | Self::Link(_))
	}

	/// Short variant name, for logs and errors.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Constant(_) => "constant",
			Self::Fake(_) => "fake",
			Self::ManyToOne(_) => "many-to-one",
			Self::OneToOne(_) => "one-to-one",
			Self::ManyToMany(_) => "many-to-many",
			Self::Computed(_) => "computed",
			Self::Link(_) => "link",
		}
	}
}

impl fmt::Debug for FieldFormatter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
			Self::Fake(hint) => f.debug_tuple("Fake").field(hint).finish(),
			Self::ManyToOne(target) => f.debug_tuple("ManyToOne").field(target).finish(),
			Self::OneToOne(target) => f.debug_tuple("OneToOne").field(target).finish(),
			Self::ManyToMany(target) => f.debug_tuple("ManyToMany").field(target).finish(),
			Self::Computed(_) => f.write_str("Computed(<fn>)"),
			Self::Link(_) => f.write_str("Link(<fn>)"),
		}
	}
}

/// Formatters for one entity.
#[derive(Debug, Clone, Default)]
pub struct EntityFormatters {
	/// Create-time attributes, in schema order.
	pub attributes: IndexMap<String, FieldFormatter>,
	/// Post-insert relation sets, in schema order.
	pub relation_sets: IndexMap<String, FieldFormatter>,
}

impl EntityFormatters {
	/// Layers `overrides` on top, replacing guessed formatters by field name.
	///
	/// # Errors
	///
	/// Returns [`SeedingError::Configuration`] when an override names a field
	/// the schema does not have, or when the formatter kind does not fit the
	/// field: many-to-many fields take only relation set formatters, and
	/// relation set formatters fit only many-to-many fields.
	pub fn apply_overrides(
		&mut self,
		schema: &EntitySchema,
		overrides: Overrides,
	) -> SeedingResult<()> {
		for (name, formatter) in overrides {
			let field = schema.get_field(&name).ok_or_else(|| {
				SeedingError::configuration(format!(
					"Override for unknown field '{}' of '{}'",
					name, schema.model
				))
			})?;

			if field.kind.is_many_to_many() {
				if !formatter.is_relation_set() {
					return Err(SeedingError::configuration(format!(
						"Many-to-many field '{}' of '{}' needs a many-to-many or link formatter, got a {} formatter",
						name,
						schema.model,
						formatter.kind()
					)));
				}
				self.relation_sets.insert(name, formatter);
				continue;
			}

			if formatter.is_relation_set() {
				return Err(SeedingError::configuration(format!(
					"Field '{}' of '{}' is not many-to-many but got a {} formatter",
					name,
					schema.model,
					formatter.kind()
				)));
			}
			self.attributes.insert(name, formatter);
		}
		Ok(())
	}

	/// Fixes the set size of many-to-many fields.
	///
	/// # Errors
	///
	/// Returns [`SeedingError::Configuration`] when a name is not a
	/// many-to-many field of `schema`, or when its formatter was overridden
	/// with a link, which picks its own keys.
	pub fn apply_many_to_many_counts(
		&mut self,
		schema: &EntitySchema,
		counts: impl IntoIterator<Item = (String, usize)>,
	) -> SeedingResult<()> {
		for (name, count) in counts {
			let is_m2m = schema
				.get_field(&name)
				.is_some_and(|field| field.kind.is_many_to_many());
			if !is_m2m {
				return Err(SeedingError::configuration(format!(
					"Many-to-many count given for '{}' of '{}', which is not a many-to-many field",
					name, schema.model
				)));
			}

			match self.relation_sets.get_mut(&name) {
				Some(FieldFormatter::ManyToMany(target)) => target.count = Some(count),
				Some(other) => {
					return Err(SeedingError::configuration(format!(
						"Many-to-many count given for '{}' of '{}', which has a {} formatter",
						name,
						schema.model,
						other.kind()
					)));
				}
				None => {}
			}
		}
		Ok(())
	}
}

/// Picks a formatter for every field of an entity.
#[derive(Debug, Default)]
pub struct FormatterResolver;

impl FormatterResolver {
	/// Resolves formatters for `schema`.
	///
	/// Many-to-many fields go to [`EntityFormatters::relation_sets`]; every
	/// other field is checked against these rules, first match wins:
	///
	/// 1. a declared default becomes a constant;
	/// 2. a one-to-one relation becomes [`FieldFormatter::OneToOne`];
	/// 3. a foreign key becomes [`FieldFormatter::ManyToOne`];
	/// 4. an auto id is left out of the create attributes;
	/// 5. without a choice set, a recognised field name picks the hint,
	///    bounded by the field's `max_length` if it declares one;
	/// 6. otherwise the declared type and choice set pick the hint.
	pub fn resolve(schema: &EntitySchema) -> EntityFormatters {
		let mut formatters = EntityFormatters::default();

		for field in &schema.fields {
			if let FieldKind::ManyToMany { to } = &field.kind {
				formatters.relation_sets.insert(
					field.name.clone(),
					FieldFormatter::ManyToMany(ManyToManyTarget {
						field: FieldIdentity::new(&schema.model, &field.name),
						related: to.clone(),
						nullable: field.nullable,
						count: None,
					}),
				);
				continue;
			}

			if let Some(formatter) = Self::resolve_field(&schema.model, field) {
				formatters.attributes.insert(field.name.clone(), formatter);
			}
		}

		formatters
	}

	fn resolve_field(model: &str, field: &FieldSchema) -> Option<FieldFormatter> {
		if let Some(default) = &field.default {
			return Some(FieldFormatter::Constant(default.clone()));
		}

		match &field.kind {
			FieldKind::OneToOne { to } => {
				return Some(FieldFormatter::OneToOne(RelationTarget::from_field(
					model, field, to,
				)));
			}
			FieldKind::ForeignKey { to } => {
				return Some(FieldFormatter::ManyToOne(RelationTarget::from_field(
					model, field, to,
				)));
			}
			FieldKind::AutoId => return None,
			FieldKind::Scalar | FieldKind::ManyToMany { .. } => {}
		}

		if field.choices.is_empty()
			&& let Some(hint) = NameGuesser::guess(&field.name)
		{
			let hint = match field.field_type {
				FieldType::Char { max_length } => hint.bounded(max_length),
				_ => hint,
			};
			return Some(FieldFormatter::Fake(hint));
		}

		Some(FieldFormatter::Fake(TypeGuesser::guess(field)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn profile() -> EntitySchema {
		EntitySchema::new(
			"auth.Profile",
			vec![
				FieldSchema::auto_id("id"),
				FieldSchema::one_to_one("user", "auth.User"),
				FieldSchema::foreign_key("team", "org.Team").nullable(),
				FieldSchema::foreign_key("plan", "billing.Plan").with_default(json!(1)),
				FieldSchema::many_to_many("groups", "auth.Group"),
				FieldSchema::new("email", FieldType::Char { max_length: 100 }),
				FieldSchema::new("status", FieldType::Char { max_length: 10 })
					.with_choices(vec![json!("active"), json!("banned")]),
				FieldSchema::new("city", FieldType::Char { max_length: 50 })
					.with_choices(vec![json!("Paris")]),
				FieldSchema::new("score", FieldType::Integer),
			],
		)
	}

	#[rstest]
	fn test_resolve_follows_precedence(profile: EntitySchema) {
		let formatters = FormatterResolver::resolve(&profile);
		let attrs = &formatters.attributes;

		assert!(!attrs.contains_key("id"));
		assert!(matches!(
			&attrs["user"],
			FieldFormatter::OneToOne(t) if t.related == "auth.User" && !t.nullable
		));
		assert!(matches!(
			&attrs["team"],
			FieldFormatter::ManyToOne(t) if t.nullable
		));
		assert!(matches!(&attrs["plan"], FieldFormatter::Constant(v) if *v == json!(1)));
		assert!(matches!(
			&attrs["email"],
			FieldFormatter::Fake(FakerHint::Bounded { hint, max_length: 100 })
				if **hint == FakerHint::Email
		));
		assert!(matches!(
			&attrs["status"],
			FieldFormatter::Fake(FakerHint::Choice(c)) if c.len() == 2
		));
		// Choices win over the name guesser.
		assert!(matches!(
			&attrs["city"],
			FieldFormatter::Fake(FakerHint::Choice(_))
		));
		assert!(matches!(
			&attrs["score"],
			FieldFormatter::Fake(FakerHint::Integer { .. })
		));
	}

	#[rstest]
	fn test_resolve_keeps_schema_order(profile: EntitySchema) {
		let formatters = FormatterResolver::resolve(&profile);
		let names: Vec<&str> = formatters.attributes.keys().map(String::as_str).collect();
		assert_eq!(
			names,
			vec!["user", "team", "plan", "email", "status", "city", "score"]
		);
	}

	#[rstest]
	fn test_many_to_many_is_routed_to_relation_sets(profile: EntitySchema) {
		let formatters = FormatterResolver::resolve(&profile);

		assert!(!formatters.attributes.contains_key("groups"));
		assert!(matches!(
			&formatters.relation_sets["groups"],
			FieldFormatter::ManyToMany(t) if t.related == "auth.Group" && t.count.is_none()
		));
	}

	#[rstest]
	fn test_apply_overrides_replaces_by_name(profile: EntitySchema) {
		let mut formatters = FormatterResolver::resolve(&profile);
		let mut overrides = Overrides::new();
		overrides.insert("score".to_string(), FieldFormatter::constant(7));
		overrides.insert(
			"groups".to_string(),
			FieldFormatter::link(|_, _| vec![json!(1)]),
		);

		formatters.apply_overrides(&profile, overrides).unwrap();

		assert!(matches!(&formatters.attributes["score"], FieldFormatter::Constant(v) if *v == json!(7)));
		assert!(matches!(&formatters.relation_sets["groups"], FieldFormatter::Link(_)));
	}

	#[rstest]
	fn test_apply_overrides_unknown_field(profile: EntitySchema) {
		let mut formatters = FormatterResolver::resolve(&profile);
		let mut overrides = Overrides::new();
		overrides.insert("nickname".to_string(), FieldFormatter::constant("x"));

		let result = formatters.apply_overrides(&profile, overrides);
		assert!(matches!(result, Err(SeedingError::Configuration(_))));
	}

	#[rstest]
	fn test_apply_overrides_rejects_link_on_scalar(profile: EntitySchema) {
		let mut formatters = FormatterResolver::resolve(&profile);
		let mut overrides = Overrides::new();
		overrides.insert("score".to_string(), FieldFormatter::link(|_, _| vec![]));

		let result = formatters.apply_overrides(&profile, overrides);
		assert!(matches!(result, Err(SeedingError::Configuration(_))));
	}

	#[rstest]
	#[case(FieldFormatter::constant(json!([1])))]
	#[case(FieldFormatter::computed(|_| Some(json!([1]))))]
	#[case(FieldFormatter::Fake(FakerHint::Integer { min: 1, max: 3 }))]
	fn test_apply_overrides_rejects_attribute_on_many_to_many(
		profile: EntitySchema,
		#[case] formatter: FieldFormatter,
	) {
		let mut formatters = FormatterResolver::resolve(&profile);
		let mut overrides = Overrides::new();
		overrides.insert("groups".to_string(), formatter);

		let result = formatters.apply_overrides(&profile, overrides);

		assert!(matches!(result, Err(SeedingError::Configuration(ref m)) if m.contains("groups")));
		assert!(matches!(
			&formatters.relation_sets["groups"],
			FieldFormatter::ManyToMany(_)
		));
	}

	#[rstest]
	fn test_apply_many_to_many_counts_rejects_link(profile: EntitySchema) {
		let mut formatters = FormatterResolver::resolve(&profile);
		let mut overrides = Overrides::new();
		overrides.insert("groups".to_string(), FieldFormatter::link(|_, _| vec![]));
		formatters.apply_overrides(&profile, overrides).unwrap();

		let result = formatters.apply_many_to_many_counts(&profile, [("groups".to_string(), 2)]);

		assert!(matches!(result, Err(SeedingError::Configuration(ref m)) if m.contains("link")));
	}

	#[rstest]
	fn test_apply_many_to_many_counts(profile: EntitySchema) {
		let mut formatters = FormatterResolver::resolve(&profile);

		formatters
			.apply_many_to_many_counts(&profile, [("groups".to_string(), 3)])
			.unwrap();
		assert!(matches!(
			&formatters.relation_sets["groups"],
			FieldFormatter::ManyToMany(t) if t.count == Some(3)
		));

		let result = formatters.apply_many_to_many_counts(&profile, [("team".to_string(), 1)]);
		assert!(matches!(result, Err(SeedingError::Configuration(_))));
	}

	#[rstest]
	fn test_name_guess_is_bounded_by_char_length() {
		let schema = EntitySchema::new(
			"blog.Post",
			vec![
				FieldSchema::new("title", FieldType::Char { max_length: 8 }),
				FieldSchema::new("name", FieldType::Char { max_length: 6 }),
				FieldSchema::new("summary", FieldType::Text),
			],
		);

		let formatters = FormatterResolver::resolve(&schema);
		let mut generator = crate::faker::FakeGenerator::seeded(3);

		for (field, max_length) in [("title", 8), ("name", 6)] {
			let FieldFormatter::Fake(hint) = &formatters.attributes[field] else {
				panic!("Expected a fake formatter for {}", field);
			};
			for _ in 0..20 {
				let value = crate::faker::ValueGenerator::generate(&mut generator, hint).unwrap();
				assert!(value.as_str().unwrap().chars().count() <= max_length);
			}
		}
		assert!(matches!(
			&formatters.attributes["summary"],
			FieldFormatter::Fake(FakerHint::Text { max_length: None })
		));
	}

	#[rstest]
	fn test_formatter_debug_hides_closures() {
		let formatter = FieldFormatter::computed(|_| None);
		assert_eq!(format!("{:?}", formatter), "Computed(<fn>)");
		assert_eq!(formatter.kind(), "computed");
	}
}
