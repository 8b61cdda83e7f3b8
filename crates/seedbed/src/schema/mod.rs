//! Schema introspection types.
//!
//! These types describe entities the way an ORM's introspection layer
//! reports them: field names, relation kinds, nullability, declared
//! defaults and choice sets. The seeding engine only reads them.

mod parser;
mod registry;

pub use parser::{SchemaFormat, SchemaParser};
pub use registry::SchemaRegistry;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a field relates to other entities.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
	/// Plain value, no relation.
	#[default]
	Scalar,

	/// Auto-generated identity column, never part of the create attributes.
	AutoId,

	/// Many-to-one relation to `to`.
	ForeignKey {
		/// Related model identifier.
		to: String,
	},

	/// One-to-one relation to `to`.
	OneToOne {
		/// Related model identifier.
		to: String,
	},

	/// Many-to-many relation to `to`, applied after the record exists.
	ManyToMany {
		/// Related model identifier.
		to: String,
	},
}

impl FieldKind {
	/// Returns the related model identifier for relation kinds.
	pub fn related_model(&self) -> Option<&str> {
		match self {
			Self::ForeignKey { to } | Self::OneToOne { to } | Self::ManyToMany { to } => {
				Some(to)
			}
			Self::Scalar | Self::AutoId => None,
		}
	}

	/// Returns true for foreign key, one-to-one and many-to-many fields.
	pub fn is_relation(&self) -> bool {
		self.related_model().is_some()
	}

	/// Returns true for many-to-many fields.
	pub fn is_many_to_many(&self) -> bool {
		matches!(self, Self::ManyToMany { .. })
	}
}

/// Declared primitive type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
	/// Boolean flag.
	Boolean,
	/// 16-bit signed integer.
	SmallInteger,
	/// 32-bit signed integer.
	Integer,
	/// 64-bit signed integer.
	BigInteger,
	/// Non-negative 16-bit integer.
	PositiveSmallInteger,
	/// Non-negative 32-bit integer.
	PositiveInteger,
	/// Floating point number.
	Float,
	/// Fixed precision decimal.
	Decimal {
		/// Total number of digits.
		max_digits: u8,
		/// Digits after the decimal point.
		decimal_places: u8,
	},
	/// Bounded string.
	Char {
		/// Maximum length in characters.
		max_length: usize,
	},
	/// Unbounded text.
	#[default]
	Text,
	/// URL-safe identifier.
	Slug,
	/// E-mail address.
	Email,
	/// URL.
	Url,
	/// UUID.
	Uuid,
	/// Calendar date.
	Date,
	/// Time of day.
	Time,
	/// Date and time (UTC).
	DateTime,
	/// Duration, in seconds.
	Duration,
	/// IPv4 address.
	IpAddress,
	/// JSON document.
	Json,
	/// Raw bytes.
	Binary,
}

/// Description of a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
	/// Field name.
	pub name: String,

	/// Relation kind.
	#[serde(default)]
	pub kind: FieldKind,

	/// Declared primitive type.
	#[serde(default, rename = "type")]
	pub field_type: FieldType,

	/// Whether the field accepts null.
	#[serde(default)]
	pub nullable: bool,

	/// Declared default value.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub default: Option<Value>,

	/// Declared choice set.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub choices: Vec<Value>,

	/// Timestamp refreshed on every save.
	#[serde(default)]
	pub auto_now: bool,

	/// Timestamp set on creation.
	#[serde(default)]
	pub auto_now_add: bool,
}

impl FieldSchema {
	/// Creates a scalar field of the given type.
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			kind: FieldKind::Scalar,
			field_type,
			nullable: false,
			default: None,
			choices: Vec::new(),
			auto_now: false,
			auto_now_add: false,
		}
	}

	/// Creates an auto-generated identity field.
	pub fn auto_id(name: impl Into<String>) -> Self {
		Self {
			kind: FieldKind::AutoId,
			..Self::new(name, FieldType::BigInteger)
		}
	}

	/// Creates a many-to-one field pointing at `to`.
	pub fn foreign_key(name: impl Into<String>, to: impl Into<String>) -> Self {
		Self {
			kind: FieldKind::ForeignKey { to: to.into() },
			..Self::new(name, FieldType::BigInteger)
		}
	}

	/// Creates a one-to-one field pointing at `to`.
	pub fn one_to_one(name: impl Into<String>, to: impl Into<String>) -> Self {
		Self {
			kind: FieldKind::OneToOne { to: to.into() },
			..Self::new(name, FieldType::BigInteger)
		}
	}

	/// Creates a many-to-many field pointing at `to`.
	pub fn many_to_many(name: impl Into<String>, to: impl Into<String>) -> Self {
		Self {
			kind: FieldKind::ManyToMany { to: to.into() },
			..Self::new(name, FieldType::BigInteger)
		}
	}

	/// Marks the field as nullable.
	pub fn nullable(mut self) -> Self {
		self.nullable = true;
		self
	}

	/// Sets the declared default.
	pub fn with_default(mut self, value: Value) -> Self {
		self.default = Some(value);
		self
	}

	/// Sets the declared choice set.
	pub fn with_choices(mut self, choices: Vec<Value>) -> Self {
		self.choices = choices;
		self
	}

	/// Marks the field as refreshed on every save.
	pub fn auto_now(mut self) -> Self {
		self.auto_now = true;
		self
	}

	/// Marks the field as set on creation.
	pub fn auto_now_add(mut self) -> Self {
		self.auto_now_add = true;
		self
	}

	/// Returns true when the backend would stamp this field on its own.
	pub fn has_auto_timestamp(&self) -> bool {
		self.auto_now || self.auto_now_add
	}
}

/// Description of one entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySchema {
	/// Model identifier in `app.Model` form.
	pub model: String,

	/// Backend alias this entity is stored in.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub database: Option<String>,

	/// Fields in declaration order.
	pub fields: Vec<FieldSchema>,
}

impl EntitySchema {
	/// Creates a new entity schema.
	pub fn new(model: impl Into<String>, fields: Vec<FieldSchema>) -> Self {
		Self {
			model: model.into(),
			database: None,
			fields,
		}
	}

	/// Sets the backend alias.
	pub fn with_database(mut self, alias: impl Into<String>) -> Self {
		self.database = Some(alias.into());
		self
	}

	/// Returns the app label portion of the model identifier.
	///
	/// # Example
	///
	/// ```
	/// # use seedbed::schema::EntitySchema;
	/// let schema = EntitySchema::new("auth.User", vec![]);
	/// assert_eq!(schema.app_label(), Some("auth"));
	/// ```
	pub fn app_label(&self) -> Option<&str> {
		self.model.split_once('.').map(|(app, _)| app)
	}

	/// Returns the model name portion of the model identifier.
	///
	/// # Example
	///
	/// ```
	/// # use seedbed::schema::EntitySchema;
	/// let schema = EntitySchema::new("auth.User", vec![]);
	/// assert_eq!(schema.model_name(), Some("User"));
	/// ```
	pub fn model_name(&self) -> Option<&str> {
		self.model.split_once('.').map(|(_, name)| name)
	}

	/// Gets a field by name.
	pub fn get_field(&self, name: &str) -> Option<&FieldSchema> {
		self.fields.iter().find(|f| f.name == name)
	}

	/// Returns all field names in declaration order.
	pub fn field_names(&self) -> Vec<&str> {
		self.fields.iter().map(|f| f.name.as_str()).collect()
	}

	/// Names of the fields whose timestamps the backend sets automatically.
	pub fn auto_timestamp_fields(&self) -> Vec<String> {
		self.fields
			.iter()
			.filter(|f| f.has_auto_timestamp())
			.map(|f| f.name.clone())
			.collect()
	}

	/// Models this entity points at, excluding itself.
	///
	/// With `required_only`, nullable relations are skipped.
	pub fn dependencies(&self, required_only: bool) -> Vec<&str> {
		let mut deps: Vec<&str> = Vec::new();
		for field in &self.fields {
			if required_only && field.nullable {
				continue;
			}
			if let Some(to) = field.kind.related_model()
				&& to != self.model
				&& !deps.contains(&to)
			{
				deps.push(to);
			}
		}
		deps
	}
}

/// Identity of a field across the whole schema, `app.Model.field`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldIdentity {
	/// Owning model identifier.
	pub model: String,
	/// Field name.
	pub field: String,
}

impl FieldIdentity {
	/// Creates a new field identity.
	pub fn new(model: impl Into<String>, field: impl Into<String>) -> Self {
		Self {
			model: model.into(),
			field: field.into(),
		}
	}
}

impl std::fmt::Display for FieldIdentity {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}.{}", self.model, self.field)
	}
}
