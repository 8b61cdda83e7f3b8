//! Field-name and field-type heuristics.

use once_cell::sync::Lazy;
use regex::Regex;

use super::FakerHint;
use crate::schema::{FieldSchema, FieldType};

/// Name patterns checked in order, first match wins.
static NAME_PATTERNS: Lazy<Vec<(Regex, FakerHint)>> = Lazy::new(|| {
	let table: &[(&str, FakerHint)] = &[
		(r"^(is|has)([_A-Z]|$)", FakerHint::Boolean),
		(r"(_a|A)t$", FakerHint::DateTime),
		(r"(_d|D)ate$", FakerHint::Date),
		(r"^first_?name$", FakerHint::FirstName),
		(r"^last_?name$|^surname$", FakerHint::LastName),
		(r"^(user_?name|login)$", FakerHint::Username),
		(r"^e_?mail(_address)?$", FakerHint::Email),
		(r"^(phone(_?number)?|mobile|telephone)$", FakerHint::PhoneNumber),
		(r"^street(_?address)?$", FakerHint::StreetName),
		(r"^address$", FakerHint::Address),
		(r"^(city|town)$", FakerHint::City),
		(r"^(post_?code|zip_?code|zip)$", FakerHint::PostCode),
		(r"^(state|province)$", FakerHint::State),
		(r"^country$", FakerHint::Country),
		(r"^company(_?name)?$", FakerHint::CompanyName),
		(r"^(title|headline)$", FakerHint::Title),
		(
			r"^(body|summary|description|content|bio)$",
			FakerHint::Text { max_length: None },
		),
		(r"^(full_?)?name$", FakerHint::FullName),
		(r"^(url|website|homepage)$", FakerHint::Url),
		(r"^slug$", FakerHint::Slug),
	];

	table
		.iter()
		.map(|(pattern, hint)| {
			let re = Regex::new(pattern).expect("Invalid field name regex pattern");
			(re, hint.clone())
		})
		.collect()
});

/// Guesses a hint from a field's name alone.
///
/// # Example
///
/// ```
/// use seedbed::faker::{FakerHint, NameGuesser};
///
/// assert_eq!(NameGuesser::guess("email"), Some(FakerHint::Email));
/// assert_eq!(NameGuesser::guess("created_at"), Some(FakerHint::DateTime));
/// assert_eq!(NameGuesser::guess("quantity"), None);
/// ```
#[derive(Debug, Default)]
pub struct NameGuesser;

impl NameGuesser {
	/// Returns the hint of the first matching name pattern.
	pub fn guess(name: &str) -> Option<FakerHint> {
		NAME_PATTERNS
			.iter()
			.find(|(re, _)| re.is_match(name))
			.map(|(_, hint)| hint.clone())
	}
}

/// Guesses a hint from a field's declared type and choice set.
#[derive(Debug, Default)]
pub struct TypeGuesser;

impl TypeGuesser {
	/// Returns the hint for `field`.
	///
	/// A non-empty choice set always wins over the declared type.
	pub fn guess(field: &FieldSchema) -> FakerHint {
		if !field.choices.is_empty() {
			return FakerHint::Choice(field.choices.clone());
		}

		match &field.field_type {
			FieldType::Boolean => FakerHint::Boolean,
			FieldType::SmallInteger => FakerHint::Integer {
				min: i64::from(i16::MIN),
				max: i64::from(i16::MAX),
			},
			FieldType::Integer => FakerHint::Integer {
				min: i64::from(i32::MIN),
				max: i64::from(i32::MAX),
			},
			FieldType::BigInteger => FakerHint::Integer {
				min: i64::MIN,
				max: i64::MAX,
			},
			FieldType::PositiveSmallInteger => FakerHint::Integer {
				min: 0,
				max: i64::from(i16::MAX),
			},
			FieldType::PositiveInteger => FakerHint::Integer {
				min: 0,
				max: i64::from(i32::MAX),
			},
			FieldType::Float => FakerHint::Float {
				min: -1_000_000.0,
				max: 1_000_000.0,
			},
			FieldType::Decimal {
				max_digits,
				decimal_places,
			} => FakerHint::Decimal {
				max_digits: *max_digits,
				decimal_places: *decimal_places,
			},
			FieldType::Char { max_length } => FakerHint::Text {
				max_length: Some(*max_length),
			},
			FieldType::Text => FakerHint::Text { max_length: None },
			FieldType::Slug => FakerHint::Slug,
			FieldType::Email => FakerHint::Email,
			FieldType::Url => FakerHint::Url,
			FieldType::Uuid => FakerHint::Uuid,
			FieldType::Date => FakerHint::Date,
			FieldType::Time => FakerHint::Time,
			FieldType::DateTime => FakerHint::DateTime,
			FieldType::Duration => FakerHint::Duration,
			FieldType::IpAddress => FakerHint::IpAddress,
			FieldType::Json => FakerHint::Json,
			FieldType::Binary => FakerHint::Binary,
		}
	}
}
