//! Fake value generation.
//!
//! The resolver only decides *which kind* of value a field needs, expressed
//! as a [`FakerHint`]. Turning a hint into a concrete value is the job of a
//! [`ValueGenerator`]. [`FakeGenerator`] is the stock implementation backed
//! by the `fake` crate and a seedable [`StdRng`].

mod guessers;

pub use guessers::{NameGuesser, TypeGuesser};

use std::net::Ipv4Addr;
use std::ops::Range;

use chrono::{DateTime, NaiveTime, Utc};
use fake::Fake;
use fake::faker::address::en::{CityName, CountryName, StateName, StreetName, ZipCode};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::{DomainSuffix, SafeEmail, Username};
use fake::faker::lorem::en::{Paragraph, Sentence, Word, Words};
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value, json};

use crate::error::{SeedingError, SeedingResult};

/// Oldest timestamp produced for temporal hints (2000-01-01T00:00:00Z).
const EPOCH_START: i64 = 946_684_800;
/// Newest timestamp produced for temporal hints (2030-01-01T00:00:00Z).
const EPOCH_END: i64 = 1_893_456_000;

/// Kind of value a field should receive.
#[derive(Debug, Clone, PartialEq)]
pub enum FakerHint {
	/// `true` or `false`.
	Boolean,
	/// Integer within `min..=max`.
	Integer {
		/// Inclusive lower bound.
		min: i64,
		/// Inclusive upper bound.
		max: i64,
	},
	/// Float within `min..max`.
	Float {
		/// Lower bound.
		min: f64,
		/// Upper bound.
		max: f64,
	},
	/// Decimal rendered as a string with fixed precision.
	Decimal {
		/// Total number of digits.
		max_digits: u8,
		/// Digits after the decimal point.
		decimal_places: u8,
	},
	/// Full personal name.
	FullName,
	/// Given name.
	FirstName,
	/// Family name.
	LastName,
	/// Login name.
	Username,
	/// E-mail address on a reserved domain.
	Email,
	/// Phone number.
	PhoneNumber,
	/// Single-line postal address.
	Address,
	/// Street name.
	StreetName,
	/// City name.
	City,
	/// Postal code.
	PostCode,
	/// State or province.
	State,
	/// Country name.
	Country,
	/// Company name.
	CompanyName,
	/// Short title-like sentence.
	Title,
	/// Free text, optionally truncated to `max_length` characters.
	Text {
		/// Maximum length in characters.
		max_length: Option<usize>,
	},
	/// Single word.
	Word,
	/// URL-safe slug.
	Slug,
	/// HTTP URL.
	Url,
	/// Random UUID.
	Uuid,
	/// Calendar date, `YYYY-MM-DD`.
	Date,
	/// Time of day, `HH:MM:SS`.
	Time,
	/// RFC 3339 UTC timestamp.
	DateTime,
	/// Duration in whole seconds.
	Duration,
	/// IPv4 address.
	IpAddress,
	/// Small JSON object.
	Json,
	/// Byte array.
	Binary,
	/// One of the given values.
	Choice(Vec<Value>),
	/// Another hint whose string values are cut to `max_length` characters.
	Bounded {
		/// Hint producing the value.
		hint: Box<FakerHint>,
		/// Maximum number of characters.
		max_length: usize,
	},
}

impl FakerHint {
	/// Wraps this hint so string values fit in `max_length` characters.
	pub fn bounded(self, max_length: usize) -> Self {
		Self::Bounded {
			hint: Box::new(self),
			max_length,
		}
	}
}

/// Produces a single value for a hint.
///
/// Implementations own their randomness so that a seeded generator yields
/// the same values for the same sequence of hints.
pub trait ValueGenerator: Send {
	/// Generates a value of the shape described by `hint`.
	fn generate(&mut self, hint: &FakerHint) -> SeedingResult<Value>;
}

/// [`ValueGenerator`] backed by the `fake` crate.
///
/// # Example
///
/// ```
/// use seedbed::faker::{FakeGenerator, FakerHint, ValueGenerator};
///
/// let mut generator = FakeGenerator::seeded(7);
/// let email = generator.generate(&FakerHint::Email).unwrap();
/// assert!(email.as_str().unwrap().contains('@'));
/// ```
#[derive(Debug, Clone)]
pub struct FakeGenerator {
	rng: StdRng,
}

impl FakeGenerator {
	/// Creates a generator seeded from the operating system.
	pub fn new() -> Self {
		Self {
			rng: StdRng::from_entropy(),
		}
	}

	/// Creates a deterministic generator.
	pub fn seeded(seed: u64) -> Self {
		Self {
			rng: StdRng::seed_from_u64(seed),
		}
	}

	fn sentence(&mut self, words: Range<usize>) -> String {
		let sentence: String = Sentence(words).fake_with_rng(&mut self.rng);
		sentence
	}

	fn text(&mut self, max_length: Option<usize>) -> String {
		let text: String = match max_length {
			Some(max) if max < 64 => {
				let words: Vec<String> = Words(1..4).fake_with_rng(&mut self.rng);
				words.join(" ")
			}
			_ => Paragraph(1..4).fake_with_rng(&mut self.rng),
		};
		match max_length {
			Some(max) => text.chars().take(max).collect(),
			None => text,
		}
	}

	fn timestamp(&mut self) -> SeedingResult<DateTime<Utc>> {
		let secs = self.rng.gen_range(EPOCH_START..EPOCH_END);
		DateTime::from_timestamp(secs, 0)
			.ok_or_else(|| SeedingError::FakerError(format!("Timestamp {} out of range", secs)))
	}
}

impl Default for FakeGenerator {
	fn default() -> Self {
		Self::new()
	}
}

impl ValueGenerator for FakeGenerator {
	fn generate(&mut self, hint: &FakerHint) -> SeedingResult<Value> {
		let rng = &mut self.rng;
		let value = match hint {
			FakerHint::Boolean => json!(rng.gen_bool(0.5)),
			FakerHint::Integer { min, max } => {
				if min > max {
					return Err(SeedingError::FakerError(format!(
						"Empty integer range {}..={}",
						min, max
					)));
				}
				json!(rng.gen_range(*min..=*max))
			}
			FakerHint::Float { min, max } => {
				if min >= max {
					return Err(SeedingError::FakerError(format!(
						"Empty float range {}..{}",
						min, max
					)));
				}
				json!(rng.gen_range(*min..*max))
			}
			FakerHint::Decimal {
				max_digits,
				decimal_places,
			} => {
				let places = u32::from(*decimal_places);
				let int_digits = u32::from(max_digits.saturating_sub(*decimal_places)).min(15);
				let whole = rng.gen_range(0..10u64.pow(int_digits));
				if places == 0 {
					json!(whole.to_string())
				} else {
					let frac = rng.gen_range(0..10u64.pow(places.min(15)));
					json!(format!(
						"{}.{:0width$}",
						whole,
						frac,
						width = places.min(15) as usize
					))
				}
			}
			FakerHint::FullName => json!(Name().fake_with_rng::<String, _>(rng)),
			FakerHint::FirstName => json!(FirstName().fake_with_rng::<String, _>(rng)),
			FakerHint::LastName => json!(LastName().fake_with_rng::<String, _>(rng)),
			FakerHint::Username => json!(Username().fake_with_rng::<String, _>(rng)),
			FakerHint::Email => json!(SafeEmail().fake_with_rng::<String, _>(rng)),
			FakerHint::PhoneNumber => json!(PhoneNumber().fake_with_rng::<String, _>(rng)),
			FakerHint::Address => {
				let number = rng.gen_range(1..9999);
				let street: String = StreetName().fake_with_rng(rng);
				let city: String = CityName().fake_with_rng(rng);
				let zip: String = ZipCode().fake_with_rng(rng);
				json!(format!("{} {}, {} {}", number, street, city, zip))
			}
			FakerHint::StreetName => json!(StreetName().fake_with_rng::<String, _>(rng)),
			FakerHint::City => json!(CityName().fake_with_rng::<String, _>(rng)),
			FakerHint::PostCode => json!(ZipCode().fake_with_rng::<String, _>(rng)),
			FakerHint::State => json!(StateName().fake_with_rng::<String, _>(rng)),
			FakerHint::Country => json!(CountryName().fake_with_rng::<String, _>(rng)),
			FakerHint::CompanyName => json!(CompanyName().fake_with_rng::<String, _>(rng)),
			FakerHint::Title => {
				let title = self.sentence(2..6);
				json!(title.trim_end_matches('.'))
			}
			FakerHint::Text { max_length } => json!(self.text(*max_length)),
			FakerHint::Word => json!(Word().fake_with_rng::<String, _>(rng)),
			FakerHint::Slug => {
				let words: Vec<String> = Words(2..4).fake_with_rng(rng);
				json!(words.join("-").to_lowercase())
			}
			FakerHint::Url => {
				let host: String = Word().fake_with_rng(rng);
				let suffix: String = DomainSuffix().fake_with_rng(rng);
				json!(format!("https://www.{}.{}/", host.to_lowercase(), suffix))
			}
			FakerHint::Uuid => {
				let mut bytes = [0u8; 16];
				rng.fill(&mut bytes);
				json!(uuid::Builder::from_random_bytes(bytes).into_uuid().to_string())
			}
			FakerHint::Date => json!(self.timestamp()?.date_naive().to_string()),
			FakerHint::Time => {
				let secs = rng.gen_range(0..86_400u32);
				let time = NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).ok_or_else(
					|| SeedingError::FakerError(format!("Invalid time of day {}", secs)),
				)?;
				json!(time.format("%H:%M:%S").to_string())
			}
			FakerHint::DateTime => json!(self.timestamp()?.to_rfc3339()),
			FakerHint::Duration => json!(rng.gen_range(0..30 * 86_400i64)),
			FakerHint::IpAddress => {
				let ip = Ipv4Addr::new(
					rng.gen_range(1..=223),
					rng.gen_range(0..=255),
					rng.gen_range(0..=255),
					rng.gen_range(1..=254),
				);
				json!(ip.to_string())
			}
			FakerHint::Json => {
				let key: String = Word().fake_with_rng(rng);
				let mut object = Map::new();
				object.insert(key, json!(rng.gen_range(0..1000)));
				Value::Object(object)
			}
			FakerHint::Binary => {
				let len = rng.gen_range(1..=32);
				let bytes: Vec<u8> = (0..len).map(|_| rng.gen_range(0..=255u8)).collect();
				json!(bytes)
			}
			FakerHint::Choice(choices) => choices
				.choose(rng)
				.cloned()
				.ok_or_else(|| SeedingError::FakerError("Empty choice set".to_string()))?,
			FakerHint::Bounded { hint, max_length } => {
				truncate(self.generate(hint)?, *max_length)
			}
		};
		Ok(value)
	}
}

fn truncate(value: Value, max_length: usize) -> Value {
	match value {
		Value::String(text) if text.chars().count() > max_length => {
			let cut: String = text.chars().take(max_length).collect();
			Value::String(cut.trim_end().to_string())
		}
		other => other,
	}
}
