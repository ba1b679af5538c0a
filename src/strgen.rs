//! String generation strategies for `Primitive(string)` slots.
//!
//! The synthesizer takes a [`StringGenerator`] so tests can pin the output.
//! [`FieldNameFaker`] keys its output on the field name: the RNG is seeded
//! from `(seed, field name)` alone, so the same field always gets the same
//! value no matter how many other fields were generated before it.

use chrono::{Days, NaiveDate, NaiveTime, SecondsFormat};
use fake::Fake;
use fake::faker::address::en::{CityName, CountryName};
use fake::faker::internet::en::{SafeEmail, Username};
use fake::faker::lorem::en::{Sentence, Word, Words};
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;

pub const DEFAULT_PLACEHOLDER: &str = "Sample text";

pub trait StringGenerator: Send + Sync {
    fn generate(&self, field_name: Option<&str>) -> String;
}

// ————————————————————————————————————————————————————————————————————————————
// PLACEHOLDER
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    text: String,
}

impl Placeholder {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for Placeholder {
    fn default() -> Self { Self::new(DEFAULT_PLACEHOLDER) }
}

impl StringGenerator for Placeholder {
    fn generate(&self, _field_name: Option<&str>) -> String {
        self.text.clone()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// FIELD NAME FAKER
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCategory {
    FullName,
    FirstName,
    LastName,
    Username,
    Email,
    Phone,
    Date,
    DateTime,
    Url,
    City,
    Country,
    Title,
    Id,
    Phrase,
}

// First match wins; names are normalized to snake_case before matching.
static CATEGORY_RULES: Lazy<Vec<(Regex, FieldCategory)>> = Lazy::new(|| {
    let rules: [(&str, FieldCategory); 13] = [
        (r"^(first|given)_?name$", FieldCategory::FirstName),
        (r"^(last|family|sur)_?name$", FieldCategory::LastName),
        (r"(^|_)(user_?name|handle|login)$", FieldCategory::Username),
        (r"^((full|display|author|owner|customer|person|contact)_)?name$|^(author|owner)$", FieldCategory::FullName),
        (r"(^|_)(e_?)?mail(_address)?$", FieldCategory::Email),
        (r"(^|_)(phone|mobile|tel|telephone)(_number)?$", FieldCategory::Phone),
        (r"(_at|_time|^timestamp|^datetime|_timestamp)$", FieldCategory::DateTime),
        (r"(^|_)(date|day|birthday|dob)$|_on$", FieldCategory::Date),
        (r"(^|_)(url|uri|href|link|website|src|avatar|image)$", FieldCategory::Url),
        (r"(^|_)city$", FieldCategory::City),
        (r"(^|_)country$", FieldCategory::Country),
        (r"(^|_)(title|heading|headline|label)$", FieldCategory::Title),
        (r"(^|_)(id|uuid|guid|key)$", FieldCategory::Id),
    ];
    rules
        .into_iter()
        .filter_map(|(pattern, category)| Regex::new(pattern).ok().map(|rx| (rx, category)))
        .collect()
});

/// `firstName`, `first-name`, `FirstName` → `first_name`.
pub fn normalize_field_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower_or_digit = false;
    for c in name.chars() {
        if c.is_uppercase() {
            if prev_lower_or_digit {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            prev_lower_or_digit = false;
        } else if c == '-' || c == ' ' {
            out.push('_');
            prev_lower_or_digit = false;
        } else {
            out.push(c);
            prev_lower_or_digit = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

pub fn classify(field_name: &str) -> FieldCategory {
    let normalized = normalize_field_name(field_name);
    CATEGORY_RULES
        .iter()
        .find(|(rx, _)| rx.is_match(&normalized))
        .map(|(_, category)| *category)
        .unwrap_or(FieldCategory::Phrase)
}

/// First 8 bytes (little endian) of the BLAKE3 digest of the name. Fixed by
/// the hash definition, so seeds mean the same thing on every toolchain.
fn field_fingerprint(field_name: &str) -> u64 {
    let digest = blake3::hash(field_name.as_bytes());
    let mut word = [0u8; 8];
    word.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(word)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldNameFaker {
    seed: u64,
}

impl FieldNameFaker {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn rng_for(&self, field_name: Option<&str>) -> StdRng {
        StdRng::seed_from_u64(self.seed ^ field_fingerprint(field_name.unwrap_or_default()))
    }
}

impl StringGenerator for FieldNameFaker {
    fn generate(&self, field_name: Option<&str>) -> String {
        let category = field_name.map(classify).unwrap_or(FieldCategory::Phrase);
        let mut rng = self.rng_for(field_name);
        match category {
            FieldCategory::FullName => Name().fake_with_rng::<String, _>(&mut rng),
            FieldCategory::FirstName => FirstName().fake_with_rng::<String, _>(&mut rng),
            FieldCategory::LastName => LastName().fake_with_rng::<String, _>(&mut rng),
            FieldCategory::Username => Username().fake_with_rng::<String, _>(&mut rng),
            FieldCategory::Email => SafeEmail().fake_with_rng::<String, _>(&mut rng),
            FieldCategory::Phone => PhoneNumber().fake_with_rng::<String, _>(&mut rng),
            FieldCategory::City => CityName().fake_with_rng::<String, _>(&mut rng),
            FieldCategory::Country => CountryName().fake_with_rng::<String, _>(&mut rng),
            FieldCategory::Date => sample_date(&mut rng).format("%Y-%m-%d").to_string(),
            FieldCategory::DateTime => {
                let time = NaiveTime::from_num_seconds_from_midnight_opt(rng.gen_range(0..86_400), 0)
                    .unwrap_or_default();
                sample_date(&mut rng)
                    .and_time(time)
                    .and_utc()
                    .to_rfc3339_opts(SecondsFormat::Secs, true)
            }
            FieldCategory::Url => {
                let slug: String = Word().fake_with_rng(&mut rng);
                format!("https://example.com/{}", slug.to_lowercase())
            }
            FieldCategory::Title => {
                let sentence: String = Sentence(2..5).fake_with_rng(&mut rng);
                sentence.trim_end_matches('.').to_string()
            }
            FieldCategory::Id => {
                let (hi, lo): (u64, u64) = (rng.r#gen(), rng.r#gen());
                format!(
                    "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
                    hi >> 32,
                    (hi >> 16) & 0xffff,
                    hi & 0xffff,
                    lo >> 48,
                    lo & 0xffff_ffff_ffff
                )
            }
            FieldCategory::Phrase => {
                let words: Vec<String> = Words(2..5).fake_with_rng(&mut rng);
                words.join(" ")
            }
        }
    }
}

// somewhere in 2020..2025
fn sample_date(rng: &mut StdRng) -> NaiveDate {
    let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default();
    let offset = Days::new(rng.gen_range(0..1826));
    base.checked_add_days(offset).unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_ignores_field_name() {
        let g = Placeholder::default();
        assert_eq!(g.generate(Some("name")), "Sample text");
        assert_eq!(g.generate(None), "Sample text");
        assert_eq!(Placeholder::new("x").generate(Some("y")), "x");
    }

    #[test]
    fn normalizes_field_names() {
        assert_eq!(normalize_field_name("firstName"), "first_name");
        assert_eq!(normalize_field_name("first-name"), "first_name");
        assert_eq!(normalize_field_name("FirstName"), "first_name");
        assert_eq!(normalize_field_name("createdAt"), "created_at");
        assert_eq!(normalize_field_name("avatarURL"), "avatar_url");
        assert_eq!(normalize_field_name("user_id"), "user_id");
    }

    #[test]
    fn classifies_common_field_names() {
        assert_eq!(classify("name"), FieldCategory::FullName);
        assert_eq!(classify("authorName"), FieldCategory::FullName);
        assert_eq!(classify("firstName"), FieldCategory::FirstName);
        assert_eq!(classify("surname"), FieldCategory::LastName);
        assert_eq!(classify("username"), FieldCategory::Username);
        assert_eq!(classify("userName"), FieldCategory::Username);
        assert_eq!(classify("email"), FieldCategory::Email);
        assert_eq!(classify("contactEmail"), FieldCategory::Email);
        assert_eq!(classify("phoneNumber"), FieldCategory::Phone);
        assert_eq!(classify("birthDate"), FieldCategory::Date);
        assert_eq!(classify("date"), FieldCategory::Date);
        assert_eq!(classify("createdAt"), FieldCategory::DateTime);
        assert_eq!(classify("avatarUrl"), FieldCategory::Url);
        assert_eq!(classify("city"), FieldCategory::City);
        assert_eq!(classify("title"), FieldCategory::Title);
        assert_eq!(classify("userId"), FieldCategory::Id);
        assert_eq!(classify("description"), FieldCategory::Phrase);
        assert_eq!(classify("fileName"), FieldCategory::Phrase);
    }

    #[test]
    fn faker_is_deterministic_per_field() {
        let g = FieldNameFaker::new(7);
        for field in ["name", "email", "createdAt", "birthDate", "id", "bio"] {
            assert_eq!(g.generate(Some(field)), g.generate(Some(field)), "{field}");
        }
        // order of calls must not matter
        let a = g.generate(Some("bio"));
        let _ = g.generate(Some("name"));
        assert_eq!(g.generate(Some("bio")), a);
        assert_eq!(FieldNameFaker::new(7).generate(Some("bio")), a);
    }

    #[test]
    fn field_fingerprint_is_pinned() {
        // BLAKE3("") = af1349b9f5f9a1a6...
        assert_eq!(field_fingerprint(""), 0xa6a1_f9f5_b949_13af);
        assert_ne!(field_fingerprint("name"), field_fingerprint("email"));
        assert_eq!(FieldNameFaker::new(3).generate(None), FieldNameFaker::new(3).generate(Some("")));
    }

    #[test]
    fn faker_formats_by_category() {
        let g = FieldNameFaker::new(0);
        let date = g.generate(Some("birthDate"));
        assert!(NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_ok(), "{date}");

        let stamp = g.generate(Some("updatedAt"));
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok(), "{stamp}");

        let email = g.generate(Some("email"));
        assert!(email.contains('@'), "{email}");

        let url = g.generate(Some("website"));
        assert!(url.starts_with("https://example.com/"), "{url}");

        let id = g.generate(Some("id"));
        assert_eq!(id.len(), 36, "{id}");
        assert_eq!(id.matches('-').count(), 4);

        let name = g.generate(Some("name"));
        assert!(!name.trim().is_empty());

        let phrase = g.generate(None);
        assert!(phrase.split(' ').count() >= 2, "{phrase}");
    }
}
