//! Deterministic names for residents and companies.
//!
//! Same random stream, same names. Used only when bootstrapping a city.

use crate::{company::Industry, rng::RandomSource};

pub struct NameGenerator;

impl NameGenerator {
    pub fn person_name<R: RandomSource + ?Sized>(rng: &mut R) -> String {
        format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, SURNAMES))
    }

    /// "<Surname or place> <trade word> <suffix>", e.g. "Okafor Bakery Co".
    pub fn company_name<R: RandomSource + ?Sized>(rng: &mut R, industry: Industry) -> String {
        let head = if rng.chance(0.5) {
            pick(rng, SURNAMES)
        } else {
            pick(rng, PLACES)
        };
        let trade = pick(rng, trade_words(industry));
        let suffix = pick(rng, SUFFIXES);
        format!("{head} {trade} {suffix}")
    }
}

fn pick<R: RandomSource + ?Sized>(rng: &mut R, words: &'static [&'static str]) -> &'static str {
    let last = u32::try_from(words.len().saturating_sub(1)).unwrap_or(0);
    words[rng.range_inclusive(0, last) as usize]
}

fn trade_words(industry: Industry) -> &'static [&'static str] {
    match industry {
        Industry::Technology => &["Software", "Systems", "Digital", "Labs"],
        Industry::Retail => &["Market", "Outfitters", "Bakery", "Goods"],
        Industry::Agriculture => &["Farms", "Orchards", "Dairy", "Growers"],
        Industry::Manufacturing => &["Works", "Fabrication", "Machining", "Mills"],
        Industry::Finance => &["Capital", "Savings", "Trust", "Partners"],
        Industry::Healthcare => &["Clinic", "Health", "Pharmacy", "Care"],
        Industry::Construction => &["Builders", "Contracting", "Masonry", "Roofing"],
        Industry::Hospitality => &["Diner", "Inn", "Kitchen", "Hotel"],
    }
}

const FIRST_NAMES: &[&str] = &[
    "Ada", "Amir", "Beatriz", "Chen", "Dmitri", "Elena", "Farah", "Gustavo", "Hana", "Ike",
    "Jonas", "Keiko", "Lars", "Mei", "Nadia", "Omar", "Priya", "Quinn", "Rosa", "Sven",
    "Tomas", "Uma", "Viktor", "Wen", "Yusuf", "Zara",
];

const SURNAMES: &[&str] = &[
    "Abara", "Bergstrom", "Castillo", "Dubois", "Eriksen", "Fujita", "Gallagher", "Haddad",
    "Ivanova", "Jensen", "Kowalski", "Lindqvist", "Moreau", "Nakamura", "Okafor", "Petrov",
    "Quintero", "Rahman", "Silva", "Tanaka", "Ueda", "Varga", "Whitfield", "Yilmaz",
];

const PLACES: &[&str] = &[
    "Riverside", "Hillcrest", "Northgate", "Lakeview", "Old Town", "Mill Creek", "Harbor",
    "Elmwood",
];

const SUFFIXES: &[&str] = &["Co", "& Sons", "Ltd", "Group", "Cooperative"];
