//! Demo city generation for the runner and integration tests.
//!
//! Lays out a 2×2 grid of districts, each with a road along its top edge,
//! a block of homes, a few shops and a farm, plus one citywide office per
//! remaining industry. Everything is drawn from the World RNG slot, so the
//! same seed always produces the same city.

use crate::{
    company::{CareerLevel, CompanyCharter, CompanySize, Industry},
    config::SimConfig,
    geography::{LandUse, Occupant, TileMap},
    name_generator::NameGenerator,
    population::{EducationLevel, Gender, PersonSpec, RelationshipStatus},
    region::Region,
    rng::{RandomSource, RngBank, SubsystemSlot},
    state::SimState,
    types::{SimDate, TileCoord},
};
use chrono::{Datelike, NaiveDate};

pub const DISTRICT_WIDTH: i32 = 15;
pub const DISTRICT_HEIGHT: i32 = 10;
const DISTRICTS: [&str; 4] = ["Old Town", "Riverside", "Northgate", "Mill Creek"];

/// Homes per district, of which `VACANT_HOMES` are left empty.
const HOMES_PER_DISTRICT: i32 = 12;
const VACANT_HOMES: i32 = 2;
const SHOPS_PER_DISTRICT: i32 = 3;

pub struct City {
    pub map: TileMap,
    pub state: SimState,
}

pub fn bootstrap(config: &SimConfig, seed: u64) -> City {
    let mut rng = RngBank::new(seed).for_subsystem_at_cycle(SubsystemSlot::World, 0);
    let today = config.start_date;
    let mut state = SimState::new(config);
    let mut map = TileMap::new(DISTRICT_WIDTH * 2, DISTRICT_HEIGHT * 2);

    for (index, name) in DISTRICTS.iter().enumerate() {
        let index = index as i32;
        let origin = TileCoord::new(
            (index % 2) * DISTRICT_WIDTH,
            (index / 2) * DISTRICT_HEIGHT,
        );
        let anchor = TileCoord::new(origin.x + DISTRICT_WIDTH / 2, origin.y);

        for dx in 0..DISTRICT_WIDTH {
            map.zone(TileCoord::new(origin.x + dx, origin.y), LandUse::Road, None);
        }

        for i in 0..HOMES_PER_DISTRICT {
            let home = TileCoord::new(origin.x + 1 + i % 6, origin.y + 2 + i / 6);
            if i < HOMES_PER_DISTRICT - VACANT_HOMES {
                let hh = state.population.add_household(today, Some(home));
                let members = rng.range_inclusive(1, 4);
                for _ in 0..members {
                    state.population.add_person(hh, random_resident(&mut rng, today));
                }
                map.zone(home, LandUse::Residential, Some(Occupant::Household(hh)));
            } else {
                map.zone(home, LandUse::Residential, None);
            }
        }

        for i in 0..SHOPS_PER_DISTRICT {
            let at = TileCoord::new(origin.x + 9 + i, origin.y + 2);
            let size = if i == 0 { CompanySize::Medium } else { CompanySize::Small };
            let id = state.found_company(charter(&mut rng, Industry::Retail, size, Some(at)), today);
            map.zone(at, LandUse::Retail, Some(Occupant::Company(id)));
        }

        let farm = TileCoord::new(origin.x + 9, origin.y + 6);
        let id = state.found_company(
            charter(&mut rng, Industry::Agriculture, CompanySize::Medium, Some(farm)),
            today,
        );
        map.zone(farm, LandUse::Agriculture, Some(Occupant::Company(id)));

        state.regions.push(Region::new(
            index as u32 + 1,
            *name,
            origin,
            DISTRICT_WIDTH,
            DISTRICT_HEIGHT,
            Some(anchor),
        ));
    }

    for industry in Industry::ALL {
        if matches!(industry, Industry::Retail | Industry::Agriculture) {
            continue;
        }
        state.found_company(charter(&mut rng, industry, CompanySize::Large, None), today);
    }

    City { map, state }
}

/// Monthly (revenue, expenses) by company size, with a little spread.
fn opening_books<R: RandomSource + ?Sized>(rng: &mut R, size: CompanySize) -> (f64, f64) {
    let (revenue, margin) = match size {
        CompanySize::Small => (40_000.0, 0.15),
        CompanySize::Medium => (120_000.0, 0.12),
        CompanySize::Large => (400_000.0, 0.10),
    };
    let revenue = revenue * rng.uniform(0.9, 1.1);
    (revenue, revenue * (1.0 - margin))
}

fn charter<R: RandomSource + ?Sized>(
    rng: &mut R,
    industry: Industry,
    size: CompanySize,
    location: Option<TileCoord>,
) -> CompanyCharter {
    let (revenue, expenses) = opening_books(rng, size);
    CompanyCharter {
        name: NameGenerator::company_name(rng, industry),
        industry,
        size,
        location,
        revenue,
        expenses,
    }
}

fn random_resident<R: RandomSource + ?Sized>(rng: &mut R, today: SimDate) -> PersonSpec {
    let age = rng.range_inclusive(0, 80) as i32;
    let birthdate = NaiveDate::from_ymd_opt(
        today.year() - age,
        rng.range_inclusive(1, 12),
        rng.range_inclusive(1, 28),
    )
    .unwrap_or(today);

    let career_level = match rng.range_inclusive(0, 9) {
        0..=4 => CareerLevel::EntryLevel,
        5..=7 => CareerLevel::MidLevel,
        8 => CareerLevel::Senior,
        _ => CareerLevel::Executive,
    };
    let education = match rng.range_inclusive(0, 9) {
        0 => EducationLevel::None,
        1..=4 => EducationLevel::HighSchool,
        5..=7 => EducationLevel::Bachelor,
        8 => EducationLevel::Master,
        _ => EducationLevel::Doctorate,
    };
    let gender = match rng.range_inclusive(0, 20) {
        0..=9 => Gender::Female,
        10..=19 => Gender::Male,
        _ => Gender::NonBinary,
    };
    let relationship = match rng.range_inclusive(0, 3) {
        0 => RelationshipStatus::Single,
        1 => RelationshipStatus::Partnered,
        2 => RelationshipStatus::Married,
        _ => RelationshipStatus::Widowed,
    };
    let industry = Industry::ALL[rng.range_inclusive(0, Industry::ALL.len() as u32 - 1) as usize];

    PersonSpec {
        name: NameGenerator::person_name(rng),
        birthdate,
        gender,
        education,
        industry,
        career_level,
        relationship,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geography::LandUseService;

    #[test]
    fn same_seed_same_city() {
        let config = SimConfig::default_test();
        let a = bootstrap(&config, 11);
        let b = bootstrap(&config, 11);
        assert_eq!(a.state, b.state);
    }

    #[test]
    fn districts_have_homes_shops_and_roads() {
        let config = SimConfig::default_test();
        let city = bootstrap(&config, 5);
        assert_eq!(city.state.regions.len(), 4);
        assert_eq!(city.map.road_length(), (DISTRICT_WIDTH * 4) as u64);
        assert_eq!(city.state.population.household_count(), 4 * 10);
        // 4 districts × (3 shops + 1 farm) + 6 offices
        assert_eq!(city.state.companies.len(), 22);
        let corner = city.state.regions[0].origin;
        assert_eq!(city.map.tile(TileCoord::new(corner.x + 9, corner.y + 2)).land_use, LandUse::Retail);
    }
}
