//! Two regions ten tiles apart, driven through the engine's monthly cycle.

use chrono::NaiveDate;
use civic_core::{
    company::{CareerLevel, CompanyCharter, CompanySize, Industry},
    config::SimConfig,
    engine::SimEngine,
    event::SimEvent,
    geography::{DistanceTable, LandUse, Occupant, TileMap},
    population::{EducationLevel, Gender, PersonSpec, RelationshipStatus},
    region::Region,
    state::SimState,
    types::TileCoord,
};
use std::sync::Arc;

const ANCHOR_A: TileCoord = TileCoord::new(0, 0);
const ANCHOR_B: TileCoord = TileCoord::new(10, 0);

fn resident() -> PersonSpec {
    PersonSpec {
        name: "Commuter".into(),
        birthdate: NaiveDate::from_ymd_opt(1975, 5, 5).unwrap(),
        gender: Gender::Female,
        education: EducationLevel::Bachelor,
        industry: Industry::Finance,
        career_level: CareerLevel::MidLevel,
        relationship: RelationshipStatus::Single,
    }
}

/// A: 10 homes × 100 residents. B: 5 shops, nobody living there.
fn two_region_engine(connected: bool) -> SimEngine {
    let config = SimConfig::default_test();
    let today = config.start_date;
    let mut state = SimState::new(&config);
    let mut map = TileMap::new(20, 2);

    for x in 0..10 {
        let home = TileCoord::new(x, 1);
        let hh = state.population.add_household(today, Some(home));
        for _ in 0..100 {
            state.population.add_person(hh, resident());
        }
        map.zone(home, LandUse::Residential, Some(Occupant::Household(hh)));
    }
    for x in 10..15 {
        let at = TileCoord::new(x, 1);
        let id = state.found_company(
            CompanyCharter {
                name: format!("Shop {x}"),
                industry: Industry::Retail,
                size: CompanySize::Small,
                location: Some(at),
                revenue: 10_000.0,
                expenses: 9_000.0,
            },
            today,
        );
        map.zone(at, LandUse::Retail, Some(Occupant::Company(id)));
    }

    state.regions.push(Region::new(1, "A", TileCoord::new(0, 0), 10, 2, Some(ANCHOR_A)));
    state.regions.push(Region::new(2, "B", TileCoord::new(10, 0), 10, 2, Some(ANCHOR_B)));

    let mut paths = DistanceTable::new();
    if connected {
        paths.connect(ANCHOR_A, ANCHOR_B, 10);
    }
    SimEngine::new("trade".into(), 1, config, state, Arc::new(map), Arc::new(paths)).unwrap()
}

#[test]
fn shoppers_from_a_make_399_daily_trips_to_b() {
    let mut engine = two_region_engine(true);
    let events = engine.advance_one_month().unwrap();

    let a = &engine.state.regions[0];
    let b = &engine.state.regions[1];
    assert_eq!(a.tally.population, 1_000);
    assert_eq!(b.tally.shops, 5);
    assert_eq!(b.tally.jobs, 0);
    assert_eq!(a.trips.len(), 1);
    assert_eq!(a.trips[0].destination, 2);
    assert_eq!(a.trips[0].daily_trips, 399);
    assert!(b.trips.is_empty());

    let traded = events.iter().find_map(|e| match e {
        SimEvent::TradeComputed { daily_trips, .. } => Some(*daily_trips),
        _ => None,
    });
    assert_eq!(traded, Some(399));

    // Visitors are B's only customers, and five identical shops split them evenly.
    let sales: Vec<f64> = engine.state.companies.iter().map(|c| c.retail_sales).collect();
    assert!(sales[0] > 0.0);
    assert!(sales.iter().all(|s| (s - sales[0]).abs() < 1e-6));
}

#[test]
fn unreachable_regions_trade_nothing() {
    let mut engine = two_region_engine(false);
    engine.advance_one_month().unwrap();
    assert!(engine.state.regions.iter().all(|r| r.trips.is_empty()));
    assert_eq!(engine.state.last_daily_trips, 0);
    assert!(engine.state.companies.iter().all(|c| c.retail_sales == 0.0));
}

#[test]
fn tallies_are_rebuilt_every_cycle() {
    let mut engine = two_region_engine(true);
    engine.advance_one_month().unwrap();
    let first = engine.state.regions.clone();

    engine.clock.date = engine.state.next_calculation_date;
    engine.advance_one_month().unwrap();
    assert_eq!(engine.state.regions[0].tally.population, first[0].tally.population);
    assert_eq!(engine.state.regions[0].trips.len(), 1);
}
