//! Whole-city behaviour over more than a year: idempotent cycles, yearly
//! tax settlement and employment.

use chrono::{Datelike, NaiveDate};
use civic_core::{
    config::SimConfig,
    engine::SimEngine,
    event::SimEvent,
};

fn city(seed: u64) -> SimEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    SimEngine::build(format!("annual-{seed}"), seed, SimConfig::default_test()).unwrap()
}

#[test]
fn taxes_are_settled_exactly_once_per_new_year() {
    let mut engine = city(8);
    engine.run_months(26).unwrap();

    let years: Vec<i32> = engine
        .take_event_log()
        .iter()
        .filter(|e| e.event_type == "taxes_collected")
        .map(|e| match serde_json::from_str::<SimEvent>(&e.payload).unwrap() {
            SimEvent::TaxesCollected { report, .. } => report.year,
            other => panic!("unexpected payload {other:?}"),
        })
        .collect();
    assert_eq!(years, vec![2001, 2002]);
    assert_eq!(engine.state.government.last_tax_year, 2002);
    assert_eq!(engine.state.government.history.income.len(), 2);
}

#[test]
fn repeating_a_cycle_on_the_same_day_changes_nothing() {
    let mut engine = city(9);
    engine.run_months(13).unwrap();
    assert_eq!(engine.clock.date.month(), 1);
    let before = engine.snapshot();

    assert!(engine.advance_one_month().unwrap().is_empty());
    assert!(engine.advance_one_month().unwrap().is_empty());
    assert_eq!(engine.snapshot(), before);
}

#[test]
fn cycles_land_on_the_first_of_each_month() {
    let mut engine = city(10);
    engine.run_months(4).unwrap();
    assert_eq!(
        engine.state.next_calculation_date,
        NaiveDate::from_ymd_opt(2000, 5, 1).unwrap()
    );
    assert_eq!(engine.clock.date, NaiveDate::from_ymd_opt(2000, 4, 1).unwrap());
}

#[test]
fn demo_city_puts_people_to_work() {
    let mut engine = city(11);
    engine.run_months(3).unwrap();

    let employed = engine
        .state
        .population
        .persons()
        .filter(|p| p.is_employed())
        .count();
    assert!(employed > 0);

    // Every employee back-reference matches the person's employer.
    for company in engine.state.companies.iter() {
        for id in &company.employees {
            let person = engine.state.population.person(*id).unwrap();
            assert_eq!(person.employer, Some(company.id));
            assert_eq!(person.industry, company.industry);
        }
    }
    let u = engine.state.market.unemployment;
    assert!((0.0..=1.0).contains(&u));
    assert!(engine.summary().to_string().contains("unemployment"));
}
