//! A restored snapshot resumes with numerically identical results.

use civic_core::{
    config::SimConfig,
    engine::SimEngine,
    error::SimError,
    geography::ManhattanPaths,
    snapshot::SimSnapshot,
    store::SimStore,
    world,
};
use std::sync::Arc;

const SEED: u64 = 31337;

fn restore(snapshot: SimSnapshot) -> SimEngine {
    let city = world::bootstrap(&snapshot.config, snapshot.seed);
    SimEngine::restore(snapshot, Arc::new(city.map), Arc::new(ManhattanPaths))
}

#[test]
fn restored_engine_continues_identically() {
    let mut original = SimEngine::build("snap".into(), SEED, SimConfig::default_test()).unwrap();
    original.run_months(5).unwrap();

    let json = original.snapshot().to_json().unwrap();
    let mut resumed = restore(SimSnapshot::from_json(&json).unwrap());
    assert_eq!(resumed.snapshot(), original.snapshot());

    original.take_event_log();
    original.run_months(9).unwrap();
    resumed.run_months(9).unwrap();

    assert_eq!(resumed.state, original.state);
    assert_eq!(resumed.clock, original.clock);

    let a: Vec<String> = original.take_event_log().into_iter().map(|e| e.payload).collect();
    let b: Vec<String> = resumed.take_event_log().into_iter().map(|e| e.payload).collect();
    assert_eq!(a, b);
}

#[test]
fn store_keeps_the_latest_snapshot_per_run() {
    let store = SimStore::in_memory().unwrap();
    store.migrate().unwrap();
    let config = SimConfig::default_test();
    store.insert_run("snap-store", SEED, "test", config.start_date).unwrap();

    let mut engine = SimEngine::build("snap-store".into(), SEED, config).unwrap();
    engine.run_months(2).unwrap();
    store.save_snapshot(&engine.snapshot()).unwrap();
    engine.run_months(3).unwrap();
    store.save_snapshot(&engine.snapshot()).unwrap();

    let latest = store.latest_snapshot("snap-store").unwrap();
    assert_eq!(latest, engine.snapshot());
    assert_eq!(store.snapshot_at_or_before("snap-store", 4).unwrap().map(|s| s.cycle()), Some(2));
    assert_eq!(store.run_seed("snap-store").unwrap(), Some(SEED));
}

#[test]
fn missing_snapshot_is_reported() {
    let store = SimStore::in_memory().unwrap();
    store.migrate().unwrap();
    match store.latest_snapshot("nope") {
        Err(SimError::SnapshotNotFound { run_id }) => assert_eq!(run_id, "nope"),
        other => panic!("expected SnapshotNotFound, got {other:?}"),
    }
}
