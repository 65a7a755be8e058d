//! The wall-clock driver: ticking, pausing and stopping.

use civic_core::{
    clock::SimSpeed, command::PlayerCommand, config::SimConfig, engine::SimEngine,
    scheduler::Scheduler,
};
use std::{thread, time::Duration};

fn engine() -> SimEngine {
    SimEngine::build("sched".into(), 3, SimConfig::default_test()).unwrap()
}

#[test]
fn running_scheduler_advances_the_clock() {
    let mut engine = engine();
    let start = engine.clock.date;
    engine.clock.set_speed(SimSpeed::FastForward);

    let scheduler = Scheduler::start(engine, Duration::from_millis(5));
    thread::sleep(Duration::from_millis(200));
    let shared = scheduler.stop();

    let engine = shared.read();
    assert!(engine.clock.date > start);
    assert!(engine.state.cycle >= 1);
}

#[test]
fn paused_engine_is_ticked_but_does_not_move() {
    let engine = engine();
    let start = engine.clock.date;

    let scheduler = Scheduler::start(engine, Duration::from_millis(5));
    thread::sleep(Duration::from_millis(60));
    assert_eq!(scheduler.summary().date, start);
    assert_eq!(scheduler.engine().read().state.cycle, 0);

    scheduler.set_speed(SimSpeed::FastForward);
    thread::sleep(Duration::from_millis(100));
    scheduler.pause();
    let paused_at = scheduler.summary().date;
    assert!(paused_at > start);

    thread::sleep(Duration::from_millis(60));
    assert_eq!(scheduler.summary().date, paused_at);
    drop(scheduler);
}

#[test]
fn stop_returns_promptly_and_engine_is_unshared() {
    let scheduler = Scheduler::start(engine(), Duration::from_millis(10_000));
    scheduler
        .command(&PlayerCommand::SetInterestRate { rate: 6.5 })
        .unwrap();
    let shared = scheduler.stop();
    assert_eq!(std::sync::Arc::strong_count(&shared), 1);
    assert_eq!(shared.read().state.market.interest_rate, 6.5);
}
