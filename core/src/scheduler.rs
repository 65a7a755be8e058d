//! Wall-clock driver for a live run.
//!
//! One background thread ticks the engine at a fixed interval. The engine
//! sits behind a single `RwLock`: the driver holds the write lock for a
//! whole tick, so readers always see a state between ticks, never inside
//! one. Pausing sets the clock speed to zero and keeps the thread alive.

use crate::{clock::SimSpeed, command::PlayerCommand, engine::SimEngine, error::SimResult, report::Summary};
use parking_lot::RwLock;
use std::{
    sync::{
        mpsc::{self, RecvTimeoutError},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

pub type SharedEngine = Arc<RwLock<SimEngine>>;

pub struct Scheduler {
    engine: SharedEngine,
    stop_tx: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawn the driver thread. The engine keeps whatever speed it has;
    /// a paused engine is ticked but does not move.
    pub fn start(engine: SimEngine, interval: Duration) -> Self {
        let engine = Arc::new(RwLock::new(engine));
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let driven = Arc::clone(&engine);

        let handle = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    let mut engine = driven.write();
                    if let Err(e) = engine.tick() {
                        log::error!("tick failed on {}: {e}", engine.clock.date);
                    }
                }
            }
        });

        log::info!("scheduler started, interval {interval:?}");
        Self {
            engine,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    /// Apply a command between ticks.
    pub fn command(&self, command: &PlayerCommand) -> SimResult<()> {
        self.engine.write().apply_command(command)?;
        Ok(())
    }

    pub fn pause(&self) {
        self.engine.write().clock.pause();
    }

    pub fn resume(&self) {
        self.engine.write().clock.resume();
    }

    pub fn set_speed(&self, speed: SimSpeed) {
        self.engine.write().clock.set_speed(speed);
    }

    /// A consistent view taken between ticks.
    pub fn summary(&self) -> Summary {
        self.engine.read().summary()
    }

    /// Signal the driver, wait for it to finish its current tick, and
    /// hand the engine back.
    pub fn stop(mut self) -> SharedEngine {
        self.shutdown();
        Arc::clone(&self.engine)
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("scheduler thread panicked");
            }
            log::info!("scheduler stopped");
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
