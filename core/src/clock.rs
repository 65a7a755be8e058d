//! Simulation clock: owns the simulated date, speed control, and pause.

use crate::types::SimDate;
use chrono::Days;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub date: SimDate,
    pub speed: SimSpeed,
    /// Speed to return to on `resume()`.
    resume_speed: SimSpeed,
}

impl SimClock {
    pub fn new(start: SimDate) -> Self {
        Self {
            date: start,
            speed: SimSpeed::Paused,
            resume_speed: SimSpeed::Normal,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.speed == SimSpeed::Paused
    }

    /// Advance by one external tick worth of days, then hand the new date
    /// to `on_advance`. A paused clock moves nothing and skips the callback.
    /// Returns whether time moved.
    pub fn advance<F: FnOnce(SimDate)>(&mut self, on_advance: F) -> bool {
        let days = self.speed.days_per_tick();
        if days == 0 {
            return false;
        }
        // Saturate at the calendar's end rather than go backwards.
        if let Some(next) = self.date.checked_add_days(Days::new(days)) {
            self.date = next;
        }
        on_advance(self.date);
        true
    }

    pub fn pause(&mut self) {
        if !self.is_paused() {
            self.resume_speed = self.speed;
        }
        self.speed = SimSpeed::Paused;
    }

    pub fn resume(&mut self) {
        if self.is_paused() {
            self.speed = self.resume_speed;
        }
    }

    pub fn set_speed(&mut self, speed: SimSpeed) {
        if speed != SimSpeed::Paused {
            self.resume_speed = speed;
        }
        self.speed = speed;
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SimSpeed {
    Paused,      // 0 days/tick
    Normal,      // 1 day/tick
    Accelerated, // 7 days/tick
    /// 30 days per tick. A tick runs at most one monthly cycle, so a jump
    /// across two month boundaries (Jan 31 to Mar 1) skips a month.
    /// `SimEngine::run_months` ticks at `Normal` to run every month.
    FastForward,
}

impl SimSpeed {
    pub fn days_per_tick(&self) -> u64 {
        match self {
            Self::Paused => 0,
            Self::Normal => 1,
            Self::Accelerated => 7,
            Self::FastForward => 30,
        }
    }
}
