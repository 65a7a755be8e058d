//! Shared primitive types used across the entire simulation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A simulated calendar date. One clock day = one in-game day.
pub type SimDate = NaiveDate;

/// The canonical run identifier.
pub type RunId = String;

pub type PersonId = u64;
pub type HouseholdId = u64;
pub type CompanyId = u64;
pub type RegionId = u32;

/// Integer tile coordinate on the city grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Whole years elapsed between `from` and `to`. Zero if `to` precedes `from`.
pub fn years_between(from: SimDate, to: SimDate) -> u32 {
    use chrono::Datelike;
    if to < from {
        return 0;
    }
    let mut years = to.year() - from.year();
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// True if `value` can be applied as a policy setting. Logs and returns
/// false for NaN or infinite input.
pub(crate) fn finite_policy(name: &str, value: f64) -> bool {
    if value.is_finite() {
        return true;
    }
    log::warn!("ignoring non-finite {name}: {value}");
    false
}
