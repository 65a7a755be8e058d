//! Events emitted by the monthly stages.
//!
//! RULE: stages report what they did ONLY through events. The engine
//! appends every event to the run's log; nothing reads the log back to
//! drive the simulation.

use crate::{
    government::TaxReport,
    market::PhaseChange,
    types::{RunId, SimDate},
};
use serde::{Deserialize, Serialize};

/// Every event emitted during simulation.
/// Variants are only ever appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine ─────────────────────────────────────
    RunInitialized {
        run_id: RunId,
        seed: u64,
    },
    CycleStarted {
        cycle: u64,
        date: SimDate,
    },
    CycleCompleted {
        cycle: u64,
        date: SimDate,
        next_calculation_date: SimDate,
    },
    CommandApplied {
        date: SimDate,
        command: String,
    },

    // ── Population ─────────────────────────────────
    HouseholdsPurged {
        cycle: u64,
        count: usize,
    },
    PopulationRecorded {
        cycle: u64,
        population: usize,
        households: usize,
        growth: f64,
    },

    // ── Market ─────────────────────────────────────
    MarketUpdated {
        cycle: u64,
        sentiment: f64,
        money_supply_growth: f64,
        inflation: f64,
        growth: f64,
        market_index: f64,
    },
    PhaseChanged {
        cycle: u64,
        change: PhaseChange,
    },

    // ── Regional trade ─────────────────────────────
    TradeComputed {
        cycle: u64,
        regions: usize,
        daily_trips: u64,
        retail_sales: f64,
    },

    // ── Companies ──────────────────────────────────
    ProfitsReported {
        cycle: u64,
        companies: usize,
        total_profit: f64,
        total_openings: u32,
    },

    // ── Employment ─────────────────────────────────
    JobsAssigned {
        cycle: u64,
        hired: usize,
        retired: usize,
        still_seeking: usize,
        unemployment: f64,
    },

    // ── Government ─────────────────────────────────
    TaxesCollected {
        cycle: u64,
        report: TaxReport,
    },
}

impl SimEvent {
    /// Stable name for the event_type column in event_log.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RunInitialized { .. } => "run_initialized",
            Self::CycleStarted { .. } => "cycle_started",
            Self::CycleCompleted { .. } => "cycle_completed",
            Self::CommandApplied { .. } => "command_applied",
            Self::HouseholdsPurged { .. } => "households_purged",
            Self::PopulationRecorded { .. } => "population_recorded",
            Self::MarketUpdated { .. } => "market_updated",
            Self::PhaseChanged { .. } => "phase_changed",
            Self::TradeComputed { .. } => "trade_computed",
            Self::ProfitsReported { .. } => "profits_reported",
            Self::JobsAssigned { .. } => "jobs_assigned",
            Self::TaxesCollected { .. } => "taxes_collected",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub run_id: RunId,
    pub cycle: u64,
    pub subsystem: String,
    pub event_type: String,
    pub payload: String, // JSON-serialized SimEvent
}

impl EventLogEntry {
    pub fn new(
        run_id: &str,
        cycle: u64,
        subsystem: &str,
        event: &SimEvent,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            id: None,
            run_id: run_id.to_string(),
            cycle,
            subsystem: subsystem.to_string(),
            event_type: event.type_name().to_string(),
            payload: serde_json::to_string(event)?,
        })
    }
}
