//! The simulation engine: orchestrator and time authority for the city
//! economy.
//!
//! EXECUTION ORDER of one monthly cycle (fixed, documented, never reordered):
//!   1. Population:  purge empty households, pay households, record growth
//!   2. Market:      sentiment, money supply, inflation, growth, index
//!   3. Region:      stats, then traffic, then sales
//!   4. Company:     profit, job openings, report aggregate profit
//!   5. Employment:  first-fit hiring, retirement, unemployment rate
//!   6. Government:  annual tax settlement (at most once per year)
//!
//! RULES:
//!   - A cycle runs only once the clock reaches `next_calculation_date`,
//!     which then moves to the first day of the following month.
//!   - Stages execute in registration order and share one `&mut SimState`.
//!   - All randomness flows through the RngBank, per (slot, cycle).
//!   - Every stage event is appended to the run's event log.

use crate::{
    clock::{SimClock, SimSpeed},
    command::PlayerCommand,
    config::SimConfig,
    error::SimResult,
    event::{EventLogEntry, SimEvent},
    geography::{LandUseService, ManhattanPaths, PathService},
    report::Summary,
    rng::RngBank,
    snapshot::{SimSnapshot, SNAPSHOT_VERSION},
    state::SimState,
    subsystem::{
        CompanyStage, CycleContext, EmploymentStage, GovernmentStage, MarketStage, PopulationStage,
        RegionStage, SimSubsystem,
    },
    types::{RunId, SimDate},
    world,
};
use chrono::{Datelike, Months};
use std::sync::Arc;

/// Longest month in days; bounds the ticks `run_months` needs per cycle.
const MAX_DAYS_PER_MONTH: u64 = 31;

/// Everything a cycle needs besides the clock and the state.
struct Pipeline {
    config: SimConfig,
    rng_bank: RngBank,
    land: Arc<dyn LandUseService>,
    paths: Arc<dyn PathService>,
    stages: Vec<Box<dyn SimSubsystem>>,
}

impl Pipeline {
    fn new(
        config: SimConfig,
        seed: u64,
        land: Arc<dyn LandUseService>,
        paths: Arc<dyn PathService>,
    ) -> Self {
        let mut pipeline = Self {
            config,
            rng_bank: RngBank::new(seed),
            land,
            paths,
            stages: Vec::new(),
        };
        // EXECUTION ORDER: fixed, documented, never reordered.
        pipeline.register(Box::new(PopulationStage));
        pipeline.register(Box::new(MarketStage));
        pipeline.register(Box::new(RegionStage));
        pipeline.register(Box::new(CompanyStage));
        pipeline.register(Box::new(EmploymentStage));
        pipeline.register(Box::new(GovernmentStage));
        pipeline
    }

    fn register(&mut self, stage: Box<dyn SimSubsystem>) {
        self.stages.push(stage);
    }

    fn advance_one_month(
        &mut self,
        today: SimDate,
        run_id: &str,
        state: &mut SimState,
        log: &mut Vec<EventLogEntry>,
    ) -> SimResult<Vec<SimEvent>> {
        if today < state.next_calculation_date {
            return Ok(Vec::new());
        }

        let cycle = state.cycle;
        let ctx = CycleContext {
            today,
            cycle,
            config: &self.config,
            land: self.land.as_ref(),
            paths: self.paths.as_ref(),
        };

        let started = SimEvent::CycleStarted { cycle, date: today };
        log.push(EventLogEntry::new(run_id, cycle, "engine", &started)?);
        let mut events = vec![started];

        for stage in &mut self.stages {
            let mut rng = self.rng_bank.for_subsystem_at_cycle(stage.slot(), cycle);
            let new_events = stage.update(&ctx, state, &events, &mut rng)?;
            for event in &new_events {
                log.push(EventLogEntry::new(run_id, cycle, stage.name(), event)?);
            }
            events.extend(new_events);
        }

        state.next_calculation_date = first_of_next_month(today);
        state.cycle += 1;

        let completed = SimEvent::CycleCompleted {
            cycle,
            date: today,
            next_calculation_date: state.next_calculation_date,
        };
        log.push(EventLogEntry::new(run_id, cycle, "engine", &completed)?);
        events.push(completed);

        log::info!("{}", Summary::capture(today, &self.config, state));
        Ok(events)
    }
}

/// First day of the month after `date`.
pub fn first_of_next_month(date: SimDate) -> SimDate {
    date.with_day(1)
        .and_then(|d| d.checked_add_months(Months::new(1)))
        .unwrap_or(SimDate::MAX)
}

pub struct SimEngine {
    pub run_id: RunId,
    pub clock: SimClock,
    pub state: SimState,
    seed: u64,
    pipeline: Pipeline,
    event_log: Vec<EventLogEntry>,
}

impl SimEngine {
    /// Wire an engine around an existing city. The clock starts paused at
    /// `config.start_date`.
    pub fn new(
        run_id: RunId,
        seed: u64,
        config: SimConfig,
        state: SimState,
        land: Arc<dyn LandUseService>,
        paths: Arc<dyn PathService>,
    ) -> SimResult<Self> {
        let clock = SimClock::new(config.start_date);
        let mut engine = Self {
            pipeline: Pipeline::new(config, seed, land, paths),
            clock,
            state,
            seed,
            event_log: Vec::new(),
            run_id,
        };
        let init = SimEvent::RunInitialized {
            run_id: engine.run_id.clone(),
            seed,
        };
        engine
            .event_log
            .push(EventLogEntry::new(&engine.run_id, 0, "engine", &init)?);
        Ok(engine)
    }

    /// Build an engine over the generated demo city.
    /// Call this instead of assembling the state by hand.
    pub fn build(run_id: RunId, seed: u64, config: SimConfig) -> SimResult<Self> {
        let city = world::bootstrap(&config, seed);
        log::info!(
            "bootstrapped city: {} residents, {} companies, {} regions",
            city.state.population.count(),
            city.state.companies.len(),
            city.state.regions.len()
        );
        Self::new(
            run_id,
            seed,
            config,
            city.state,
            Arc::new(city.map),
            Arc::new(ManhattanPaths),
        )
    }

    /// Resume a run from a snapshot over the given geography.
    pub fn restore(
        snapshot: SimSnapshot,
        land: Arc<dyn LandUseService>,
        paths: Arc<dyn PathService>,
    ) -> Self {
        Self {
            pipeline: Pipeline::new(snapshot.config, snapshot.seed, land, paths),
            run_id: snapshot.run_id,
            clock: snapshot.clock,
            state: snapshot.state,
            seed: snapshot.seed,
            event_log: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> SimSnapshot {
        SimSnapshot {
            version: SNAPSHOT_VERSION,
            run_id: self.run_id.clone(),
            seed: self.seed,
            clock: self.clock.clone(),
            config: self.pipeline.config.clone(),
            state: self.state.clone(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SimConfig {
        &self.pipeline.config
    }

    /// Advance the clock by one tick. A paused clock moves nothing and
    /// recomputes nothing; otherwise the monthly cycle runs if it is due.
    pub fn tick(&mut self) -> SimResult<Vec<SimEvent>> {
        let Self {
            run_id,
            clock,
            state,
            pipeline,
            event_log,
            ..
        } = self;
        let mut outcome = Ok(Vec::new());
        clock.advance(|today| {
            outcome = pipeline.advance_one_month(today, run_id.as_str(), state, event_log);
        });
        outcome
    }

    /// Run the monthly cycle at the current date if it is due.
    /// Calling it again on the same date does nothing.
    pub fn advance_one_month(&mut self) -> SimResult<Vec<SimEvent>> {
        let today = self.clock.date;
        self.pipeline
            .advance_one_month(today, &self.run_id, &mut self.state, &mut self.event_log)
    }

    /// Tick day by day until `months` more cycles have completed.
    /// Used by the runner and tests; leaves the clock paused.
    pub fn run_months(&mut self, months: u64) -> SimResult<()> {
        let target = self.state.cycle + months;
        self.clock.set_speed(SimSpeed::Normal);
        let mut budget = months.saturating_add(1).saturating_mul(MAX_DAYS_PER_MONTH);
        while self.state.cycle < target && budget > 0 {
            self.tick()?;
            budget -= 1;
        }
        self.clock.pause();
        Ok(())
    }

    pub fn apply_command(&mut self, command: &PlayerCommand) -> SimResult<SimEvent> {
        match *command {
            PlayerCommand::Pause => self.clock.pause(),
            PlayerCommand::Resume => self.clock.resume(),
            PlayerCommand::SetSpeed { speed } => self.clock.set_speed(speed),
            PlayerCommand::SetInterestRate { rate } => self.state.market.set_interest_rate(rate),
            PlayerCommand::SetCorporateTaxRate { rate } => {
                self.state.government.set_corporate_tax_rate(rate)
            }
            PlayerCommand::SetSalesTaxRate { rate } => self.state.government.set_sales_tax_rate(rate),
            PlayerCommand::SetSpendingLevel { level } => {
                self.state.government.set_spending_level(level)
            }
            PlayerCommand::RecordCapitalExpense { amount } => {
                self.state.government.record_capital_expense(amount)
            }
        }
        log::debug!("command applied: {command:?}");
        let event = SimEvent::CommandApplied {
            date: self.clock.date,
            command: command.label().to_string(),
        };
        self.event_log
            .push(EventLogEntry::new(&self.run_id, self.state.cycle, "command", &event)?);
        Ok(event)
    }

    pub fn summary(&self) -> Summary {
        Summary::capture(self.clock.date, self.config(), &self.state)
    }

    /// Entries logged since the last call, oldest first.
    pub fn take_event_log(&mut self) -> Vec<EventLogEntry> {
        std::mem::take(&mut self.event_log)
    }
}
