//! Subsystem trait and the six monthly stages.
//!
//! RULE: Every stage implements SimSubsystem.
//! The engine calls update() on each registered stage in registration
//! order, once per monthly cycle. Execution order is fixed and documented
//! in engine.rs.

use crate::{
    company::HiringConditions,
    config::SimConfig,
    employment::assign_jobs,
    error::SimResult,
    event::SimEvent,
    geography::{LandUseService, PathService},
    market::{MarketInputs, PhaseChange},
    region::{calculate_regional_sales, calculate_regional_stats, calculate_regional_traffic, SalesConditions},
    rng::{SubsystemRng, SubsystemSlot},
    state::SimState,
    types::SimDate,
};

/// Read-only inputs shared by every stage of one cycle.
pub struct CycleContext<'a> {
    pub today: SimDate,
    pub cycle: u64,
    pub config: &'a SimConfig,
    pub land: &'a dyn LandUseService,
    pub paths: &'a dyn PathService,
}

/// The contract every stage must fulfill.
pub trait SimSubsystem: Send + Sync {
    /// Unique stable name, used as the event log's subsystem column.
    fn name(&self) -> &'static str;

    /// RNG slot this stage draws from.
    fn slot(&self) -> SubsystemSlot;

    /// Called once per monthly cycle by the engine.
    ///
    /// - `events_in`: events emitted by earlier stages this cycle
    /// - `rng`:       this stage's deterministic RNG for this cycle
    fn update(
        &mut self,
        ctx: &CycleContext<'_>,
        state: &mut SimState,
        events_in: &[SimEvent],
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>>;
}

// ── 1. Population ──────────────────────────────────────────────────

pub struct PopulationStage;

impl SimSubsystem for PopulationStage {
    fn name(&self) -> &'static str {
        "population"
    }

    fn slot(&self) -> SubsystemSlot {
        SubsystemSlot::Population
    }

    fn update(
        &mut self,
        ctx: &CycleContext<'_>,
        state: &mut SimState,
        _events_in: &[SimEvent],
        _rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let mut events = Vec::new();

        let purged = state.population.purge_empty_households();
        if purged > 0 {
            log::warn!("purged {purged} empty household(s)");
            events.push(SimEvent::HouseholdsPurged {
                cycle: ctx.cycle,
                count: purged,
            });
        }

        let saved = state.population.pay_households(
            ctx.today,
            state.government.income_tax_brackets(),
            ctx.config.labor.household_savings_rate,
        );
        let growth = state.population.record_population();
        log::debug!(
            "population: {} residents, growth {growth:.2}%, households saved {saved:.0}",
            state.population.count()
        );

        events.push(SimEvent::PopulationRecorded {
            cycle: ctx.cycle,
            population: state.population.count(),
            households: state.population.household_count(),
            growth,
        });
        Ok(events)
    }
}

// ── 2. Market ──────────────────────────────────────────────────────

pub struct MarketStage;

impl SimSubsystem for MarketStage {
    fn name(&self) -> &'static str {
        "market"
    }

    fn slot(&self) -> SubsystemSlot {
        SubsystemSlot::Market
    }

    fn update(
        &mut self,
        ctx: &CycleContext<'_>,
        state: &mut SimState,
        _events_in: &[SimEvent],
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let inputs = MarketInputs {
            government_spending: state.government.spending_level,
            population_growth: state.population.population_growth(),
            corporate_tax_rate: state.government.corporate_tax_rate,
        };
        let result = state.market.run_cycle(inputs, rng);

        let mut events = vec![SimEvent::MarketUpdated {
            cycle: ctx.cycle,
            sentiment: result.sentiment,
            money_supply_growth: result.money_supply_growth,
            inflation: result.inflation,
            growth: result.growth,
            market_index: result.market_index,
        }];
        for change in result.phase_changes {
            match change {
                PhaseChange::EnteredRecession => log::warn!("{}: economy entered recession", ctx.today),
                other => log::info!("{}: {other:?}", ctx.today),
            }
            events.push(SimEvent::PhaseChanged {
                cycle: ctx.cycle,
                change,
            });
        }
        Ok(events)
    }
}

// ── 3. Regional trade ──────────────────────────────────────────────

pub struct RegionStage;

impl SimSubsystem for RegionStage {
    fn name(&self) -> &'static str {
        "region"
    }

    fn slot(&self) -> SubsystemSlot {
        SubsystemSlot::Region
    }

    fn update(
        &mut self,
        ctx: &CycleContext<'_>,
        state: &mut SimState,
        _events_in: &[SimEvent],
        _rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        calculate_regional_stats(
            &mut state.regions,
            ctx.land,
            &state.population,
            &state.companies,
            state.government.income_tax_brackets(),
        );
        let daily_trips = calculate_regional_traffic(&mut state.regions, ctx.paths, &ctx.config.trade);
        let conditions = SalesConditions {
            unemployment: state.market.unemployment,
            sentiment: state.market.last_sentiment(),
            inflation: state.market.last_inflation(),
            inflation_target: state.market.inflation_target(),
            sales_tax_rate: state.government.sales_tax_rate,
        };
        let retail_sales =
            calculate_regional_sales(&state.regions, &mut state.companies, conditions, &ctx.config.trade);

        state.last_daily_trips = daily_trips;
        state.last_retail_sales = retail_sales;
        log::debug!("trade: {daily_trips} daily trips, retail sales {retail_sales:.0}");

        Ok(vec![SimEvent::TradeComputed {
            cycle: ctx.cycle,
            regions: state.regions.len(),
            daily_trips,
            retail_sales,
        }])
    }
}

// ── 4. Companies ───────────────────────────────────────────────────

pub struct CompanyStage;

impl SimSubsystem for CompanyStage {
    fn name(&self) -> &'static str {
        "company"
    }

    fn slot(&self) -> SubsystemSlot {
        SubsystemSlot::Company
    }

    fn update(
        &mut self,
        ctx: &CycleContext<'_>,
        state: &mut SimState,
        _events_in: &[SimEvent],
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let inflation = state.market.last_inflation();
        let growth = state.market.last_growth();
        let corporate_tax_rate = state.government.corporate_tax_rate;
        let conditions = HiringConditions {
            interest_rate: state.market.interest_rate,
            inflation,
            government_spending: state.government.spending_level,
            sentiment: state.market.last_sentiment(),
        };

        let mut total_profit = 0.0;
        let mut total_openings = 0;
        for company in state.companies.iter_mut() {
            total_profit += company.calculate_profit(&ctx.config.company, inflation, growth, corporate_tax_rate);
            total_openings += company
                .determine_job_openings(&ctx.config.company, conditions, rng)
                .total();
        }
        state.market.report_company_profits(total_profit);

        Ok(vec![SimEvent::ProfitsReported {
            cycle: ctx.cycle,
            companies: state.companies.len(),
            total_profit,
            total_openings,
        }])
    }
}

// ── 5. Employment ──────────────────────────────────────────────────

pub struct EmploymentStage;

impl SimSubsystem for EmploymentStage {
    fn name(&self) -> &'static str {
        "employment"
    }

    fn slot(&self) -> SubsystemSlot {
        SubsystemSlot::Employment
    }

    fn update(
        &mut self,
        ctx: &CycleContext<'_>,
        state: &mut SimState,
        _events_in: &[SimEvent],
        _rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let labor = &ctx.config.labor;
        let outcome = assign_jobs(&mut state.population, &mut state.companies, ctx.today, labor);

        // An empty labour force keeps the configured rate.
        if state.population.labor_force(ctx.today, labor) > 0 {
            state.market.unemployment = state.population.unemployment_rate(ctx.today, labor);
        }

        Ok(vec![SimEvent::JobsAssigned {
            cycle: ctx.cycle,
            hired: outcome.hired,
            retired: outcome.retired,
            still_seeking: outcome.still_seeking,
            unemployment: state.market.unemployment,
        }])
    }
}

// ── 6. Government ──────────────────────────────────────────────────

pub struct GovernmentStage;

impl SimSubsystem for GovernmentStage {
    fn name(&self) -> &'static str {
        "government"
    }

    fn slot(&self) -> SubsystemSlot {
        SubsystemSlot::Government
    }

    fn update(
        &mut self,
        ctx: &CycleContext<'_>,
        state: &mut SimState,
        _events_in: &[SimEvent],
        _rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let report = state.government.collect_taxes(
            ctx.today,
            &state.population,
            &mut state.companies,
            ctx.land.road_length(),
            state.market.last_inflation(),
        );
        Ok(match report {
            Some(report) => {
                log::info!(
                    "{}: taxes collected for {}: income {:.0}, reserves now {:.0}",
                    ctx.today,
                    report.year,
                    report.total_income,
                    report.reserves
                );
                vec![SimEvent::TaxesCollected {
                    cycle: ctx.cycle,
                    report,
                }]
            }
            None => Vec::new(),
        })
    }
}
