//! Market engine: the macro model behind every company and household.
//!
//! One cycle runs these steps, strictly in order, each consuming the prior
//! step's output:
//!   1. sentiment
//!   2. money supply growth
//!   3. inflation
//!   4. market growth (boom/recession transition evaluated first)
//!   5. market index update
//!   6. company profit report (filled in later in the cycle by the
//!      company step, read by step 4 of the next cycle)
//!
//! Nothing here can fail. Every output is clamped to its documented range.

use crate::{
    config::MarketConfig,
    history::{BoundedHistory, HISTORY_CAPACITY},
    rng::RandomSource,
    types::finite_policy,
};
use serde::{Deserialize, Serialize};

pub const SENTIMENT_RANGE: (f64, f64) = (-3.0, 3.0);
pub const MONEY_SUPPLY_RANGE: (f64, f64) = (0.0, 10.0);
pub const INFLATION_RANGE: (f64, f64) = (-1.0, 15.0);
pub const GROWTH_FLOOR: f64 = -5.0;

// Money supply
const MONEY_SUPPLY_BASE: f64 = 3.0;
const MONEY_INFLATION_GAP_WEIGHT: f64 = 0.5;
const MONEY_SPENDING_WEIGHT: f64 = 0.3;
const MONEY_SENTIMENT_WEIGHT: f64 = 0.4;

// Inflation
const INFLATION_MONEY_WEIGHT: f64 = 1.5;
const INFLATION_RATE_WEIGHT: f64 = 0.2;
const POPULATION_GROWTH_CLAMP: f64 = 5.0;
const INFLATION_DEMAND_WEIGHT: f64 = 0.3;
const SUPPLY_SHOCK_MAX: f64 = 3.6;

// Growth
const GROWTH_RATE_WEIGHT: f64 = 0.15;
const GROWTH_INFLATION_GAP_WEIGHT: f64 = 0.25;
const GROWTH_UNEMPLOYMENT_WEIGHT: f64 = 0.2;
const GROWTH_TAX_WEIGHT: f64 = 0.05;
const GROWTH_SENTIMENT_WEIGHT: f64 = 0.5;
const PROFIT_IMPACT_WEIGHT: f64 = 0.5;
const PROFIT_IMPACT_SCALE: f64 = 100.0;
const RECOVERY_GRACE_MONTHS: u32 = 3;
const RECOVERY_BOOST_PER_MONTH: f64 = 0.5;
const MEAN_REVERSION: f64 = 0.25;
const RECESSION_IMPACT: (f64, f64) = (-1.0, 0.5);
const BOOM_IMPACT: (f64, f64) = (2.5, 3.5);

/// Five independent rolling histories. Each is seeded with one value so
/// averages and "last" lookups never see an empty sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketHistory {
    pub market_index: BoundedHistory,
    pub inflation: BoundedHistory,
    pub growth: BoundedHistory,
    pub sentiment: BoundedHistory,
    pub company_profit: BoundedHistory,
}

impl MarketHistory {
    pub fn seeded(config: &MarketConfig) -> Self {
        Self {
            market_index: BoundedHistory::seeded(HISTORY_CAPACITY, config.initial_index),
            inflation: BoundedHistory::seeded(HISTORY_CAPACITY, config.inflation_target),
            growth: BoundedHistory::seeded(HISTORY_CAPACITY, config.baseline_growth),
            sentiment: BoundedHistory::seeded(HISTORY_CAPACITY, 0.0),
            company_profit: BoundedHistory::seeded(HISTORY_CAPACITY, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhaseChange {
    EnteredRecession,
    ExitedRecession,
    EnteredBoom,
    ExitedBoom,
}

/// Inputs the market reads from the rest of the world each cycle.
#[derive(Debug, Clone, Copy)]
pub struct MarketInputs {
    /// Public spending dial, 0..10.
    pub government_spending: f64,
    /// Month-over-month population change in percent.
    pub population_growth: f64,
    pub corporate_tax_rate: f64,
}

/// Everything one cycle produced, for logging and events.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketCycle {
    pub sentiment: f64,
    pub money_supply_growth: f64,
    pub inflation: f64,
    pub growth: f64,
    pub market_index: f64,
    pub phase_changes: Vec<PhaseChange>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Market {
    /// Percent.
    pub interest_rate: f64,
    /// Fraction of the labour force.
    pub unemployment: f64,
    pub months_of_negative_growth: u32,
    pub in_recession: bool,
    pub in_boom: bool,
    pub money_supply_growth: f64,
    pub history: MarketHistory,
    inflation_target: f64,
    baseline_growth: f64,
    recession_threshold: f64,
    boom_threshold: f64,
}

impl Market {
    pub fn new(config: &MarketConfig) -> Self {
        Self {
            interest_rate: config.interest_rate,
            unemployment: config.unemployment,
            months_of_negative_growth: 0,
            in_recession: false,
            in_boom: false,
            money_supply_growth: MONEY_SUPPLY_BASE,
            history: MarketHistory::seeded(config),
            inflation_target: config.inflation_target,
            baseline_growth: config.baseline_growth,
            recession_threshold: config.recession_threshold,
            boom_threshold: config.boom_threshold,
        }
    }

    /// Central bank policy rate. Negative rates floor at zero; NaN or
    /// infinite input is ignored.
    pub fn set_interest_rate(&mut self, rate: f64) {
        if finite_policy("interest rate", rate) {
            self.interest_rate = rate.max(0.0);
        }
    }

    pub fn last_inflation(&self) -> f64 {
        self.history.inflation.last()
    }

    pub fn last_growth(&self) -> f64 {
        self.history.growth.last()
    }

    pub fn last_sentiment(&self) -> f64 {
        self.history.sentiment.last()
    }

    pub fn market_index(&self) -> f64 {
        self.history.market_index.last()
    }

    pub fn inflation_target(&self) -> f64 {
        self.inflation_target
    }

    /// Steps 1–5 of the cycle. Step 6 is `report_company_profits`.
    pub fn run_cycle<R: RandomSource + ?Sized>(
        &mut self,
        inputs: MarketInputs,
        rng: &mut R,
    ) -> MarketCycle {
        let sentiment = self.sentiment(rng);
        let money_supply_growth = self.money_supply_growth(inputs.government_spending);
        let inflation = self.inflation(inputs.population_growth, rng);
        let (growth, phase_changes) = self.market_growth(inputs.corporate_tax_rate, rng);
        let market_index = self.update_market_value(growth);
        MarketCycle {
            sentiment,
            money_supply_growth,
            inflation,
            growth,
            market_index,
            phase_changes,
        }
    }

    /// Step 1.
    pub fn sentiment<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> f64 {
        let mut value = rng.uniform(-2.0, 2.0);
        if self.in_recession {
            value -= rng.uniform(0.0, 2.0);
        }
        if self.in_boom {
            value += rng.uniform(0.0, 2.0);
        }
        let value = value.clamp(SENTIMENT_RANGE.0, SENTIMENT_RANGE.1);
        self.history.sentiment.push(value);
        value
    }

    /// Step 2. Stored on the market and consumed by `inflation`.
    pub fn money_supply_growth(&mut self, government_spending: f64) -> f64 {
        let rate_term = -(self.interest_rate.max(0.0) / 5.0).powf(1.2);
        let inflation_gap = self.last_inflation() - self.inflation_target;
        let value = MONEY_SUPPLY_BASE + rate_term
            - inflation_gap * MONEY_INFLATION_GAP_WEIGHT
            + government_spending * MONEY_SPENDING_WEIGHT
            + self.last_sentiment() * MONEY_SENTIMENT_WEIGHT;
        self.money_supply_growth = value.clamp(MONEY_SUPPLY_RANGE.0, MONEY_SUPPLY_RANGE.1);
        self.money_supply_growth
    }

    /// Step 3.
    pub fn inflation<R: RandomSource + ?Sized>(&mut self, population_growth: f64, rng: &mut R) -> f64 {
        let money_term = (1.0 + self.money_supply_growth).ln() * INFLATION_MONEY_WEIGHT;
        let rate_term = -self.interest_rate * INFLATION_RATE_WEIGHT;
        let demand_term = population_growth.clamp(-POPULATION_GROWTH_CLAMP, POPULATION_GROWTH_CLAMP)
            * INFLATION_DEMAND_WEIGHT;
        let supply_shock = rng.uniform(0.0, SUPPLY_SHOCK_MAX);
        let value = (money_term + rate_term + demand_term + supply_shock)
            .clamp(INFLATION_RANGE.0, INFLATION_RANGE.1);
        self.history.inflation.push(value);
        value
    }

    /// Step 4. The boom/recession state moves first, judged on the growth
    /// stored by the previous cycle.
    pub fn market_growth<R: RandomSource + ?Sized>(
        &mut self,
        corporate_tax_rate: f64,
        rng: &mut R,
    ) -> (f64, Vec<PhaseChange>) {
        let phase_changes = self.transition_phase();

        let rate_term = -self.interest_rate * GROWTH_RATE_WEIGHT;
        let inflation_term =
            -(self.last_inflation() - self.inflation_target) * GROWTH_INFLATION_GAP_WEIGHT;
        let unemployment_term = -(self.unemployment * 100.0) * GROWTH_UNEMPLOYMENT_WEIGHT;
        let tax_term = -(corporate_tax_rate * 100.0) * GROWTH_TAX_WEIGHT;
        let sentiment_term = self.last_sentiment() * GROWTH_SENTIMENT_WEIGHT;
        let profit_term = profit_impact(self.history.company_profit.average());

        let recovery_term = if self.months_of_negative_growth > RECOVERY_GRACE_MONTHS {
            (self.months_of_negative_growth - RECOVERY_GRACE_MONTHS) as f64 * RECOVERY_BOOST_PER_MONTH
        } else {
            0.0
        };

        let cycle_term = if self.in_recession {
            rng.uniform(RECESSION_IMPACT.0, RECESSION_IMPACT.1)
        } else if self.in_boom {
            rng.uniform(BOOM_IMPACT.0, BOOM_IMPACT.1)
        } else {
            0.0
        };

        let reversion_term = (self.baseline_growth - self.last_growth()) * MEAN_REVERSION;

        let growth = (self.baseline_growth
            + rate_term
            + inflation_term
            + unemployment_term
            + tax_term
            + sentiment_term
            + profit_term
            + recovery_term
            + cycle_term
            + reversion_term)
            .max(GROWTH_FLOOR);

        if growth < 0.0 {
            self.months_of_negative_growth += 1;
        } else {
            self.months_of_negative_growth = 0;
        }
        self.history.growth.push(growth);
        (growth, phase_changes)
    }

    /// Same threshold in and out: growth hovering at a threshold can flip
    /// state every cycle.
    fn transition_phase(&mut self) -> Vec<PhaseChange> {
        let last = self.last_growth();
        let mut changes = Vec::new();
        if self.in_recession && last > self.recession_threshold {
            self.in_recession = false;
            changes.push(PhaseChange::ExitedRecession);
        }
        if self.in_boom && last < self.boom_threshold {
            self.in_boom = false;
            changes.push(PhaseChange::ExitedBoom);
        }
        if last < self.recession_threshold && !self.in_recession {
            self.in_recession = true;
            changes.push(PhaseChange::EnteredRecession);
        }
        if last > self.boom_threshold && !self.in_boom {
            self.in_boom = true;
            changes.push(PhaseChange::EnteredBoom);
        }
        changes
    }

    /// Step 5.
    pub fn update_market_value(&mut self, growth: f64) -> f64 {
        let value = self.market_index() * (1.0 + growth / 100.0);
        self.history.market_index.push(value);
        value
    }

    /// Step 6. Read back by `market_growth` next cycle.
    pub fn report_company_profits(&mut self, total: f64) {
        self.history.company_profit.push(total);
    }
}

/// Signed, heavily damped response to the average aggregate profit.
fn profit_impact(average_profit: f64) -> f64 {
    let magnitude = (1.0 + average_profit.abs().sqrt() / PROFIT_IMPACT_SCALE).ln();
    average_profit.signum() * magnitude * PROFIT_IMPACT_WEIGHT
}
