use crate::{
    company::CareerLevel,
    error::{SimError, SimResult},
    types::SimDate,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Market ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketConfig {
    /// Central bank rate in percent.
    pub interest_rate: f64,
    /// Unemployment as a fraction of the labour force.
    pub unemployment: f64,
    pub initial_index: f64,
    /// Inflation percent the economy reverts toward.
    pub inflation_target: f64,
    /// Growth percent the economy reverts toward.
    pub baseline_growth: f64,
    pub recession_threshold: f64,
    pub boom_threshold: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            interest_rate: 5.0,
            unemployment: 0.05,
            initial_index: 1_000.0,
            inflation_target: 2.0,
            baseline_growth: 2.5,
            recession_threshold: -2.0,
            boom_threshold: 5.0,
        }
    }
}

// ── Companies ──────────────────────────────────────────────────────

/// Inclusive (min, max) base draw per career level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpeningRanges {
    pub entry: (u32, u32),
    pub mid: (u32, u32),
    pub senior: (u32, u32),
    pub executive: (u32, u32),
}

impl OpeningRanges {
    pub fn for_level(&self, level: CareerLevel) -> (u32, u32) {
        match level {
            CareerLevel::EntryLevel => self.entry,
            CareerLevel::MidLevel => self.mid,
            CareerLevel::Senior => self.senior,
            CareerLevel::Executive => self.executive,
        }
    }
}

impl Default for OpeningRanges {
    fn default() -> Self {
        Self {
            entry: (5, 15),
            mid: (2, 7),
            senior: (1, 4),
            executive: (0, 1),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanyConfig {
    /// Flat revenue bonus for a company that made money last period.
    pub profit_bonus: f64,
    /// Expense discount applied after a losing period.
    pub cost_cutting: f64,
    /// Largest loss, as a fraction of revenue, booked in one period.
    pub loss_limit: f64,
    pub opening_ranges: OpeningRanges,
}

impl Default for CompanyConfig {
    fn default() -> Self {
        Self {
            profit_bonus: 500.0,
            cost_cutting: 0.05,
            loss_limit: 0.25,
            opening_ranges: OpeningRanges::default(),
        }
    }
}

// ── Labour ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LaborConfig {
    pub working_age: u32,
    pub retirement_age: u32,
    /// Annual salary per career level: entry, mid, senior, executive.
    pub salaries: [f64; 4],
    /// Share of monthly disposable income a household puts aside.
    pub household_savings_rate: f64,
}

impl LaborConfig {
    pub fn salary(&self, level: CareerLevel) -> f64 {
        self.salaries[level.index()]
    }
}

impl Default for LaborConfig {
    fn default() -> Self {
        Self {
            working_age: 18,
            retirement_age: 65,
            salaries: [32_000.0, 55_000.0, 85_000.0, 150_000.0],
            household_savings_rate: 0.10,
        }
    }
}

// ── Government ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TaxBracket {
    /// Income above this amount is taxed at `rate`.
    pub threshold: f64,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GovernmentConfig {
    pub initial_reserves: f64,
    pub corporate_tax_rate: f64,
    pub sales_tax_rate: f64,
    pub income_tax_brackets: Vec<TaxBracket>,
    /// Yearly upkeep per tile of road.
    pub road_maintenance_cost: f64,
    /// Public spending dial on a 0..10 scale.
    pub spending_level: f64,
}

impl Default for GovernmentConfig {
    fn default() -> Self {
        Self {
            initial_reserves: 1_000_000.0,
            corporate_tax_rate: 0.21,
            sales_tax_rate: 0.06,
            income_tax_brackets: vec![
                TaxBracket { threshold: 0.0, rate: 0.10 },
                TaxBracket { threshold: 40_000.0, rate: 0.20 },
                TaxBracket { threshold: 90_000.0, rate: 0.30 },
                TaxBracket { threshold: 200_000.0, rate: 0.40 },
            ],
            road_maintenance_cost: 120.0,
            spending_level: 4.0,
        }
    }
}

// ── Regional trade ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeConfig {
    /// Scaling constant applied to the summed gravity terms.
    pub trip_scale: f64,
    pub work_distance_exponent: f64,
    pub shopping_distance_exponent: f64,
    /// Share of each inbound trip that turns into spending.
    pub external_demand_share: f64,
    /// Share of monthly disposable income spent in local shops.
    pub retail_spending_share: f64,
    /// Spend per inbound visit, before macro adjustments.
    pub spend_per_visit: f64,
    pub days_per_month: f64,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            trip_scale: 0.4,
            work_distance_exponent: 0.9,
            shopping_distance_exponent: 0.7,
            external_demand_share: 0.3,
            retail_spending_share: 0.25,
            spend_per_visit: 20.0,
            days_per_month: 30.0,
        }
    }
}

// ── Scheduler ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchedulerConfig {
    /// Wall-clock milliseconds between ticks.
    pub tick_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { tick_interval_ms: 100 }
    }
}

// ── Root ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimConfig {
    pub start_date: SimDate,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub company: CompanyConfig,
    #[serde(default)]
    pub labor: LaborConfig,
    #[serde(default)]
    pub government: GovernmentConfig,
    #[serde(default)]
    pub trade: TradeConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl SimConfig {
    /// Load from the data/ directory.
    /// In tests, use SimConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/economy.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SimConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("{path}: {e}"))?;
        Ok(config)
    }

    /// Reject tunables the monthly cycle cannot work with.
    pub fn validate(&self) -> SimResult<()> {
        let invalid = |msg: String| Err(SimError::Config(msg));
        let brackets = &self.government.income_tax_brackets;
        if brackets.is_empty() {
            return invalid("at least one income tax bracket is required".into());
        }
        if brackets
            .iter()
            .any(|b| !(0.0..=1.0).contains(&b.rate) || !b.threshold.is_finite() || b.threshold < 0.0)
        {
            return invalid("tax bracket rates must be in [0, 1] with non-negative thresholds".into());
        }
        if self.labor.retirement_age <= self.labor.working_age {
            return invalid(format!(
                "retirement age {} must exceed working age {}",
                self.labor.retirement_age, self.labor.working_age
            ));
        }
        let exponents = [self.trade.work_distance_exponent, self.trade.shopping_distance_exponent];
        if exponents.iter().any(|e| !e.is_finite() || *e <= 0.0) {
            return invalid("distance exponents must be positive".into());
        }
        Ok(())
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
            market: MarketConfig::default(),
            company: CompanyConfig::default(),
            labor: LaborConfig::default(),
            government: GovernmentConfig::default(),
            trade: TradeConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_test_config_is_valid() {
        SimConfig::default_test().validate().unwrap();
    }

    #[test]
    fn partial_json_falls_back_to_section_defaults() {
        let json = r#"{ "start_date": "1995-03-01", "market": {
            "interest_rate": 7.0, "unemployment": 0.001, "initial_index": 500.0,
            "inflation_target": 2.0, "baseline_growth": 2.5,
            "recession_threshold": -2.0, "boom_threshold": 5.0 } }"#;
        let config: SimConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.market.interest_rate, 7.0);
        assert_eq!(config.trade.trip_scale, 0.4);
        config.validate().unwrap();
    }

    #[test]
    fn inverted_ages_are_rejected() {
        let mut config = SimConfig::default_test();
        config.labor.retirement_age = 10;
        assert!(matches!(config.validate(), Err(SimError::Config(_))));
    }
}
