//! One-line human-readable city summary, logged after every cycle and
//! printed by the runner.

use crate::{
    config::SimConfig,
    population::AgeGroups,
    state::SimState,
    types::SimDate,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub date: SimDate,
    pub cycle: u64,
    pub reserves: f64,
    pub population: usize,
    /// Percent, month over month.
    pub population_growth: f64,
    pub free_housing: usize,
    /// Percent of the labour force.
    pub unemployment: f64,
    pub companies: usize,
    pub market_index: f64,
    /// Percent.
    pub market_growth: f64,
    /// Percent.
    pub inflation: f64,
    pub age_groups: AgeGroups,
    pub retail_sales: f64,
    pub daily_trips: u64,
}

impl Summary {
    pub fn capture(date: SimDate, config: &SimConfig, state: &SimState) -> Self {
        Self {
            date,
            cycle: state.cycle,
            reserves: state.government.reserves,
            population: state.population.count(),
            population_growth: state.population.population_growth(),
            free_housing: state.free_housing(),
            unemployment: state.market.unemployment * 100.0,
            companies: state.companies.len(),
            market_index: state.market.market_index(),
            market_growth: state.market.last_growth(),
            inflation: state.market.last_inflation(),
            age_groups: state.population.age_groups(date, &config.labor),
            retail_sales: state.last_retail_sales,
            daily_trips: state.last_daily_trips,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | reserves {:.0} | pop {} ({:+.2}%) | free homes {} | unemployment {:.1}% | companies {} | index {:.1} ({:+.2}%) | inflation {:.2}%",
            self.date,
            self.reserves,
            self.population,
            self.population_growth,
            self.free_housing,
            self.unemployment,
            self.companies,
            self.market_index,
            self.market_growth,
            self.inflation,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_a_single_line_with_every_headline_figure() {
        let config = SimConfig::default_test();
        let state = SimState::new(&config);
        let line = Summary::capture(config.start_date, &config, &state).to_string();
        assert!(!line.contains('\n'));
        assert!(line.starts_with("2000-01-01"));
        for part in ["reserves 1000000", "pop 0", "free homes 0", "unemployment 5.0%", "companies 0", "index 1000.0", "inflation"] {
            assert!(line.contains(part), "missing '{part}' in {line}");
        }
    }
}
