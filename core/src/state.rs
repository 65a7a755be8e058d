//! The single aggregate every monthly stage reads and writes.
//!
//! RULE: the engine owns exactly one `SimState` and lends it `&mut` to
//! one stage at a time. Nothing else holds a reference into it.

use crate::{
    company::{CompanyCharter, CompanyRegistry},
    config::SimConfig,
    government::Government,
    market::Market,
    population::Population,
    region::Region,
    types::{CompanyId, SimDate},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimState {
    /// Monthly cycles completed so far.
    pub cycle: u64,
    /// The orchestrator does nothing until the clock reaches this date.
    pub next_calculation_date: SimDate,
    pub market: Market,
    pub companies: CompanyRegistry,
    pub population: Population,
    pub government: Government,
    pub regions: Vec<Region>,
    /// Total city retail sales in the last cycle.
    pub last_retail_sales: f64,
    /// Total daily inter-regional trips in the last cycle.
    pub last_daily_trips: u64,
}

impl SimState {
    /// An empty city. The first cycle runs on `config.start_date`.
    pub fn new(config: &SimConfig) -> Self {
        Self {
            cycle: 0,
            next_calculation_date: config.start_date,
            market: Market::new(&config.market),
            companies: CompanyRegistry::new(),
            population: Population::new(),
            government: Government::new(&config.government, config.start_date),
            regions: Vec::new(),
            last_retail_sales: 0.0,
            last_daily_trips: 0,
        }
    }

    pub fn found_company(&mut self, charter: CompanyCharter, today: SimDate) -> CompanyId {
        let id = self.companies.found(charter, today);
        log::debug!("company {id} founded on {today}");
        id
    }

    /// Close a company and lay off everyone it employed.
    /// Returns the number of people released, or `None` if no such company.
    pub fn close_company(&mut self, id: CompanyId) -> Option<usize> {
        let company = self.companies.close(id)?;
        for person_id in &company.employees {
            if let Some(person) = self.population.person_mut(*person_id) {
                person.employer = None;
                person.income = 0.0;
            }
        }
        log::info!("company {id} ({}) closed, {} laid off", company.name, company.employees.len());
        Some(company.employees.len())
    }

    /// Homes that exist on the map but have nobody living in them.
    pub fn free_housing(&self) -> usize {
        self.regions.iter().map(|r| r.tally.vacant_homes).sum()
    }
}
