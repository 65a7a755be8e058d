//! Company financial model and the company registry.
//!
//! Each cycle a company compounds its revenue with market growth and its
//! costs with inflation, books a (loss-limited) profit, and posts a fresh
//! set of job openings for the employment matcher to fill.

use crate::{
    config::CompanyConfig,
    rng::RandomSource,
    types::{CompanyId, PersonId, SimDate, TileCoord},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    Technology,
    Retail,
    Agriculture,
    Manufacturing,
    Finance,
    Healthcare,
    Construction,
    Hospitality,
}

impl Industry {
    pub const ALL: [Industry; 8] = [
        Industry::Technology,
        Industry::Retail,
        Industry::Agriculture,
        Industry::Manufacturing,
        Industry::Finance,
        Industry::Healthcare,
        Industry::Construction,
        Industry::Hospitality,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Technology => "Technology",
            Self::Retail => "Retail",
            Self::Agriculture => "Agriculture",
            Self::Manufacturing => "Manufacturing",
            Self::Finance => "Finance",
            Self::Healthcare => "Healthcare",
            Self::Construction => "Construction",
            Self::Hospitality => "Hospitality",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CareerLevel {
    EntryLevel,
    MidLevel,
    Senior,
    Executive,
}

impl CareerLevel {
    pub const ALL: [CareerLevel; 4] = [
        CareerLevel::EntryLevel,
        CareerLevel::MidLevel,
        CareerLevel::Senior,
        CareerLevel::Executive,
    ];

    pub fn index(&self) -> usize {
        match self {
            Self::EntryLevel => 0,
            Self::MidLevel => 1,
            Self::Senior => 2,
            Self::Executive => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::EntryLevel => "Entry Level",
            Self::MidLevel => "Mid Level",
            Self::Senior => "Senior",
            Self::Executive => "Executive",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompanySize {
    Small,
    Medium,
    Large,
}

impl CompanySize {
    fn weight(&self) -> f64 {
        match self {
            Self::Small => 1.0,
            Self::Medium => 2.0,
            Self::Large => 3.5,
        }
    }
}

/// Open positions per career level. Unsigned, so never negative.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobOpenings([u32; 4]);

impl JobOpenings {
    pub fn new(entry: u32, mid: u32, senior: u32, executive: u32) -> Self {
        Self([entry, mid, senior, executive])
    }

    pub fn get(&self, level: CareerLevel) -> u32 {
        self.0[level.index()]
    }

    pub fn set(&mut self, level: CareerLevel, count: u32) {
        self.0[level.index()] = count;
    }

    /// Take one opening at `level`. Returns false if none were left.
    pub fn take(&mut self, level: CareerLevel) -> bool {
        let slot = &mut self.0[level.index()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

/// Macro conditions a company looks at when deciding how many to hire.
#[derive(Debug, Clone, Copy)]
pub struct HiringConditions {
    pub interest_rate: f64,
    pub inflation: f64,
    pub government_spending: f64,
    pub sentiment: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub industry: Industry,
    pub size: CompanySize,
    pub founded: SimDate,
    pub location: Option<TileCoord>,
    pub last_revenue: f64,
    pub last_expenses: f64,
    pub last_profit: f64,
    pub corp_tax_payable: f64,
    pub sales_tax_payable: f64,
    pub retail_sales: f64,
    pub job_openings: JobOpenings,
    pub employees: BTreeSet<PersonId>,
}

impl Company {
    /// Compound revenue and costs for one month and book the profit.
    /// Returns the net profit, which is also stored as `last_profit`.
    pub fn calculate_profit(
        &mut self,
        config: &CompanyConfig,
        inflation: f64,
        growth: f64,
        corporate_tax_rate: f64,
    ) -> f64 {
        let mut expenses = self.last_expenses * (1.0 + inflation / 2400.0);
        if self.last_profit < 0.0 {
            expenses *= 1.0 - config.cost_cutting;
        }

        let mut revenue = self.last_revenue * (1.0 + growth / 1200.0);
        if self.last_profit > 0.0 {
            revenue += config.profit_bonus;
        }

        let gross = revenue - expenses;
        let mut net = if gross > 0.0 {
            let tax = gross * corporate_tax_rate;
            self.corp_tax_payable += tax;
            gross - tax
        } else {
            gross
        };

        // Loss limiter.
        let worst = -config.loss_limit * revenue.max(0.0);
        if net < worst {
            net = worst;
        }

        self.last_revenue = revenue;
        self.last_expenses = expenses;
        self.last_profit = net;
        net
    }

    /// Replace this period's openings with fresh draws scaled by conditions.
    pub fn determine_job_openings<R: RandomSource + ?Sized>(
        &mut self,
        config: &CompanyConfig,
        conditions: HiringConditions,
        rng: &mut R,
    ) -> JobOpenings {
        let mut factor = 1.0;
        if conditions.interest_rate > 5.0 {
            factor -= 0.3;
        }
        if conditions.inflation > 6.0 {
            factor -= 0.2;
        }
        if conditions.government_spending > 5.0 {
            factor += 0.2;
        }
        factor += conditions.sentiment * 0.1;
        if self.last_profit < 0.0 {
            factor -= 0.5;
        }

        let mut openings = JobOpenings::default();
        for level in CareerLevel::ALL {
            let (lo, hi) = config.opening_ranges.for_level(level);
            let base = rng.range_inclusive(lo, hi) as f64;
            let adjusted = (base * factor).round().max(0.0);
            openings.set(level, adjusted as u32);
        }
        self.job_openings = openings;
        openings
    }

    /// Weight used to split a region's retail demand between its shops.
    pub fn productivity_score(&self) -> f64 {
        self.size.weight() * (1.0 + self.employees.len() as f64 / 10.0)
    }
}

/// Arena of companies keyed by id. Iteration is in ascending id order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompanyRegistry {
    companies: BTreeMap<CompanyId, Company>,
    next_id: CompanyId,
}

/// What a newly founded company starts with.
#[derive(Debug, Clone)]
pub struct CompanyCharter {
    pub name: String,
    pub industry: Industry,
    pub size: CompanySize,
    pub location: Option<TileCoord>,
    pub revenue: f64,
    pub expenses: f64,
}

impl CompanyRegistry {
    pub fn new() -> Self {
        Self {
            companies: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn found(&mut self, charter: CompanyCharter, founded: SimDate) -> CompanyId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.companies.insert(
            id,
            Company {
                id,
                name: charter.name,
                industry: charter.industry,
                size: charter.size,
                founded,
                location: charter.location,
                last_revenue: charter.revenue,
                last_expenses: charter.expenses,
                last_profit: charter.revenue - charter.expenses,
                corp_tax_payable: 0.0,
                sales_tax_payable: 0.0,
                retail_sales: 0.0,
                job_openings: JobOpenings::default(),
                employees: BTreeSet::new(),
            },
        );
        id
    }

    /// Remove a company. The caller is responsible for releasing its
    /// employees in the population registry.
    pub fn close(&mut self, id: CompanyId) -> Option<Company> {
        self.companies.remove(&id)
    }

    pub fn get(&self, id: CompanyId) -> Option<&Company> {
        self.companies.get(&id)
    }

    pub fn get_mut(&mut self, id: CompanyId) -> Option<&mut Company> {
        self.companies.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Company> {
        self.companies.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Company> {
        self.companies.values_mut()
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}
