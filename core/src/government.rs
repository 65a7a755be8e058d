//! Government ledger: progressive taxation, reserves and expenses.
//!
//! Taxes are settled once per calendar year. Company tax accruals build up
//! month by month in the company model and are drained here.

use crate::{
    company::CompanyRegistry,
    config::{GovernmentConfig, TaxBracket},
    history::{BoundedHistory, HISTORY_CAPACITY},
    population::Population,
    types::{finite_policy, SimDate},
};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SPENDING_RANGE: (f64, f64) = (0.0, 10.0);

/// Tax owed on `income`, walking brackets from the highest threshold down.
/// Each bracket taxes only the slice above its threshold that higher
/// brackets have not already consumed.
pub fn marginal_income_tax(income: f64, brackets: &[TaxBracket]) -> f64 {
    let mut ordered: Vec<TaxBracket> = brackets.to_vec();
    ordered.sort_by(|a, b| b.threshold.total_cmp(&a.threshold));

    let mut remaining = income.max(0.0);
    let mut tax = 0.0;
    for bracket in ordered {
        if remaining > bracket.threshold {
            tax += (remaining - bracket.threshold) * bracket.rate;
            remaining = bracket.threshold;
        }
    }
    tax
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseKind {
    RoadMaintenance,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GovernmentHistory {
    pub reserves: BoundedHistory,
    pub income: BoundedHistory,
    pub cap_ex: BoundedHistory,
    pub op_ex: BoundedHistory,
}

/// Outcome of one annual settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxReport {
    pub year: i32,
    pub income_tax: f64,
    pub corporate_tax: f64,
    pub sales_tax: f64,
    pub total_income: f64,
    pub op_ex: f64,
    pub cap_ex: f64,
    pub reserves: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Government {
    pub reserves: f64,
    /// Capital spending accumulated since the last settlement.
    pub cap_ex: f64,
    /// Ordered by threshold, highest first.
    income_tax_brackets: Vec<TaxBracket>,
    pub corporate_tax_rate: f64,
    pub sales_tax_rate: f64,
    /// Unit cost per expense kind, indexed to inflation every settlement.
    pub expenses: BTreeMap<ExpenseKind, f64>,
    pub spending_level: f64,
    pub last_tax_year: i32,
    pub history: GovernmentHistory,
}

impl Government {
    /// `start` counts as already settled, so the first collection happens
    /// on the first cycle of the following year.
    pub fn new(config: &GovernmentConfig, start: SimDate) -> Self {
        let mut brackets = config.income_tax_brackets.clone();
        brackets.sort_by(|a, b| b.threshold.total_cmp(&a.threshold));
        let mut expenses = BTreeMap::new();
        expenses.insert(ExpenseKind::RoadMaintenance, config.road_maintenance_cost);
        Self {
            reserves: config.initial_reserves,
            cap_ex: 0.0,
            income_tax_brackets: brackets,
            corporate_tax_rate: config.corporate_tax_rate.clamp(0.0, 1.0),
            sales_tax_rate: config.sales_tax_rate.clamp(0.0, 1.0),
            expenses,
            spending_level: config.spending_level.clamp(SPENDING_RANGE.0, SPENDING_RANGE.1),
            last_tax_year: start.year(),
            history: GovernmentHistory {
                reserves: BoundedHistory::seeded(HISTORY_CAPACITY, config.initial_reserves),
                income: BoundedHistory::new(HISTORY_CAPACITY),
                cap_ex: BoundedHistory::new(HISTORY_CAPACITY),
                op_ex: BoundedHistory::new(HISTORY_CAPACITY),
            },
        }
    }

    pub fn income_tax_brackets(&self) -> &[TaxBracket] {
        &self.income_tax_brackets
    }

    pub fn income_tax(&self, income: f64) -> f64 {
        marginal_income_tax(income, &self.income_tax_brackets)
    }

    pub fn unit_cost(&self, kind: ExpenseKind) -> f64 {
        self.expenses.get(&kind).copied().unwrap_or(0.0)
    }

    /// Yearly operating cost of public works.
    pub fn operating_expense(&self, road_length: u64) -> f64 {
        self.unit_cost(ExpenseKind::RoadMaintenance) * road_length as f64
    }

    pub fn record_capital_expense(&mut self, amount: f64) {
        self.cap_ex += amount.max(0.0);
    }

    // Policy setters clamp into range and ignore NaN or infinite input,
    // which `clamp` would otherwise pass through.

    pub fn set_spending_level(&mut self, level: f64) {
        if finite_policy("spending level", level) {
            self.spending_level = level.clamp(SPENDING_RANGE.0, SPENDING_RANGE.1);
        }
    }

    pub fn set_corporate_tax_rate(&mut self, rate: f64) {
        if finite_policy("corporate tax rate", rate) {
            self.corporate_tax_rate = rate.clamp(0.0, 1.0);
        }
    }

    pub fn set_sales_tax_rate(&mut self, rate: f64) {
        if finite_policy("sales tax rate", rate) {
            self.sales_tax_rate = rate.clamp(0.0, 1.0);
        }
    }

    /// Annual settlement. A no-op returning `None` if this calendar year
    /// has already been settled.
    pub fn collect_taxes(
        &mut self,
        today: SimDate,
        population: &Population,
        companies: &mut CompanyRegistry,
        road_length: u64,
        inflation: f64,
    ) -> Option<TaxReport> {
        let year = today.year();
        if year <= self.last_tax_year {
            return None;
        }

        let income_tax: f64 = population
            .households()
            .map(|hh| self.income_tax(population.household_income(hh.id)))
            .sum();

        let mut corporate_tax = 0.0;
        let mut sales_tax = 0.0;
        for company in companies.iter_mut() {
            corporate_tax += company.corp_tax_payable;
            sales_tax += company.sales_tax_payable;
            company.corp_tax_payable = 0.0;
            company.sales_tax_payable = 0.0;
        }

        let total_income = income_tax + corporate_tax + sales_tax;
        let op_ex = self.operating_expense(road_length);
        let cap_ex = self.cap_ex;

        self.reserves += total_income - cap_ex - op_ex;
        self.history.income.push(total_income);
        self.history.op_ex.push(op_ex);
        self.history.cap_ex.push(cap_ex);
        self.history.reserves.push(self.reserves);
        self.cap_ex = 0.0;
        self.revise_expenses(inflation);
        self.last_tax_year = year;

        Some(TaxReport {
            year,
            income_tax,
            corporate_tax,
            sales_tax,
            total_income,
            op_ex,
            cap_ex,
            reserves: self.reserves,
        })
    }

    /// Index every unit cost upward by `inflation` percent. Deflation
    /// never lowers costs.
    pub fn revise_expenses(&mut self, inflation: f64) {
        let factor = 1.0 + inflation.max(0.0) / 100.0;
        for cost in self.expenses.values_mut() {
            *cost *= factor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        company::{CareerLevel, CompanyCharter, CompanySize, Industry},
        population::{EducationLevel, Gender, PersonSpec, RelationshipStatus},
    };
    use chrono::NaiveDate;

    fn d(y: i32, m: u32) -> SimDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn brackets() -> Vec<TaxBracket> {
        vec![
            TaxBracket { threshold: 0.0, rate: 0.10 },
            TaxBracket { threshold: 40_000.0, rate: 0.20 },
            TaxBracket { threshold: 90_000.0, rate: 0.30 },
        ]
    }

    #[test]
    fn marginal_tax_consumes_income_downward() {
        // 10k @30% + 50k @20% + 40k @10%
        let tax = marginal_income_tax(100_000.0, &brackets());
        assert!((tax - (3_000.0 + 10_000.0 + 4_000.0)).abs() < 1e-9);
    }

    #[test]
    fn income_at_threshold_pays_nothing_in_that_bracket() {
        let tax = marginal_income_tax(40_000.0, &brackets());
        assert!((tax - 4_000.0).abs() < 1e-9);
        let single = [TaxBracket { threshold: 50_000.0, rate: 0.5 }];
        assert_eq!(marginal_income_tax(50_000.0, &single), 0.0);
    }

    #[test]
    fn bracket_order_in_input_does_not_matter() {
        let mut shuffled = brackets();
        shuffled.reverse();
        assert_eq!(
            marginal_income_tax(75_000.0, &shuffled),
            marginal_income_tax(75_000.0, &brackets())
        );
    }

    fn world() -> (Population, CompanyRegistry) {
        let mut pop = Population::new();
        let hh = pop.add_household(d(2000, 1), None);
        let p = pop
            .add_person(
                hh,
                PersonSpec {
                    name: "Ada".into(),
                    birthdate: d(1970, 1),
                    gender: Gender::Female,
                    education: EducationLevel::Master,
                    industry: Industry::Technology,
                    career_level: CareerLevel::Senior,
                    relationship: RelationshipStatus::Single,
                },
            )
            .unwrap();
        pop.person_mut(p).unwrap().income = 50_000.0;

        let mut companies = CompanyRegistry::new();
        let id = companies.found(
            CompanyCharter {
                name: "Shop".into(),
                industry: Industry::Retail,
                size: CompanySize::Small,
                location: None,
                revenue: 0.0,
                expenses: 0.0,
            },
            d(2000, 1),
        );
        let c = companies.get_mut(id).unwrap();
        c.corp_tax_payable = 1_000.0;
        c.sales_tax_payable = 500.0;
        (pop, companies)
    }

    #[test]
    fn settlement_updates_reserves_and_resets_accruals() {
        let mut config = GovernmentConfig::default();
        config.income_tax_brackets = brackets();
        config.initial_reserves = 10_000.0;
        config.road_maintenance_cost = 10.0;
        let mut gov = Government::new(&config, d(2000, 1));
        gov.record_capital_expense(2_000.0);
        let (pop, mut companies) = world();

        let report = gov
            .collect_taxes(d(2001, 1), &pop, &mut companies, 100, 5.0)
            .expect("first settlement of 2001");

        // 50k income: 10k @20% + 40k @10%
        assert!((report.income_tax - 6_000.0).abs() < 1e-9);
        assert_eq!(report.corporate_tax, 1_000.0);
        assert_eq!(report.sales_tax, 500.0);
        assert_eq!(report.op_ex, 1_000.0);
        assert!((gov.reserves - (10_000.0 + 7_500.0 - 2_000.0 - 1_000.0)).abs() < 1e-9);
        assert_eq!(gov.cap_ex, 0.0);
        assert!((gov.unit_cost(ExpenseKind::RoadMaintenance) - 10.5).abs() < 1e-9);
        assert!(companies.iter().all(|c| c.corp_tax_payable == 0.0 && c.sales_tax_payable == 0.0));
    }

    #[test]
    fn second_collection_in_same_year_is_a_noop() {
        let mut gov = Government::new(&GovernmentConfig::default(), d(2000, 1));
        let (pop, mut companies) = world();
        assert!(gov.collect_taxes(d(2001, 2), &pop, &mut companies, 10, 2.0).is_some());
        let before = gov.clone();
        assert!(gov.collect_taxes(d(2001, 11), &pop, &mut companies, 10, 2.0).is_none());
        assert_eq!(gov, before);
    }

    #[test]
    fn start_year_is_never_taxed() {
        let mut gov = Government::new(&GovernmentConfig::default(), d(2000, 1));
        let (pop, mut companies) = world();
        assert!(gov.collect_taxes(d(2000, 12), &pop, &mut companies, 10, 2.0).is_none());
    }

    #[test]
    fn spending_dial_is_clamped() {
        let mut gov = Government::new(&GovernmentConfig::default(), d(2000, 1));
        gov.set_spending_level(42.0);
        assert_eq!(gov.spending_level, SPENDING_RANGE.1);
    }

    #[test]
    fn non_finite_policy_input_keeps_previous_value() {
        let mut gov = Government::new(&GovernmentConfig::default(), d(2000, 1));
        gov.set_spending_level(6.0);
        gov.set_corporate_tax_rate(0.3);
        gov.set_sales_tax_rate(0.05);

        gov.set_spending_level(f64::NAN);
        gov.set_corporate_tax_rate(f64::NAN);
        gov.set_sales_tax_rate(f64::INFINITY);

        assert_eq!(gov.spending_level, 6.0);
        assert_eq!(gov.corporate_tax_rate, 0.3);
        assert_eq!(gov.sales_tax_rate, 0.05);
    }
}
