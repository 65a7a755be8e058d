//! Population aggregate: persons and households.
//!
//! Persons live in one population-wide registry. Households only hold
//! person ids; a household without members is dead and gets purged at
//! the start of the next cycle.

use crate::{
    company::{CareerLevel, Industry},
    config::{LaborConfig, TaxBracket},
    government::marginal_income_tax,
    history::{BoundedHistory, HISTORY_CAPACITY},
    types::{years_between, CompanyId, HouseholdId, PersonId, SimDate, TileCoord},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
    NonBinary,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    None,
    HighSchool,
    Bachelor,
    Master,
    Doctorate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStatus {
    Single,
    Partnered,
    Married,
    Widowed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub birthdate: SimDate,
    pub gender: Gender,
    pub education: EducationLevel,
    pub industry: Industry,
    pub career_level: CareerLevel,
    /// `None` means unemployed.
    pub employer: Option<CompanyId>,
    /// Annual gross income.
    pub income: f64,
    pub savings: f64,
    pub relationship: RelationshipStatus,
    pub retired: bool,
}

impl Person {
    pub fn age(&self, today: SimDate) -> u32 {
        years_between(self.birthdate, today)
    }

    pub fn is_employed(&self) -> bool {
        self.employer.is_some()
    }

    pub fn is_employable(&self, today: SimDate, labor: &LaborConfig) -> bool {
        let age = self.age(today);
        !self.retired && age >= labor.working_age && age < labor.retirement_age
    }

    pub fn should_retire(&self, today: SimDate, labor: &LaborConfig) -> bool {
        !self.retired && self.age(today) >= labor.retirement_age
    }
}

/// Attributes for a person joining the population.
#[derive(Debug, Clone)]
pub struct PersonSpec {
    pub name: String,
    pub birthdate: SimDate,
    pub gender: Gender,
    pub education: EducationLevel,
    pub industry: Industry,
    pub career_level: CareerLevel,
    pub relationship: RelationshipStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Household {
    pub id: HouseholdId,
    pub members: Vec<PersonId>,
    pub savings: f64,
    pub moved_in: SimDate,
    pub last_paid: SimDate,
    pub home: Option<TileCoord>,
}

impl Household {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeGroups {
    pub children: usize,
    pub working_age: usize,
    pub seniors: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Population {
    persons: BTreeMap<PersonId, Person>,
    households: BTreeMap<HouseholdId, Household>,
    next_person_id: PersonId,
    next_household_id: HouseholdId,
    /// Head count at the end of each recent cycle.
    pub history: BoundedHistory,
}

impl Default for Population {
    fn default() -> Self {
        Self::new()
    }
}

impl Population {
    pub fn new() -> Self {
        Self {
            persons: BTreeMap::new(),
            households: BTreeMap::new(),
            next_person_id: 1,
            next_household_id: 1,
            history: BoundedHistory::new(HISTORY_CAPACITY),
        }
    }

    // ── Registry ───────────────────────────────────────────────

    pub fn add_household(&mut self, moved_in: SimDate, home: Option<TileCoord>) -> HouseholdId {
        let id = self.next_household_id;
        self.next_household_id += 1;
        self.households.insert(
            id,
            Household {
                id,
                members: Vec::new(),
                savings: 0.0,
                moved_in,
                last_paid: moved_in,
                home,
            },
        );
        id
    }

    /// Add a person to an existing household. `None` if the household is unknown.
    pub fn add_person(&mut self, household: HouseholdId, spec: PersonSpec) -> Option<PersonId> {
        let hh = self.households.get_mut(&household)?;
        let id = self.next_person_id;
        self.next_person_id += 1;
        hh.members.push(id);
        self.persons.insert(
            id,
            Person {
                id,
                name: spec.name,
                birthdate: spec.birthdate,
                gender: spec.gender,
                education: spec.education,
                industry: spec.industry,
                career_level: spec.career_level,
                employer: None,
                income: 0.0,
                savings: 0.0,
                relationship: spec.relationship,
                retired: false,
            },
        );
        Some(id)
    }

    /// Remove a person from the registry and from whichever household held them.
    /// Employer back-references are the caller's to clean up.
    pub fn remove_person(&mut self, id: PersonId) -> Option<Person> {
        let person = self.persons.remove(&id)?;
        for hh in self.households.values_mut() {
            hh.members.retain(|m| *m != id);
        }
        Some(person)
    }

    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.persons.get(&id)
    }

    pub fn person_mut(&mut self, id: PersonId) -> Option<&mut Person> {
        self.persons.get_mut(&id)
    }

    pub fn household(&self, id: HouseholdId) -> Option<&Household> {
        self.households.get(&id)
    }

    pub fn households(&self) -> impl Iterator<Item = &Household> {
        self.households.values()
    }

    pub fn persons(&self) -> impl Iterator<Item = &Person> {
        self.persons.values()
    }

    pub fn household_ids(&self) -> Vec<HouseholdId> {
        self.households.keys().copied().collect()
    }

    pub fn household_size(&self, id: HouseholdId) -> usize {
        self.households.get(&id).map_or(0, Household::size)
    }

    pub fn count(&self) -> usize {
        self.persons.len()
    }

    pub fn household_count(&self) -> usize {
        self.households.len()
    }

    /// Drop every household with no members. Returns how many went.
    pub fn purge_empty_households(&mut self) -> usize {
        let before = self.households.len();
        self.households.retain(|_, hh| !hh.members.is_empty());
        before - self.households.len()
    }

    // ── Aggregates ─────────────────────────────────────────────

    /// Unemployed share of the employable population. Zero when nobody
    /// is employable.
    pub fn unemployment_rate(&self, today: SimDate, labor: &LaborConfig) -> f64 {
        let (employable, unemployed) = self
            .persons
            .values()
            .filter(|p| p.is_employable(today, labor))
            .fold((0usize, 0usize), |(e, u), p| {
                (e + 1, u + usize::from(!p.is_employed()))
            });
        if employable == 0 {
            0.0
        } else {
            unemployed as f64 / employable as f64
        }
    }

    pub fn labor_force(&self, today: SimDate, labor: &LaborConfig) -> usize {
        self.persons
            .values()
            .filter(|p| p.is_employable(today, labor))
            .count()
    }

    pub fn age_groups(&self, today: SimDate, labor: &LaborConfig) -> AgeGroups {
        let mut groups = AgeGroups::default();
        for p in self.persons.values() {
            let age = p.age(today);
            if age < labor.working_age {
                groups.children += 1;
            } else if age < labor.retirement_age {
                groups.working_age += 1;
            } else {
                groups.seniors += 1;
            }
        }
        groups
    }

    /// Annual gross income of all members.
    pub fn household_income(&self, id: HouseholdId) -> f64 {
        self.households.get(&id).map_or(0.0, |hh| {
            hh.members
                .iter()
                .filter_map(|m| self.persons.get(m))
                .map(|p| p.income)
                .sum()
        })
    }

    /// Annual income left after income tax.
    pub fn disposable_income(&self, id: HouseholdId, brackets: &[TaxBracket]) -> f64 {
        let gross = self.household_income(id);
        (gross - marginal_income_tax(gross, brackets)).max(0.0)
    }

    /// Annual disposable income per resident across the whole city.
    pub fn average_disposable_income(&self, brackets: &[TaxBracket]) -> f64 {
        let residents = self.persons.len();
        if residents == 0 {
            return 0.0;
        }
        let total: f64 = self
            .households
            .keys()
            .map(|id| self.disposable_income(*id, brackets))
            .sum();
        total / residents as f64
    }

    /// Monthly payday: each household banks a share of its disposable
    /// income. Returns the total saved across the city.
    pub fn pay_households(&mut self, today: SimDate, brackets: &[TaxBracket], savings_rate: f64) -> f64 {
        let monthly: Vec<(HouseholdId, f64)> = self
            .households
            .keys()
            .map(|id| (*id, self.disposable_income(*id, brackets) / 12.0))
            .collect();
        let mut total = 0.0;
        for (id, income) in monthly {
            if let Some(hh) = self.households.get_mut(&id) {
                let saved = income * savings_rate;
                hh.savings += saved;
                hh.last_paid = today;
                total += saved;
            }
        }
        total
    }

    /// Record this cycle's head count and return the change from the
    /// previous record in percent. Zero when there is no prior record.
    pub fn record_population(&mut self) -> f64 {
        let previous = self.history.last();
        let current = self.persons.len() as f64;
        self.history.push(current);
        if previous > 0.0 {
            (current - previous) / previous * 100.0
        } else {
            0.0
        }
    }

    /// Growth between the last two recorded head counts, in percent.
    pub fn population_growth(&self) -> f64 {
        let recent: Vec<f64> = self.history.iter().rev().take(2).copied().collect();
        match recent.as_slice() {
            [current, previous] if *previous > 0.0 => (current - previous) / previous * 100.0,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32) -> SimDate {
        NaiveDate::from_ymd_opt(y, 1, 1).unwrap()
    }

    fn spec(born: i32) -> PersonSpec {
        PersonSpec {
            name: "Test Person".into(),
            birthdate: d(born),
            gender: Gender::Female,
            education: EducationLevel::Bachelor,
            industry: Industry::Technology,
            career_level: CareerLevel::EntryLevel,
            relationship: RelationshipStatus::Single,
        }
    }

    #[test]
    fn unemployment_counts_only_employable_people() {
        let labor = LaborConfig::default();
        let mut pop = Population::new();
        let hh = pop.add_household(d(2000), None);
        let worker = pop.add_person(hh, spec(1970)).unwrap();
        pop.add_person(hh, spec(1975)).unwrap();
        pop.add_person(hh, spec(1995)).unwrap(); // child in 2000
        pop.add_person(hh, spec(1920)).unwrap(); // past retirement
        pop.person_mut(worker).unwrap().employer = Some(1);
        assert_eq!(pop.labor_force(d(2000), &labor), 2);
        assert!((pop.unemployment_rate(d(2000), &labor) - 0.5).abs() < 1e-12);
        let groups = pop.age_groups(d(2000), &labor);
        assert_eq!(groups, AgeGroups { children: 1, working_age: 2, seniors: 1 });
    }

    #[test]
    fn empty_city_has_zero_unemployment() {
        let pop = Population::new();
        assert_eq!(pop.unemployment_rate(d(2000), &LaborConfig::default()), 0.0);
        assert_eq!(pop.average_disposable_income(&[]), 0.0);
    }

    #[test]
    fn empty_households_are_purged() {
        let mut pop = Population::new();
        let keep = pop.add_household(d(2000), None);
        let gone = pop.add_household(d(2000), None);
        pop.add_person(keep, spec(1980)).unwrap();
        let leaver = pop.add_person(gone, spec(1980)).unwrap();
        pop.remove_person(leaver);
        assert_eq!(pop.purge_empty_households(), 1);
        assert!(pop.household(gone).is_none());
        assert_eq!(pop.household_size(keep), 1);
    }

    #[test]
    fn disposable_income_nets_out_income_tax() {
        let brackets = [TaxBracket { threshold: 10_000.0, rate: 0.5 }];
        let mut pop = Population::new();
        let hh = pop.add_household(d(2000), None);
        let p = pop.add_person(hh, spec(1980)).unwrap();
        pop.person_mut(p).unwrap().income = 30_000.0;
        assert_eq!(pop.disposable_income(hh, &brackets), 20_000.0);
        let saved = pop.pay_households(d(2000), &brackets, 0.1);
        assert!((saved - 20_000.0 / 12.0 * 0.1).abs() < 1e-9);
        assert_eq!(pop.household(hh).unwrap().last_paid, d(2000));
    }

    #[test]
    fn population_growth_tracks_recorded_counts() {
        let mut pop = Population::new();
        let hh = pop.add_household(d(2000), None);
        for _ in 0..4 {
            pop.add_person(hh, spec(1980));
        }
        assert_eq!(pop.record_population(), 0.0);
        pop.add_person(hh, spec(1980));
        assert!((pop.record_population() - 25.0).abs() < 1e-12);
        assert!((pop.population_growth() - 25.0).abs() < 1e-12);
    }
}
