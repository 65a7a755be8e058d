//! Employment matcher: greedy first-fit assignment of job seekers.
//!
//! Order is fixed so runs are reproducible: households by ascending id,
//! members in stored order, companies by ascending id. The first company
//! in the person's industry with an opening at the person's career level
//! takes them. There is no search for a better match and no wage
//! negotiation; anyone left over tries again next cycle.

use crate::{
    company::CompanyRegistry,
    config::LaborConfig,
    population::Population,
    types::SimDate,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmploymentOutcome {
    pub hired: usize,
    pub retired: usize,
    pub still_seeking: usize,
}

pub fn assign_jobs(
    population: &mut Population,
    companies: &mut CompanyRegistry,
    today: SimDate,
    labor: &LaborConfig,
) -> EmploymentOutcome {
    let mut outcome = EmploymentOutcome::default();

    for household_id in population.household_ids() {
        let members = match population.household(household_id) {
            Some(hh) => hh.members.clone(),
            None => continue,
        };

        for person_id in members {
            let Some(person) = population.person_mut(person_id) else {
                continue;
            };

            if person.should_retire(today, labor) {
                if let Some(employer) = person.employer.take() {
                    if let Some(company) = companies.get_mut(employer) {
                        company.employees.remove(&person_id);
                    }
                }
                person.retired = true;
                person.income = 0.0;
                outcome.retired += 1;
                continue;
            }

            if !person.is_employable(today, labor) || person.is_employed() {
                continue;
            }

            let level = person.career_level;
            let industry = person.industry;
            let employer = companies
                .iter_mut()
                .find(|c| c.industry == industry && c.job_openings.get(level) > 0);

            match employer {
                Some(company) => {
                    company.job_openings.take(level);
                    company.employees.insert(person_id);
                    person.employer = Some(company.id);
                    person.income = labor.salary(level);
                    outcome.hired += 1;
                }
                None => outcome.still_seeking += 1,
            }
        }
    }

    if outcome.retired > 0 || outcome.hired > 0 {
        log::debug!(
            "employment: hired={} retired={} seeking={}",
            outcome.hired,
            outcome.retired,
            outcome.still_seeking
        );
    }
    outcome
}
