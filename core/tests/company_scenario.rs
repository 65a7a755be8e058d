//! Twelve monthly cycles of a single company under tight money.

use chrono::NaiveDate;
use civic_core::{
    company::{CompanyCharter, CompanyRegistry, CompanySize, HiringConditions, Industry},
    config::{CompanyConfig, MarketConfig},
    market::{Market, MarketInputs},
    rng::{RngBank, SubsystemSlot},
};

#[test]
fn twelve_cycles_respect_the_loss_limit_and_keep_the_index_positive() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut market = Market::new(&MarketConfig {
        interest_rate: 7.0,
        unemployment: 0.001,
        ..MarketConfig::default()
    });
    let company_config = CompanyConfig::default();
    let mut companies = CompanyRegistry::new();
    let id = companies.found(
        CompanyCharter {
            name: "Steady Works".into(),
            industry: Industry::Manufacturing,
            size: CompanySize::Large,
            location: None,
            revenue: 1_000_000.0,
            expenses: 800_000.0,
        },
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
    );
    let bank = RngBank::new(2024);

    for cycle in 0..12 {
        let mut market_rng = bank.for_subsystem_at_cycle(SubsystemSlot::Market, cycle);
        market.run_cycle(
            MarketInputs {
                government_spending: 4.0,
                population_growth: 0.0,
                corporate_tax_rate: 0.21,
            },
            &mut market_rng,
        );

        let mut company_rng = bank.for_subsystem_at_cycle(SubsystemSlot::Company, cycle);
        let company = companies.get_mut(id).unwrap();
        let profit = company.calculate_profit(
            &company_config,
            market.last_inflation(),
            market.last_growth(),
            0.21,
        );
        let openings = company.determine_job_openings(
            &company_config,
            HiringConditions {
                interest_rate: market.interest_rate,
                inflation: market.last_inflation(),
                government_spending: 4.0,
                sentiment: market.last_sentiment(),
            },
            &mut company_rng,
        );
        market.report_company_profits(profit);

        assert!(
            profit >= -0.25 * company.last_revenue - 1e-9,
            "cycle {cycle}: profit {profit} below loss limit of revenue {}",
            company.last_revenue
        );
        // 7% rates knock 30% off every draw; entry openings can never exceed 15.
        assert!(openings.total() <= 15 + 7 + 4 + 1);
        assert!(market.market_index() > 0.0, "cycle {cycle}: index collapsed");
    }

    // Profitable from the start with a 200k margin: the loss limiter never bites.
    let company = companies.get(id).unwrap();
    assert!(company.last_profit >= -250_000.0);
    assert!(company.corp_tax_payable > 0.0);
}
