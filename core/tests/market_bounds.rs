//! Market outputs stay inside their documented bands whatever the inputs.

use civic_core::{
    config::MarketConfig,
    history::HISTORY_CAPACITY,
    market::{Market, MarketInputs, GROWTH_FLOOR, INFLATION_RANGE, MONEY_SUPPLY_RANGE, SENTIMENT_RANGE},
    rng::SubsystemRng,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn every_cycle_output_is_bounded(
        seed in any::<u64>(),
        interest_rate in 0.0f64..25.0,
        unemployment in 0.0f64..1.0,
        spending in 0.0f64..10.0,
        population_growth in -50.0f64..50.0,
        corporate_tax_rate in 0.0f64..1.0,
        profits in prop::collection::vec(-1.0e7f64..1.0e7, 1..30),
    ) {
        let mut market = Market::new(&MarketConfig {
            interest_rate,
            unemployment,
            ..MarketConfig::default()
        });
        let mut rng = SubsystemRng::new(seed, 1);

        for profit in profits {
            let cycle = market.run_cycle(
                MarketInputs {
                    government_spending: spending,
                    population_growth,
                    corporate_tax_rate,
                },
                &mut rng,
            );
            market.report_company_profits(profit);

            prop_assert!(cycle.sentiment >= SENTIMENT_RANGE.0 && cycle.sentiment <= SENTIMENT_RANGE.1);
            prop_assert!(cycle.money_supply_growth >= MONEY_SUPPLY_RANGE.0);
            prop_assert!(cycle.money_supply_growth <= MONEY_SUPPLY_RANGE.1);
            prop_assert!(cycle.inflation >= INFLATION_RANGE.0 && cycle.inflation <= INFLATION_RANGE.1);
            prop_assert!(cycle.growth >= GROWTH_FLOOR);
            prop_assert!(cycle.market_index.is_finite());

            let h = &market.history;
            for len in [h.market_index.len(), h.inflation.len(), h.growth.len(), h.sentiment.len(), h.company_profit.len()] {
                prop_assert!(len <= HISTORY_CAPACITY);
            }
        }
    }
}

#[test]
fn histories_cap_at_ten_after_a_long_run() {
    let mut market = Market::new(&MarketConfig::default());
    let mut rng = SubsystemRng::new(5, 1);
    for _ in 0..40 {
        market.run_cycle(
            MarketInputs {
                government_spending: 4.0,
                population_growth: 0.0,
                corporate_tax_rate: 0.21,
            },
            &mut rng,
        );
        market.report_company_profits(10_000.0);
    }
    assert_eq!(market.history.growth.len(), HISTORY_CAPACITY);
    assert_eq!(market.history.company_profit.len(), HISTORY_CAPACITY);
}
