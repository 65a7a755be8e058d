//! Regional trade model.
//!
//! Runs every cycle in three dependent passes:
//!   1. stats:   re-tally each region from its tiles
//!   2. traffic: gravity-model trips between every ordered region pair
//!   3. sales:   local plus inbound demand, split across each region's shops
//!
//! Nothing is carried over between cycles: tallies and trips are rebuilt
//! from the current world every time.

use crate::{
    company::CompanyRegistry,
    config::{TaxBracket, TradeConfig},
    geography::{LandUse, LandUseService, Occupant, PathService},
    population::Population,
    types::{CompanyId, RegionId, TileCoord},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trip {
    pub destination: RegionId,
    pub daily_trips: u32,
    pub from: TileCoord,
    pub to: TileCoord,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RegionTally {
    pub population: usize,
    pub shops: usize,
    pub jobs: usize,
    pub vacant_homes: usize,
    /// Annual disposable income of all residents.
    pub disposable_income: f64,
    pub shop_ids: Vec<CompanyId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    pub origin: TileCoord,
    pub width: i32,
    pub height: i32,
    /// Where the region joins the regional road network, if it does.
    pub road_anchor: Option<TileCoord>,
    pub tally: RegionTally,
    pub trips: Vec<Trip>,
}

impl Region {
    pub fn new(
        id: RegionId,
        name: impl Into<String>,
        origin: TileCoord,
        width: i32,
        height: i32,
        road_anchor: Option<TileCoord>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            origin,
            width,
            height,
            road_anchor,
            tally: RegionTally::default(),
            trips: Vec::new(),
        }
    }

    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (0..self.height.max(0)).flat_map(move |dy| {
            (0..self.width.max(0)).map(move |dx| TileCoord::new(self.origin.x + dx, self.origin.y + dy))
        })
    }

    /// Monthly disposable income per resident.
    pub fn average_monthly_disposable_income(&self) -> f64 {
        if self.tally.population == 0 {
            0.0
        } else {
            self.tally.disposable_income / self.tally.population as f64 / 12.0
        }
    }
}

// ── 1. Stats ───────────────────────────────────────────────────────

pub fn calculate_regional_stats(
    regions: &mut [Region],
    land: &dyn LandUseService,
    population: &Population,
    companies: &CompanyRegistry,
    brackets: &[TaxBracket],
) {
    for region in regions.iter_mut() {
        let mut tally = RegionTally::default();
        for at in region.tiles() {
            let tile = land.tile(at);
            if !tile.developed {
                continue;
            }
            match (tile.land_use, tile.occupant) {
                (LandUse::Residential, Some(Occupant::Household(id))) => {
                    let size = population.household_size(id);
                    if size == 0 {
                        tally.vacant_homes += 1;
                    } else {
                        tally.population += size;
                        tally.disposable_income += population.disposable_income(id, brackets);
                    }
                }
                (LandUse::Residential, _) => tally.vacant_homes += 1,
                // Farms sell at the gate, so they count as shops too.
                (LandUse::Retail | LandUse::Agriculture, Some(Occupant::Company(id))) => {
                    if let Some(company) = companies.get(id) {
                        tally.shops += 1;
                        tally.jobs += company.employees.len();
                        tally.shop_ids.push(id);
                    }
                }
                _ => {}
            }
        }
        region.tally = tally;
    }
}

// ── 2. Traffic ─────────────────────────────────────────────────────

/// Daily trips from a region of `population` to one offering `jobs` and
/// `shops` at `distance`. Distance is floored at 1.
pub fn gravity_trip_volume(
    population: usize,
    jobs: usize,
    shops: usize,
    distance: u32,
    trade: &TradeConfig,
) -> i64 {
    let d = f64::from(distance.max(1));
    let pop = population as f64;
    let work = pop * jobs as f64 / d.powf(trade.work_distance_exponent);
    let shopping = pop * shops as f64 / d.powf(trade.shopping_distance_exponent);
    (trade.trip_scale * (work + shopping)).round() as i64
}

/// Rebuild every region's outbound trips. Returns the total daily volume.
pub fn calculate_regional_traffic(
    regions: &mut [Region],
    paths: &dyn PathService,
    trade: &TradeConfig,
) -> u64 {
    let targets: Vec<(RegionId, Option<TileCoord>, usize, usize)> = regions
        .iter()
        .map(|r| (r.id, r.road_anchor, r.tally.jobs, r.tally.shops))
        .collect();

    let mut total = 0u64;
    for origin in regions.iter_mut() {
        origin.trips.clear();
        let Some(from) = origin.road_anchor else {
            continue;
        };
        for &(dest_id, dest_anchor, jobs, shops) in &targets {
            if dest_id == origin.id {
                continue;
            }
            let Some(to) = dest_anchor else {
                continue;
            };
            let Some(distance) = paths.distance(from, to) else {
                continue;
            };
            let volume = gravity_trip_volume(origin.tally.population, jobs, shops, distance, trade);
            if volume <= 0 {
                continue;
            }
            let daily_trips = u32::try_from(volume).unwrap_or(u32::MAX);
            total += u64::from(daily_trips);
            origin.trips.push(Trip {
                destination: dest_id,
                daily_trips,
                from,
                to,
            });
        }
    }
    total
}

// ── 3. Sales ───────────────────────────────────────────────────────

/// City-wide conditions that scale what shoppers spend.
#[derive(Debug, Clone, Copy)]
pub struct SalesConditions {
    pub unemployment: f64,
    pub sentiment: f64,
    pub inflation: f64,
    pub inflation_target: f64,
    pub sales_tax_rate: f64,
}

impl SalesConditions {
    /// Share of spending that survives sales tax and above-target inflation.
    fn macro_adjustment(&self) -> f64 {
        (1.0 - self.sales_tax_rate - (self.inflation - self.inflation_target) / 100.0).max(0.0)
    }

    fn mood(&self) -> f64 {
        1.0 + self.sentiment / 10.0
    }
}

/// Monthly retail demand a region's residents spend at home.
pub fn local_demand(region: &Region, conditions: &SalesConditions, trade: &TradeConfig) -> f64 {
    let spending_power = (region.average_monthly_disposable_income()
        * (1.0 - conditions.unemployment)
        * conditions.mood())
    .max(0.0);
    region.tally.population as f64 * spending_power * conditions.macro_adjustment() * trade.retail_spending_share
}

/// Monthly demand brought in by visitors from other regions.
pub fn external_demand(
    region_id: RegionId,
    regions: &[Region],
    conditions: &SalesConditions,
    trade: &TradeConfig,
) -> f64 {
    let per_visit = (trade.spend_per_visit * conditions.mood()).max(0.0) * conditions.macro_adjustment();
    regions
        .iter()
        .flat_map(|r| r.trips.iter())
        .filter(|t| t.destination == region_id)
        .map(|t| trade.external_demand_share * f64::from(t.daily_trips) * per_visit * trade.days_per_month)
        .sum()
}

/// Set every company's `retail_sales` for the month and accrue sales tax.
/// Returns total city retail sales.
pub fn calculate_regional_sales(
    regions: &[Region],
    companies: &mut CompanyRegistry,
    conditions: SalesConditions,
    trade: &TradeConfig,
) -> f64 {
    for company in companies.iter_mut() {
        company.retail_sales = 0.0;
    }

    let mut city_total = 0.0;
    for region in regions.iter().filter(|r| r.tally.shops > 0) {
        let demand = local_demand(region, &conditions, trade)
            + external_demand(region.id, regions, &conditions, trade);
        let shops = region.tally.shop_ids.len().max(1) as f64;
        let average = demand / shops;

        let scores: Vec<(CompanyId, f64)> = region
            .tally
            .shop_ids
            .iter()
            .filter_map(|id| companies.get(*id).map(|c| (*id, c.productivity_score())))
            .collect();
        let mean_score = scores.iter().map(|(_, s)| s).sum::<f64>() / shops;

        for (id, score) in scores {
            let sales = if mean_score > 0.0 {
                average * score / mean_score
            } else {
                average
            };
            if let Some(company) = companies.get_mut(id) {
                company.retail_sales += sales;
                company.sales_tax_payable += sales * conditions.sales_tax_rate;
            }
            city_total += sales;
        }
    }
    city_total
}
