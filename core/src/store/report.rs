use super::SimStore;
use crate::{error::SimResult, report::Summary};
use rusqlite::params;

/// A stored monthly report row.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyReportRow {
    pub cycle: u64,
    pub sim_date: String,
    pub reserves: f64,
    pub population: i64,
    pub unemployment: f64,
    pub market_index: f64,
    pub inflation: f64,
}

impl SimStore {
    pub fn insert_monthly_report(&self, run_id: &str, summary: &Summary) -> SimResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO monthly_report (
                run_id, cycle, sim_date, reserves, population, population_growth,
                free_housing, unemployment, companies, market_index, market_growth,
                inflation, retail_sales, daily_trips
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                run_id,
                summary.cycle as i64,
                summary.date.to_string(),
                summary.reserves,
                summary.population as i64,
                summary.population_growth,
                summary.free_housing as i64,
                summary.unemployment,
                summary.companies as i64,
                summary.market_index,
                summary.market_growth,
                summary.inflation,
                summary.retail_sales,
                summary.daily_trips as i64,
            ],
        )?;
        Ok(())
    }

    pub fn monthly_reports(&self, run_id: &str) -> SimResult<Vec<MonthlyReportRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT cycle, sim_date, reserves, population, unemployment, market_index, inflation
             FROM monthly_report WHERE run_id = ?1
             ORDER BY cycle ASC",
        )?;
        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok(MonthlyReportRow {
                    cycle: row.get::<_, i64>(0)? as u64,
                    sim_date: row.get(1)?,
                    reserves: row.get(2)?,
                    population: row.get(3)?,
                    unemployment: row.get(4)?,
                    market_index: row.get(5)?,
                    inflation: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
