//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The engine never executes SQL; the runner hands it the engine's event
//! log, summaries and snapshots.

use crate::{
    error::{SimError, SimResult},
    event::EventLogEntry,
    snapshot::SimSnapshot,
    types::SimDate,
};
use rusqlite::{params, Connection, OptionalExtension};

mod report;

pub use report::MonthlyReportRow;

pub struct SimStore {
    conn: Connection,
}

impl SimStore {
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        // WAL only matters for real files; in-memory databases ignore it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order. Safe to call more than once.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_monthly_report.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, seed: u64, version: &str, start: SimDate) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, start_date) VALUES (?1, ?2, ?3, ?4)",
            params![run_id, seed as i64, version, start.to_string()],
        )?;
        Ok(())
    }

    pub fn run_seed(&self, run_id: &str) -> SimResult<Option<u64>> {
        let seed = self
            .conn
            .query_row("SELECT seed FROM run WHERE run_id = ?1", params![run_id], |row| {
                row.get::<_, i64>(0)
            })
            .optional()?;
        Ok(seed.map(|s| s as u64))
    }

    // ── Event log ──────────────────────────────────────────────

    /// Append a batch in one transaction.
    pub fn append_events(&mut self, entries: &[EventLogEntry]) -> SimResult<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO event_log (run_id, cycle, subsystem, event_type, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for entry in entries {
                stmt.execute(params![
                    entry.run_id,
                    entry.cycle as i64,
                    entry.subsystem,
                    entry.event_type,
                    entry.payload,
                ])?;
            }
        }
        tx.commit()?;
        Ok(entries.len())
    }

    pub fn events_for_cycle(&self, run_id: &str, cycle: u64) -> SimResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, cycle, subsystem, event_type, payload
             FROM event_log WHERE run_id = ?1 AND cycle = ?2
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![run_id, cycle as i64], |row| {
                Ok(EventLogEntry {
                    id: Some(row.get(0)?),
                    run_id: row.get(1)?,
                    cycle: row.get::<_, i64>(2)? as u64,
                    subsystem: row.get(3)?,
                    event_type: row.get(4)?,
                    payload: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self, run_id: &str) -> SimResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ── Snapshot ───────────────────────────────────────────────

    /// Store a snapshot, replacing any earlier one for the same cycle.
    pub fn save_snapshot(&self, snapshot: &SimSnapshot) -> SimResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO snapshot (run_id, cycle, sim_date, state_json)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                snapshot.run_id,
                snapshot.cycle() as i64,
                snapshot.clock.date.to_string(),
                snapshot.to_json()?,
            ],
        )?;
        log::debug!("snapshot saved for {} at cycle {}", snapshot.run_id, snapshot.cycle());
        Ok(())
    }

    /// The newest snapshot taken at or before `cycle`, if any.
    pub fn snapshot_at_or_before(&self, run_id: &str, cycle: u64) -> SimResult<Option<SimSnapshot>> {
        let json = self
            .conn
            .query_row(
                "SELECT state_json FROM snapshot
                 WHERE run_id = ?1 AND cycle <= ?2
                 ORDER BY cycle DESC LIMIT 1",
                params![run_id, cycle as i64],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        json.map(|j| SimSnapshot::from_json(&j)).transpose()
    }

    pub fn latest_snapshot(&self, run_id: &str) -> SimResult<SimSnapshot> {
        self.snapshot_at_or_before(run_id, i64::MAX as u64)?
            .ok_or_else(|| SimError::SnapshotNotFound {
                run_id: run_id.to_string(),
            })
    }
}
