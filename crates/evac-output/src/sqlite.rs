//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! two tables: `agent_snapshots` and `tick_summaries`.  "No edge" and "no
//! target" are stored as NULL.

use std::path::Path;

use rusqlite::Connection;

use crate::{AgentSnapshotRow, OutputResult, TickSummaryRow};
use crate::writer::OutputWriter;

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS agent_snapshots (
                 agent_id      INTEGER NOT NULL,
                 tick          INTEGER NOT NULL,
                 node          INTEGER NOT NULL,
                 edge          INTEGER,
                 progress_m    REAL    NOT NULL,
                 lat           REAL    NOT NULL,
                 lon           REAL    NOT NULL,
                 status        TEXT    NOT NULL,
                 reroute_count INTEGER NOT NULL,
                 target        INTEGER,
                 PRIMARY KEY (tick, agent_id)
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick           INTEGER PRIMARY KEY,
                 unix_time_secs INTEGER NOT NULL,
                 active         INTEGER NOT NULL,
                 evacuated      INTEGER NOT NULL,
                 stranded       INTEGER NOT NULL,
                 rerouted       INTEGER NOT NULL,
                 blocked_edges  INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

fn optional_id(id: u32) -> Option<u32> {
    (id != u32::MAX).then_some(id)
}

impl OutputWriter for SqliteWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO agent_snapshots \
                 (agent_id, tick, node, edge, progress_m, lat, lon, status, reroute_count, target) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.agent_id,
                    row.tick as i64,
                    row.node,
                    optional_id(row.edge),
                    row.progress_m as f64,
                    row.lat as f64,
                    row.lon as f64,
                    row.status.as_str(),
                    row.reroute_count,
                    optional_id(row.target),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries \
             (tick, unix_time_secs, active, evacuated, stranded, rerouted, blocked_edges) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                row.tick as i64,
                row.unix_time_secs,
                row.active,
                row.evacuated,
                row.stranded,
                row.rerouted,
                row.blocked_edges,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
