//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `agent_snapshots.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::{AgentSnapshotRow, OutputResult, TickSummaryRow};
use crate::writer::OutputWriter;

pub(crate) const SNAPSHOT_COLUMNS: [&str; 10] = [
    "agent_id", "tick", "node", "edge", "progress_m", "lat", "lon", "status", "reroute_count",
    "target",
];

pub(crate) const SUMMARY_COLUMNS: [&str; 7] = [
    "tick", "unix_time_secs", "active", "evacuated", "stranded", "rerouted", "blocked_edges",
];

/// Writes simulation output to two CSV files.
///
/// `u32::MAX` ids ("no edge", "no target") are written as empty fields.
pub struct CsvWriter {
    snapshots: Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut snapshots = Writer::from_path(dir.join("agent_snapshots.csv"))?;
        snapshots.write_record(SNAPSHOT_COLUMNS)?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(SUMMARY_COLUMNS)?;

        Ok(Self { snapshots, summaries, finished: false })
    }
}

fn optional_id(id: u32) -> String {
    if id == u32::MAX { String::new() } else { id.to_string() }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.agent_id.to_string(),
                row.tick.to_string(),
                row.node.to_string(),
                optional_id(row.edge),
                format!("{:.2}", row.progress_m),
                format!("{:.6}", row.lat),
                format!("{:.6}", row.lon),
                row.status.as_str().to_owned(),
                row.reroute_count.to_string(),
                optional_id(row.target),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.unix_time_secs.to_string(),
            row.active.to_string(),
            row.evacuated.to_string(),
            row.stranded.to_string(),
            row.rerouted.to_string(),
            row.blocked_edges.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
