//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use evac_core::{SimClock, SimConfig, Tick};
use evac_sim::{SimObserver, SimView, TickSummary};

use crate::row::{AgentSnapshotRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes agent snapshots and tick summaries to any
/// [`OutputWriter`] backend (CSV, SQLite, Parquet, …).
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    clock:      SimClock,
    rows:       u64,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`, using `config` for wall-clock
    /// conversion.
    pub fn new(writer: W, config: &SimConfig) -> Self {
        Self {
            writer,
            clock:      config.make_clock(),
            rows:       0,
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Agent snapshot rows written so far.
    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                log::error!("output write failed: {e}");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, summary: &TickSummary) {
        let row = TickSummaryRow::from_summary(summary, self.clock.unix_secs_at(summary.tick));
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, view: &SimView<'_>) {
        let rows: Vec<AgentSnapshotRow> = view
            .agent_snapshots()
            .map(|s| AgentSnapshotRow::from_snapshot(view.tick, &s))
            .collect();

        if !rows.is_empty() {
            self.rows += rows.len() as u64;
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        log::debug!("closing output at {final_tick} after {} snapshot rows", self.rows);
        let result = self.writer.finish();
        self.store_err(result);
    }
}
