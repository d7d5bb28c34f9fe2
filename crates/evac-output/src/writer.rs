//! The `OutputWriter` trait implemented by all backend writers.

use crate::{AgentSnapshotRow, OutputResult, TickSummaryRow};

/// Trait implemented by the CSV, SQLite, and Parquet writers.
///
/// [`SimOutputObserver`](crate::SimOutputObserver) stores the first error
/// instead of aborting the run; retrieve it with `take_error`.
pub trait OutputWriter {
    /// Write all agent rows of one snapshot tick.
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent; safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}

impl<W: OutputWriter + ?Sized> OutputWriter for Box<W> {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        (**self).write_snapshots(rows)
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        (**self).write_tick_summary(row)
    }

    fn finish(&mut self) -> OutputResult<()> {
        (**self).finish()
    }
}
