//! Parquet output backend (feature `parquet`).
//!
//! Creates two files in the configured output directory:
//! - `agent_snapshots.parquet`
//! - `tick_summaries.parquet`

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float32Builder, Int64Builder, StringBuilder, UInt32Builder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, OutputResult, TickSummaryRow};

fn snapshot_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("agent_id",      DataType::UInt32,  false),
        Field::new("tick",          DataType::UInt64,  false),
        Field::new("node",          DataType::UInt32,  false),
        Field::new("edge",          DataType::UInt32,  true),
        Field::new("progress_m",    DataType::Float32, false),
        Field::new("lat",           DataType::Float32, false),
        Field::new("lon",           DataType::Float32, false),
        Field::new("status",        DataType::Utf8,    false),
        Field::new("reroute_count", DataType::UInt32,  false),
        Field::new("target",        DataType::UInt32,  true),
    ]))
}

fn summary_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("tick",           DataType::UInt64, false),
        Field::new("unix_time_secs", DataType::Int64,  false),
        Field::new("active",         DataType::UInt32, false),
        Field::new("evacuated",      DataType::UInt32, false),
        Field::new("stranded",       DataType::UInt32, false),
        Field::new("rerouted",       DataType::UInt32, false),
        Field::new("blocked_edges",  DataType::UInt32, false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

fn optional_id(id: u32) -> Option<u32> {
    (id != u32::MAX).then_some(id)
}

/// Writes simulation output to two Parquet files.
///
/// `finish()` **must** be called to write the Parquet file footer; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    snapshots:   Option<ArrowWriter<File>>,
    summaries:   Option<ArrowWriter<File>>,
    snap_schema: Arc<Schema>,
    summ_schema: Arc<Schema>,
}

impl ParquetWriter {
    /// Create both Parquet files in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let snap_schema = snapshot_schema();
        let summ_schema = summary_schema();

        let snap_file = File::create(dir.join("agent_snapshots.parquet"))?;
        let snapshots = ArrowWriter::try_new(snap_file, Arc::clone(&snap_schema), Some(snappy_props()))?;

        let summ_file = File::create(dir.join("tick_summaries.parquet"))?;
        let summaries = ArrowWriter::try_new(summ_file, Arc::clone(&summ_schema), Some(snappy_props()))?;

        Ok(Self {
            snapshots: Some(snapshots),
            summaries: Some(summaries),
            snap_schema,
            summ_schema,
        })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.snapshots.as_mut() else {
            return Ok(());
        };

        let mut agent_ids = UInt32Builder::new();
        let mut ticks     = UInt64Builder::new();
        let mut nodes     = UInt32Builder::new();
        let mut edges     = UInt32Builder::new();
        let mut progress  = Float32Builder::new();
        let mut lats      = Float32Builder::new();
        let mut lons      = Float32Builder::new();
        let mut statuses  = StringBuilder::new();
        let mut reroutes  = UInt32Builder::new();
        let mut targets   = UInt32Builder::new();

        for row in rows {
            agent_ids.append_value(row.agent_id);
            ticks.append_value(row.tick);
            nodes.append_value(row.node);
            edges.append_option(optional_id(row.edge));
            progress.append_value(row.progress_m);
            lats.append_value(row.lat);
            lons.append_value(row.lon);
            statuses.append_value(row.status.as_str());
            reroutes.append_value(row.reroute_count);
            targets.append_option(optional_id(row.target));
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.snap_schema),
            vec![
                Arc::new(agent_ids.finish()),
                Arc::new(ticks.finish()),
                Arc::new(nodes.finish()),
                Arc::new(edges.finish()),
                Arc::new(progress.finish()),
                Arc::new(lats.finish()),
                Arc::new(lons.finish()),
                Arc::new(statuses.finish()),
                Arc::new(reroutes.finish()),
                Arc::new(targets.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        let Some(writer) = self.summaries.as_mut() else {
            return Ok(());
        };

        let mut ticks      = UInt64Builder::new();
        let mut unix_times = Int64Builder::new();
        let mut counts: [UInt32Builder; 5] = std::array::from_fn(|_| UInt32Builder::new());

        ticks.append_value(row.tick);
        unix_times.append_value(row.unix_time_secs);
        let values = [row.active, row.evacuated, row.stranded, row.rerouted, row.blocked_edges];
        for (builder, value) in counts.iter_mut().zip(values) {
            builder.append_value(value);
        }

        let mut columns: Vec<arrow::array::ArrayRef> =
            vec![Arc::new(ticks.finish()), Arc::new(unix_times.finish())];
        columns.extend(counts.iter_mut().map(|b| Arc::new(b.finish()) as arrow::array::ArrayRef));

        let batch = RecordBatch::try_new(Arc::clone(&self.summ_schema), columns)?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(w) = self.snapshots.take() {
            w.close()?;
        }
        if let Some(w) = self.summaries.take() {
            w.close()?;
        }
        Ok(())
    }
}
