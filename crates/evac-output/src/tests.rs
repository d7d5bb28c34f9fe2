//! Integration tests for evac-output.

#[cfg(test)]
mod helpers {
    use evac_agent::AgentStatus;

    use crate::row::{AgentSnapshotRow, TickSummaryRow};

    pub fn snap_row(agent_id: u32, tick: u64) -> AgentSnapshotRow {
        AgentSnapshotRow {
            agent_id,
            tick,
            node:          agent_id * 10,
            edge:          u32::MAX,
            progress_m:    0.0,
            lat:           51.5,
            lon:           -0.12,
            status:        AgentStatus::Active,
            reroute_count: 0,
            target:        u32::MAX,
        }
    }

    pub fn moving_row() -> AgentSnapshotRow {
        AgentSnapshotRow {
            edge:          7,
            progress_m:    12.5,
            reroute_count: 2,
            target:        20,
            ..snap_row(1, 3)
        }
    }

    pub fn summary_row(tick: u64) -> TickSummaryRow {
        TickSummaryRow {
            tick,
            unix_time_secs: tick as i64 * 600,
            active:         10 - tick as u32,
            evacuated:      tick as u32,
            stranded:       0,
            rerouted:       1,
            blocked_edges:  4,
        }
    }
}

#[cfg(test)]
mod rows {
    use evac_agent::AgentStatus;
    use evac_core::{AgentId, EdgeId, GeoPoint, NodeId, Tick};
    use evac_sim::{AgentSnapshot, TickSummary};

    use crate::row::{AgentSnapshotRow, TickSummaryRow};

    #[test]
    fn snapshot_row_uses_max_for_missing_ids() {
        let snap = AgentSnapshot {
            agent:         AgentId(4),
            node:          NodeId(2),
            edge:          EdgeId::INVALID,
            progress_m:    0.0,
            position:      GeoPoint::new(1.0, 2.0),
            status:        AgentStatus::Stranded,
            target:        None,
            reroute_count: 3,
        };
        let row = AgentSnapshotRow::from_snapshot(Tick(9), &snap);
        assert_eq!(row.agent_id, 4);
        assert_eq!(row.tick, 9);
        assert_eq!(row.edge, u32::MAX);
        assert_eq!(row.target, u32::MAX);
        assert_eq!((row.lat, row.lon), (1.0, 2.0));
        assert_eq!(row.status, AgentStatus::Stranded);
    }

    #[test]
    fn summary_row_copies_counts() {
        let s = TickSummary {
            tick:          Tick(5),
            active:        3,
            evacuated:     6,
            stranded:      1,
            rerouted:      2,
            blocked_edges: 8,
        };
        let row = TickSummaryRow::from_summary(&s, 3_000);
        assert_eq!(row.tick, 5);
        assert_eq!(row.unix_time_secs, 3_000);
        assert_eq!((row.active, row.evacuated, row.stranded), (3, 6, 1));
        assert_eq!((row.rerouted, row.blocked_edges), (2, 8));
    }
}

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use super::helpers::{moving_row, snap_row, summary_row};
    use crate::csv::CsvWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("agent_snapshots.csv").exists());
        assert!(dir.path().join("tick_summaries.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("agent_snapshots.csv")).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(
            headers,
            [
                "agent_id", "tick", "node", "edge", "progress_m", "lat", "lon", "status",
                "reroute_count", "target",
            ]
        );

        let mut rdr2 = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        let headers2: Vec<_> = rdr2.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(
            headers2,
            ["tick", "unix_time_secs", "active", "evacuated", "stranded", "rerouted", "blocked_edges"]
        );
    }

    #[test]
    fn csv_snapshot_fields() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[snap_row(0, 5), moving_row()]).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("agent_snapshots.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);

        // At a node without a route: empty edge and target.
        assert_eq!(&rows[0][0], "0");
        assert_eq!(&rows[0][1], "5");
        assert_eq!(&rows[0][3], "");
        assert_eq!(&rows[0][7], "active");
        assert_eq!(&rows[0][9], "");

        assert_eq!(&rows[1][3], "7");
        assert_eq!(&rows[1][4], "12.50");
        assert_eq!(&rows[1][8], "2");
        assert_eq!(&rows[1][9], "20");
    }

    #[test]
    fn csv_tick_summary_fields() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&summary_row(3)).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "3");
        assert_eq!(&rows[0][1], "1800");
        assert_eq!(&rows[0][2], "7");
        assert_eq!(&rows[0][3], "3");
        assert_eq!(&rows[0][6], "4");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn csv_empty_snapshot_ok() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[]).unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tmp();
        let r = CsvWriter::new(&dir.path().join("does/not/exist"));
        assert!(r.is_err());
    }
}

// ── Whole-run output ──────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use evac_agent::{AgentStoreBuilder, Placement};
    use evac_behavior::{BehaviorSet, Pedestrian};
    use evac_core::{BehaviorId, GeoPoint, NodeId, SimConfig};
    use evac_hazard::NoHazard;
    use evac_sim::SimBuilder;
    use evac_spatial::{DijkstraRouter, RoadNetworkBuilder};
    use tempfile::TempDir;

    use crate::csv::CsvWriter;
    use crate::observer::SimOutputObserver;
    use crate::writer::OutputWriter;
    use crate::{AgentSnapshotRow, OutputError, OutputResult, TickSummaryRow};

    /// A–B–C path of 100 m roads, C safe, agents at A, B, C walking 50 m/s.
    /// Agent 2 evacuates on tick 1, agent 1 on tick 2, agent 0 on tick 4.
    fn run_path(interval: u64, obs: &mut impl evac_sim::SimObserver) -> SimConfig {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let bn = b.add_node(GeoPoint::new(0.0, 0.001));
        let c = b.add_node(GeoPoint::new(0.0, 0.002));
        b.add_road(a, bn, 100.0);
        b.add_road(bn, c, 100.0);
        b.add_safe_location(c, None);
        let net = b.build().unwrap();

        let config = SimConfig {
            start_unix_secs:       1_000,
            tick_duration_secs:    1,
            max_ticks:             6,
            output_interval_ticks: interval,
            ..SimConfig::default()
        };
        let agents = AgentStoreBuilder::new()
            .placements((0..3).map(|n| Placement::new(NodeId(n), BehaviorId(0), 50.0)))
            .build(&net)
            .unwrap();
        let mut sim = SimBuilder::new(
            config.clone(),
            agents,
            net,
            NoHazard::new(),
            BehaviorSet::from(Pedestrian),
            DijkstraRouter,
        )
        .build()
        .unwrap();
        sim.run(obs).unwrap();
        config
    }

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn integration_csv() {
        let dir = tmp();
        let config = SimConfig { start_unix_secs: 1_000, tick_duration_secs: 1, ..SimConfig::default() };
        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = SimOutputObserver::new(writer, &config);
        run_path(2, &mut obs);
        assert!(obs.take_error().is_none(), "no write errors expected");
        assert_eq!(obs.rows_written(), 9);

        // output_interval = 2 → snapshots at ticks 0, 2, 4 (3 ticks × 3 agents)
        let mut rdr = csv::Reader::from_path(dir.path().join("agent_snapshots.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 9);

        // Agent 0 at tick 2: standing on B, heading for C.
        let a0_t2 = rows.iter().find(|r| &r[0] == "0" && &r[1] == "2").unwrap();
        assert_eq!(&a0_t2[2], "1");
        assert_eq!(&a0_t2[3], "");
        assert_eq!(&a0_t2[7], "active");
        assert_eq!(&a0_t2[9], "2");

        let a0_t4 = rows.iter().find(|r| &r[0] == "0" && &r[1] == "4").unwrap();
        assert_eq!(&a0_t4[7], "evacuated");

        let mut rdr = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        let summaries: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(summaries.len(), 4);
        assert_eq!(&summaries[2][0], "3");
        assert_eq!(&summaries[2][1], "1003");
        assert_eq!(&summaries[3][3], "3");
    }

    /// Fails every write after the first `ok` calls.
    struct Flaky {
        ok:       usize,
        calls:    usize,
        finished: bool,
    }

    impl Flaky {
        fn tick(&mut self) -> OutputResult<()> {
            self.calls += 1;
            if self.calls > self.ok {
                Err(OutputError::Io(std::io::Error::other(format!("write {}", self.calls))))
            } else {
                Ok(())
            }
        }
    }

    impl OutputWriter for Flaky {
        fn write_snapshots(&mut self, _rows: &[AgentSnapshotRow]) -> OutputResult<()> {
            self.tick()
        }
        fn write_tick_summary(&mut self, _row: &TickSummaryRow) -> OutputResult<()> {
            self.tick()
        }
        fn finish(&mut self) -> OutputResult<()> {
            self.finished = true;
            Ok(())
        }
    }

    #[test]
    fn first_error_is_kept_and_run_completes() {
        let config = SimConfig::default();
        let mut obs = SimOutputObserver::new(Flaky { ok: 2, calls: 0, finished: false }, &config);
        run_path(1, &mut obs);

        let err = obs.take_error().unwrap();
        assert!(err.to_string().contains("write 3"), "{err}");
        assert!(obs.take_error().is_none());

        let writer = obs.into_writer();
        assert!(writer.finished);
        assert!(writer.calls > 3);
    }
}

// ── SQLite tests ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use super::helpers::{moving_row, snap_row, summary_row};
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("output.db").exists());
    }

    #[test]
    fn sqlite_snapshot_count() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[snap_row(0, 1), snap_row(1, 1), snap_row(2, 1)]).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM agent_snapshots", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn sqlite_missing_ids_are_null() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[snap_row(0, 0), moving_row()]).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let (edge, target): (Option<i64>, Option<i64>) = conn
            .query_row(
                "SELECT edge, target FROM agent_snapshots WHERE agent_id = 0",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!((edge, target), (None, None));

        let (edge, status): (Option<i64>, String) = conn
            .query_row(
                "SELECT edge, status FROM agent_snapshots WHERE agent_id = 1",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(edge, Some(7));
        assert_eq!(status, "active");
    }

    #[test]
    fn sqlite_tick_summary() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&summary_row(7)).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let (tick, unix_time, evacuated): (i64, i64, i64) = conn
            .query_row(
                "SELECT tick, unix_time_secs, evacuated FROM tick_summaries WHERE tick = 7",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(tick, 7);
        assert_eq!(unix_time, 4_200);
        assert_eq!(evacuated, 7);
    }
}

// ── Parquet tests ─────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "parquet"))]
mod parquet_tests {
    use tempfile::TempDir;

    use arrow::array::{Array, UInt32Array};
    use arrow::datatypes::DataType;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    use super::helpers::{moving_row, snap_row, summary_row};
    use crate::parquet::ParquetWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn parquet_files_created() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        assert!(dir.path().join("agent_snapshots.parquet").exists());
        assert!(dir.path().join("tick_summaries.parquet").exists());
    }

    #[test]
    fn parquet_snapshot_schema_and_nulls() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[snap_row(0, 2), moving_row()]).unwrap();
        w.finish().unwrap();

        let file = std::fs::File::open(dir.path().join("agent_snapshots.parquet")).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        let schema = builder.schema().clone();
        let batches: Vec<_> = builder.build().unwrap().map(|b| b.unwrap()).collect();
        let total_rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(total_rows, 2);

        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(
            names,
            [
                "agent_id", "tick", "node", "edge", "progress_m", "lat", "lon", "status",
                "reroute_count", "target",
            ]
        );
        assert_eq!(*schema.field_with_name("status").unwrap().data_type(), DataType::Utf8);

        let edges = batches[0]
            .column_by_name("edge")
            .unwrap()
            .as_any()
            .downcast_ref::<UInt32Array>()
            .unwrap();
        assert!(edges.is_null(0));
        assert_eq!(edges.value(1), 7);
    }

    #[test]
    fn parquet_summary_rows() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        for t in 1..=3 {
            w.write_tick_summary(&summary_row(t)).unwrap();
        }
        w.finish().unwrap();

        let file = std::fs::File::open(dir.path().join("tick_summaries.parquet")).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file).unwrap().build().unwrap();
        let total_rows: usize = reader.map(|b| b.unwrap().num_rows()).sum();
        assert_eq!(total_rows, 3);
    }

    #[test]
    fn parquet_finish_required() {
        // An ArrowWriter dropped without close() leaves no footer.
        let dir = tmp();
        {
            let mut w = ParquetWriter::new(dir.path()).unwrap();
            w.write_snapshots(&[snap_row(0, 0)]).unwrap();
        }

        let file = std::fs::File::open(dir.path().join("agent_snapshots.parquet")).unwrap();
        let result = ParquetRecordBatchReaderBuilder::try_new(file);
        assert!(result.is_err(), "file without Parquet footer should fail to open");
    }
}
