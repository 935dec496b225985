//! Console formatting for run results.

use anyhow::{Context, Result};
use kutta_core::analysis::{DecayComparison, DecayRow, SeparationReport};
use kutta_core::simulation::RunStatus;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub const DECAY_HEADER: &str = "t\teuler\trk4\texact";
pub const EXPLODED_MESSAGE: &str = "State exploded, stopping early";

pub fn decay_row(row: &DecayRow) -> String {
    format!(
        "{:.2}\t{:.5}\t{:.5}\t{:.5}",
        row.t, row.euler, row.rk4, row.exact
    )
}

pub fn decay_table(comparison: &DecayComparison) -> Vec<String> {
    std::iter::once(DECAY_HEADER.to_string())
        .chain(comparison.rows.iter().map(decay_row))
        .collect()
}

pub fn completion_line(points: usize) -> String {
    format!("Simulation complete. Points: {points}")
}

/// Closing lines of a run: the early-stop notice if the guard tripped, then
/// the point count, which is printed either way.
pub fn run_summary(status: &RunStatus, points: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(2);
    if status.is_diverged() {
        lines.push(EXPLODED_MESSAGE.to_string());
    }
    lines.push(completion_line(points));
    lines
}

pub fn separation_summary(report: &SeparationReport, growth_rate: Option<f64>) -> Vec<String> {
    let mut lines = Vec::new();
    if let (Some(initial), Some(last)) = (report.distances.first(), report.final_distance()) {
        lines.push(format!("Initial separation: {initial:.3e}"));
        lines.push(format!("Final separation: {last:.3e}"));
    }
    match growth_rate {
        Some(rate) => lines.push(format!("Separation growth rate: {rate:.4}")),
        None => lines.push("Separation growth rate: undefined".to_string()),
    }
    lines.extend(run_summary(&report.status, report.points()));
    lines
}

/// Writes `value` to `path` as pretty-printed JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize results.")?;
    fs::write(path, json).with_context(|| format!("Unable to write {}.", path.display()))
}

#[cfg(test)]
mod tests {
    use super::{
        completion_line, decay_row, decay_table, run_summary, write_json, EXPLODED_MESSAGE,
    };
    use approx::assert_relative_eq;
    use kutta_core::analysis::{compare_decay, DecayComparison, DecayRow};
    use kutta_core::simulation::{simulate, RunStatus, SimulationReport, SimulationSettings};
    use kutta_core::solvers::Method;
    use kutta_core::systems::{Decay, FnSystem};
    use std::fs;

    #[test]
    fn decay_rows_use_fixed_precision() {
        let row = DecayRow {
            t: 0.1,
            euler: 0.9,
            rk4: 0.904_837_5,
            exact: (-0.1f64).exp(),
        };
        assert_eq!(decay_row(&row), "0.10\t0.90000\t0.90484\t0.90484");
    }

    #[test]
    fn decay_table_starts_with_header_and_initial_row() {
        let comparison =
            compare_decay(&Decay::default(), 1.0, 0.1, 20).expect("comparison should run");
        let lines = decay_table(&comparison);
        assert_eq!(lines.len(), 22);
        assert_eq!(lines[0], "t\teuler\trk4\texact");
        assert_eq!(lines[1], "0.00\t1.00000\t1.00000\t1.00000");
        assert!(lines[2].starts_with("0.10\t0.90000\t"));
        assert!(lines[2].ends_with("\t0.90484"));
        assert!(lines[21].starts_with("2.00\t"));
    }

    #[test]
    fn run_summary_always_reports_points() {
        assert_eq!(
            run_summary(&RunStatus::Completed, 38_000),
            vec!["Simulation complete. Points: 38000".to_string()]
        );
        let diverged = RunStatus::Diverged { step: 6, time: 6.0 };
        assert_eq!(
            run_summary(&diverged, 6),
            vec![EXPLODED_MESSAGE.to_string(), completion_line(6)]
        );
    }

    #[test]
    fn json_export_reads_back() {
        let dir = std::env::temp_dir();
        let pid = std::process::id();

        let growth = FnSystem::new(1, |x: &[f64], out: &mut [f64]| out[0] = 10.0 * x[0]);
        let settings = SimulationSettings::new(Method::Euler, 1.0, 100);
        let report = simulate(&growth, &[1.0], &settings).expect("simulation should run");
        let report_path = dir.join(format!("kutta-report-{pid}-simulation.json"));
        write_json(&report_path, &report).expect("report should be written");

        let text = fs::read_to_string(&report_path).expect("report should exist");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(value["status"]["type"], "Diverged");
        assert_eq!(value["status"]["step"], 6);
        let restored: SimulationReport = serde_json::from_str(&text).expect("report should parse");
        assert_eq!(restored.points(), 6);
        assert_eq!(restored.steps_taken, 6);
        assert_relative_eq!(restored.trajectory.states[5][0], 11f64.powi(5));

        let comparison =
            compare_decay(&Decay::default(), 1.0, 0.1, 20).expect("comparison should run");
        let table_path = dir.join(format!("kutta-report-{pid}-decay.json"));
        write_json(&table_path, &comparison).expect("comparison should be written");
        let text = fs::read_to_string(&table_path).expect("comparison should exist");
        let restored: DecayComparison = serde_json::from_str(&text).expect("table should parse");
        assert_eq!(restored.rows.len(), 21);
        assert_relative_eq!(restored.rows[20].t, 2.0, max_relative = 1e-12);

        fs::remove_file(&report_path).ok();
        fs::remove_file(&table_path).ok();
    }

    #[test]
    fn json_export_reports_unwritable_path() {
        let path = std::env::temp_dir()
            .join(format!("kutta-report-{}-missing-dir", std::process::id()))
            .join("out.json");
        let err = write_json(&path, &RunStatus::Completed).expect_err("expected error");
        assert!(err.to_string().contains("Unable to write"));
    }
}
