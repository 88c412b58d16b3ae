//! Formatting and export helpers for optimization results.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use itertools::Itertools;

use crate::error::{OptimizerError, Result};
use crate::OptimizationResult;

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let millis = duration.subsec_millis();

    format!("{}h {:02}m {:02}.{:03}s", hours, minutes, seconds, millis)
}

/// Write a result as pretty-printed JSON.
pub fn save_result<P: AsRef<Path>>(result: &OptimizationResult, path: P) -> Result<()> {
    let path = path.as_ref();

    let file = File::create(path).map_err(|err| io_error(path, err))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, result).map_err(|err| io_error(path, err))?;
    writer.flush().map_err(|err| io_error(path, err))
}

fn io_error(path: &Path, err: impl std::fmt::Display) -> OptimizerError {
    OptimizerError::Io {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Render the front as a plain-text table, best route marked with `*`.
pub fn format_front(result: &OptimizationResult) -> String {
    let mut out = format!(
        "Pareto front: {} routes after {} generations ({})\n",
        result.pareto_front.len(),
        result.generations_completed,
        format_duration(result.run_time)
    );
    out.push_str(&format!(
        "  {:>12} {:>12} {:>10}  route\n",
        "distance_km", "time_min", "estimated"
    ));

    for route in &result.pareto_front {
        let marker = if route.route == result.best.route { '*' } else { ' ' };
        out.push_str(&format!(
            "{} {:>12.2} {:>12.2} {:>10}  {}\n",
            marker,
            route.objectives.distance_km,
            route.objectives.time_min,
            route.estimated_legs,
            route.route.iter().join(" -> ")
        ));
    }

    if result.missing_pairs > 0 {
        out.push_str(&format!(
            "{} zone pairs priced with {:?}\n",
            result.missing_pairs, result.fallback
        ));
    }
    for warning in &result.warnings {
        out.push_str(&format!("warning: {}\n", warning));
    }

    out
}
