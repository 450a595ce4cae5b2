//! Loading of Criterion benchmark output into per-function sample series.
//!
//! The expected layout is the one Criterion writes into `target/criterion`:
//!
//! ```text
//! <root>/<function_name>[ <qualifier>]/<size>/base/estimates.json
//! ```
//!
//! The top-level `report` directory, as well as the per-function `report`
//! directories, hold Criterion's own aggregate HTML reports and are ignored.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::error::CalibrationError;

/// Name of the directory Criterion uses for its aggregate reports.
const REPORT_DIR: &str = "report";

/// Measured runtime (nanoseconds) per input size of a single function.
///
/// Sizes are unique by construction; missing sizes are allowed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSeries {
    points: BTreeMap<u64, f64>,
}

impl SampleSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` and keeps the existing value if `size` was already
    /// present.
    pub fn insert(&mut self, size: u64, runtime_ns: f64) -> bool {
        match self.points.entry(size) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(entry) => {
                entry.insert(runtime_ns);
                true
            }
        }
    }

    /// Points in increasing size order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, f64)> + '_ {
        self.points.iter().map(|(&size, &runtime)| (size, runtime))
    }

    pub fn sizes(&self) -> Vec<u64> {
        self.points.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl FromIterator<(u64, f64)> for SampleSeries {
    fn from_iter<T: IntoIterator<Item = (u64, f64)>>(iter: T) -> Self {
        let mut series = SampleSeries::new();
        for (size, runtime) in iter {
            series.insert(size, runtime);
        }
        series
    }
}

/// All sample series of one benchmark run, keyed by function name.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkReport {
    series: BTreeMap<String, SampleSeries>,
}

impl BenchmarkReport {
    pub fn get(&self, function: &str) -> Option<&SampleSeries> {
        self.series.get(function)
    }

    pub fn insert(&mut self, function: impl Into<String>, series: SampleSeries) {
        self.series.insert(function.into(), series);
    }

    /// Function names in sorted order.
    pub fn functions(&self) -> impl Iterator<Item = &str> + '_ {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SampleSeries)> + '_ {
        self.series.iter().map(|(name, series)| (name.as_str(), series))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Subset of Criterion's `estimates.json` we rely on.
#[derive(Debug, Deserialize)]
struct Estimates {
    median: Stat,
}

#[derive(Debug, Deserialize)]
struct Stat {
    point_estimate: f64,
}

/// Reads a Criterion output directory.
///
/// Unreadable directories are an error. A size whose summary is missing or
/// malformed is dropped and reported in the returned list, the rest of its
/// function is kept. Directory entries are visited in sorted order, so
/// loading is deterministic.
pub fn load_criterion_report(
    root: &Path,
) -> anyhow::Result<(BenchmarkReport, Vec<CalibrationError>)> {
    let mut report = BenchmarkReport::default();
    let mut dropped = Vec::new();

    for function_dir in sorted_subdirs(root)? {
        let dir_name = file_name(&function_dir);
        if dir_name == REPORT_DIR {
            continue;
        }
        // Criterion appends the parameter description after a space.
        let function = dir_name.split(' ').next().unwrap_or_default().to_string();
        if function.is_empty() {
            tracing::warn!(target: "calibrator", dir = %function_dir.display(), "unnamed benchmark directory, skipping");
            continue;
        }

        let mut series = report.series.remove(&function).unwrap_or_default();
        for size_dir in sorted_subdirs(&function_dir)? {
            let size_name = file_name(&size_dir);
            if size_name == REPORT_DIR {
                continue;
            }
            let size = match size_name.parse::<u64>() {
                Ok(size) if size > 0 => size,
                _ => {
                    tracing::warn!(
                        target: "calibrator",
                        %function,
                        dir = %size_dir.display(),
                        "size directory is not a positive integer, skipping"
                    );
                    continue;
                }
            };

            let summary = size_dir.join("base").join("estimates.json");
            match read_median(&summary) {
                Ok(median) => {
                    tracing::debug!(target: "calibrator", %function, size, median, "loaded sample");
                    if !series.insert(size, median) {
                        tracing::warn!(
                            target: "calibrator",
                            %function,
                            size,
                            dir = %function_dir.display(),
                            "duplicate size for function, keeping the first one"
                        );
                    }
                }
                Err(reason) => {
                    let err = CalibrationError::MalformedSample {
                        function: function.clone(),
                        size,
                        path: summary,
                        reason,
                    };
                    tracing::warn!(target: "calibrator", "{err}");
                    dropped.push(err);
                }
            }
        }

        if series.is_empty() {
            tracing::warn!(target: "calibrator", %function, "no usable samples");
        } else {
            report.series.insert(function, series);
        }
    }

    tracing::info!(target: "calibrator", functions = report.len(), dropped = dropped.len(), "loaded benchmark report");
    Ok((report, dropped))
}

fn read_median(path: &Path) -> Result<f64, String> {
    let raw = fs::read_to_string(path).map_err(|err| err.to_string())?;
    let estimates: Estimates = serde_json::from_str(&raw).map_err(|err| err.to_string())?;
    Ok(estimates.median.point_estimate)
}

fn sorted_subdirs(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read directory {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read directory {}", dir.display()))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to read directory {}", dir.display()))?;
        if file_type.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
}
