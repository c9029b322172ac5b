// asv-collect - Benchmark result collection tool
// Copyright (c) 2025 Oliver Seifert
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! # Stored results
//!
//! Results live under `<results_dir>/<machine>/<hash-prefix>-<env_name>.json`,
//! one file per (machine, commit, environment):
//!
//! ```json
//! {
//!   "commit_hash": "abc1234...",
//!   "env_name": "existing-py",
//!   "date": 1700000000000,
//!   "results": {
//!     "time_scalar": 0.5,
//!     "time_sum": {"params": [["1", "2"]], "result": [0.1, null]}
//!   },
//!   "version": 1
//! }
//! ```
//!
//! `null` marks a run that failed to produce a number.

use crate::benchmarks::cartesian_product;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Per-machine metadata file that sits next to the result files.
const MACHINE_JSON: &str = "machine.json";

/// Outcome for one parameter combination of a benchmark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    Value(f64),
    /// The benchmark ran but produced no number
    Failed,
    /// Nothing is recorded for this combination
    Missing,
}

impl Measurement {
    /// True when there is no usable number: missing, failed, or NaN.
    pub fn is_missing(&self) -> bool {
        match self {
            Measurement::Value(v) => v.is_nan(),
            Measurement::Failed | Measurement::Missing => true,
        }
    }
}

impl From<Option<f64>> for Measurement {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) => Measurement::Value(v),
            None => Measurement::Failed,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum StoredValue {
    Parameterized {
        params: Vec<Vec<String>>,
        result: Vec<Option<f64>>,
    },
    Scalar(Option<f64>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Results {
    #[serde(default)]
    pub commit_hash: String,
    #[serde(default)]
    pub env_name: String,
    /// Milliseconds since the epoch
    #[serde(default)]
    pub date: Option<i64>,
    #[serde(default)]
    results: BTreeMap<String, StoredValue>,
    #[serde(skip)]
    path: PathBuf,
}

impl Results {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read(path)
            .with_context(|| format!("Failed to read results file: {}", path.display()))?;
        let mut results: Results = serde_json::from_slice(&content)
            .with_context(|| format!("Failed to parse results file: {}", path.display()))?;
        results.path = path.to_path_buf();
        Ok(results)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date.and_then(DateTime::from_timestamp_millis)
    }

    /// One measurement per combination of `params`, or `None` if `name` is not in this record.
    ///
    /// When the stored parameter grid differs from `params`, values are matched
    /// by combination and anything not stored is `Missing`.
    pub fn get_result_value(&self, name: &str, params: &[Vec<String>]) -> Option<Vec<Measurement>> {
        let stored = self.results.get(name)?;
        let requested = cartesian_product(params);

        let values = match stored {
            StoredValue::Scalar(value) if params.is_empty() => vec![Measurement::from(*value)],
            StoredValue::Scalar(_) => vec![Measurement::Missing; requested.len()],
            StoredValue::Parameterized {
                params: stored_params,
                result,
            } if stored_params.as_slice() == params => {
                let mut values: Vec<Measurement> = result
                    .iter()
                    .take(requested.len())
                    .map(|v| Measurement::from(*v))
                    .collect();
                values.resize(requested.len(), Measurement::Missing);
                values
            }
            StoredValue::Parameterized {
                params: stored_params,
                result,
            } => {
                let by_combination: HashMap<Vec<String>, Measurement> =
                    cartesian_product(stored_params)
                        .into_iter()
                        .zip(result.iter().map(|v| Measurement::from(*v)))
                        .collect();
                requested
                    .iter()
                    .map(|combination| {
                        by_combination
                            .get(combination)
                            .copied()
                            .unwrap_or(Measurement::Missing)
                    })
                    .collect()
            }
        };
        Some(values)
    }
}

fn collect_result_paths(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to list results directory: {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_result_paths(&path, paths)?;
        } else if path.extension().map(|ext| ext == "json").unwrap_or(false)
            && path.file_name().map(|f| f != MACHINE_JSON).unwrap_or(false)
        {
            paths.push(path);
        }
    }
    Ok(())
}

fn matches_commit(path: &Path, commit_hash: &str) -> bool {
    let Some(stem) = path.file_stem().map(|s| s.to_string_lossy()) else {
        return false;
    };
    let prefix = stem.split('-').next().unwrap_or("");
    let len = prefix.len().min(commit_hash.len());
    len > 0 && prefix.get(..len) == commit_hash.get(..len)
}

/// Stored results for `machine` at `commit_hash`, loaded lazily in path order.
///
/// A machine without a results directory has no results.
pub fn iter_results_for_machine_and_hash<'a>(
    results_dir: &Path,
    machine: &str,
    commit_hash: &'a str,
) -> Result<impl Iterator<Item = Result<Results>> + 'a> {
    let machine_dir = results_dir.join(machine);
    let mut paths = Vec::new();
    if machine_dir.is_dir() {
        collect_result_paths(&machine_dir, &mut paths)?;
    }
    paths.sort();

    Ok(paths
        .into_iter()
        .filter(move |path| matches_commit(path, commit_hash))
        .map(|path| {
            log::debug!("Loading results from {}", path.display());
            Results::load(&path)
        })
        .filter(move |loaded| match loaded {
            // A shared short prefix is not enough once the full hash is known
            Ok(results) => {
                results.commit_hash.is_empty()
                    || results.commit_hash.starts_with(commit_hash)
                    || commit_hash.starts_with(&results.commit_hash)
            }
            Err(_) => true,
        }))
}
