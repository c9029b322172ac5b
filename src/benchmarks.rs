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

//! # Benchmark catalog
//!
//! The suite is described by a `benchmarks.json` file mapping each benchmark
//! name to its definition:
//!
//! ```json
//! {
//!   "time_sum": {"params": [["1", "2"]], "param_names": ["n"], "unit": "seconds"},
//!   "version": 2
//! }
//! ```
//!
//! Discovery reads the file from the benchmark directory of the first commit
//! that has one, falling back to the copy cached in the results directory.

use crate::config::Config;
use crate::environment::Environment;
use crate::repo::Repo;
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;

pub const BENCHMARKS_FILE: &str = "benchmarks.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    #[serde(default)]
    pub name: String,

    /// One list of value representations per parameter
    #[serde(default)]
    pub params: Vec<Vec<String>>,

    #[serde(default)]
    pub param_names: Vec<String>,

    #[serde(default = "default_unit")]
    pub unit: String,

    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    #[serde(default)]
    pub version: Option<String>,
}

fn default_unit() -> String {
    "seconds".to_string()
}

impl Benchmark {
    pub fn new(name: &str, params: Vec<Vec<String>>) -> Self {
        let param_names = (1..=params.len()).map(|i| format!("param{}", i)).collect();
        Self {
            name: name.to_string(),
            params,
            param_names,
            unit: default_unit(),
            kind: None,
            version: None,
        }
    }

    /// Number of parameter combinations (1 for an unparameterized benchmark).
    pub fn num_combinations(&self) -> usize {
        self.params.iter().map(Vec::len).product()
    }

    /// Cartesian product of the parameter lists; the last parameter varies fastest.
    pub fn param_combinations(&self) -> Vec<Vec<String>> {
        cartesian_product(&self.params)
    }
}

pub(crate) fn cartesian_product(lists: &[Vec<String>]) -> Vec<Vec<String>> {
    let mut combinations: Vec<Vec<String>> = vec![Vec::new()];
    for values in lists {
        combinations = combinations
            .iter()
            .flat_map(|prefix| {
                values.iter().map(move |value| {
                    let mut combination = prefix.clone();
                    combination.push(value.clone());
                    combination
                })
            })
            .collect();
    }
    combinations
}

#[derive(Debug, Deserialize)]
struct SuiteFile {
    #[serde(default)]
    #[allow(dead_code)]
    version: Option<u32>,
    #[serde(flatten)]
    benchmarks: BTreeMap<String, Benchmark>,
}

/// Benchmarks keyed (and therefore iterated) by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Benchmarks {
    benchmarks: BTreeMap<String, Benchmark>,
}

impl Benchmarks {
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let suite: SuiteFile = serde_json::from_slice(data)?;
        let benchmarks = suite
            .benchmarks
            .into_iter()
            .map(|(key, mut benchmark)| {
                if benchmark.name.is_empty() {
                    benchmark.name = key.clone();
                }
                (key, benchmark)
            })
            .collect();
        Ok(Self { benchmarks })
    }

    /// Find the suite for `commit_hashes` and keep the benchmarks any of `regexes` matches.
    pub fn discover(
        conf: &Config,
        repo: &dyn Repo,
        environments: &[Environment],
        commit_hashes: &[String],
        regexes: &[String],
    ) -> Result<Self> {
        if environments.is_empty() {
            anyhow::bail!("No environments selected");
        }

        let filters = regexes
            .iter()
            .map(|pattern| {
                Regex::new(pattern).with_context(|| format!("Invalid benchmark regex: {}", pattern))
            })
            .collect::<Result<Vec<_>>>()?;

        let suite_path = conf.benchmark_dir.join(BENCHMARKS_FILE);
        let mut found = None;
        for commit_hash in commit_hashes {
            if let Some(data) = repo.read_file(commit_hash, &suite_path)? {
                log::debug!(
                    "Discovered benchmarks in {} at commit {} ({})",
                    suite_path.display(),
                    short_hash(commit_hash),
                    environments[0].name
                );
                found = Some(Self::from_json(&data).with_context(|| {
                    format!(
                        "Failed to parse {} at commit {}",
                        suite_path.display(),
                        short_hash(commit_hash)
                    )
                })?);
                break;
            }
        }

        let all = match found {
            Some(benchmarks) => benchmarks,
            None => Self::load(conf)?,
        };

        Ok(all.filter(&filters))
    }

    /// Load the suite cached in the results directory.
    pub fn load(conf: &Config) -> Result<Self> {
        let path = conf.results_dir.join(BENCHMARKS_FILE);
        if !path.exists() {
            anyhow::bail!(
                "No benchmark suite found: neither {} in the repository nor {} exist",
                conf.benchmark_dir.join(BENCHMARKS_FILE).display(),
                path.display()
            );
        }
        log::debug!("Loading cached benchmark suite from {}", path.display());
        let data =
            fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&data).with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn filter(self, filters: &[Regex]) -> Self {
        if filters.is_empty() {
            return self;
        }
        let benchmarks = self
            .benchmarks
            .into_iter()
            .filter(|(name, _)| filters.iter().any(|re| re.is_match(name)))
            .collect();
        Self { benchmarks }
    }

    pub fn insert(&mut self, benchmark: Benchmark) {
        self.benchmarks.insert(benchmark.name.clone(), benchmark);
    }

    pub fn get(&self, name: &str) -> Option<&Benchmark> {
        self.benchmarks.get(name)
    }

    /// Benchmarks in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = &Benchmark> {
        self.benchmarks.values()
    }

    pub fn len(&self) -> usize {
        self.benchmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }
}

impl FromIterator<Benchmark> for Benchmarks {
    fn from_iter<I: IntoIterator<Item = Benchmark>>(iter: I) -> Self {
        let mut benchmarks = Benchmarks::default();
        for benchmark in iter {
            benchmarks.insert(benchmark);
        }
        benchmarks
    }
}

/// First 7 characters of a commit hash, the whole hash if shorter.
pub fn short_hash(commit_hash: &str) -> &str {
    commit_hash.get(..7).unwrap_or(commit_hash)
}
