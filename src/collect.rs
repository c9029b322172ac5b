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

//! # `collect`
//!
//! Display the stored results of every benchmark for a set of commits:
//!
//! ```text
//! asv collect                       # tips of the configured branches
//! asv collect main~5..main          # a commit range
//! asv collect --bench 'time_.*' --missing
//! ```
//!
//! With `--missing`, each combination without a usable value gets an
//! `asv run` command that would fill it in.

use crate::benchmarks::{Benchmark, Benchmarks, short_hash};
use crate::config::Config;
use crate::console::Console;
use crate::environment::{self, EXISTING_SAME};
use crate::format::format_benchmark_result;
use crate::machine::Machine;
use crate::repo::{GitRepo, Repo};
use crate::results::{Measurement, Results, iter_results_for_machine_and_hash};
use anyhow::Result;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    /// Commit range; the configured branch tips when `None`
    pub range: Option<String>,
    /// Benchmark name filters, any match keeps a benchmark
    pub bench: Vec<String>,
    /// Emit re-run commands for missing values
    pub missing: bool,
    /// Entry of the machine file to use
    pub machine: Option<String>,
    /// Machine file; `~/.asv-machine.json` when `None`
    pub machine_file: Option<PathBuf>,
    /// Width available for result tables
    pub max_width: usize,
}

/// Resolve the commits to display: a range in walk order, or the deduplicated branch tips.
pub fn resolve_commits(conf: &Config, repo: &dyn Repo, range: Option<&str>) -> Result<Vec<String>> {
    match range {
        Some(range_spec) => repo.get_hashes_from_range(range_spec),
        None => {
            let mut seen = HashSet::new();
            let mut hashes = Vec::new();
            for branch in &conf.branches {
                let hash = repo.get_hash_from_name(branch)?;
                if seen.insert(hash.clone()) {
                    hashes.push(hash);
                }
            }
            Ok(hashes)
        }
    }
}

/// Run the command against the configured repository and this machine's results.
pub fn run(conf: &Config, options: &CollectOptions, console: &mut dyn Console) -> Result<()> {
    let repo = GitRepo::open(&conf.repo)?;
    let commit_hashes = resolve_commits(conf, &repo, options.range.as_deref())?;
    let environments = environment::get_environments(conf, &[EXISTING_SAME])?;
    let benchmarks =
        Benchmarks::discover(conf, &repo, &environments, &commit_hashes, &options.bench)?;
    let machine = match &options.machine_file {
        Some(path) => Machine::load_from(path, options.machine.as_deref())?,
        None => Machine::load(options.machine.as_deref())?,
    };

    collect(conf, &machine, &benchmarks, &commit_hashes, options, console)
}

/// Emit the display (and optionally the re-run commands) for every commit and benchmark.
pub fn collect(
    conf: &Config,
    machine: &Machine,
    benchmarks: &Benchmarks,
    commit_hashes: &[String],
    options: &CollectOptions,
    console: &mut dyn Console,
) -> Result<()> {
    log::debug!(
        "Collecting {} benchmarks over {} commits for machine {}",
        benchmarks.len(),
        commit_hashes.len(),
        machine.machine
    );

    for commit_hash in commit_hashes {
        let result =
            iter_results_for_machine_and_hash(&conf.results_dir, &machine.machine, commit_hash)?
                .next()
                .transpose()?;
        match &result {
            Some(result) => log::debug!(
                "Results for {} from {} ({})",
                short_hash(commit_hash),
                result.path().display(),
                result
                    .date()
                    .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "undated".to_string())
            ),
            None => log::debug!("No results stored for {}", short_hash(commit_hash)),
        }

        for benchmark in benchmarks.iter() {
            let values = display_values(result.as_ref(), benchmark);
            let display = format_benchmark_result(&values, benchmark, options.max_width);
            console.info(&format!(
                "{} for commit {}:\n{}",
                benchmark.name,
                short_hash(commit_hash),
                display.join("\n")
            ));

            if options.missing {
                console.info(&format!(
                    "Missing results for {} at commit {}:",
                    benchmark.name,
                    short_hash(commit_hash)
                ));
                for command in rerun_commands(benchmark, &values, commit_hash) {
                    console.info(&command);
                }
            }
        }
    }

    Ok(())
}

/// Stored values for `benchmark`, or `Missing` for every combination when there are none.
pub fn display_values(result: Option<&Results>, benchmark: &Benchmark) -> Vec<Measurement> {
    result
        .and_then(|r| r.get_result_value(&benchmark.name, &benchmark.params))
        .unwrap_or_else(|| vec![Measurement::Missing; benchmark.num_combinations()])
}

/// `asv run` commands for every combination of `benchmark` lacking a usable value.
pub fn rerun_commands(benchmark: &Benchmark, values: &[Measurement], commit_hash: &str) -> Vec<String> {
    values
        .iter()
        .zip(benchmark.param_combinations())
        .filter(|(value, _)| value.is_missing())
        .map(|(_, combination)| {
            let pattern = regex::escape(&format!("{}({})", benchmark.name, combination.join(", ")));
            format!("asv run {} --bench \"{}\"", short_hash(commit_hash), pattern)
        })
        .collect()
}
