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

//! Project configuration (`asv.conf.json`).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "asv.conf.json";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub project: Option<String>,

    /// Path to the project repository
    #[serde(default = "default_repo")]
    pub repo: PathBuf,

    /// Branches whose tips are collected when no range is given
    #[serde(default = "default_branches")]
    pub branches: Vec<String>,

    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// Directory (relative to the repository root) holding the suite definition
    #[serde(default = "default_benchmark_dir")]
    pub benchmark_dir: PathBuf,
}

fn default_repo() -> PathBuf {
    PathBuf::from(".")
}

fn default_branches() -> Vec<String> {
    vec!["HEAD".to_string()]
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_benchmark_dir() -> PathBuf {
    PathBuf::from("benchmarks")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: None,
            repo: default_repo(),
            branches: default_branches(),
            results_dir: default_results_dir(),
            benchmark_dir: default_benchmark_dir(),
        }
    }
}

impl Config {
    /// Load a config file; relative `repo` and `results_dir` resolve against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.repo = base.join(&config.repo);
        config.results_dir = base.join(&config.results_dir);

        log::debug!(
            "Loaded config {} (repo: {}, results: {})",
            path.display(),
            config.repo.display(),
            config.results_dir.display()
        );
        Ok(config)
    }
}
