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

//! Execution environments benchmarks run under.
//!
//! Only already existing environments are known to this tool; selecting one
//! never creates anything.

use crate::config::Config;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Selector for the environment this process is running in.
pub const EXISTING_SAME: &str = "existing:same";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub name: String,
    pub tool_name: String,
    pub executable: PathBuf,
}

impl Environment {
    fn existing(executable: PathBuf) -> Self {
        let sanitized: String = executable
            .to_string_lossy()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        Self {
            name: format!("existing-{}", sanitized.trim_matches('_')),
            tool_name: "existing".to_string(),
            executable,
        }
    }
}

/// Enumerate the environments matching `selectors` (`type` or `type:spec`).
pub fn get_environments(conf: &Config, selectors: &[&str]) -> Result<Vec<Environment>> {
    let mut environments: Vec<Environment> = Vec::new();

    for selector in selectors {
        let (kind, spec) = match selector.split_once(':') {
            Some((kind, spec)) => (kind, Some(spec)),
            None => (*selector, None),
        };

        let environment = match (kind, spec) {
            ("existing", None | Some("same")) => {
                let exe = std::env::current_exe()
                    .context("Failed to determine the current executable")?;
                Environment::existing(exe)
            }
            ("existing", Some(path)) => {
                let path = Path::new(path);
                if !path.exists() {
                    anyhow::bail!("Executable not found: {}", path.display());
                }
                Environment::existing(path.to_path_buf())
            }
            (other, _) => anyhow::bail!(
                "Environment type '{}' is not supported, only 'existing' environments can be selected",
                other
            ),
        };

        if !environments.contains(&environment) {
            log::debug!(
                "Selected environment {} for {}",
                environment.name,
                conf.project.as_deref().unwrap_or("project")
            );
            environments.push(environment);
        }
    }

    Ok(environments)
}
