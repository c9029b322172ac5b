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

//! Identity of the machine results were recorded on (`~/.asv-machine.json`).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const MACHINE_FILE: &str = ".asv-machine.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    /// Stable identity; also the name of the machine's results directory
    #[serde(default)]
    pub machine: String,
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub arch: String,
    #[serde(default)]
    pub cpu: String,
    #[serde(default)]
    pub num_cpu: String,
    #[serde(default)]
    pub ram: String,
}

#[derive(Debug, Deserialize)]
struct MachineFile {
    #[serde(default)]
    #[allow(dead_code)]
    version: Option<u32>,
    #[serde(flatten)]
    machines: BTreeMap<String, Machine>,
}

/// `~/.asv-machine.json`, if a home directory is known.
pub fn default_machine_file() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(MACHINE_FILE))
}

impl Machine {
    /// Load the machine entry from the default machine file.
    pub fn load(name: Option<&str>) -> Result<Self> {
        let path = default_machine_file()
            .ok_or_else(|| anyhow::anyhow!("Cannot locate home directory for {}", MACHINE_FILE))?;
        Self::load_from(&path, name)
    }

    /// Pick `name` if given, the only entry if there is one, else the entry named after this host.
    pub fn load_from(path: &Path, name: Option<&str>) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "No machine information file found at {}; record results on this machine first",
                path.display()
            );
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read machine file: {}", path.display()))?;
        let file: MachineFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse machine file: {}", path.display()))?;
        let mut machines = file.machines;

        let key = match name {
            Some(name) => name.to_string(),
            None if machines.len() == 1 => machines.keys().next().cloned().unwrap_or_default(),
            None => sysinfo::System::host_name().unwrap_or_default(),
        };

        let mut machine = machines.remove(&key).ok_or_else(|| {
            anyhow::anyhow!(
                "No machine named '{}' in {} (known: {})",
                key,
                path.display(),
                machines.keys().cloned().collect::<Vec<_>>().join(", ")
            )
        })?;
        if machine.machine.is_empty() {
            machine.machine = key;
        }

        log::debug!(
            "Machine: {} ({} {}, {})",
            machine.machine,
            machine.os,
            machine.arch,
            machine.cpu
        );
        Ok(machine)
    }
}
