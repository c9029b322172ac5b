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

//! Collect stored asv-style benchmark results for a set of commits and
//! display them per benchmark, optionally listing the `asv run` commands
//! that would fill in missing values.

pub mod benchmarks;
pub mod collect;
pub mod config;
pub mod console;
pub mod environment;
pub mod format;
pub mod machine;
pub mod repo;
pub mod results;

pub use benchmarks::{Benchmark, Benchmarks};
pub use collect::CollectOptions;
pub use config::Config;
pub use console::{Console, LogConsole};
pub use machine::Machine;
pub use results::{Measurement, Results};
