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

/// Where command output goes.
pub trait Console {
    fn info(&mut self, message: &str);
}

/// Writes every message through the `log` facade at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogConsole;

impl Console for LogConsole {
    fn info(&mut self, message: &str) {
        log::info!("{}", message);
    }
}

/// Keeps messages in memory.
impl Console for Vec<String> {
    fn info(&mut self, message: &str) {
        self.push(message.to_string());
    }
}
