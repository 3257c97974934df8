// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

/// Dispatch behavior toggles. Defaults match the classic interpreter.
#[derive(Debug, Clone)]
pub struct Config {
    /// After the ordered name search fails, sweep capture-bearing patterns
    /// against the whole token list.
    pub fallback_capture_matching: bool,
    /// Exit objects do not answer single-word commands; bare directions
    /// belong to the movement layer.
    pub exits_skip_bare_commands: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fallback_capture_matching: true,
            exits_skip_bare_commands: true,
        }
    }
}
