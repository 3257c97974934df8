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

//! The command kernel: takes raw player input, resolves it against the verbs
//! reachable from the player's surroundings, and hands matched verbs to an
//! external script executor. The kernel never interprets verb code itself.

mod config;
mod dispatch;
mod exec;
mod resolve;
mod session;

pub use config::Config;
pub use dispatch::CommandDispatcher;
pub use exec::{ScriptError, ScriptExecutor, VerbCall};
pub use resolve::{VerbMatch, VerbResolver};
pub use session::{NoopSession, Session, SessionError};
