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

use crate::session::Session;
use loam_common::model::Verb;
use loam_var::ObjId;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScriptError {
    #[error("script compilation failed: {0}")]
    Compile(String),
    #[error("script runtime error: {0}")]
    Runtime(String),
}

/// A matched verb, ready to run: the verb itself, the object it answered on,
/// who invoked it, the raw input line, and whatever the pattern captured.
#[derive(Debug, Clone)]
pub struct VerbCall {
    pub verb: Verb,
    pub this: ObjId,
    pub player: ObjId,
    pub raw_input: String,
    pub variables: BTreeMap<String, String>,
}

/// The seam to the scripting runtime. Verb code references are opaque to the
/// kernel; whatever implements this trait gets to interpret them. The
/// returned string, if non-empty, is echoed to the invoking player.
pub trait ScriptExecutor: Send + Sync {
    fn execute_verb(&self, call: &VerbCall, session: &dyn Session) -> Result<String, ScriptError>;
}
