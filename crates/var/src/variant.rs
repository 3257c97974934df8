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

use crate::{ObjId, Var};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The closed set of value shapes a dynamic property can hold.
///
/// Property bags are string-keyed maps of these; they round-trip through the
/// document store as tagged JSON. Deliberately small: no code values, no
/// open-ended host types.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Variant {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    DateTime(DateTime<Utc>),
    Obj(ObjId),
    List(Vec<Var>),
    Map(BTreeMap<String, Var>),
}
