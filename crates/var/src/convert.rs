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

//! Typed views over dynamic values, for the typed property accessors.

use crate::variant::Variant;
use crate::{ObjId, Var};
use chrono::{DateTime, Utc};

/// Decode a [`Var`] into a concrete Rust type. `None` on shape mismatch.
pub trait FromVar: Sized {
    fn from_var(v: &Var) -> Option<Self>;
}

/// Encode a concrete Rust type as a [`Var`].
pub trait IntoVar {
    fn into_var(self) -> Var;
}

impl FromVar for i64 {
    fn from_var(v: &Var) -> Option<Self> {
        v.as_integer()
    }
}

impl IntoVar for i64 {
    fn into_var(self) -> Var {
        Var::mk_integer(self)
    }
}

impl FromVar for f64 {
    fn from_var(v: &Var) -> Option<Self> {
        v.as_float()
    }
}

impl IntoVar for f64 {
    fn into_var(self) -> Var {
        Var::mk_float(self)
    }
}

impl FromVar for bool {
    fn from_var(v: &Var) -> Option<Self> {
        v.as_bool()
    }
}

impl IntoVar for bool {
    fn into_var(self) -> Var {
        Var::mk_bool(self)
    }
}

impl FromVar for String {
    fn from_var(v: &Var) -> Option<Self> {
        v.as_str().map(str::to_string)
    }
}

impl IntoVar for String {
    fn into_var(self) -> Var {
        Var::mk_string(self)
    }
}

impl IntoVar for &str {
    fn into_var(self) -> Var {
        Var::mk_str(self)
    }
}

impl FromVar for ObjId {
    fn from_var(v: &Var) -> Option<Self> {
        v.as_object().cloned()
    }
}

impl IntoVar for ObjId {
    fn into_var(self) -> Var {
        Var::mk_object(self)
    }
}

impl FromVar for DateTime<Utc> {
    fn from_var(v: &Var) -> Option<Self> {
        v.as_datetime()
    }
}

impl IntoVar for DateTime<Utc> {
    fn into_var(self) -> Var {
        Var::mk_datetime(self)
    }
}

impl<T: FromVar> FromVar for Vec<T> {
    fn from_var(v: &Var) -> Option<Self> {
        let Variant::List(items) = v.variant() else {
            return None;
        };
        items.iter().map(T::from_var).collect()
    }
}

impl<T: IntoVar> IntoVar for Vec<T> {
    fn into_var(self) -> Var {
        Var::mk_list(self.into_iter().map(IntoVar::into_var).collect())
    }
}

impl FromVar for Var {
    fn from_var(v: &Var) -> Option<Self> {
        Some(v.clone())
    }
}

impl IntoVar for Var {
    fn into_var(self) -> Var {
        self
    }
}
