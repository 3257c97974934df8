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

use crate::ObjId;
use crate::variant::Variant;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

/// A dynamic world-model value; a thin wrapper over [`Variant`].
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Var(Variant);

impl Debug for Var {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.variant())
    }
}

impl Var {
    pub fn from_variant(variant: Variant) -> Self {
        Var(variant)
    }

    pub fn variant(&self) -> &Variant {
        &self.0
    }

    pub fn mk_none() -> Self {
        Var(Variant::None)
    }

    pub fn mk_bool(b: bool) -> Self {
        Var(Variant::Bool(b))
    }

    pub fn mk_integer(i: i64) -> Self {
        Var(Variant::Int(i))
    }

    pub fn mk_float(f: f64) -> Self {
        Var(Variant::Float(f))
    }

    pub fn mk_str(s: &str) -> Self {
        Var(Variant::Str(s.to_string()))
    }

    pub fn mk_string(s: String) -> Self {
        Var(Variant::Str(s))
    }

    pub fn mk_datetime(dt: DateTime<Utc>) -> Self {
        Var(Variant::DateTime(dt))
    }

    pub fn mk_object(o: ObjId) -> Self {
        Var(Variant::Obj(o))
    }

    pub fn mk_list(values: Vec<Var>) -> Self {
        Var(Variant::List(values))
    }

    pub fn mk_map(pairs: BTreeMap<String, Var>) -> Self {
        Var(Variant::Map(pairs))
    }

    pub fn is_none(&self) -> bool {
        matches!(self.variant(), Variant::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.variant() {
            Variant::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.variant() {
            Variant::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self.variant() {
            Variant::Float(f) => Some(*f),
            Variant::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.variant() {
            Variant::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self.variant() {
            Variant::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjId> {
        match self.variant() {
            Variant::Obj(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Var]> {
        match self.variant() {
            Variant::List(l) => Some(l.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Var>> {
        match self.variant() {
            Variant::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Truthiness, for scripting-facing conditionals.
    pub fn is_true(&self) -> bool {
        match self.variant() {
            Variant::None => false,
            Variant::Bool(b) => *b,
            Variant::Int(i) => *i != 0,
            Variant::Float(f) => *f != 0.0,
            Variant::Str(s) => !s.is_empty(),
            Variant::DateTime(_) => true,
            Variant::Obj(_) => true,
            Variant::List(l) => !l.is_empty(),
            Variant::Map(m) => !m.is_empty(),
        }
    }
}

pub fn v_none() -> Var {
    Var::mk_none()
}

pub fn v_bool(b: bool) -> Var {
    Var::mk_bool(b)
}

pub fn v_int(i: i64) -> Var {
    Var::mk_integer(i)
}

pub fn v_float(f: f64) -> Var {
    Var::mk_float(f)
}

pub fn v_str(s: &str) -> Var {
    Var::mk_str(s)
}

pub fn v_string(s: String) -> Var {
    Var::mk_string(s)
}

pub fn v_datetime(dt: DateTime<Utc>) -> Var {
    Var::mk_datetime(dt)
}

pub fn v_obj(o: ObjId) -> Var {
    Var::mk_object(o)
}

pub fn v_list(values: Vec<Var>) -> Var {
    Var::mk_list(values)
}

pub fn v_map(pairs: BTreeMap<String, Var>) -> Var {
    Var::mk_map(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ObjId;

    #[test]
    fn test_accessors() {
        assert_eq!(v_int(42).as_integer(), Some(42));
        assert_eq!(v_int(42).as_str(), None);
        assert_eq!(v_str("hp").as_str(), Some("hp"));
        let o = ObjId::mk("o1");
        assert_eq!(v_obj(o.clone()).as_object(), Some(&o));
        assert!(v_none().is_none());
    }

    #[test]
    fn test_truthiness() {
        assert!(!v_none().is_true());
        assert!(!v_int(0).is_true());
        assert!(v_int(1).is_true());
        assert!(!v_str("").is_true());
        assert!(v_str("x").is_true());
        assert!(!v_list(vec![]).is_true());
    }

    #[test]
    fn test_json_round_trip() {
        let v = v_list(vec![v_int(1), v_str("two"), v_obj(ObjId::mk("o1"))]);
        let encoded = serde_json::to_string(&v).unwrap();
        let decoded: Var = serde_json::from_str(&encoded).unwrap();
        assert_eq!(v, decoded);
    }
}
