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

//! String-keyed entity identifiers.
//!
//! Every persisted entity is addressed by a string id that is stable for the
//! entity's lifetime. Freshly created entities get a v4 UUID; a handful of
//! well-known ids (the system object) are reserved.

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use uuid::Uuid;

/// The reserved id of the singleton "system" object, holder of global verbs.
pub const SYSTEM_OBJECT: ObjId = ObjId(arcstr::literal!("system"));

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(ArcStr);

        impl $name {
            /// Mint a fresh unique id.
            pub fn new() -> Self {
                $name(ArcStr::from(Uuid::new_v4().to_string()))
            }

            pub fn mk(s: &str) -> Self {
                $name(ArcStr::from(s))
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.as_str())
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name::mk(value)
            }
        }
    };
}

string_id!(ObjId);
string_id!(ClassId);
string_id!(VerbId);
