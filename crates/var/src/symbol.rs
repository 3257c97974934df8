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

//! Case-preserving, case-insensitively comparing names.
//!
//! Property names, verb names and accessor keys in the world model are all
//! compared without regard to case, but we keep the original spelling around
//! for display and persistence.

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use unicase::UniCase;

#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(ArcStr);

impl Symbol {
    pub fn mk(s: &str) -> Self {
        Symbol(ArcStr::from(s))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_arc_str(&self) -> &ArcStr {
        &self.0
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        UniCase::new(self.as_str()) == UniCase::new(other.as_str())
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        UniCase::new(self.as_str()).hash(state);
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        UniCase::new(self.as_str()).cmp(&UniCase::new(other.as_str()))
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Debug for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({})", self.as_str())
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Symbol::mk(value)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Symbol(ArcStr::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::Symbol;
    use std::collections::HashMap;

    #[test]
    fn test_case_insensitive_eq() {
        assert_eq!(Symbol::mk("Name"), Symbol::mk("name"));
        assert_eq!(Symbol::mk("LOOK"), Symbol::mk("look"));
        assert_ne!(Symbol::mk("look"), Symbol::mk("book"));
    }

    #[test]
    fn test_preserves_original_case() {
        let s = Symbol::mk("DbRef");
        assert_eq!(s.as_str(), "DbRef");
        assert_eq!(format!("{s}"), "DbRef");
    }

    #[test]
    fn test_hash_agrees_with_eq() {
        let mut m = HashMap::new();
        m.insert(Symbol::mk("Secret"), 1);
        assert_eq!(m.get(&Symbol::mk("secret")), Some(&1));
        assert_eq!(m.get(&Symbol::mk("SECRET")), Some(&1));
        assert_eq!(m.get(&Symbol::mk("other")), None);
    }
}
