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

use crate::matching::{PatternCompileError, VerbPattern};
use chrono::{DateTime, Utc};
use loam_var::{ClassId, ObjId, Symbol, VerbId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// What a verb is attached to: an object instance or a class definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerbOwner {
    Object(ObjId),
    Class(ClassId),
}

impl Display for VerbOwner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VerbOwner::Object(o) => write!(f, "object {o}"),
            VerbOwner::Class(c) => write!(f, "class {c}"),
        }
    }
}

/// A named, pattern-matchable command handler. The code reference is opaque
/// to this core; only the external executor interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verb {
    id: VerbId,
    owner: VerbOwner,
    name: Symbol,
    /// Space-separated alternate names.
    #[serde(default)]
    aliases: String,
    /// Empty means legacy positional matching; otherwise a `{name}` template.
    #[serde(default)]
    pattern: String,
    code: String,
    #[serde(default)]
    permissions: Vec<String>,
    created_by: ObjId,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl Verb {
    pub fn new(owner: VerbOwner, name: &str, pattern: &str, code: &str, created_by: ObjId) -> Self {
        let now = Utc::now();
        Self {
            id: VerbId::new(),
            owner,
            name: Symbol::mk(name),
            aliases: String::new(),
            pattern: pattern.to_string(),
            code: code.to_string(),
            permissions: vec![],
            created_by,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn id(&self) -> &VerbId {
        &self.id
    }

    pub fn owner(&self) -> &VerbOwner {
        &self.owner
    }

    pub fn set_owner(&mut self, owner: VerbOwner) {
        self.owner = owner;
        self.touch();
    }

    pub fn name(&self) -> &Symbol {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = Symbol::mk(name);
        self.touch();
    }

    pub fn aliases(&self) -> &str {
        &self.aliases
    }

    pub fn set_aliases(&mut self, aliases: &str) {
        self.aliases = aliases.to_string();
        self.touch();
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn set_pattern(&mut self, pattern: &str) {
        self.pattern = pattern.to_string();
        self.touch();
    }

    /// Compile the pattern source. Cheap enough to do per match attempt;
    /// registration has already validated it.
    pub fn compiled_pattern(&self) -> Result<VerbPattern, PatternCompileError> {
        VerbPattern::compile(&self.pattern)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn set_code(&mut self, code: &str) {
        self.code = code.to_string();
        self.touch();
    }

    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    pub fn set_permissions(&mut self, permissions: Vec<String>) {
        self.permissions = permissions;
        self.touch();
    }

    pub fn created_by(&self) -> &ObjId {
        &self.created_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }

    /// The primary name plus every alias.
    pub fn names(&self) -> Vec<Symbol> {
        let mut names = vec![self.name.clone()];
        names.extend(self.aliases.split_whitespace().map(Symbol::mk));
        names
    }

    /// Is `word` this verb's name or one of its aliases (case-insensitive)?
    pub fn matches_name(&self, word: &str) -> bool {
        let word = Symbol::mk(word);
        self.names().iter().any(|n| *n == word)
    }
}

/// A partial update to a verb; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct VerbUpdate {
    pub name: Option<String>,
    pub aliases: Option<String>,
    pub pattern: Option<String>,
    pub code: Option<String>,
    pub permissions: Option<Vec<String>>,
}

impl Verb {
    pub fn apply_update(&mut self, update: VerbUpdate) {
        if let Some(name) = update.name {
            self.name = Symbol::mk(&name);
        }
        if let Some(aliases) = update.aliases {
            self.aliases = aliases;
        }
        if let Some(pattern) = update.pattern {
            self.pattern = pattern;
        }
        if let Some(code) = update.code {
            self.code = code;
        }
        if let Some(permissions) = update.permissions {
            self.permissions = permissions;
        }
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_name_and_aliases() {
        let mut v = Verb::new(
            VerbOwner::Object(ObjId::mk("o1")),
            "look",
            "",
            "code-ref",
            ObjId::mk("creator"),
        );
        v.set_aliases("l examine");
        assert!(v.matches_name("look"));
        assert!(v.matches_name("LOOK"));
        assert!(v.matches_name("l"));
        assert!(v.matches_name("Examine"));
        assert!(!v.matches_name("loo"));
    }

    #[test]
    fn test_update_bumps_modified() {
        let mut v = Verb::new(
            VerbOwner::Object(ObjId::mk("o1")),
            "get",
            "",
            "code-ref",
            ObjId::mk("creator"),
        );
        let before = v.modified_at();
        v.apply_update(VerbUpdate {
            code: Some("new-code-ref".to_string()),
            ..Default::default()
        });
        assert_eq!(v.code(), "new-code-ref");
        assert!(v.modified_at() >= before);
        assert_eq!(v.name(), &Symbol::mk("get"));
    }
}
