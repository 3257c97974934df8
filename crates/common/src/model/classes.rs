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

use crate::model::objects::ObjKind;
use crate::model::permissions::AccessorFlag;
use crate::util::BitEnum;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use loam_var::{ClassId, Symbol, Var};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A class definition: the template objects are instantiated from, and one
/// link in the single-inheritance chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectClass {
    id: ClassId,
    name: String,
    parent: Option<ClassId>,
    #[serde(default)]
    kind: ObjKind,
    #[serde(default)]
    description: String,
    #[serde(default)]
    is_abstract: bool,
    /// Class-level property defaults, in definition order.
    #[serde(default)]
    properties: IndexMap<Symbol, Var>,
    #[serde(default)]
    accessors: HashMap<Symbol, BitEnum<AccessorFlag>>,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl ObjectClass {
    pub fn new(name: &str, parent: Option<ClassId>, description: &str) -> Self {
        let now = Utc::now();
        Self {
            id: ClassId::new(),
            name: name.to_string(),
            parent,
            kind: ObjKind::Generic,
            description: description.to_string(),
            is_abstract: false,
            properties: IndexMap::new(),
            accessors: HashMap::new(),
            created_at: now,
            modified_at: now,
        }
    }

    pub fn id(&self) -> &ClassId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&ClassId> {
        self.parent.as_ref()
    }

    pub fn set_parent(&mut self, parent: Option<ClassId>) {
        self.parent = parent;
        self.touch();
    }

    pub fn kind(&self) -> ObjKind {
        self.kind
    }

    pub fn with_kind(mut self, kind: ObjKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
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

    // --- class-level property defaults ---

    pub fn get_default(&self, name: &str) -> Option<&Var> {
        self.properties.get(&Symbol::mk(name))
    }

    pub fn set_default(&mut self, name: &str, value: Var) {
        self.properties.insert(Symbol::mk(name), value);
        self.touch();
    }

    pub fn remove_default(&mut self, name: &str) -> Option<Var> {
        let removed = self.properties.shift_remove(&Symbol::mk(name));
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    pub fn defaults(&self) -> impl Iterator<Item = (&Symbol, &Var)> {
        self.properties.iter()
    }

    // --- class-level accessor flags ---

    pub fn accessors_for(&self, name: &str) -> Option<BitEnum<AccessorFlag>> {
        self.accessors.get(&Symbol::mk(name)).copied()
    }

    pub fn set_accessors(&mut self, name: &str, flags: BitEnum<AccessorFlag>) {
        self.accessors.insert(Symbol::mk(name), flags);
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_var::v_int;

    #[test]
    fn test_defaults_keep_definition_order() {
        let mut c = ObjectClass::new("creature", None, "a living thing");
        c.set_default("hp", v_int(10));
        c.set_default("mana", v_int(5));
        c.set_default("armor", v_int(0));
        let names: Vec<_> = c.defaults().map(|(n, _)| n.as_str().to_string()).collect();
        assert_eq!(names, vec!["hp", "mana", "armor"]);
    }

    #[test]
    fn test_default_lookup_case_insensitive() {
        let mut c = ObjectClass::new("creature", None, "");
        c.set_default("HP", v_int(10));
        assert_eq!(c.get_default("hp"), Some(&v_int(10)));
    }

    #[test]
    fn test_kind_builder() {
        let c = ObjectClass::new("Exit", None, "a way out").with_kind(ObjKind::Exit);
        assert_eq!(c.kind(), ObjKind::Exit);
        assert_eq!(ObjectClass::new("x", None, "").kind(), ObjKind::Generic);
    }
}
