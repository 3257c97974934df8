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

use crate::model::permissions::{AccessorFlag, CapabilityFlag};
use crate::util::BitEnum;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use loam_var::{ClassId, FromVar, IntoVar, ObjId, Symbol, Var};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumString};

// Well-known property-bag keys with typed accessors layered over them.
pub const PROP_NAME: &str = "name";
pub const PROP_ALIASES: &str = "aliases";
pub const PROP_DBREF: &str = "dbref";
pub const PROP_LOCATION: &str = "location";
pub const PROP_OWNER: &str = "owner";
pub const PROP_CONTENTS: &str = "contents";
pub const PROP_CREATED_AT: &str = "created_at";
pub const PROP_MODIFIED_AT: &str = "modified_at";
pub const PROP_PERMISSIONS: &str = "permissions";

/// Attributes that are read-only from the outside no matter what accessor
/// flags say. Mutation goes through dedicated store operations only.
pub const BUILTIN_ATTRIBUTES: &[&str] = &["id", PROP_NAME, PROP_DBREF, "class_id", PROP_CREATED_AT];

/// The closed set of instance shapes an object can take, selected by the
/// declared kind of its class chain. Anything unrecognized is `Generic`.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    StrumDisplay,
    EnumString,
)]
pub enum ObjKind {
    Room,
    Player,
    Item,
    Container,
    Exit,
    #[default]
    Generic,
}

/// A live in-world object: a dynamic property bag plus identity fields.
///
/// The bag is the single source of truth; the typed accessors below are views
/// over well-known keys, so the whole object round-trips through the document
/// store as one map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameObject {
    id: ObjId,
    class_id: ClassId,
    #[serde(default)]
    kind: ObjKind,
    #[serde(rename = "_isNullObject", default)]
    is_ghost: bool,
    #[serde(default)]
    properties: IndexMap<Symbol, Var>,
    #[serde(default)]
    accessors: HashMap<Symbol, BitEnum<AccessorFlag>>,
}

impl GameObject {
    pub fn new(id: ObjId, class_id: ClassId, kind: ObjKind) -> Self {
        let mut obj = Self {
            id,
            class_id,
            kind,
            is_ghost: false,
            properties: IndexMap::new(),
            accessors: HashMap::new(),
        };
        let now = Utc::now();
        obj.set_typed(PROP_CREATED_AT, now);
        obj.set_typed(PROP_MODIFIED_AT, now);
        obj
    }

    pub fn id(&self) -> &ObjId {
        &self.id
    }

    pub fn class_id(&self) -> &ClassId {
        &self.class_id
    }

    pub fn kind(&self) -> ObjKind {
        self.kind
    }

    pub fn is_ghost(&self) -> bool {
        self.is_ghost
    }

    /// Reduce this object to a dangling-reference marker. The id survives;
    /// the bag does not.
    pub fn demote_to_ghost(&mut self) {
        self.is_ghost = true;
        self.properties.clear();
        self.accessors.clear();
    }

    // --- raw bag access ---

    pub fn get(&self, name: &str) -> Option<&Var> {
        self.properties.get(&Symbol::mk(name))
    }

    pub fn set(&mut self, name: &str, value: Var) {
        self.properties.insert(Symbol::mk(name), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Var> {
        self.properties.shift_remove(&Symbol::mk(name))
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(&Symbol::mk(name))
    }

    pub fn property_names(&self) -> impl Iterator<Item = &Symbol> {
        self.properties.keys()
    }

    pub fn get_typed<T: FromVar>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(T::from_var)
    }

    pub fn set_typed<T: IntoVar>(&mut self, name: &str, value: T) {
        self.set(name, value.into_var());
    }

    // --- per-instance accessor flags ---

    pub fn accessors_for(&self, name: &str) -> Option<BitEnum<AccessorFlag>> {
        self.accessors.get(&Symbol::mk(name)).copied()
    }

    pub fn set_accessors(&mut self, name: &str, flags: BitEnum<AccessorFlag>) {
        self.accessors.insert(Symbol::mk(name), flags);
    }

    pub fn clear_accessors(&mut self, name: &str) {
        self.accessors.remove(&Symbol::mk(name));
    }

    // --- typed views over well-known keys ---

    pub fn name(&self) -> Option<String> {
        self.get_typed(PROP_NAME)
    }

    pub fn set_name(&mut self, name: &str) {
        self.set_typed(PROP_NAME, name.to_string());
    }

    pub fn aliases(&self) -> Vec<String> {
        self.get_typed(PROP_ALIASES).unwrap_or_default()
    }

    pub fn set_aliases(&mut self, aliases: Vec<String>) {
        self.set_typed(PROP_ALIASES, aliases);
    }

    pub fn dbref(&self) -> Option<i64> {
        self.get_typed(PROP_DBREF)
    }

    pub fn set_dbref(&mut self, dbref: i64) {
        self.set_typed(PROP_DBREF, dbref);
    }

    pub fn location(&self) -> Option<ObjId> {
        self.get_typed(PROP_LOCATION)
    }

    pub fn set_location(&mut self, location: Option<ObjId>) {
        match location {
            Some(loc) => self.set_typed(PROP_LOCATION, loc),
            None => {
                self.remove(PROP_LOCATION);
            }
        }
    }

    pub fn owner(&self) -> Option<ObjId> {
        self.get_typed(PROP_OWNER)
    }

    pub fn set_owner(&mut self, owner: Option<ObjId>) {
        match owner {
            Some(o) => self.set_typed(PROP_OWNER, o),
            None => {
                self.remove(PROP_OWNER);
            }
        }
    }

    pub fn contents(&self) -> Vec<ObjId> {
        self.get_typed(PROP_CONTENTS).unwrap_or_default()
    }

    pub fn set_contents(&mut self, contents: Vec<ObjId>) {
        self.set_typed(PROP_CONTENTS, contents);
    }

    pub fn add_content(&mut self, id: ObjId) {
        let mut contents = self.contents();
        if !contents.contains(&id) {
            contents.push(id);
            self.set_contents(contents);
        }
    }

    pub fn remove_content(&mut self, id: &ObjId) {
        let mut contents = self.contents();
        contents.retain(|c| c != id);
        self.set_contents(contents);
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.get_typed(PROP_CREATED_AT)
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.get_typed(PROP_MODIFIED_AT)
    }

    pub fn touch(&mut self) {
        self.set_typed(PROP_MODIFIED_AT, Utc::now());
    }

    /// Capability flags, persisted as a list of flag names.
    pub fn capabilities(&self) -> BitEnum<CapabilityFlag> {
        let names: Vec<String> = self.get_typed(PROP_PERMISSIONS).unwrap_or_default();
        names
            .iter()
            .filter_map(|n| CapabilityFlag::from_str(n).ok())
            .collect()
    }

    pub fn set_capabilities(&mut self, caps: BitEnum<CapabilityFlag>) {
        let names: Vec<String> = [
            CapabilityFlag::Admin,
            CapabilityFlag::Programmer,
            CapabilityFlag::Moderator,
        ]
        .into_iter()
        .filter(|f| caps.contains(*f))
        .map(|f| f.to_string())
        .collect();
        self.set_typed(PROP_PERMISSIONS, names);
    }
}

/// Is this attribute one of the always-read-only built-ins?
pub fn is_builtin_attribute(name: &str) -> bool {
    BUILTIN_ATTRIBUTES
        .iter()
        .any(|b| b.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_var::v_int;

    fn obj() -> GameObject {
        GameObject::new(ObjId::mk("o1"), ClassId::mk("thing"), ObjKind::Item)
    }

    #[test]
    fn test_bag_is_case_insensitive() {
        let mut o = obj();
        o.set("HitPoints", v_int(10));
        assert_eq!(o.get("hitpoints"), Some(&v_int(10)));
        assert!(o.has_property("HITPOINTS"));
        o.remove("hitPoints");
        assert!(!o.has_property("HitPoints"));
    }

    #[test]
    fn test_typed_accessors_are_bag_views() {
        let mut o = obj();
        o.set_name("lantern");
        assert_eq!(o.name(), Some("lantern".to_string()));
        // The typed accessor and raw bag see the same key.
        assert_eq!(o.get(PROP_NAME).and_then(|v| v.as_str()), Some("lantern"));

        o.set_location(Some(ObjId::mk("room1")));
        assert_eq!(o.location(), Some(ObjId::mk("room1")));
        o.set_location(None);
        assert_eq!(o.location(), None);
        assert!(!o.has_property(PROP_LOCATION));
    }

    #[test]
    fn test_contents_dedupe() {
        let mut o = obj();
        o.add_content(ObjId::mk("a"));
        o.add_content(ObjId::mk("a"));
        o.add_content(ObjId::mk("b"));
        assert_eq!(o.contents(), vec![ObjId::mk("a"), ObjId::mk("b")]);
        o.remove_content(&ObjId::mk("a"));
        assert_eq!(o.contents(), vec![ObjId::mk("b")]);
    }

    #[test]
    fn test_capabilities_round_trip() {
        let mut o = obj();
        let caps = BitEnum::new_with(CapabilityFlag::Admin) | CapabilityFlag::Moderator;
        o.set_capabilities(caps);
        assert_eq!(o.capabilities(), caps);
        // Stored as names, so it survives serialization as plain strings.
        let names: Vec<String> = o.get_typed(PROP_PERMISSIONS).unwrap();
        assert_eq!(names, vec!["Admin".to_string(), "Moderator".to_string()]);
    }

    #[test]
    fn test_ghost_demotion_clears_bag() {
        let mut o = obj();
        o.set_name("doomed");
        o.demote_to_ghost();
        assert!(o.is_ghost());
        assert_eq!(o.name(), None);
        assert_eq!(o.id(), &ObjId::mk("o1"));
    }

    #[test]
    fn test_builtin_attribute_names() {
        assert!(is_builtin_attribute("DbRef"));
        assert!(is_builtin_attribute("id"));
        assert!(!is_builtin_attribute("location"));
    }

    #[test]
    fn test_json_round_trip() {
        let mut o = obj();
        o.set_name("lantern");
        o.set_accessors(
            "fuel",
            BitEnum::new_with(AccessorFlag::Private) | AccessorFlag::Hidden,
        );
        let encoded = serde_json::to_string(&o).unwrap();
        let decoded: GameObject = serde_json::from_str(&encoded).unwrap();
        assert_eq!(o, decoded);
        assert!(encoded.contains("\"_isNullObject\":false"));
    }
}
