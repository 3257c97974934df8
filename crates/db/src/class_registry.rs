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

use crate::CacheMap;
use crate::store::{OBJECT_CLASSES, PersistentStore, from_doc, to_doc};
use loam_common::model::{ObjectClass, WorldError};
use loam_var::ClassId;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// The class taxonomy: every class definition, cached in memory and written
/// through to the `objectclasses` collection. Classes form a
/// single-inheritance forest; cycles are rejected on reparenting, and chain
/// walks carry a visited set so a corrupted store cannot hang them.
pub struct ClassRegistry {
    store: Arc<dyn PersistentStore>,
    cache: CacheMap<ClassId, ObjectClass>,
}

impl ClassRegistry {
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self {
            store,
            cache: Default::default(),
        }
    }

    /// Populate the cache from the store. Called once at boot.
    pub fn load_all(&self) -> Result<usize, WorldError> {
        let docs = self.store.find_all(OBJECT_CLASSES)?;
        let count = docs.len();
        let cache = self.cache.pin();
        for doc in docs {
            let class: ObjectClass = from_doc(doc)?;
            cache.insert(class.id().clone(), class);
        }
        info!("loaded {count} object classes");
        Ok(count)
    }

    /// Register a fully-built class definition. Fails on a duplicate name or
    /// a missing parent.
    pub fn add_class(&self, class: ObjectClass) -> Result<ObjectClass, WorldError> {
        if self.find_class_by_name(class.name())?.is_some() {
            return Err(WorldError::Conflict(format!(
                "a class named '{}' already exists",
                class.name()
            )));
        }
        if let Some(parent) = class.parent()
            && self.get_class(parent)?.is_none()
        {
            // A bad parent reference is a validation failure of the new
            // definition, not a lookup miss.
            return Err(WorldError::Validation(format!(
                "parent class '{parent}' does not exist"
            )));
        }
        self.store.insert(OBJECT_CLASSES, to_doc(&class)?)?;
        self.cache.pin().insert(class.id().clone(), class.clone());
        info!(class = %class.id(), name = class.name(), "created class");
        Ok(class)
    }

    /// Convenience: build and register a plain (non-abstract, generic) class.
    pub fn create_class(
        &self,
        name: &str,
        parent: Option<&ClassId>,
        description: &str,
    ) -> Result<ObjectClass, WorldError> {
        self.add_class(ObjectClass::new(name, parent.cloned(), description))
    }

    pub fn get_class(&self, id: &ClassId) -> Result<Option<ObjectClass>, WorldError> {
        if let Some(class) = self.cache.pin().get(id) {
            return Ok(Some(class.clone()));
        }
        let Some(doc) = self.store.find_by_id(OBJECT_CLASSES, id.as_str())? else {
            return Ok(None);
        };
        let class: ObjectClass = from_doc(doc)?;
        self.cache.pin().insert(class.id().clone(), class.clone());
        Ok(Some(class))
    }

    /// Case-insensitive lookup by class name.
    pub fn find_class_by_name(&self, name: &str) -> Result<Option<ObjectClass>, WorldError> {
        let cache = self.cache.pin();
        Ok(cache
            .iter()
            .find(|(_, c)| c.name().eq_ignore_ascii_case(name))
            .map(|(_, c)| c.clone()))
    }

    pub fn all_classes(&self) -> Vec<ObjectClass> {
        let cache = self.cache.pin();
        let mut classes: Vec<_> = cache.iter().map(|(_, c)| c.clone()).collect();
        classes.sort_by(|a, b| a.name().cmp(b.name()));
        classes
    }

    /// Write a mutated class definition back through to the store.
    pub fn save_class(&self, class: &ObjectClass) -> Result<(), WorldError> {
        if !self.store.update(OBJECT_CLASSES, to_doc(class)?)? {
            return Err(WorldError::ClassNotFound(class.id().clone()));
        }
        self.cache.pin().insert(class.id().clone(), class.clone());
        Ok(())
    }

    /// Reparent a class, rejecting any edge that would close a cycle.
    pub fn change_parent(
        &self,
        class_id: &ClassId,
        new_parent: Option<&ClassId>,
    ) -> Result<(), WorldError> {
        let Some(mut class) = self.get_class(class_id)? else {
            return Err(WorldError::ClassNotFound(class_id.clone()));
        };
        if let Some(parent) = new_parent {
            if self
                .inheritance_chain(parent)?
                .iter()
                .any(|c| c.id() == class_id)
            {
                return Err(WorldError::Validation(format!(
                    "reparenting class '{}' under '{parent}' would create an inheritance cycle",
                    class.name()
                )));
            }
        }
        class.set_parent(new_parent.cloned());
        self.save_class(&class)
    }

    /// The chain from the named class up to its root, the class itself first.
    pub fn inheritance_chain(&self, id: &ClassId) -> Result<Vec<ObjectClass>, WorldError> {
        let Some(class) = self.get_class(id)? else {
            return Err(WorldError::ClassNotFound(id.clone()));
        };
        let mut chain = vec![class];
        let mut visited: HashSet<ClassId> = HashSet::from([id.clone()]);
        loop {
            let Some(parent_id) = chain.last().and_then(|c| c.parent()).cloned() else {
                return Ok(chain);
            };
            if !visited.insert(parent_id.clone()) {
                return Err(WorldError::Validation(format!(
                    "inheritance cycle detected at class '{parent_id}'"
                )));
            }
            let Some(parent) = self.get_class(&parent_id)? else {
                return Err(WorldError::ClassNotFound(parent_id));
            };
            chain.push(parent);
        }
    }

    /// Is `child` the same class as `ancestor`, or below it in the chain?
    pub fn inherits_from(&self, child: &ClassId, ancestor: &ClassId) -> Result<bool, WorldError> {
        Ok(self
            .inheritance_chain(child)?
            .iter()
            .any(|c| c.id() == ancestor))
    }

    /// Classes whose parent is `parent`; with `recursive`, the whole subtree.
    pub fn subclasses(
        &self,
        parent: &ClassId,
        recursive: bool,
    ) -> Result<Vec<ObjectClass>, WorldError> {
        let candidates = self.all_classes();
        let mut out = Vec::new();
        for class in candidates {
            if class.id() == parent {
                continue;
            }
            let related = if recursive {
                self.inherits_from(class.id(), parent)?
            } else {
                class.parent() == Some(parent)
            };
            if related {
                out.push(class);
            }
        }
        Ok(out)
    }

    /// Delete a class. A class with subclasses is only deleted when
    /// `delete_subclasses` is set, in which case the whole subtree goes.
    pub fn delete_class(&self, id: &ClassId, delete_subclasses: bool) -> Result<(), WorldError> {
        let Some(class) = self.get_class(id)? else {
            return Err(WorldError::ClassNotFound(id.clone()));
        };
        let children = self.subclasses(id, false)?;
        if !children.is_empty() && !delete_subclasses {
            return Err(WorldError::Conflict(format!(
                "class '{}' has {} subclasses",
                class.name(),
                children.len()
            )));
        }
        for child in children {
            self.delete_class(child.id(), true)?;
        }
        self.store.delete(OBJECT_CLASSES, id.as_str())?;
        self.cache.pin().remove(id);
        info!(class = %id, name = class.name(), "deleted class");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transient::TransientStore;
    use loam_common::model::ObjKind;
    use loam_var::v_int;
    use pretty_assertions::assert_eq;

    fn registry() -> ClassRegistry {
        ClassRegistry::new(Arc::new(TransientStore::new()))
    }

    #[test]
    fn test_create_and_lookup() {
        let reg = registry();
        let root = reg.create_class("Thing", None, "the root of all things").unwrap();
        let sub = reg
            .create_class("Weapon", Some(root.id()), "something that hurts")
            .unwrap();

        assert_eq!(reg.get_class(sub.id()).unwrap().unwrap().name(), "Weapon");
        assert_eq!(
            reg.find_class_by_name("weapon").unwrap().unwrap().id(),
            sub.id()
        );
        assert!(reg.get_class(&ClassId::mk("nope")).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_name_conflicts() {
        let reg = registry();
        reg.create_class("Thing", None, "").unwrap();
        let err = reg.create_class("THING", None, "").unwrap_err();
        assert!(matches!(err, WorldError::Conflict(_)));
    }

    #[test]
    fn test_missing_parent_rejected() {
        let reg = registry();
        let err = reg
            .create_class("Orphan", Some(&ClassId::mk("ghost-class")), "")
            .unwrap_err();
        assert!(matches!(err, WorldError::Validation(_)));
    }

    #[test]
    fn test_chain_is_self_first() {
        let reg = registry();
        let a = reg.create_class("A", None, "").unwrap();
        let b = reg.create_class("B", Some(a.id()), "").unwrap();
        let c = reg.create_class("C", Some(b.id()), "").unwrap();

        let chain = reg.inheritance_chain(c.id()).unwrap();
        let names: Vec<_> = chain.iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["C", "B", "A"]);

        assert!(reg.inherits_from(c.id(), a.id()).unwrap());
        assert!(reg.inherits_from(c.id(), c.id()).unwrap());
        assert!(!reg.inherits_from(a.id(), c.id()).unwrap());
    }

    #[test]
    fn test_reparent_cycle_rejected() {
        let reg = registry();
        let a = reg.create_class("A", None, "").unwrap();
        let b = reg.create_class("B", Some(a.id()), "").unwrap();

        let err = reg.change_parent(a.id(), Some(b.id())).unwrap_err();
        assert!(matches!(err, WorldError::Validation(_)));
        // Self-parenting is a one-edge cycle.
        let err = reg.change_parent(a.id(), Some(a.id())).unwrap_err();
        assert!(matches!(err, WorldError::Validation(_)));
    }

    #[test]
    fn test_chain_walk_survives_corrupted_store() {
        // A cycle written behind the registry's back must error, not hang.
        let store = Arc::new(TransientStore::new());
        let reg = ClassRegistry::new(store.clone());
        let a = reg.create_class("A", None, "").unwrap();
        let b = reg.create_class("B", Some(a.id()), "").unwrap();

        let mut corrupted = a.clone();
        corrupted.set_parent(Some(b.id().clone()));
        store
            .update(OBJECT_CLASSES, to_doc(&corrupted).unwrap())
            .unwrap();
        let fresh = ClassRegistry::new(store);
        fresh.load_all().unwrap();

        let err = fresh.inheritance_chain(b.id()).unwrap_err();
        assert!(matches!(err, WorldError::Validation(_)));
    }

    #[test]
    fn test_subclasses_direct_and_recursive() {
        let reg = registry();
        let a = reg.create_class("A", None, "").unwrap();
        let b = reg.create_class("B", Some(a.id()), "").unwrap();
        let _c = reg.create_class("C", Some(b.id()), "").unwrap();

        let direct = reg.subclasses(a.id(), false).unwrap();
        assert_eq!(direct.len(), 1);
        assert_eq!(direct[0].name(), "B");

        let all = reg.subclasses(a.id(), true).unwrap();
        let names: Vec<_> = all.iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["B", "C"]);
    }

    #[test]
    fn test_delete_class_guards_subclasses() {
        let reg = registry();
        let a = reg.create_class("A", None, "").unwrap();
        let b = reg.create_class("B", Some(a.id()), "").unwrap();

        let err = reg.delete_class(a.id(), false).unwrap_err();
        assert!(matches!(err, WorldError::Conflict(_)));

        reg.delete_class(a.id(), true).unwrap();
        assert!(reg.get_class(a.id()).unwrap().is_none());
        assert!(reg.get_class(b.id()).unwrap().is_none());
    }

    #[test]
    fn test_save_class_writes_defaults_through() {
        let store = Arc::new(TransientStore::new());
        let reg = ClassRegistry::new(store.clone());
        let mut a = reg
            .add_class(ObjectClass::new("Creature", None, "").with_kind(ObjKind::Item))
            .unwrap();
        a.set_default("hp", v_int(10));
        reg.save_class(&a).unwrap();

        let fresh = ClassRegistry::new(store);
        fresh.load_all().unwrap();
        let loaded = fresh.get_class(a.id()).unwrap().unwrap();
        assert_eq!(loaded.get_default("hp"), Some(&v_int(10)));
        assert_eq!(loaded.kind(), ObjKind::Item);
    }
}
