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

use crate::class_registry::ClassRegistry;
use crate::object_store::ObjectStore;
use loam_common::model::{
    Access, AccessorFlag, Caller, CapabilityFlag, GameObject, WorldError, check_property_access,
    is_builtin_attribute,
};
use loam_common::util::BitEnum;
use loam_var::{FromVar, IntoVar, ObjId, Symbol, Var};
use std::sync::Arc;

/// Permission-gated property access over the inheritance chain.
///
/// Reads fall back from the instance bag to class defaults, nearest class
/// first. Writes always land on the instance, shadowing the default. Every
/// access runs through the accessor-flag gate first; the effective flags for
/// a property come from the instance, else the nearest class that declares
/// them, else `{Public}`.
pub struct PropertyResolver {
    objects: Arc<ObjectStore>,
    classes: Arc<ClassRegistry>,
}

impl PropertyResolver {
    pub fn new(objects: Arc<ObjectStore>, classes: Arc<ClassRegistry>) -> Self {
        Self { objects, classes }
    }

    /// The accessor flags governing `name` on `obj`.
    pub fn effective_accessors(
        &self,
        obj: &GameObject,
        name: &str,
    ) -> Result<BitEnum<AccessorFlag>, WorldError> {
        if let Some(flags) = obj.accessors_for(name) {
            return Ok(flags);
        }
        for class in self.classes.inheritance_chain(obj.class_id())? {
            if let Some(flags) = class.accessors_for(name) {
                return Ok(flags);
            }
        }
        Ok(BitEnum::new_with(AccessorFlag::Public))
    }

    /// Read a property. `None` when the property is defined nowhere on the
    /// chain, or the object is a ghost. Permission failures are errors, not
    /// absences.
    pub fn get_property(
        &self,
        caller: Option<&Caller>,
        obj_id: &ObjId,
        name: &str,
    ) -> Result<Option<Var>, WorldError> {
        let Some(obj) = self.objects.get_object(obj_id)? else {
            return Err(WorldError::ObjectNotFound(obj_id.clone()));
        };
        if obj.is_ghost() {
            return Ok(None);
        }
        let flags = self.effective_accessors(&obj, name)?;
        check_property_access(caller, &obj, name, flags, Access::Read)?;

        if let Some(value) = obj.get(name) {
            return Ok(Some(value.clone()));
        }
        for class in self.classes.inheritance_chain(obj.class_id())? {
            if let Some(value) = class.get_default(name) {
                return Ok(Some(value.clone()));
            }
        }
        Ok(None)
    }

    /// Write a property onto the instance, shadowing any class default.
    /// Built-in attributes never go through here.
    pub fn set_property(
        &self,
        caller: Option<&Caller>,
        obj_id: &ObjId,
        name: &str,
        value: Var,
    ) -> Result<(), WorldError> {
        if is_builtin_attribute(name) {
            return Err(WorldError::PropertyPermissionDenied {
                rule: "BuiltIn",
                access: Access::Write,
                property: name.to_string(),
            });
        }
        let lock = self.objects.object_lock(obj_id);
        let _guard = lock.lock().unwrap();

        let Some(mut obj) = self.objects.get_object(obj_id)? else {
            return Err(WorldError::ObjectNotFound(obj_id.clone()));
        };
        if obj.is_ghost() {
            return Err(WorldError::GhostObject(obj_id.clone()));
        }
        let flags = self.effective_accessors(&obj, name)?;
        check_property_access(caller, &obj, name, flags, Access::Write)?;

        obj.set(name, value);
        obj.touch();
        self.objects.persist_object(&obj)
    }

    /// Remove the instance-level value, unshadowing any class default.
    /// Returns whether an instance value was actually removed.
    pub fn remove_property(
        &self,
        caller: Option<&Caller>,
        obj_id: &ObjId,
        name: &str,
    ) -> Result<bool, WorldError> {
        if is_builtin_attribute(name) {
            return Err(WorldError::PropertyPermissionDenied {
                rule: "BuiltIn",
                access: Access::Write,
                property: name.to_string(),
            });
        }
        let lock = self.objects.object_lock(obj_id);
        let _guard = lock.lock().unwrap();

        let Some(mut obj) = self.objects.get_object(obj_id)? else {
            return Err(WorldError::ObjectNotFound(obj_id.clone()));
        };
        if obj.is_ghost() {
            return Err(WorldError::GhostObject(obj_id.clone()));
        }
        let flags = self.effective_accessors(&obj, name)?;
        check_property_access(caller, &obj, name, flags, Access::Write)?;

        let removed = obj.remove(name).is_some();
        if removed {
            obj.touch();
            self.objects.persist_object(&obj)?;
        }
        Ok(removed)
    }

    /// Typed read with a fallback for absent or mistyped values. Permission
    /// failures still propagate.
    pub fn get_property_typed<T: FromVar>(
        &self,
        caller: Option<&Caller>,
        obj_id: &ObjId,
        name: &str,
        default: T,
    ) -> Result<T, WorldError> {
        Ok(self
            .get_property(caller, obj_id, name)?
            .and_then(|v| T::from_var(&v))
            .unwrap_or(default))
    }

    pub fn set_property_typed<T: IntoVar>(
        &self,
        caller: Option<&Caller>,
        obj_id: &ObjId,
        name: &str,
        value: T,
    ) -> Result<(), WorldError> {
        self.set_property(caller, obj_id, name, value.into_var())
    }

    /// The property names visible to `caller` on an object: instance values
    /// first, then inherited defaults, deduplicated case-insensitively.
    /// Hidden-flagged properties are omitted for everyone but admins, and
    /// unreadable properties are omitted silently.
    pub fn visible_properties(
        &self,
        caller: Option<&Caller>,
        obj_id: &ObjId,
    ) -> Result<Vec<String>, WorldError> {
        let Some(obj) = self.objects.get_object(obj_id)? else {
            return Err(WorldError::ObjectNotFound(obj_id.clone()));
        };
        if obj.is_ghost() {
            return Ok(vec![]);
        }
        let is_admin = caller.is_some_and(Caller::is_admin);

        let mut seen: Vec<Symbol> = Vec::new();
        let mut names: Vec<String> = Vec::new();
        let mut consider = |sym: &Symbol| {
            if !seen.contains(sym) {
                seen.push(sym.clone());
                names.push(sym.as_str().to_string());
            }
        };
        for sym in obj.property_names() {
            consider(sym);
        }
        for class in self.classes.inheritance_chain(obj.class_id())? {
            for (sym, _) in class.defaults() {
                consider(sym);
            }
        }

        let mut visible = Vec::new();
        for name in names {
            let flags = self.effective_accessors(&obj, &name)?;
            if flags.contains(AccessorFlag::Hidden) && !is_admin {
                continue;
            }
            if check_property_access(caller, &obj, &name, flags, Access::Read).is_err() {
                continue;
            }
            visible.push(name);
        }
        Ok(visible)
    }

    /// Set the instance-level accessor flags on a property. Only an admin or
    /// the object itself may retune its gates.
    pub fn set_property_accessors(
        &self,
        caller: &Caller,
        obj_id: &ObjId,
        name: &str,
        flags: BitEnum<AccessorFlag>,
    ) -> Result<(), WorldError> {
        if !caller.is_admin() && caller.who != *obj_id {
            return Err(WorldError::CapabilityDenied(CapabilityFlag::Admin));
        }
        let lock = self.objects.object_lock(obj_id);
        let _guard = lock.lock().unwrap();

        let Some(mut obj) = self.objects.get_object(obj_id)? else {
            return Err(WorldError::ObjectNotFound(obj_id.clone()));
        };
        if obj.is_ghost() {
            return Err(WorldError::GhostObject(obj_id.clone()));
        }
        obj.set_accessors(name, flags);
        obj.touch();
        self.objects.persist_object(&obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PersistentStore;
    use crate::transient::TransientStore;
    use loam_common::model::ObjectClass;
    use loam_var::{ClassId, v_int, v_str};
    use pretty_assertions::assert_eq;

    struct Fixture {
        classes: Arc<ClassRegistry>,
        objects: Arc<ObjectStore>,
        props: PropertyResolver,
        class_id: ClassId,
        obj_id: ObjId,
    }

    fn fixture() -> Fixture {
        let store: Arc<dyn PersistentStore> = Arc::new(TransientStore::new());
        let classes = Arc::new(ClassRegistry::new(store.clone()));
        let objects = Arc::new(ObjectStore::new(store, classes.clone()));
        let props = PropertyResolver::new(objects.clone(), classes.clone());

        let mut base = ObjectClass::new("Creature", None, "");
        base.set_default("hp", v_int(10));
        base.set_default("species", v_str("unknown"));
        let base = classes.add_class(base).unwrap();
        let obj = objects.create_instance(base.id(), None).unwrap();
        Fixture {
            class_id: base.id().clone(),
            obj_id: obj.id().clone(),
            classes,
            objects,
            props,
        }
    }

    fn admin() -> Caller {
        Caller::new(
            ObjId::mk("admin"),
            None,
            None,
            BitEnum::new_with(CapabilityFlag::Admin),
        )
    }

    #[test]
    fn test_instance_shadows_class_default() {
        let f = fixture();
        // Materialized from the default, then overridden on the instance.
        assert_eq!(
            f.props.get_property(None, &f.obj_id, "hp").unwrap(),
            Some(v_int(10))
        );
        f.props
            .set_property(None, &f.obj_id, "hp", v_int(42))
            .unwrap();
        assert_eq!(
            f.props.get_property(None, &f.obj_id, "hp").unwrap(),
            Some(v_int(42))
        );

        // Removing the instance value unshadows the class default.
        let mut class = f.classes.get_class(&f.class_id).unwrap().unwrap();
        class.set_default("hp", v_int(7));
        f.classes.save_class(&class).unwrap();
        assert!(f.props.remove_property(None, &f.obj_id, "hp").unwrap());
        assert_eq!(
            f.props.get_property(None, &f.obj_id, "hp").unwrap(),
            Some(v_int(7))
        );
        assert!(!f.props.remove_property(None, &f.obj_id, "hp").unwrap());
    }

    #[test]
    fn test_undefined_property_is_none() {
        let f = fixture();
        assert_eq!(f.props.get_property(None, &f.obj_id, "nope").unwrap(), None);
    }

    #[test]
    fn test_builtins_are_immutable() {
        let f = fixture();
        let err = f
            .props
            .set_property(Some(&admin()), &f.obj_id, "dbref", v_int(999))
            .unwrap_err();
        assert!(matches!(
            err,
            WorldError::PropertyPermissionDenied { rule: "BuiltIn", .. }
        ));
        let err = f
            .props
            .remove_property(Some(&admin()), &f.obj_id, "id")
            .unwrap_err();
        assert!(matches!(
            err,
            WorldError::PropertyPermissionDenied { rule: "BuiltIn", .. }
        ));
    }

    #[test]
    fn test_class_level_accessors_gate_instances() {
        let f = fixture();
        let mut class = f.classes.get_class(&f.class_id).unwrap().unwrap();
        class.set_accessors("hp", BitEnum::new_with(AccessorFlag::AdminOnly));
        f.classes.save_class(&class).unwrap();

        let stranger = Caller::new(ObjId::mk("someone"), None, None, BitEnum::new());
        let err = f
            .props
            .get_property(Some(&stranger), &f.obj_id, "hp")
            .unwrap_err();
        assert!(matches!(
            err,
            WorldError::PropertyPermissionDenied { rule: "AdminOnly", .. }
        ));
        // No context at all on a restricted property is its own error.
        let err = f.props.get_property(None, &f.obj_id, "hp").unwrap_err();
        assert!(matches!(err, WorldError::MissingContext(_)));
        // Admins pass.
        assert!(
            f.props
                .get_property(Some(&admin()), &f.obj_id, "hp")
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn test_instance_accessors_override_class() {
        let f = fixture();
        let mut class = f.classes.get_class(&f.class_id).unwrap().unwrap();
        class.set_accessors("hp", BitEnum::new_with(AccessorFlag::AdminOnly));
        f.classes.save_class(&class).unwrap();

        f.props
            .set_property_accessors(
                &admin(),
                &f.obj_id,
                "hp",
                BitEnum::new_with(AccessorFlag::Public),
            )
            .unwrap();
        // Instance-level Public wins over the class-level AdminOnly.
        assert_eq!(
            f.props.get_property(None, &f.obj_id, "hp").unwrap(),
            Some(v_int(10))
        );
    }

    #[test]
    fn test_ghost_reads_none_writes_error() {
        let f = fixture();
        f.objects.destroy_object(&f.obj_id).unwrap();
        assert_eq!(f.props.get_property(None, &f.obj_id, "hp").unwrap(), None);
        let err = f
            .props
            .set_property(None, &f.obj_id, "hp", v_int(1))
            .unwrap_err();
        assert!(matches!(err, WorldError::GhostObject(_)));
        assert_eq!(
            f.props.visible_properties(None, &f.obj_id).unwrap(),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_typed_round_trip_and_default() {
        let f = fixture();
        assert_eq!(
            f.props
                .get_property_typed(None, &f.obj_id, "hp", 0i64)
                .unwrap(),
            10
        );
        f.props
            .set_property_typed(None, &f.obj_id, "label", "shiny".to_string())
            .unwrap();
        assert_eq!(
            f.props
                .get_property_typed(None, &f.obj_id, "label", String::new())
                .unwrap(),
            "shiny"
        );
        // Absent key falls back to the supplied default.
        assert_eq!(
            f.props
                .get_property_typed(None, &f.obj_id, "missing", 99i64)
                .unwrap(),
            99
        );
    }

    #[test]
    fn test_hidden_is_listed_only_for_admins() {
        let f = fixture();
        f.props
            .set_property(None, &f.obj_id, "secret", v_int(1))
            .unwrap();
        f.props
            .set_property_accessors(
                &admin(),
                &f.obj_id,
                "secret",
                BitEnum::new_with(AccessorFlag::Public) | AccessorFlag::Hidden,
            )
            .unwrap();

        let listed = f.props.visible_properties(None, &f.obj_id).unwrap();
        assert!(!listed.iter().any(|n| n == "secret"));
        // Hidden affects listing only; direct reads still work.
        assert_eq!(
            f.props.get_property(None, &f.obj_id, "secret").unwrap(),
            Some(v_int(1))
        );

        let listed = f
            .props
            .visible_properties(Some(&admin()), &f.obj_id)
            .unwrap();
        assert!(listed.iter().any(|n| n == "secret"));
    }

    #[test]
    fn test_visible_properties_cover_chain() {
        let f = fixture();
        let listed = f.props.visible_properties(None, &f.obj_id).unwrap();
        // Materialized instance values and class defaults, without dupes.
        assert!(listed.iter().any(|n| n == "hp"));
        assert!(listed.iter().any(|n| n == "species"));
        assert_eq!(listed.iter().filter(|n| *n == "hp").count(), 1);
    }

    #[test]
    fn test_accessor_change_needs_standing() {
        let f = fixture();
        let stranger = Caller::new(ObjId::mk("someone"), None, None, BitEnum::new());
        let err = f
            .props
            .set_property_accessors(
                &stranger,
                &f.obj_id,
                "hp",
                BitEnum::new_with(AccessorFlag::Private),
            )
            .unwrap_err();
        assert_eq!(err, WorldError::CapabilityDenied(CapabilityFlag::Admin));

        // The object itself may adjust its own gates.
        let myself = Caller::new(f.obj_id.clone(), None, None, BitEnum::new());
        f.props
            .set_property_accessors(
                &myself,
                &f.obj_id,
                "hp",
                BitEnum::new_with(AccessorFlag::Private),
            )
            .unwrap();
    }
}
