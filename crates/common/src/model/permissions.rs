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

//! Two independent permission axes: per-player capability flags and
//! per-property accessor flags.

use crate::model::objects::GameObject;
use crate::model::WorldError;
use crate::util::BitEnum;
use enum_primitive_derive::Primitive;
use loam_var::{ClassId, ObjId};
use std::fmt::{Display, Formatter};
use strum::{Display as StrumDisplay, EnumString};

/// The player whose Admin capability can never be revoked.
pub const FIRST_ADMIN_NAME: &str = "wizard";

/// Privilege tags carried on a player object.
#[derive(
    Debug, Ord, PartialOrd, Copy, Clone, Eq, PartialEq, Hash, Primitive, StrumDisplay, EnumString,
)]
pub enum CapabilityFlag {
    Admin = 0,
    Programmer = 1,
    Moderator = 2,
}

/// Access-control tags on a (class, property) or (instance, property) pair.
/// An unset accessor set is equivalent to `{Public}`.
#[derive(
    Debug, Ord, PartialOrd, Copy, Clone, Eq, PartialEq, Hash, Primitive, StrumDisplay, EnumString,
)]
pub enum AccessorFlag {
    Public = 0,
    Private = 1,
    Internal = 2,
    Protected = 3,
    ReadOnly = 4,
    WriteOnly = 5,
    AdminOnly = 6,
    Hidden = 7,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Access {
    Read,
    Write,
}

impl Display for Access {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Access::Read => f.write_str("read"),
            Access::Write => f.write_str("write"),
        }
    }
}

/// Who is performing an access, and with what standing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub who: ObjId,
    pub owner: Option<ObjId>,
    pub class_id: Option<ClassId>,
    pub flags: BitEnum<CapabilityFlag>,
}

impl Caller {
    pub fn new(
        who: ObjId,
        owner: Option<ObjId>,
        class_id: Option<ClassId>,
        flags: BitEnum<CapabilityFlag>,
    ) -> Self {
        Self {
            who,
            owner,
            class_id,
            flags,
        }
    }

    /// A caller context derived from an object's own identity.
    pub fn for_object(obj: &GameObject) -> Self {
        Self {
            who: obj.id().clone(),
            owner: obj.owner(),
            class_id: Some(obj.class_id().clone()),
            flags: obj.capabilities(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.flags.contains(CapabilityFlag::Admin)
    }

    pub fn check_admin(&self) -> Result<(), WorldError> {
        if self.is_admin() {
            return Ok(());
        }
        Err(WorldError::CapabilityDenied(CapabilityFlag::Admin))
    }

    pub fn check_programmer(&self) -> Result<(), WorldError> {
        if self.flags.contains(CapabilityFlag::Programmer) || self.is_admin() {
            return Ok(());
        }
        Err(WorldError::CapabilityDenied(CapabilityFlag::Programmer))
    }
}

/// Evaluate an accessor set for one access against one property of `obj`.
///
/// `{Public}` (or an empty set) allows without needing a context. Any other
/// set requires a caller context; rules are checked in fixed order and the
/// first violated rule is reported. Admin callers pass every gate.
pub fn check_property_access(
    caller: Option<&Caller>,
    obj: &GameObject,
    property: &str,
    accessors: BitEnum<AccessorFlag>,
    access: Access,
) -> Result<(), WorldError> {
    let mut restricted = accessors;
    restricted.clear(AccessorFlag::Public);
    restricted.clear(AccessorFlag::Hidden);
    if restricted.is_empty() {
        return Ok(());
    }

    let Some(caller) = caller else {
        return Err(WorldError::MissingContext(property.to_string()));
    };
    if caller.is_admin() {
        return Ok(());
    }

    let denied = |rule: &'static str| WorldError::PropertyPermissionDenied {
        rule,
        access,
        property: property.to_string(),
    };

    if restricted.contains(AccessorFlag::AdminOnly) {
        return Err(denied("AdminOnly"));
    }
    if restricted.contains(AccessorFlag::Private) && caller.who != *obj.id() {
        return Err(denied("Private"));
    }
    if restricted.contains(AccessorFlag::Internal)
        && caller.who != *obj.id()
        && !same_owner(caller, obj)
    {
        return Err(denied("Internal"));
    }
    if restricted.contains(AccessorFlag::Protected)
        && caller.class_id.as_ref() != Some(obj.class_id())
    {
        return Err(denied("Protected"));
    }
    if access == Access::Write && restricted.contains(AccessorFlag::ReadOnly) {
        return Err(denied("ReadOnly"));
    }
    if access == Access::Read && restricted.contains(AccessorFlag::WriteOnly) {
        return Err(denied("WriteOnly"));
    }
    Ok(())
}

fn same_owner(caller: &Caller, obj: &GameObject) -> bool {
    match (&caller.owner, obj.owner()) {
        (Some(a), Some(b)) => *a == b,
        _ => false,
    }
}

/// Grant a capability flag. Requires Admin standing on the granter.
pub fn grant_capability(
    granter: &Caller,
    target: &mut GameObject,
    flag: CapabilityFlag,
) -> Result<(), WorldError> {
    granter.check_admin()?;
    let mut caps = target.capabilities();
    caps.set(flag);
    target.set_capabilities(caps);
    Ok(())
}

/// Revoke a capability flag. Requires Admin standing on the revoker; the
/// first-admin identity can never lose Admin.
pub fn revoke_capability(
    revoker: &Caller,
    target: &mut GameObject,
    flag: CapabilityFlag,
) -> Result<(), WorldError> {
    revoker.check_admin()?;
    if flag == CapabilityFlag::Admin
        && target
            .name()
            .is_some_and(|n| n.eq_ignore_ascii_case(FIRST_ADMIN_NAME))
    {
        return Err(WorldError::Validation(format!(
            "cannot revoke Admin from the original admin '{FIRST_ADMIN_NAME}'"
        )));
    }
    let mut caps = target.capabilities();
    caps.clear(flag);
    target.set_capabilities(caps);
    Ok(())
}
