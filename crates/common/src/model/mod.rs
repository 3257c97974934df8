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

pub use crate::model::classes::ObjectClass;
pub use crate::model::objects::{
    BUILTIN_ATTRIBUTES, GameObject, ObjKind, PROP_ALIASES, PROP_CONTENTS, PROP_CREATED_AT,
    PROP_DBREF, PROP_LOCATION, PROP_MODIFIED_AT, PROP_NAME, PROP_OWNER, PROP_PERMISSIONS,
    is_builtin_attribute,
};
pub use crate::model::permissions::{
    Access, AccessorFlag, Caller, CapabilityFlag, FIRST_ADMIN_NAME, check_property_access,
    grant_capability, revoke_capability,
};
pub use crate::model::player::PlayerRecord;
pub use crate::model::verbs::{Verb, VerbOwner, VerbUpdate};

use crate::matching::PatternCompileError;
use loam_var::{ClassId, ObjId};
use thiserror::Error;

mod classes;
mod objects;
mod permissions;
mod player;
mod verbs;

/// Errors related to the world state and operations on it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorldError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Class not found: {0}")]
    ClassNotFound(ClassId),
    #[error("Object not found: {0}")]
    ObjectNotFound(ObjId),
    #[error("Verb not found: {0}")]
    VerbNotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Permission denied: {rule} forbids {access} of '{property}'")]
    PropertyPermissionDenied {
        rule: &'static str,
        access: Access,
        property: String,
    },
    #[error("Permission denied: {0} capability required")]
    CapabilityDenied(CapabilityFlag),

    #[error("Operation attempted on ghost object {0}")]
    GhostObject(ObjId),

    #[error("Permission check on '{0}' requires a caller context")]
    MissingContext(String),

    #[error("Pattern failed to compile: {0}")]
    PatternCompile(#[from] PatternCompileError),

    #[error("Script execution failed: {0}")]
    ScriptExecution(String),

    // Catch-all for store-level failures.
    #[error("Database error: {0}")]
    Database(String),
}
