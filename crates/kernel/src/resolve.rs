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

use loam_common::model::{Verb, VerbOwner, WorldError};
use loam_db::{ObjectStore, VerbRegistry};
use loam_var::{ObjId, Symbol};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// A verb that answered a command: where it was found and what its pattern
/// captured.
#[derive(Debug, Clone)]
pub struct VerbMatch {
    pub verb: Verb,
    pub this: ObjId,
    pub variables: BTreeMap<String, String>,
}

/// Resolves which verbs an object answers to, walking instance verbs, then
/// class verbs up the inheritance chain, then (optionally) the system
/// object's verbs. Nearer sources shadow farther ones by primary name.
pub struct VerbResolver {
    objects: Arc<ObjectStore>,
    verbs: Arc<VerbRegistry>,
}

impl VerbResolver {
    pub fn new(objects: Arc<ObjectStore>, verbs: Arc<VerbRegistry>) -> Self {
        Self { objects, verbs }
    }

    /// The merged verb list for an object, nearest definition first. A verb
    /// whose primary name was already claimed by a nearer source is shadowed
    /// out of the list entirely.
    pub fn verbs_for_object(
        &self,
        obj_id: &ObjId,
        include_system: bool,
    ) -> Result<Vec<Verb>, WorldError> {
        let Some(obj) = self.objects.get_object(obj_id)? else {
            return Err(WorldError::ObjectNotFound(obj_id.clone()));
        };
        if obj.is_ghost() {
            return Ok(vec![]);
        }

        let mut candidates = self.verbs.verbs_on(&VerbOwner::Object(obj_id.clone()))?;
        for class in self.objects.classes().inheritance_chain(obj.class_id())? {
            candidates.extend(
                self.verbs
                    .verbs_on(&VerbOwner::Class(class.id().clone()))?,
            );
        }
        if include_system {
            let system = self.objects.system_object()?;
            if system.id() != obj_id {
                candidates.extend(
                    self.verbs
                        .verbs_on(&VerbOwner::Object(system.id().clone()))?,
                );
            }
        }

        let mut claimed: Vec<Symbol> = Vec::new();
        let mut merged = Vec::new();
        for verb in candidates {
            if claimed.contains(verb.name()) {
                continue;
            }
            claimed.push(verb.name().clone());
            merged.push(verb);
        }
        Ok(merged)
    }

    /// Find the verb on `obj_id` answering a tokenized command. The first
    /// token picks exactly one name candidate from the merged list; only
    /// that candidate's pattern is then tried against the remaining tokens.
    /// A shadowing verb whose pattern rejects the input eats the command.
    pub fn find_matching_verb(
        &self,
        obj_id: &ObjId,
        tokens: &[String],
    ) -> Result<Option<VerbMatch>, WorldError> {
        let Some(word) = tokens.first() else {
            return Ok(None);
        };
        let merged = self.verbs_for_object(obj_id, false)?;
        let Some(verb) = merged.into_iter().find(|v| v.matches_name(word)) else {
            return Ok(None);
        };
        let pattern = match verb.compiled_pattern() {
            Ok(pattern) => pattern,
            Err(e) => {
                // Registration validates patterns, so this is store rot.
                warn!(verb = %verb.id(), error = %e, "stored verb pattern does not compile");
                return Ok(None);
            }
        };
        let Some(variables) = pattern.match_args(&tokens[1..]) else {
            return Ok(None);
        };
        Ok(Some(VerbMatch {
            verb,
            this: obj_id.clone(),
            variables,
        }))
    }
}
