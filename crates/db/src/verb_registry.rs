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
use crate::store::{PersistentStore, VERBS, from_doc, to_doc};
use loam_common::model::{Verb, VerbOwner, VerbUpdate, WorldError};
use loam_common::matching::VerbPattern;
use loam_var::{ObjId, VerbId};
use std::sync::Arc;
use tracing::info;

/// Every verb definition, cached in memory and written through to the
/// `verbs` collection. Patterns are validated here, at registration and
/// update time, so match time never sees a malformed one.
pub struct VerbRegistry {
    store: Arc<dyn PersistentStore>,
    cache: CacheMap<VerbId, Verb>,
}

impl VerbRegistry {
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self {
            store,
            cache: Default::default(),
        }
    }

    /// Populate the cache from the store. Called once at boot.
    pub fn load_all(&self) -> Result<usize, WorldError> {
        let docs = self.store.find_all(VERBS)?;
        let count = docs.len();
        let cache = self.cache.pin();
        for doc in docs {
            let verb: Verb = from_doc(doc)?;
            cache.insert(verb.id().clone(), verb);
        }
        info!("loaded {count} verbs");
        Ok(count)
    }

    fn check_name_free(
        &self,
        owner: &VerbOwner,
        name: &str,
        skip: Option<&VerbId>,
    ) -> Result<(), WorldError> {
        let clash = self
            .verbs_on(owner)?
            .into_iter()
            .filter(|v| Some(v.id()) != skip)
            .any(|v| v.matches_name(name));
        if clash {
            return Err(WorldError::Conflict(format!(
                "a verb answering to '{name}' already exists on {owner}"
            )));
        }
        Ok(())
    }

    /// Define a new verb. The pattern must compile, and the name must not
    /// collide with any verb already answering on the same owner.
    pub fn create_verb(
        &self,
        owner: VerbOwner,
        name: &str,
        pattern: &str,
        code: &str,
        created_by: ObjId,
    ) -> Result<Verb, WorldError> {
        VerbPattern::compile(pattern)?;
        self.check_name_free(&owner, name, None)?;
        let verb = Verb::new(owner, name, pattern, code, created_by);
        self.store.insert(VERBS, to_doc(&verb)?)?;
        self.cache.pin().insert(verb.id().clone(), verb.clone());
        info!(verb = %verb.id(), name, owner = %verb.owner(), "created verb");
        Ok(verb)
    }

    pub fn get_verb(&self, id: &VerbId) -> Result<Option<Verb>, WorldError> {
        if let Some(verb) = self.cache.pin().get(id) {
            return Ok(Some(verb.clone()));
        }
        let Some(doc) = self.store.find_by_id(VERBS, id.as_str())? else {
            return Ok(None);
        };
        let verb: Verb = from_doc(doc)?;
        self.cache.pin().insert(verb.id().clone(), verb.clone());
        Ok(Some(verb))
    }

    /// Every verb attached to one owner, oldest first.
    pub fn verbs_on(&self, owner: &VerbOwner) -> Result<Vec<Verb>, WorldError> {
        let cache = self.cache.pin();
        let mut verbs: Vec<Verb> = cache
            .iter()
            .filter(|(_, v)| v.owner() == owner)
            .map(|(_, v)| v.clone())
            .collect();
        verbs.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().as_str().cmp(b.id().as_str()))
        });
        Ok(verbs)
    }

    fn require_verb(&self, id: &VerbId) -> Result<Verb, WorldError> {
        self.get_verb(id)?
            .ok_or_else(|| WorldError::VerbNotFound(id.to_string()))
    }

    fn persist(&self, verb: &Verb) -> Result<(), WorldError> {
        if !self.store.update(VERBS, to_doc(verb)?)? {
            return Err(WorldError::VerbNotFound(verb.id().to_string()));
        }
        self.cache.pin().insert(verb.id().clone(), verb.clone());
        Ok(())
    }

    /// Apply a partial update. A new pattern is validated before anything is
    /// touched; a new name or alias must still be free on the owner.
    pub fn update_verb(&self, id: &VerbId, update: VerbUpdate) -> Result<Verb, WorldError> {
        let mut verb = self.require_verb(id)?;
        if let Some(pattern) = &update.pattern {
            VerbPattern::compile(pattern)?;
        }
        if let Some(name) = &update.name {
            self.check_name_free(verb.owner(), name, Some(id))?;
        }
        if let Some(aliases) = &update.aliases {
            for alias in aliases.split_whitespace() {
                self.check_name_free(verb.owner(), alias, Some(id))?;
            }
        }
        verb.apply_update(update);
        self.persist(&verb)?;
        Ok(verb)
    }

    pub fn delete_verb(&self, id: &VerbId) -> Result<(), WorldError> {
        if !self.store.delete(VERBS, id.as_str())? {
            return Err(WorldError::VerbNotFound(id.to_string()));
        }
        self.cache.pin().remove(id);
        info!(verb = %id, "deleted verb");
        Ok(())
    }

    /// Reattach a verb to a different owner.
    pub fn move_verb(&self, id: &VerbId, new_owner: VerbOwner) -> Result<Verb, WorldError> {
        let mut verb = self.require_verb(id)?;
        self.check_name_free(&new_owner, verb.name().as_str(), Some(id))?;
        verb.set_owner(new_owner);
        self.persist(&verb)?;
        Ok(verb)
    }

    /// Duplicate a verb onto another owner under a fresh id.
    pub fn copy_verb(&self, id: &VerbId, new_owner: VerbOwner) -> Result<Verb, WorldError> {
        let source = self.require_verb(id)?;
        self.check_name_free(&new_owner, source.name().as_str(), None)?;
        let mut copy = Verb::new(
            new_owner,
            source.name().as_str(),
            source.pattern(),
            source.code(),
            source.created_by().clone(),
        );
        copy.set_aliases(source.aliases());
        copy.set_permissions(source.permissions().to_vec());
        self.store.insert(VERBS, to_doc(&copy)?)?;
        self.cache.pin().insert(copy.id().clone(), copy.clone());
        Ok(copy)
    }

    /// Find verbs whose name, aliases or pattern source match the query:
    /// case-insensitive substring by default, a regex when asked for. A bad
    /// regex is the caller's validation error.
    pub fn search(&self, query: &str, use_regex: bool) -> Result<Vec<Verb>, WorldError> {
        let matches: Box<dyn Fn(&str) -> bool> = if use_regex {
            let re = regex::Regex::new(&format!("(?i){query}"))
                .map_err(|e| WorldError::Validation(format!("bad search pattern: {e}")))?;
            Box::new(move |s: &str| re.is_match(s))
        } else {
            let needle = query.to_lowercase();
            Box::new(move |s: &str| s.to_lowercase().contains(&needle))
        };

        let cache = self.cache.pin();
        let mut found: Vec<Verb> = cache
            .iter()
            .filter(|(_, v)| {
                matches(v.name().as_str()) || matches(v.aliases()) || matches(v.pattern())
            })
            .map(|(_, v)| v.clone())
            .collect();
        found.sort_by(|a, b| {
            a.name()
                .as_str()
                .cmp(b.name().as_str())
                .then_with(|| a.id().as_str().cmp(b.id().as_str()))
        });
        Ok(found)
    }
}
