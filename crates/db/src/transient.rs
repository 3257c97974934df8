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

use crate::store::{Document, PersistentStore, doc_id};
use indexmap::IndexMap;
use loam_common::model::WorldError;
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory `PersistentStore`: collections of documents keyed by id,
/// preserving insertion order. Nothing survives process exit. Useful for
/// tests and for worlds that are rebuilt on boot.
#[derive(Default)]
pub struct TransientStore {
    collections: Mutex<HashMap<String, IndexMap<String, Document>>>,
}

impl TransientStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn require_id(doc: &Document) -> Result<String, WorldError> {
    doc_id(doc)
        .map(str::to_string)
        .ok_or_else(|| WorldError::Database("document has no string 'id' field".to_string()))
}

impl PersistentStore for TransientStore {
    fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, WorldError> {
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(collection)
            .and_then(|c| c.get(id))
            .cloned())
    }

    fn find_one(
        &self,
        collection: &str,
        predicate: &dyn Fn(&Document) -> bool,
    ) -> Result<Option<Document>, WorldError> {
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(collection)
            .and_then(|c| c.values().find(|d| predicate(d)))
            .cloned())
    }

    fn find(
        &self,
        collection: &str,
        predicate: &dyn Fn(&Document) -> bool,
    ) -> Result<Vec<Document>, WorldError> {
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(collection)
            .map(|c| c.values().filter(|d| predicate(d)).cloned().collect())
            .unwrap_or_default())
    }

    fn find_all(&self, collection: &str) -> Result<Vec<Document>, WorldError> {
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(collection)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default())
    }

    fn insert(&self, collection: &str, document: Document) -> Result<(), WorldError> {
        let id = require_id(&document)?;
        let mut collections = self.collections.lock().unwrap();
        let entries = collections.entry(collection.to_string()).or_default();
        if entries.contains_key(&id) {
            return Err(WorldError::Conflict(format!(
                "duplicate id '{id}' in collection '{collection}'"
            )));
        }
        entries.insert(id, document);
        Ok(())
    }

    fn update(&self, collection: &str, document: Document) -> Result<bool, WorldError> {
        let id = require_id(&document)?;
        let mut collections = self.collections.lock().unwrap();
        let Some(entries) = collections.get_mut(collection) else {
            return Ok(false);
        };
        if !entries.contains_key(&id) {
            return Ok(false);
        }
        entries.insert(id, document);
        Ok(true)
    }

    fn delete(&self, collection: &str, id: &str) -> Result<bool, WorldError> {
        let mut collections = self.collections.lock().unwrap();
        let Some(entries) = collections.get_mut(collection) else {
            return Ok(false);
        };
        Ok(entries.shift_remove(id).is_some())
    }
}
