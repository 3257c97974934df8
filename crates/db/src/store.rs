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

use loam_common::model::WorldError;
use serde::{Serialize, de::DeserializeOwned};

/// One persisted entity, as a JSON document. Every document carries a string
/// `id` field that is unique within its collection.
pub type Document = serde_json::Value;

// The collections the world is persisted into.
pub const GAME_OBJECTS: &str = "gameobjects";
pub const PLAYERS: &str = "players";
pub const OBJECT_CLASSES: &str = "objectclasses";
pub const VERBS: &str = "verbs";

/// The persistence seam. The registries above this trait treat storage as
/// named collections of JSON documents; anything that can do that -- an
/// embedded KV store, a document database, a flat file -- can sit underneath.
///
/// Implementations must be safe to call from multiple threads; the registries
/// serialize their own read-modify-write cycles.
pub trait PersistentStore: Send + Sync {
    /// Fetch one document by its `id` field.
    fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, WorldError>;

    /// The first document matching the predicate, in insertion order.
    fn find_one(
        &self,
        collection: &str,
        predicate: &dyn Fn(&Document) -> bool,
    ) -> Result<Option<Document>, WorldError>;

    /// All documents matching the predicate, in insertion order.
    fn find(
        &self,
        collection: &str,
        predicate: &dyn Fn(&Document) -> bool,
    ) -> Result<Vec<Document>, WorldError>;

    /// Every document in the collection, in insertion order.
    fn find_all(&self, collection: &str) -> Result<Vec<Document>, WorldError>;

    /// Insert a new document. The document's `id` must not already exist in
    /// the collection.
    fn insert(&self, collection: &str, document: Document) -> Result<(), WorldError>;

    /// Replace the document with the same `id`. Returns false when no such
    /// document exists.
    fn update(&self, collection: &str, document: Document) -> Result<bool, WorldError>;

    /// Remove a document by id. Returns false when no such document exists.
    fn delete(&self, collection: &str, id: &str) -> Result<bool, WorldError>;
}

/// The `id` field of a document, if present and a string.
pub fn doc_id(doc: &Document) -> Option<&str> {
    doc.get("id").and_then(Document::as_str)
}

pub fn to_doc<T: Serialize>(entity: &T) -> Result<Document, WorldError> {
    serde_json::to_value(entity).map_err(|e| WorldError::Database(e.to_string()))
}

pub fn from_doc<T: DeserializeOwned>(doc: Document) -> Result<T, WorldError> {
    serde_json::from_value(doc).map_err(|e| WorldError::Database(e.to_string()))
}
