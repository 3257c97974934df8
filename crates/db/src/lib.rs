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

//! The world database layer: a pluggable document store underneath
//! write-through in-memory registries for classes, objects and verbs, plus
//! permission-gated property resolution over the class inheritance chain.

mod class_registry;
mod object_store;
mod props;
mod store;
mod transient;
mod verb_registry;

pub use class_registry::ClassRegistry;
pub use object_store::ObjectStore;
pub use props::PropertyResolver;
pub use store::{
    Document, GAME_OBJECTS, OBJECT_CLASSES, PLAYERS, PersistentStore, VERBS, doc_id, from_doc,
    to_doc,
};
pub use transient::TransientStore;
pub use verb_registry::VerbRegistry;

/// The concurrent map the write-through caches are built on.
pub(crate) type CacheMap<K, V> =
    papaya::HashMap<K, V, std::hash::BuildHasherDefault<ahash::AHasher>>;
