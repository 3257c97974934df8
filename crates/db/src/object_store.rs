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
use crate::class_registry::ClassRegistry;
use crate::store::{GAME_OBJECTS, PLAYERS, PersistentStore, from_doc, to_doc};
use loam_common::model::{
    CapabilityFlag, FIRST_ADMIN_NAME, GameObject, ObjKind, PROP_CREATED_AT, PROP_MODIFIED_AT,
    PlayerRecord, WorldError,
};
use loam_common::util::BitEnum;
use loam_var::{ClassId, ObjId, SYSTEM_OBJECT, Var};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

/// The name of the class the system object is lazily instantiated from.
const SYSTEM_CLASS_NAME: &str = "System";

/// Every live object, cached in memory and written through to the store.
/// Objects live in `gameobjects`; players live in `players` with their
/// object embedded, but appear in the cache like any other object.
///
/// Containment writes (moves, destroys) serialize on one store-wide move
/// lock so the location/contents pair can never tear. Property writes
/// serialize per object via `object_lock`.
pub struct ObjectStore {
    store: Arc<dyn PersistentStore>,
    classes: Arc<ClassRegistry>,
    cache: CacheMap<ObjId, GameObject>,
    dbref_seq: AtomicI64,
    move_lock: Mutex<()>,
    object_locks: Mutex<HashMap<ObjId, Arc<Mutex<()>>>>,
}

impl ObjectStore {
    pub fn new(store: Arc<dyn PersistentStore>, classes: Arc<ClassRegistry>) -> Self {
        Self {
            store,
            classes,
            cache: Default::default(),
            dbref_seq: AtomicI64::new(1),
            move_lock: Mutex::new(()),
            object_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    /// Populate the cache from both object collections and seed the dbref
    /// sequence past the highest number already in use. Called once at boot.
    pub fn load_all(&self) -> Result<usize, WorldError> {
        let mut count = 0;
        let mut max_dbref = 0;
        {
            let cache = self.cache.pin();
            for doc in self.store.find_all(GAME_OBJECTS)? {
                let obj: GameObject = from_doc(doc)?;
                max_dbref = max_dbref.max(obj.dbref().unwrap_or(0));
                cache.insert(obj.id().clone(), obj);
                count += 1;
            }
            for doc in self.store.find_all(PLAYERS)? {
                let record: PlayerRecord = from_doc(doc)?;
                let obj = record.into_object();
                max_dbref = max_dbref.max(obj.dbref().unwrap_or(0));
                cache.insert(obj.id().clone(), obj);
                count += 1;
            }
        }
        self.dbref_seq.store(max_dbref + 1, Ordering::SeqCst);
        info!("loaded {count} game objects");
        Ok(count)
    }

    fn next_dbref(&self) -> i64 {
        self.dbref_seq.fetch_add(1, Ordering::SeqCst)
    }

    /// The per-object write lock, for read-modify-write cycles on one
    /// object's bag.
    pub fn object_lock(&self, id: &ObjId) -> Arc<Mutex<()>> {
        let mut locks = self.object_locks.lock().unwrap();
        locks.entry(id.clone()).or_default().clone()
    }

    /// Build an instance of a class: kind from the nearest kinded ancestor,
    /// property defaults applied root-first so subclasses override, a fresh
    /// dbref, and the class name as a fallback display name.
    fn materialize(&self, class_id: &ClassId) -> Result<GameObject, WorldError> {
        let chain = self.classes.inheritance_chain(class_id)?;
        if chain[0].is_abstract() {
            return Err(WorldError::Validation(format!(
                "class '{}' is abstract and cannot be instantiated",
                chain[0].name()
            )));
        }
        let kind = chain
            .iter()
            .map(|c| c.kind())
            .find(|k| *k != ObjKind::Generic)
            .unwrap_or_default();
        let mut obj = GameObject::new(ObjId::new(), class_id.clone(), kind);
        for class in chain.iter().rev() {
            for (name, value) in class.defaults() {
                let name = name.as_str();
                if name.eq_ignore_ascii_case(PROP_CREATED_AT)
                    || name.eq_ignore_ascii_case(PROP_MODIFIED_AT)
                {
                    continue;
                }
                obj.set(name, value.clone());
            }
        }
        if obj.name().is_none() {
            obj.set_name(chain[0].name());
        }
        obj.set_dbref(self.next_dbref());
        Ok(obj)
    }

    /// Create and persist an instance of `class_id`, optionally placing it
    /// in a location.
    pub fn create_instance(
        &self,
        class_id: &ClassId,
        location: Option<&ObjId>,
    ) -> Result<GameObject, WorldError> {
        let obj = self.materialize(class_id)?;
        self.store.insert(GAME_OBJECTS, to_doc(&obj)?)?;
        self.cache.pin().insert(obj.id().clone(), obj.clone());
        info!(object = %obj.id(), class = %class_id, "created instance");
        if let Some(location) = location {
            self.move_object(obj.id(), Some(location))?;
            return self
                .get_object(obj.id())?
                .ok_or_else(|| WorldError::ObjectNotFound(obj.id().clone()));
        }
        Ok(obj)
    }

    /// Create a player: an instance of `class_id` in the `players`
    /// collection, owning itself, with a credential hash. The first-admin
    /// name is born with the Admin capability.
    pub fn create_player(
        &self,
        name: &str,
        password_hash: &str,
        class_id: &ClassId,
        location: Option<&ObjId>,
    ) -> Result<PlayerRecord, WorldError> {
        if self.find_player_by_name(name)?.is_some() {
            return Err(WorldError::Conflict(format!(
                "a player named '{name}' already exists"
            )));
        }
        let mut obj = self.materialize(class_id)?;
        obj.set_name(name);
        if name.eq_ignore_ascii_case(FIRST_ADMIN_NAME) {
            obj.set_capabilities(BitEnum::new_with(CapabilityFlag::Admin));
        }
        let record = PlayerRecord::new(obj, password_hash);
        self.store.insert(PLAYERS, to_doc(&record)?)?;
        self.cache
            .pin()
            .insert(record.object().id().clone(), record.object().clone());
        info!(player = %record.object().id(), name, "created player");
        if let Some(location) = location {
            self.move_object(record.object().id(), Some(location))?;
            return self
                .get_player(record.object().id())?
                .ok_or_else(|| WorldError::ObjectNotFound(record.object().id().clone()));
        }
        Ok(record)
    }

    /// Fetch an object, cache first. Ghosts come back flagged; absence is
    /// `None`, never an error.
    pub fn get_object(&self, id: &ObjId) -> Result<Option<GameObject>, WorldError> {
        if let Some(obj) = self.cache.pin().get(id) {
            return Ok(Some(obj.clone()));
        }
        let obj = match self.store.find_by_id(GAME_OBJECTS, id.as_str())? {
            Some(doc) => from_doc::<GameObject>(doc)?,
            None => match self.store.find_by_id(PLAYERS, id.as_str())? {
                Some(doc) => from_doc::<PlayerRecord>(doc)?.into_object(),
                None => return Ok(None),
            },
        };
        self.cache.pin().insert(obj.id().clone(), obj.clone());
        Ok(Some(obj))
    }

    pub fn get_player(&self, id: &ObjId) -> Result<Option<PlayerRecord>, WorldError> {
        let Some(doc) = self.store.find_by_id(PLAYERS, id.as_str())? else {
            return Ok(None);
        };
        Ok(Some(from_doc(doc)?))
    }

    /// Case-insensitive lookup of a player by display name.
    pub fn find_player_by_name(&self, name: &str) -> Result<Option<PlayerRecord>, WorldError> {
        let Some(doc) = self.store.find_one(PLAYERS, &|doc| {
            // Property values persist as tagged dynamic values, not bare
            // JSON strings; decode the name before comparing.
            doc.get("properties")
                .and_then(|p| p.get("name"))
                .and_then(|n| serde_json::from_value::<Var>(n.clone()).ok())
                .is_some_and(|v| v.as_str().is_some_and(|n| n.eq_ignore_ascii_case(name)))
        })?
        else {
            return Ok(None);
        };
        Ok(Some(from_doc(doc)?))
    }

    /// Write a player record through, refreshing the object cache.
    pub fn save_player(&self, record: &PlayerRecord) -> Result<(), WorldError> {
        if !self.store.update(PLAYERS, to_doc(record)?)? {
            return Err(WorldError::ObjectNotFound(record.object().id().clone()));
        }
        self.cache
            .pin()
            .insert(record.object().id().clone(), record.object().clone());
        Ok(())
    }

    /// Session bookkeeping: mark a player connected.
    pub fn connect_player(&self, id: &ObjId, session_id: &str) -> Result<(), WorldError> {
        let Some(mut record) = self.get_player(id)? else {
            return Err(WorldError::ObjectNotFound(id.clone()));
        };
        record.connect(session_id);
        self.save_player(&record)
    }

    /// Session bookkeeping: mark a player disconnected.
    pub fn disconnect_player(&self, id: &ObjId) -> Result<(), WorldError> {
        let Some(mut record) = self.get_player(id)? else {
            return Err(WorldError::ObjectNotFound(id.clone()));
        };
        record.disconnect();
        self.save_player(&record)
    }

    /// Write an object through to whichever collection it lives in. Players
    /// live inside their record, so the record is re-wrapped around them.
    pub(crate) fn persist_object(&self, obj: &GameObject) -> Result<(), WorldError> {
        if let Some(doc) = self.store.find_by_id(PLAYERS, obj.id().as_str())? {
            let mut record: PlayerRecord = from_doc(doc)?;
            *record.object_mut() = obj.clone();
            self.store.update(PLAYERS, to_doc(&record)?)?;
        } else {
            let doc = to_doc(obj)?;
            if !self.store.update(GAME_OBJECTS, doc.clone())? {
                self.store.insert(GAME_OBJECTS, doc)?;
            }
        }
        self.cache.pin().insert(obj.id().clone(), obj.clone());
        Ok(())
    }

    /// Relocate an object, unlinking it from its old container and linking
    /// it into the new one as one atomic step. `None` drops it out of the
    /// containment graph entirely.
    pub fn move_object(&self, id: &ObjId, new_location: Option<&ObjId>) -> Result<(), WorldError> {
        let _guard = self.move_lock.lock().unwrap();

        let Some(mut obj) = self.get_object(id)? else {
            return Err(WorldError::ObjectNotFound(id.clone()));
        };
        if obj.is_ghost() {
            return Err(WorldError::GhostObject(id.clone()));
        }
        if let Some(dest) = new_location {
            let Some(target) = self.get_object(dest)? else {
                return Err(WorldError::ObjectNotFound(dest.clone()));
            };
            if target.is_ghost() {
                return Err(WorldError::GhostObject(dest.clone()));
            }
        }

        let old_location = obj.location();
        if old_location.as_ref() == new_location {
            return Ok(());
        }

        if let Some(old) = old_location
            && let Some(mut container) = self.get_object(&old)?
        {
            container.remove_content(id);
            container.touch();
            self.persist_object(&container)?;
        }

        obj.set_location(new_location.cloned());
        obj.touch();
        self.persist_object(&obj)?;

        if let Some(dest) = new_location
            && let Some(mut container) = self.get_object(dest)?
        {
            container.add_content(id.clone());
            container.touch();
            self.persist_object(&container)?;
        }
        Ok(())
    }

    /// The non-ghost objects inside a container, in containment order.
    pub fn objects_in_location(&self, location: &ObjId) -> Result<Vec<GameObject>, WorldError> {
        let Some(container) = self.get_object(location)? else {
            return Ok(vec![]);
        };
        let mut out = Vec::new();
        for content_id in container.contents() {
            if let Some(obj) = self.get_object(&content_id)?
                && !obj.is_ghost()
            {
                out.push(obj);
            }
        }
        Ok(out)
    }

    /// All non-ghost instances of a class, optionally including instances
    /// of its subclasses, ordered by dbref.
    pub fn find_objects_by_class(
        &self,
        class_id: &ClassId,
        include_subclasses: bool,
    ) -> Result<Vec<GameObject>, WorldError> {
        let candidates: Vec<GameObject> = {
            let cache = self.cache.pin();
            cache.iter().map(|(_, o)| o.clone()).collect()
        };
        let mut out = Vec::new();
        for obj in candidates {
            if obj.is_ghost() {
                continue;
            }
            let related = if include_subclasses {
                self.classes.inherits_from(obj.class_id(), class_id)?
            } else {
                obj.class_id() == class_id
            };
            if related {
                out.push(obj);
            }
        }
        out.sort_by_key(|o| o.dbref().unwrap_or(i64::MAX));
        Ok(out)
    }

    /// Destroy an object by demoting it to a ghost. The id keeps resolving,
    /// so stale references degrade instead of dangling; nothing is ever
    /// hard-deleted. Contents are spilled out of the containment graph.
    /// Destroying a ghost again is a no-op.
    pub fn destroy_object(&self, id: &ObjId) -> Result<(), WorldError> {
        let _guard = self.move_lock.lock().unwrap();

        let Some(mut obj) = self.get_object(id)? else {
            return Err(WorldError::ObjectNotFound(id.clone()));
        };
        if obj.is_ghost() {
            return Ok(());
        }

        if let Some(old) = obj.location()
            && let Some(mut container) = self.get_object(&old)?
        {
            container.remove_content(id);
            container.touch();
            self.persist_object(&container)?;
        }
        for content_id in obj.contents() {
            if let Some(mut content) = self.get_object(&content_id)? {
                content.set_location(None);
                content.touch();
                self.persist_object(&content)?;
            }
        }

        obj.demote_to_ghost();
        self.persist_object(&obj)?;
        // A ghost takes no more property writes, so its lock table entry can
        // go; anyone still holding the Arc keeps a working mutex.
        self.object_locks.lock().unwrap().remove(id);
        info!(object = %id, "destroyed object");
        Ok(())
    }

    #[cfg(test)]
    fn object_lock_count(&self) -> usize {
        self.object_locks.lock().unwrap().len()
    }

    /// The system object: the well-known verb host of last resort. Created
    /// lazily on first use, along with its class if need be.
    pub fn system_object(&self) -> Result<GameObject, WorldError> {
        let lock = self.object_lock(&SYSTEM_OBJECT);
        let _guard = lock.lock().unwrap();
        if let Some(obj) = self.get_object(&SYSTEM_OBJECT)? {
            return Ok(obj);
        }
        let class = match self.classes.find_class_by_name(SYSTEM_CLASS_NAME)? {
            Some(class) => class,
            None => self.classes.create_class(
                SYSTEM_CLASS_NAME,
                None,
                "the host of system-wide verbs",
            )?,
        };
        let mut obj = GameObject::new(SYSTEM_OBJECT, class.id().clone(), ObjKind::Generic);
        obj.set_name(SYSTEM_CLASS_NAME);
        obj.set_dbref(self.next_dbref());
        self.store.insert(GAME_OBJECTS, to_doc(&obj)?)?;
        self.cache.pin().insert(obj.id().clone(), obj.clone());
        info!(object = %obj.id(), "created system object");
        Ok(obj)
    }
}
