//! The live map object registry.
//!
//! `MapObjectRegistry` is the keyed store of map objects currently shown on the
//! map. It is shared by UI and background threads: every mutation goes through
//! a single `RwLock`, identifiers come from a persisted [`UidAllocator`], and
//! every successful registration or removal is published to an
//! [`EventNotifier`].
//!
//! Events are queued while the write lock is still held, right after the
//! mutation, so the queue order of events for one object always matches the
//! order in which the registry committed them. Observers themselves run on
//! their own delivery threads and never execute under the registry lock, so
//! an observer calling back into the registry cannot deadlock it.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    Result,
    events::{EventNotifier, MapObjectEvent},
    object::MapObject,
    uid::UidAllocator,
};


type ObjectMap = HashMap<i64, Arc<MapObject>>;

/// Concurrent store of registered map objects.
#[derive(Debug)]
pub struct MapObjectRegistry {
    objects: RwLock<ObjectMap>,
    uids: UidAllocator,
    notifier: EventNotifier,
}

impl MapObjectRegistry {
    /// Create an empty registry.
    pub fn new(uids: UidAllocator, notifier: EventNotifier) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            uids,
            notifier,
        }
    }

    /// The notifier this registry publishes to.
    pub fn notifier(&self) -> &EventNotifier {
        &self.notifier
    }

    /// Register an object under a freshly allocated identifier.
    ///
    /// The object is visible to [`lookup`](Self::lookup) before the `Added`
    /// event is delivered. Fails only when no identifier could be allocated
    /// (see [`UidAllocator::next`]); the registry is unchanged in that case.
    pub fn register(&self, mut object: MapObject) -> Result<i64> {
        let id = self.uids.next()?;
        object.id = id;
        let object = Arc::new(object);

        let mut objects = self.write();
        objects.insert(id, Arc::clone(&object));
        self.notifier.publish(MapObjectEvent::Added(object));
        drop(objects);

        tracing::debug!(id, "Registered map object");
        Ok(id)
    }

    /// Remove an object, returning whether it was registered.
    ///
    /// The removed object's bitmap is detached before the `Removed` event is
    /// published. Unknown identifiers are a normal outcome: `false`, no event.
    pub fn unregister(&self, id: i64) -> bool {
        let mut objects = self.write();
        let Some(object) = objects.remove(&id) else {
            tracing::debug!(id, "Map object not registered");
            return false;
        };
        object.release_bitmap();
        self.notifier.publish(MapObjectEvent::Removed(object));
        drop(objects);

        tracing::debug!(id, "Unregistered map object");
        true
    }

    /// Look up a registered object.
    pub fn lookup(&self, id: i64) -> Option<Arc<MapObject>> {
        self.read().get(&id).cloned()
    }

    /// Whether an object is registered under `id`.
    pub fn contains(&self, id: i64) -> bool {
        self.read().contains_key(&id)
    }

    /// Snapshot of the registered objects.
    ///
    /// The snapshot is taken under the read lock and iterated without it, so
    /// concurrent mutations neither block nor disturb the iteration.
    pub fn iter(&self) -> MapObjects {
        let snapshot: Vec<_> = self.read().values().cloned().collect();
        MapObjects {
            inner: snapshot.into_iter(),
        }
    }

    /// Number of registered objects.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Drop every entry without publishing events, returning how many there were.
    ///
    /// Used as a reset when the application context starts.
    pub fn clear(&self) -> usize {
        let mut objects = self.write();
        let cleared = objects.len();
        objects.clear();
        if cleared > 0 {
            tracing::info!(cleared, "Cleared map object registry");
        }
        cleared
    }

    fn read(&self) -> RwLockReadGuard<'_, ObjectMap> {
        self.objects.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ObjectMap> {
        self.objects.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Iterator over a registry snapshot, see [`MapObjectRegistry::iter`].
#[derive(Debug)]
pub struct MapObjects {
    inner: std::vec::IntoIter<Arc<MapObject>>,
}

impl Iterator for MapObjects {
    type Item = Arc<MapObject>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for MapObjects {}
