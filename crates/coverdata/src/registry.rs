//! Copy-on-Write Registries
//!
//! A [`Registry`] maps ids to shared records and is what every level of the
//! tree uses to hold its children. Lookups read the currently published map
//! under a read lock that is only ever contended by a pointer swap. Writers
//! serialize on a separate mutex, build the next map off to the side and
//! publish it with one store, so a registration or merge in progress never
//! holds up a touch on an existing record.

use std::borrow::Borrow;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::data::CoverageData;
use crate::lock;

pub(crate) type Entries<K, V> = BTreeMap<K, Arc<V>>;

#[derive(Debug)]
pub(crate) struct Registry<K, V> {
    published: RwLock<Arc<Entries<K, V>>>,
    writer: Mutex<()>,
}

impl<K: Ord, V> Default for Registry<K, V> {
    fn default() -> Self {
        Self::from_entries(BTreeMap::new())
    }
}

impl<K: Ord, V> Registry<K, V> {
    pub(crate) fn from_entries(entries: Entries<K, V>) -> Self {
        Self {
            published: RwLock::new(Arc::new(entries)),
            writer: Mutex::new(()),
        }
    }

    /// The map as currently published; later writes do not show up in it
    pub(crate) fn entries(&self) -> Arc<Entries<K, V>> {
        Arc::clone(&lock::read(&self.published))
    }

    /// Run `f` on the record for `key` without cloning its handle
    #[inline]
    pub(crate) fn with<Q, R>(&self, key: &Q, f: impl FnOnce(&V) -> R) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        lock::read(&self.published).get(key).map(|record| f(record))
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        lock::read(&self.published).get(key).cloned()
    }

    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        lock::read(&self.published).contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        lock::read(&self.published).len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        lock::read(&self.published).is_empty()
    }

    #[cfg(test)]
    pub(crate) fn hold_writer(&self) -> std::sync::MutexGuard<'_, ()> {
        lock::mutex(&self.writer)
    }
}

impl<K: Ord + Clone, V> Registry<K, V> {
    pub(crate) fn keys(&self) -> Vec<K> {
        lock::read(&self.published).keys().cloned().collect()
    }

    /// Insert the record built by `make` unless `key` is already present
    ///
    /// Returns the record stored under `key` and whether it was created by
    /// this call. `make` only runs when the key is missing.
    pub(crate) fn get_or_insert_with(
        &self,
        key: K,
        make: impl FnOnce() -> Arc<V>,
    ) -> (Arc<V>, bool) {
        if let Some(existing) = self.get(&key) {
            return (existing, false);
        }
        self.update(|entries| match entries.entry(key) {
            Entry::Occupied(existing) => (Arc::clone(existing.get()), false),
            Entry::Vacant(slot) => (Arc::clone(slot.insert(make())), true),
        })
    }

    /// Apply `edit` to a private copy of the map, then publish the copy
    ///
    /// Must not be called again on the same registry from inside `edit`.
    pub(crate) fn update<R>(&self, edit: impl FnOnce(&mut Entries<K, V>) -> R) -> R {
        let _writer = lock::mutex(&self.writer);
        let mut next = (*self.entries()).clone();
        let result = edit(&mut next);
        let previous = std::mem::replace(&mut *lock::write(&self.published), Arc::new(next));
        // Free the old map outside the write lock.
        drop(previous);
        result
    }
}

impl<K: Ord + Clone, V: CoverageData> Registry<K, V> {
    /// Merge each donor record into the record under the same key, or adopt
    /// `copy` of it when the key is missing; returns how many were adopted
    ///
    /// Adopted records are fresh copies, never the donor's own handles.
    pub(crate) fn absorb(&self, donor: &Self, copy: impl Fn(&V) -> V) -> usize {
        // Taken first: `donor` may be `self`.
        let donor = donor.entries();
        let current = self.entries();

        let mut missing = Vec::new();
        for (key, record) in donor.iter() {
            match current.get(key) {
                Some(existing) => existing.merge(record),
                None => missing.push((key, record)),
            }
        }
        if missing.is_empty() {
            return 0;
        }

        self.update(|entries| {
            let mut adopted = 0;
            for (key, record) in missing {
                match entries.entry(key.clone()) {
                    // Registered since `current` was taken
                    Entry::Occupied(existing) => existing.get().merge(record),
                    Entry::Vacant(slot) => {
                        slot.insert(Arc::new(copy(record)));
                        adopted += 1;
                    }
                }
            }
            adopted
        })
    }
}
