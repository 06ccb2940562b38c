//! Registry: the authoritative in-memory arena of minions.
//!
//! Components never hold on to a minion: they look it up by [`MinionId`],
//! mutate it through a closure while the arena is locked, and get a
//! snapshot back when they need one. Closures run under the lock, so a feed
//! event published from inside one is ordered with the mutation it reports.
//! The lock is never held across an `.await`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use minionhub_domain::id::MinionId;
use minionhub_domain::minion::Minion;

/// Insertion-ordered set of minions keyed by id.
#[derive(Default)]
pub struct Registry {
    minions: Mutex<Vec<Minion>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole content, e.g. with what the durable store holds.
    ///
    /// Later duplicates of an id are dropped.
    pub fn load(&self, minions: Vec<Minion>) {
        let mut arena = self.lock();
        arena.clear();
        for minion in minions {
            if arena.iter().any(|m| m.id == minion.id) {
                tracing::warn!(minion_id = %minion.id, "dropping duplicate minion id on load");
                continue;
            }
            arena.push(minion);
        }
    }

    /// Snapshot of every minion, in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<Minion> {
        self.lock().clone()
    }

    /// Ids of every minion, in insertion order.
    #[must_use]
    pub fn ids(&self) -> Vec<MinionId> {
        self.lock().iter().map(|m| m.id).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of one minion.
    #[must_use]
    pub fn get(&self, id: MinionId) -> Option<Minion> {
        self.lock().iter().find(|m| m.id == id).cloned()
    }

    /// Whether any minion is bound to `mac`.
    #[must_use]
    pub fn is_mac_bound(&self, mac: &str) -> bool {
        self.lock().iter().any(|m| m.has_mac(mac))
    }

    /// Append a minion and run `notify` on it before releasing the lock.
    ///
    /// Returns `false` (and does nothing) when the id is already present.
    pub fn insert(&self, minion: Minion, notify: impl FnOnce(&Minion)) -> bool {
        let mut arena = self.lock();
        if arena.iter().any(|m| m.id == minion.id) {
            return false;
        }
        notify(&minion);
        arena.push(minion);
        true
    }

    /// Remove a minion and run `notify` on it before releasing the lock.
    pub fn remove(&self, id: MinionId, notify: impl FnOnce(&Minion)) -> Option<Minion> {
        let mut arena = self.lock();
        let index = arena.iter().position(|m| m.id == id)?;
        let removed = arena.remove(index);
        notify(&removed);
        Some(removed)
    }

    /// Mutate one minion in place. Returns `None` when the id is absent.
    pub fn update<T>(&self, id: MinionId, f: impl FnOnce(&mut Minion) -> T) -> Option<T> {
        let mut arena = self.lock();
        arena.iter_mut().find(|m| m.id == id).map(f)
    }

    /// Mutate the first minion bound to `mac`.
    ///
    /// Minions sharing one physical device are not distinguishable by mac,
    /// so only the earliest registered one is touched.
    pub fn update_first_by_mac<T>(&self, mac: &str, f: impl FnOnce(&mut Minion) -> T) -> Option<T> {
        let mut arena = self.lock();
        arena.iter_mut().find(|m| m.has_mac(mac)).map(f)
    }

    /// Mutate every minion bound to `mac`, returning how many matched.
    pub fn update_all_by_mac(&self, mac: &str, mut f: impl FnMut(&mut Minion)) -> usize {
        let mut arena = self.lock();
        let mut count = 0;
        for minion in arena.iter_mut().filter(|m| m.has_mac(mac)) {
            f(minion);
            count += 1;
        }
        count
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Minion>> {
        self.minions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
