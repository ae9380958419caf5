use std::{
    collections::{HashMap, HashSet},
    hash::Hash,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use detangler_shared::{Identity, Tick};

// TrackedClone
/// One clone object currently believed to be owned by a player
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackedClone<E> {
    pub owner: Identity,
    /// Host key of the clone object. The host owns the object itself.
    pub entity: E,
    /// Host tick at registration, for diagnostics only
    pub spawn_tick: Tick,
}

struct RegistryState<E> {
    clones: HashMap<Identity, TrackedClone<E>>,
    owners_by_entity: HashMap<E, Identity>,
    in_revival: HashSet<Identity>,
}

impl<E: Copy + Eq + Hash> RegistryState<E> {
    fn new() -> Self {
        Self {
            clones: HashMap::new(),
            owners_by_entity: HashMap::new(),
            in_revival: HashSet::new(),
        }
    }

    fn remove_clone(&mut self, owner: &Identity) -> Option<TrackedClone<E>> {
        let removed = self.clones.remove(owner)?;
        if self.owners_by_entity.get(&removed.entity) == Some(owner) {
            self.owners_by_entity.remove(&removed.entity);
        }
        Some(removed)
    }
}

// CloneRegistry
/// Owner → active clone map, plus the set of owners currently in revival.
///
/// Internally synchronized: lifecycle notifications may arrive from a
/// network context while the tick loop sweeps. Every operation takes the
/// lock once, so each insert or removal is atomic per entry. A poisoned lock
/// is recovered rather than propagated, as no operation leaves the state
/// half-written.
pub struct CloneRegistry<E> {
    state: RwLock<RegistryState<E>>,
}

impl<E: Copy + Eq + Hash> Default for CloneRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Copy + Eq + Hash> CloneRegistry<E> {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState::new()),
        }
    }

    /// Tracks `entity` as `owner`'s clone and marks the owner in revival.
    /// Replaces any previous entry for `owner`, which is returned.
    pub fn register(&self, owner: Identity, entity: E, spawn_tick: Tick) -> Option<TrackedClone<E>> {
        let mut state = self.write();

        let replaced = state.remove_clone(&owner);
        // the same object cannot be the clone of two owners
        if let Some(previous_owner) = state.owners_by_entity.insert(entity, owner) {
            if previous_owner != owner {
                state.clones.remove(&previous_owner);
            }
        }
        state.clones.insert(
            owner,
            TrackedClone {
                owner,
                entity,
                spawn_tick,
            },
        );
        state.in_revival.insert(owner);

        replaced
    }

    /// Removes and returns `owner`'s entry. Reclaiming the object is up to
    /// the caller.
    pub fn unregister_by_owner(&self, owner: &Identity) -> Option<TrackedClone<E>> {
        self.write().remove_clone(owner)
    }

    /// Removes `owner`'s entry only if it still tracks `entity`, so that a
    /// replacement registered in the meantime survives
    pub fn unregister_if_tracking(&self, owner: &Identity, entity: &E) -> bool {
        let mut state = self.write();
        match state.clones.get(owner) {
            Some(tracked) if tracked.entity == *entity => {
                state.remove_clone(owner);
                true
            }
            _ => false,
        }
    }

    /// Removes `owner`'s entry and ends their revival, in one step, only if
    /// the entry still tracks `entity`. A replacement registered since the
    /// caller's snapshot keeps both its entry and its revival state.
    pub fn retire_if_tracking(&self, owner: &Identity, entity: &E) -> bool {
        let mut state = self.write();
        match state.clones.get(owner) {
            Some(tracked) if tracked.entity == *entity => {
                state.remove_clone(owner);
                state.in_revival.remove(owner);
                true
            }
            _ => false,
        }
    }

    pub fn lookup(&self, owner: &Identity) -> Option<TrackedClone<E>> {
        self.read().clones.get(owner).copied()
    }

    /// The owner whose clone is `entity`, if it is tracked
    pub fn owner_of(&self, entity: &E) -> Option<Identity> {
        self.read().owners_by_entity.get(entity).copied()
    }

    pub fn mark_revival(&self, owner: Identity) {
        self.write().in_revival.insert(owner);
    }

    /// Ends `owner`'s revival without touching its tracked clone.
    /// Returns whether the owner was in revival.
    pub fn clear_revival(&self, owner: &Identity) -> bool {
        self.write().in_revival.remove(owner)
    }

    pub fn is_in_revival(&self, owner: &Identity) -> bool {
        self.read().in_revival.contains(owner)
    }

    /// Stable copy of every entry, safe to iterate while the registry changes
    pub fn snapshot(&self) -> Vec<TrackedClone<E>> {
        self.read().clones.values().copied().collect()
    }

    /// Unconditional wipe of all entries and revival state
    pub fn clear_all(&self) {
        let mut state = self.write();
        state.clones.clear();
        state.owners_by_entity.clear();
        state.in_revival.clear();
    }

    pub fn len(&self) -> usize {
        self.read().clones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().clones.is_empty()
    }

    pub fn revival_count(&self) -> usize {
        self.read().in_revival.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState<E>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState<E>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
