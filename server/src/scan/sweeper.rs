use std::{collections::BTreeMap, fmt::Debug, hash::Hash};

use log::{info, warn};

use detangler_shared::{HostError, WorldMutType};

use crate::{
    heuristics::{HeuristicEvaluator, SessionState},
    registry::{CloneRegistry, TrackedClone},
    scan::{OrphanRecord, ScanResult},
    DetanglerConfig,
};

/// Counts from one registry reconciliation pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Entries examined
    pub checked: usize,
    /// Entries dropped because their object no longer exists
    pub dropped_missing: usize,
    /// Entries whose object was discarded
    pub reclaimed: usize,
    /// Entries found orphaned but left in place (reclaim disabled)
    pub orphaned: usize,
    /// Entries dropped after a host failure
    pub failed: usize,
}

enum EntryAction {
    Kept,
    DroppedMissing,
    Reclaimed,
    Orphaned,
}

/// Scans the whole world for orphaned clones and reconciles the registry
/// against it. Borrowed from the owning [`Detangler`](crate::Detangler) for
/// the duration of one pass.
pub struct Sweeper<'a, E> {
    evaluator: &'a HeuristicEvaluator,
    registry: &'a CloneRegistry<E>,
    log_notifications: bool,
    verbose: bool,
}

impl<'a, E: Copy + Eq + Hash + Debug> Sweeper<'a, E> {
    pub fn new(
        evaluator: &'a HeuristicEvaluator,
        registry: &'a CloneRegistry<E>,
        config: &DetanglerConfig,
    ) -> Self {
        Self {
            evaluator,
            registry,
            log_notifications: config.enable_log_notifications,
            verbose: config.verbose_logging,
        }
    }

    /// Full sweep: classifies every tracked-kind object of every partition,
    /// optionally reclaiming orphans, then reconciles the registry
    pub fn sweep<W: WorldMutType<E>>(&self, world: &mut W, reclaim: bool) -> ScanResult {
        let sessions = SessionState::capture::<E, W>(&*world);

        let mut total_found = 0;
        let mut per_partition = BTreeMap::new();
        let mut entities = Vec::new();

        for partition in world.partitions() {
            if self.verbose {
                info!("Scanning partition: {}", partition);
            }

            let mut partition_count = 0;
            for entity in world.objects_in_partition(&partition) {
                if !world.is_tracked_kind(&entity) {
                    continue;
                }

                let flags = self.evaluator.evaluate(&*world, &entity, &sessions);
                if !HeuristicEvaluator::classify(&flags) {
                    continue;
                }

                partition_count += 1;
                entities.push(OrphanRecord {
                    identity: world.object_identity(&entity).ok(),
                    partition: partition.clone(),
                    age: world.object_age(&entity).unwrap_or(0),
                    flags,
                });

                if reclaim {
                    let discarded = world.discard(&entity);
                    self.forget_entity(&entity);
                    if let Err(error) = discarded {
                        warn!("Failed to discard orphan {:?}: {}", entity, error);
                    }
                }
            }

            if partition_count > 0 {
                total_found += partition_count;
                per_partition.insert(partition, partition_count);
            }
        }

        let outcome = self.reconcile_with(world, &sessions, reclaim);
        if self.verbose && outcome.checked > 0 {
            info!("Registry reconciliation: {:?}", outcome);
        }

        ScanResult::new(total_found, per_partition, entities)
    }

    /// Registry-only pass: no world enumeration, bounded by registry size.
    ///
    /// An entry whose object is gone is dropped. An entry whose owner has no
    /// session or is no longer in revival is orphaned by registry membership
    /// alone, and its object is discarded when `reclaim` is set.
    pub fn reconcile_registry<W: WorldMutType<E>>(
        &self,
        world: &mut W,
        reclaim: bool,
    ) -> ReconcileOutcome {
        let sessions = SessionState::capture::<E, W>(&*world);
        self.reconcile_with(world, &sessions, reclaim)
    }

    fn reconcile_with<W: WorldMutType<E>>(
        &self,
        world: &mut W,
        sessions: &SessionState,
        reclaim: bool,
    ) -> ReconcileOutcome {
        let mut outcome = ReconcileOutcome::default();

        for tracked in self.registry.snapshot() {
            outcome.checked += 1;
            match self.reconcile_entry(world, sessions, &tracked, reclaim) {
                Ok(EntryAction::Kept) => {}
                Ok(EntryAction::DroppedMissing) => outcome.dropped_missing += 1,
                Ok(EntryAction::Reclaimed) => outcome.reclaimed += 1,
                Ok(EntryAction::Orphaned) => outcome.orphaned += 1,
                Err(error) => {
                    warn!(
                        "Failed to reconcile clone of player {}: {}",
                        tracked.owner, error
                    );
                    self.registry
                        .retire_if_tracking(&tracked.owner, &tracked.entity);
                    outcome.failed += 1;
                }
            }
        }

        outcome
    }

    fn reconcile_entry<W: WorldMutType<E>>(
        &self,
        world: &mut W,
        sessions: &SessionState,
        tracked: &TrackedClone<E>,
        reclaim: bool,
    ) -> Result<EntryAction, HostError> {
        if !world.has_object(&tracked.entity) {
            self.registry
                .unregister_if_tracking(&tracked.owner, &tracked.entity);
            return Ok(EntryAction::DroppedMissing);
        }

        let owner_present = sessions.contains(&tracked.owner);
        let in_revival = self.registry.is_in_revival(&tracked.owner);
        if owner_present && in_revival {
            return Ok(EntryAction::Kept);
        }

        if !reclaim {
            return Ok(EntryAction::Orphaned);
        }

        if self.log_notifications {
            info!(
                "Discarding orphaned revival clone for player: {}",
                tracked.owner
            );
        }
        world.discard(&tracked.entity)?;
        self.registry
            .retire_if_tracking(&tracked.owner, &tracked.entity);

        Ok(EntryAction::Reclaimed)
    }

    // Keeps the registry in step with an object the sweep just discarded
    fn forget_entity(&self, entity: &E) {
        if let Some(owner) = self.registry.owner_of(entity) {
            self.registry.retire_if_tracking(&owner, entity);
        }
    }
}
