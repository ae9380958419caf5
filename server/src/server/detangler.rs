use std::{
    fmt::Debug,
    hash::Hash,
    path::Path,
    sync::atomic::{AtomicBool, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use log::{debug, info, log_enabled, warn, Level};

use detangler_shared::{
    keys, Identity, MarkerValue, PartitionKey, Tick, TickPhase, WorldMutType, WorldRefType,
};

use crate::{
    command::{CommandReply, CommandSource, DetanglerCommand, REQUIRED_PERMISSION_LEVEL},
    heuristics::{HeuristicEvaluator, SessionState},
    registry::{CloneRegistry, TrackedClone},
    report::write_report,
    scan::{ScanResult, Sweeper},
    scheduler::PeriodicScheduler,
    DetanglerConfig, DetanglerError,
};

/// What the host should do with a death notification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeathDisposition {
    /// Let the death proceed to other subsystems
    Allow,
    /// Cancel the death so corpse and grave handling never sees it
    Suppress,
}

/// Tracks revival clones and reclaims them once their owner's revival
/// context has ended.
///
/// Every method takes `&self`, so one instance can be shared behind an `Arc`
/// between the tick loop and network-side notifications. Nothing here returns
/// an error into the host's dispatch path: failures are logged and the
/// affected entry is dropped.
pub struct Detangler<E: Copy + Eq + Hash + Send + Sync + Debug> {
    config: DetanglerConfig,
    evaluator: HeuristicEvaluator,
    registry: CloneRegistry<E>,
    scheduler: PeriodicScheduler,
    running: AtomicBool,
    started_once: AtomicBool,
}

impl<E: Copy + Eq + Hash + Send + Sync + Debug> Detangler<E> {
    /// Create a new Detangler. It does not act on ticks until [`start`] is
    /// called. Invalid config values are replaced by their defaults.
    ///
    /// [`start`]: Detangler::start
    pub fn new(config: DetanglerConfig) -> Self {
        let config = config.sanitized();
        let evaluator = HeuristicEvaluator::from_config(&config);
        let scheduler = PeriodicScheduler::from_config(&config);

        Self {
            config,
            evaluator,
            registry: CloneRegistry::new(),
            scheduler,
            running: AtomicBool::new(false),
            started_once: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &DetanglerConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &HeuristicEvaluator {
        &self.evaluator
    }

    pub fn registry(&self) -> &CloneRegistry<E> {
        &self.registry
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    // Lifecycle

    /// Enables the periodic checks. The first successful start also runs one
    /// reclaiming sweep if `auto_run_on_start` is set. Starting an already
    /// running Detangler does nothing.
    pub fn start<W: WorldMutType<E>>(&self, world: &mut W) {
        if self.running.swap(true, Ordering::AcqRel) {
            return;
        }
        self.scheduler.reset();
        if self.config.enable_log_notifications {
            info!("Detangler started");
        }

        let first_start = !self.started_once.swap(true, Ordering::AcqRel);
        if first_start && self.config.auto_run_on_start {
            let removed = self.run_cleanup(world, true);
            if removed > 0 {
                info!("Auto-clean complete: removed {} orphan clone(s).", removed);
            }
        }
    }

    /// Disables the periodic checks and forgets every tracked clone without
    /// touching the objects themselves
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
        if self.config.enable_log_notifications {
            info!("Detangler stopping, clearing clone tracking state.");
        }
        self.registry.clear_all();
        self.scheduler.reset();
    }

    /// The host is tearing down; equivalent to [`stop`](Detangler::stop)
    pub fn on_shutdown(&self) {
        self.stop();
    }

    // Notifications

    /// Must be called whenever an object joins the world. Returns the owner
    /// the object was registered as a clone of, if it was detected as one.
    pub fn on_object_created<W: WorldMutType<E>>(
        &self,
        world: &mut W,
        entity: &E,
        partition: &PartitionKey,
        current_tick: Tick,
    ) -> Option<Identity> {
        if !self.evaluator.detect_clone(&*world, entity) {
            return None;
        }

        if self.config.enable_log_notifications {
            info!("Detected revival clone {:?} in {}", entity, partition);
        }
        if log_enabled!(Level::Debug) {
            let sessions = SessionState::capture::<E, W>(&*world);
            let flags = self.evaluator.evaluate(&*world, entity, &sessions);
            debug!("Flags of new clone {:?}: [{}]", entity, flags.labels().join(", "));
        }

        let spawn_tick = i64::try_from(current_tick).unwrap_or(i64::MAX);
        write_marker(world, entity, keys::CLONE_MARK, MarkerValue::Bool(true));
        write_marker(world, entity, keys::SPAWN_TICK, MarkerValue::Int(spawn_tick));
        write_marker(world, entity, keys::IS_REVIVAL_CLONE, MarkerValue::Bool(true));

        let owner = self.evaluator.clone_owner(&*world, entity)?;
        write_marker(world, entity, keys::OWNER, MarkerValue::Identity(owner));

        if let Some(previous) = self.registry.register(owner, *entity, current_tick) {
            if previous.entity != *entity {
                debug!(
                    "Clone {:?} of player {} replaced by {:?}",
                    previous.entity, owner, entity
                );
            }
        }
        if let Some(session) = world.lookup_session(&owner) {
            write_marker(world, &session, keys::IN_REVIVAL, MarkerValue::Bool(true));
        }

        if self.config.enable_log_notifications {
            info!("Registered clone for player: {}", owner);
        }
        Some(owner)
    }

    /// Must be called before the host hands a death to other subsystems
    pub fn on_object_died<W: WorldRefType<E>>(&self, world: &W, entity: &E) -> DeathDisposition {
        if self.evaluator.is_protected_from_death(world, entity) {
            debug!("Blocking death event for revival clone {:?}", entity);
            return DeathDisposition::Suppress;
        }
        DeathDisposition::Allow
    }

    /// The owner got a fresh session object (respawn, or returning from a
    /// dimension). Any clone still tracked for them is superseded and
    /// discarded. Returns whether an object was discarded.
    pub fn on_owner_reassigned<W: WorldMutType<E>>(
        &self,
        world: &mut W,
        owner: &Identity,
        was_death: bool,
    ) -> bool {
        if self.config.enable_log_notifications {
            info!(
                "Player clone event - owner: {}, was_death: {}",
                owner, was_death
            );
        }

        let discarded = self.discard_tracked(world, owner, "respawn");
        self.registry.clear_revival(owner);

        if let Some(session) = world.lookup_session(owner) {
            for key in [keys::IN_REVIVAL, keys::IS_REVIVAL_CLONE] {
                if let Err(error) = world.remove_marker(&session, key) {
                    warn!("Failed to remove `{}` from player {}: {}", key, owner, error);
                }
            }
        }

        discarded
    }

    /// The owner logged out. Returns whether an object was discarded.
    pub fn on_owner_session_ended<W: WorldMutType<E>>(&self, world: &mut W, owner: &Identity) -> bool {
        let discarded = self.discard_tracked(world, owner, "logout");
        self.registry.clear_revival(owner);
        discarded
    }

    /// The owner's revival context ended without a respawn. The clone stays
    /// tracked until the next registry check reclaims it.
    pub fn on_revival_ended(&self, owner: &Identity) {
        if self.registry.clear_revival(owner) {
            debug!("Player {} is no longer in revival", owner);
        }
    }

    /// Must be called for both phases of every host tick; only the end of a
    /// tick drives the periodic checks, so that every notification of that
    /// tick is already visible to them
    pub fn on_tick<W: WorldMutType<E>>(&self, world: &mut W, current_tick: Tick, phase: TickPhase) {
        if phase != TickPhase::End || !self.is_running() {
            return;
        }

        let due = self.scheduler.advance(current_tick);
        if !due.any() {
            return;
        }

        if due.registry_check {
            let outcome = self.sweeper().reconcile_registry(world, true);
            if outcome.reclaimed > 0 || outcome.failed > 0 {
                debug!("Registry check at tick {}: {:?}", current_tick, outcome);
            }
        }

        if due.full_sweep {
            let removed = self.run_cleanup(world, self.config.auto_remove);
            if self.config.verbose_logging && removed > 0 {
                info!("Periodic cleanup removed {} orphan clone(s).", removed);
            }
        }
    }

    // Scans

    /// Total orphan count of a full sweep
    pub fn scan_count<W: WorldMutType<E>>(&self, world: &mut W, reclaim: bool) -> usize {
        self.scan_detailed(world, reclaim).total_found()
    }

    pub fn scan_detailed<W: WorldMutType<E>>(&self, world: &mut W, reclaim: bool) -> ScanResult {
        self.sweeper().sweep(world, reclaim)
    }

    pub fn sweeper(&self) -> Sweeper<'_, E> {
        Sweeper::new(&self.evaluator, &self.registry, &self.config)
    }

    // Commands

    /// Runs an administrative command on behalf of `source`. Reports are
    /// written into `report_dir`.
    pub fn execute_command<W: WorldMutType<E>>(
        &self,
        world: &mut W,
        source: &CommandSource,
        command: DetanglerCommand,
        report_dir: &Path,
    ) -> Result<CommandReply, DetanglerError> {
        if !source.has_permission(REQUIRED_PERMISSION_LEVEL) {
            return Err(DetanglerError::PermissionDenied {
                required: REQUIRED_PERMISSION_LEVEL,
                actual: source.permission_level,
            });
        }

        let result = self.scan_detailed(world, command.reclaims());
        let found = result.total_found();

        match command {
            DetanglerCommand::Scan | DetanglerCommand::DryRun => Ok(CommandReply::new(
                format!("Detangler detected {} potential clone(s).", found),
                found,
                false,
            )),
            DetanglerCommand::Run => Ok(CommandReply::new(
                format!("Detangler removed {} orphan clone(s).", found),
                found,
                true,
            )),
            DetanglerCommand::Report => {
                if result.is_empty() {
                    return Ok(CommandReply::new("No orphan clones detected.", 0, false));
                }
                let mut message = String::from("Detangler Report:\n");
                for (partition, count) in result.per_partition() {
                    message.push_str(&format!("  {}: {}\n", partition, count));
                }
                message.push_str(&format!("Total: {}", found));
                Ok(CommandReply::new(message, found, false))
            }
            DetanglerCommand::Dump => {
                let path = write_report(&result, report_dir, unix_timestamp())?;
                Ok(CommandReply::new(
                    format!("Report saved to: {}", path.display()),
                    found,
                    true,
                ))
            }
        }
    }

    // Private

    fn run_cleanup<W: WorldMutType<E>>(&self, world: &mut W, reclaim: bool) -> usize {
        info!("cleanup_start");
        let removed = self.scan_count(world, reclaim);
        info!("removed={}", removed);
        info!("cleanup_end");
        removed
    }

    fn discard_tracked<W: WorldMutType<E>>(&self, world: &mut W, owner: &Identity, reason: &str) -> bool {
        let TrackedClone { entity, .. } = match self.registry.unregister_by_owner(owner) {
            Some(tracked) => tracked,
            None => return false,
        };
        if !world.has_object(&entity) {
            return false;
        }

        if self.config.enable_log_notifications {
            info!("Discarding revival clone for player {} on {}", owner, reason);
        }
        match world.discard(&entity) {
            Ok(()) => true,
            Err(error) => {
                warn!("Failed to discard clone of player {} on {}: {}", owner, reason, error);
                false
            }
        }
    }
}

fn write_marker<E: Debug, W: WorldMutType<E>>(world: &mut W, entity: &E, key: &str, value: MarkerValue) {
    if let Err(error) = world.set_marker(entity, key, value) {
        warn!("Failed to write `{}` on {:?}: {}", key, entity, error);
    }
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}
