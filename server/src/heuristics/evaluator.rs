use std::fmt::Debug;

use log::debug;

use detangler_shared::{
    keys, HeuristicFlag, HeuristicFlags, HostError, Identity, MarkerVocabulary, Tick,
    WorldRefType,
};

use crate::{heuristics::SessionState, DetanglerConfig};

/// Number of independent flags at which an object is classified as an orphan
pub const ORPHAN_FLAG_THRESHOLD: usize = 2;

/// Stateless classifier turning what the host knows about an object into
/// heuristic flags. Nothing here writes to the world, and a signal that
/// cannot be read is treated as absent.
#[derive(Clone, Debug)]
pub struct HeuristicEvaluator {
    vocabulary: MarkerVocabulary,
    high_age_ticks: Tick,
}

impl HeuristicEvaluator {
    pub fn new(vocabulary: MarkerVocabulary, high_age_ticks: Tick) -> Self {
        Self {
            vocabulary,
            high_age_ticks,
        }
    }

    pub fn from_config(config: &DetanglerConfig) -> Self {
        Self::new(config.vocabulary.clone(), config.high_age_ticks)
    }

    /// Collects every signal that currently fires for `entity`, in check order
    pub fn evaluate<E: Debug, W: WorldRefType<E>>(
        &self,
        world: &W,
        entity: &E,
        sessions: &SessionState,
    ) -> HeuristicFlags {
        let mut flags = HeuristicFlags::new();

        // 1. Not actually connected
        let connected = signal(entity, "connection", world.has_connection(entity));
        if connected == Some(false) {
            flags.insert(HeuristicFlag::NoConnection);
        }

        // 2. Not in the session list
        let listed = signal(entity, "identity", world.object_identity(entity))
            .map(|identity| sessions.contains(&identity));
        if listed == Some(false) {
            flags.insert(HeuristicFlag::NotInSessionList);
        }

        // 3. Revival / corpse / grave markers
        for marker in &self.vocabulary.orphan_markers {
            if signal(entity, &marker.key, world.has_marker(entity, &marker.key)) == Some(true) {
                flags.insert(HeuristicFlag::Tag(marker.label.clone()));
            }
        }
        if flags.has_tag() {
            flags.insert(HeuristicFlag::RevivalTag);
        }

        // 4. Existed too long without looking like a real session
        let legitimate = connected == Some(true) && listed == Some(true);
        if !legitimate {
            if let Some(age) = signal(entity, "age", world.object_age(entity)) {
                if age > self.high_age_ticks {
                    flags.insert(HeuristicFlag::HighAge);
                }
            }
        }

        flags
    }

    pub fn is_orphan<E: Debug, W: WorldRefType<E>>(
        &self,
        world: &W,
        entity: &E,
        sessions: &SessionState,
    ) -> bool {
        Self::classify(&self.evaluate(world, entity, sessions))
    }

    /// Orphan classification of an already evaluated flag set
    pub fn classify(flags: &HeuristicFlags) -> bool {
        flags.len() >= ORPHAN_FLAG_THRESHOLD
    }

    /// Whether a freshly created object is a revival clone of some player
    pub fn detect_clone<E: Debug, W: WorldRefType<E>>(&self, world: &W, entity: &E) -> bool {
        for key in &self.vocabulary.detection_keys {
            if signal(entity, key, world.has_marker(entity, key)) == Some(true) {
                return true;
            }
        }

        if let Some(kind) = signal(entity, "kind", world.object_kind(entity)) {
            if self.vocabulary.kind_matches(&kind) {
                return true;
            }
        }

        if world.is_tracked_kind(entity) {
            let has_owner = signal(entity, keys::OWNER, world.has_marker(entity, keys::OWNER));
            let is_clone = signal(
                entity,
                keys::IS_REVIVAL_CLONE,
                world.marker_bool(entity, keys::IS_REVIVAL_CLONE),
            );
            if has_owner == Some(true) || is_clone == Some(true) {
                return true;
            }
        }

        false
    }

    /// The real player a clone belongs to: the first owner key holding an
    /// identity, then the core's own owner marker, then the object's own
    /// identity if it is of the tracked kind
    pub fn clone_owner<E: Debug, W: WorldRefType<E>>(
        &self,
        world: &W,
        entity: &E,
    ) -> Option<Identity> {
        let owner_keys = self
            .vocabulary
            .owner_keys
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(keys::OWNER));
        for key in owner_keys {
            if let Some(Some(owner)) = signal(entity, key, world.marker_identity(entity, key)) {
                return Some(owner);
            }
        }

        if world.is_tracked_kind(entity) {
            return signal(entity, "identity", world.object_identity(entity));
        }

        None
    }

    /// Whether the death of `entity` must be hidden from corpse/grave handling
    pub fn is_protected_from_death<E: Debug, W: WorldRefType<E>>(
        &self,
        world: &W,
        entity: &E,
    ) -> bool {
        let marked = [keys::CLONE_MARK, keys::IS_REVIVAL_CLONE]
            .into_iter()
            .any(|key| signal(entity, key, world.marker_bool(entity, key)) == Some(true));
        if marked {
            return true;
        }

        self.vocabulary
            .death_block_tags
            .iter()
            .any(|tag| signal(entity, tag, world.has_tag(entity, tag)) == Some(true))
    }
}

// A signal that cannot be read counts as absent.
fn signal<E: Debug, T>(entity: &E, what: &str, result: Result<T, HostError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            debug!("could not read `{}` of {:?}: {}", what, entity, error);
            None
        }
    }
}
