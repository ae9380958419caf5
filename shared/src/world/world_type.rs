use std::collections::HashSet;

use crate::{HostError, Identity, MarkerValue, PartitionKey, Tick};

/// Read access to the host simulation's objects and sessions.
///
/// `E` is the host's own object key. The core only ever stores keys, never
/// objects: an object's lifetime belongs to the host.
pub trait WorldRefType<E> {
    /// All partitions currently loaded
    fn partitions(&self) -> Vec<PartitionKey>;

    /// Every object currently living in `partition`
    fn objects_in_partition(&self, partition: &PartitionKey) -> Vec<E>;

    /// Whether the object still exists and has not been removed
    fn has_object(&self, entity: &E) -> bool;

    /// Whether the object is of the session-owning kind that sweeps inspect
    fn is_tracked_kind(&self, entity: &E) -> bool;

    fn object_identity(&self, entity: &E) -> Result<Identity, HostError>;

    /// Registry key of the object's kind, e.g. `minecraft:player`
    fn object_kind(&self, entity: &E) -> Result<String, HostError>;

    /// Whether the object has a live network/session association
    fn has_connection(&self, entity: &E) -> Result<bool, HostError>;

    /// Ticks since the object was created
    fn object_age(&self, entity: &E) -> Result<Tick, HostError>;

    fn marker(&self, entity: &E, key: &str) -> Result<Option<MarkerValue>, HostError>;

    fn has_tag(&self, entity: &E, tag: &str) -> Result<bool, HostError>;

    /// Identities of every player with an active session
    fn active_session_ids(&self) -> HashSet<Identity>;

    /// The live object of `owner`'s session, if the owner is connected
    fn lookup_session(&self, owner: &Identity) -> Option<E>;

    // Provided

    fn has_marker(&self, entity: &E, key: &str) -> Result<bool, HostError> {
        Ok(self.marker(entity, key)?.is_some())
    }

    /// Reads a boolean marker. A missing marker reads as `false`.
    fn marker_bool(&self, entity: &E, key: &str) -> Result<bool, HostError> {
        match self.marker(entity, key)? {
            None => Ok(false),
            Some(MarkerValue::Bool(value)) => Ok(value),
            Some(other) => Err(HostError::MarkerTypeMismatch {
                key: key.to_string(),
                expected: "bool",
                found: other.type_name(),
            }),
        }
    }

    fn marker_identity(&self, entity: &E, key: &str) -> Result<Option<Identity>, HostError> {
        match self.marker(entity, key)? {
            None => Ok(None),
            Some(MarkerValue::Identity(value)) => Ok(Some(value)),
            Some(other) => Err(HostError::MarkerTypeMismatch {
                key: key.to_string(),
                expected: "identity",
                found: other.type_name(),
            }),
        }
    }
}

/// Write access to the host simulation's objects
pub trait WorldMutType<E>: WorldRefType<E> {
    fn set_marker(&mut self, entity: &E, key: &str, value: MarkerValue) -> Result<(), HostError>;

    fn remove_marker(&mut self, entity: &E, key: &str) -> Result<(), HostError>;

    /// Removes the object from the simulation. Discarding an object that is
    /// already gone is a no-op.
    fn discard(&mut self, entity: &E) -> Result<(), HostError>;
}
