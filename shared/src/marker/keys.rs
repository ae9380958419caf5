//! Persisted marker keys written to and read from simulation objects.
//!
//! The names are fixed: the cooperating revival subsystem and any corpse or
//! grave subsystem read them to tell a revival clone from a real death.

/// Boolean: object is a detected revival clone
pub const CLONE_MARK: &str = "DetanglerClone";

/// Integer: host tick at which the clone was detected
pub const SPAWN_TICK: &str = "DetanglerSpawnTime";

/// Identity: the real player owning the clone
pub const OWNER: &str = "DetanglerOwner";

/// Boolean: set on the owner's session object while its clone is tracked
pub const IN_REVIVAL: &str = "DetanglerInRevival";

/// Boolean: the cooperating subsystem's own clone marker
pub const IS_REVIVAL_CLONE: &str = "IsRevivalClone";
