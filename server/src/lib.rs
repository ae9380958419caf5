//! # Detangler Server
//! Tracks the revival clones a cooperating subsystem spawns for downed
//! players, and reclaims the ones left orphaned once their owner respawns,
//! logs out or leaves revival.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use detangler_shared::{
        keys, HeuristicFlag, HeuristicFlags, HostError, Identity, MarkerValue, MarkerVocabulary,
        PartitionKey, RecognizedMarker, Tick, TickPhase, WorldMutType, WorldRefType,
    };
}

mod command;
mod error;
mod heuristics;
mod registry;
mod report;
mod scan;
mod scheduler;
mod server;

pub use command::{CommandReply, CommandSource, DetanglerCommand, REQUIRED_PERMISSION_LEVEL};
pub use error::{ConfigError, DetanglerError};
pub use heuristics::{HeuristicEvaluator, SessionState, ORPHAN_FLAG_THRESHOLD};
pub use registry::{CloneRegistry, TrackedClone};
pub use report::{write_report, REPORT_FILE_NAME};
pub use scan::{OrphanRecord, ReconcileOutcome, ScanResult, Sweeper};
pub use scheduler::{DueChecks, PeriodicScheduler};
pub use server::{
    DeathDisposition, Detangler, DetanglerConfig, DEFAULT_CLEAN_INTERVAL_TICKS,
    DEFAULT_HIGH_AGE_TICKS, DEFAULT_REGISTRY_CHECK_INTERVAL_TICKS,
};
