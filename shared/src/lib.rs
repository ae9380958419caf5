//! # Detangler Shared
//! Common functionality shared between the detangler core and the adapters
//! that plug it into a host simulation.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod heuristic_flag;
mod marker;
mod types;
mod world;

pub use heuristic_flag::{HeuristicFlag, HeuristicFlags};
pub use marker::{
    keys, MarkerValue, MarkerVocabulary, RecognizedMarker, VocabularyError,
    CURRENT_VOCABULARY_VERSION,
};
pub use types::{Identity, PartitionKey, Tick, TickPhase};
pub use world::{
    error::HostError,
    world_type::{WorldMutType, WorldRefType},
};
