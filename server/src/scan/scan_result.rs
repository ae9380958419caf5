use std::collections::BTreeMap;

use serde::Serialize;

use detangler_shared::{HeuristicFlags, Identity, PartitionKey, Tick};

/// Information about one object classified as an orphan during a sweep
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrphanRecord {
    /// `None` when the host could not report the object's identity
    #[serde(rename = "uuid")]
    pub identity: Option<Identity>,
    #[serde(rename = "dimension")]
    pub partition: PartitionKey,
    #[serde(rename = "tickCount")]
    pub age: Tick,
    pub flags: HeuristicFlags,
}

/// Outcome of one sweep: totals, per-partition counts and per-object
/// records. Built once per sweep and never changed afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanResult {
    total_found: usize,
    per_partition: BTreeMap<PartitionKey, usize>,
    entities: Vec<OrphanRecord>,
}

impl ScanResult {
    pub(crate) fn new(
        total_found: usize,
        per_partition: BTreeMap<PartitionKey, usize>,
        entities: Vec<OrphanRecord>,
    ) -> Self {
        Self {
            total_found,
            per_partition,
            entities,
        }
    }

    pub fn total_found(&self) -> usize {
        self.total_found
    }

    /// Orphan count per partition. Partitions without orphans are absent.
    pub fn per_partition(&self) -> &BTreeMap<PartitionKey, usize> {
        &self.per_partition
    }

    pub fn entities(&self) -> &[OrphanRecord] {
        &self.entities
    }

    pub fn is_empty(&self) -> bool {
        self.total_found == 0
    }
}
