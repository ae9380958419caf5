use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Serialize;

use detangler_shared::PartitionKey;

use crate::{
    scan::{OrphanRecord, ScanResult},
    DetanglerError,
};

/// Name of the file written by [`write_report`]
pub const REPORT_FILE_NAME: &str = "detangler_report.json";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    timestamp: u64,
    total_found: usize,
    dimensions: &'a BTreeMap<PartitionKey, usize>,
    entities: &'a [OrphanRecord],
}

/// Writes `result` as pretty-printed JSON to `dir`, replacing any previous
/// report. `timestamp` is in unix seconds. Returns the path written.
pub fn write_report(
    result: &ScanResult,
    dir: &Path,
    timestamp: u64,
) -> Result<PathBuf, DetanglerError> {
    let report = Report {
        timestamp,
        total_found: result.total_found(),
        dimensions: result.per_partition(),
        entities: result.entities(),
    };
    let json = serde_json::to_string_pretty(&report)?;

    let path = dir.join(REPORT_FILE_NAME);
    fs::write(&path, json).map_err(|source| DetanglerError::Report {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}
