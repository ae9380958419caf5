mod scan_result;
mod sweeper;

pub use scan_result::{OrphanRecord, ScanResult};
pub use sweeper::{ReconcileOutcome, Sweeper};
