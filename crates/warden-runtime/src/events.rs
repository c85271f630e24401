//! Progress events emitted by long-running supervisory runs.
//!
//! Purely observational: subscribers see periodic progress and a final
//! summary, and the emitting run never blocks on them; lagging or absent
//! subscribers are tolerated.

use serde::{Deserialize, Serialize};
use warden_kernel::StabilitySnapshot;

use crate::guard::GuardReport;

/// Capacity of the guard's broadcast event stream.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// One observation from a continuity guard run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum GuardEvent {
    /// Periodic progress, emitted every `report_every` steps.
    Progress {
        step: u64,
        total_steps: u64,
        stability: StabilitySnapshot,
        anomalies_detected: u64,
    },
    /// The run finished and appended its summary receipt.
    Completed(GuardReport),
}
