//! Continuity guard: a supervisory heartbeat over stability and integrity.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::RuntimeError;
use crate::events::{GuardEvent, EVENT_CHANNEL_CAPACITY};
use crate::runtime::WardenRuntime;

/// Summary of one completed guard run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GuardReport {
    pub steps_completed: u64,
    pub continuities_maintained: u64,
    pub anomalies_detected: u64,
    pub final_stability: f64,
    pub final_posterior: f64,
    pub integrity: bool,
}

/// Long-running supervisory loop sampling stability and chain integrity.
///
/// A heartbeat, not a correctness mechanism: it keeps the Bayesian
/// posterior continuously informed even absent real traffic. Each step
/// takes the coordinator lock once, applies detection-and-mitigation
/// feedback, releases it, and yields, so concurrent authorization requests
/// are never starved, and the cooperative stop flag is honored between
/// steps.
pub struct ContinuityGuard {
    runtime: Arc<WardenRuntime>,
    stop: Arc<AtomicBool>,
    events: broadcast::Sender<GuardEvent>,
}

impl ContinuityGuard {
    /// Creates a guard over a shared runtime.
    #[must_use]
    pub fn new(runtime: Arc<WardenRuntime>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            runtime,
            stop: Arc::new(AtomicBool::new(false)),
            events,
        }
    }

    /// Subscribe to periodic progress observations.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<GuardEvent> {
        self.events.subscribe()
    }

    /// Cooperative stop handle, shareable across tasks.
    #[must_use]
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Requests the current run to stop at its next iteration.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Runs the heartbeat with the configured step budget.
    ///
    /// # Errors
    ///
    /// Fails only on lock poisoning or a receipt-chain failure.
    pub async fn run(&self) -> Result<GuardReport, RuntimeError> {
        let policy = self.runtime.config().guard.clone();
        self.run_steps(policy.total_steps, policy.report_every).await
    }

    /// Runs the heartbeat for an explicit step budget, then appends a
    /// summary receipt to the runtime chain.
    ///
    /// # Errors
    ///
    /// Fails only on lock poisoning or a receipt-chain failure.
    pub async fn run_steps(
        &self,
        total_steps: u64,
        report_every: u64,
    ) -> Result<GuardReport, RuntimeError> {
        let policy = self.runtime.config().guard.clone();
        let mut continuities: u64 = 0;
        let mut anomalies: u64 = 0;
        let mut steps_completed: u64 = 0;

        for step in 1..=total_steps {
            if self.stop.load(Ordering::SeqCst) {
                break;
            }

            let integrity_ok = self.runtime.verify_integrity();
            let healthy = self.runtime.continuity_tick(integrity_ok, &policy)?;
            steps_completed = step;
            if healthy {
                continuities += 1;
            } else {
                anomalies += 1;
            }

            if report_every > 0 && step % report_every == 0 {
                let stability = self.runtime.stability()?;
                debug!(
                    step,
                    total_steps,
                    stability = stability.stability_index,
                    posterior = stability.posterior,
                    anomalies,
                    "guard progress"
                );
                let _ = self.events.send(GuardEvent::Progress {
                    step,
                    total_steps,
                    stability,
                    anomalies_detected: anomalies,
                });
            }

            tokio::task::yield_now().await;
        }

        let stability = self.runtime.stability()?;
        let report = GuardReport {
            steps_completed,
            continuities_maintained: continuities,
            anomalies_detected: anomalies,
            final_stability: stability.stability_index,
            final_posterior: stability.posterior,
            integrity: self.runtime.verify_integrity(),
        };
        self.runtime.receipts().append(json!({
            "event": "continuity_guard.report",
            "report": report,
        }))?;
        let _ = self.events.send(GuardEvent::Completed(report.clone()));
        Ok(report)
    }
}
