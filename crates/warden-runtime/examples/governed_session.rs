//! A complete governed session: authorize an action end to end, run a
//! short continuity guard pass, then certify the gate under adversarial
//! synthetic load.
//!
//! ```bash
//! RUST_LOG=info cargo run --example governed_session
//! ```

use std::sync::Arc;

use anyhow::Result;
use warden_kernel::{Action, RiskClass};
use warden_runtime::{ContinuityGuard, GuardEvent, ResilienceProver, WardenRuntime};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let runtime = Arc::new(WardenRuntime::new());
    println!("runtime public key: {}", runtime.public_key_hex());

    // Authorize one real action through the gate.
    let action = Action::new()
        .with_field("intent", "transfer")
        .with_field("amount", 10);
    let (token, outcome) = runtime.process_action("agent-1", &action, RiskClass::Medium)?;
    println!(
        "agent-1 {} at tier {} (nonce {})",
        outcome, token.tier, token.nonce
    );

    // A replay of the same token is rejected.
    let replay = runtime.evaluate(&action, &token)?;
    println!("replay attempt: {replay}");

    // Run a short supervisory pass, watching its progress events.
    let guard = ContinuityGuard::new(runtime.clone());
    let mut events = guard.subscribe();
    let report = guard.run_steps(2_000, 500).await?;
    while let Ok(GuardEvent::Progress { step, stability, .. }) = events.try_recv() {
        println!(
            "guard step {step}: stability {:.4}, posterior {:.4}",
            stability.stability_index, stability.posterior
        );
    }
    println!(
        "guard finished: {} continuities, {} anomalies, integrity {}",
        report.continuities_maintained, report.anomalies_detected, report.integrity
    );

    // Certify the gate under adversarial and byzantine load.
    let mut prover = ResilienceProver::new(runtime.clone());
    let certificate = prover.run_proof_suite(100, 0.33, 0.4).await?;
    println!(
        "resilience certificate {}: success rate {:.3}, posterior {:.3}, verified {}",
        certificate.certificate_id,
        certificate.success_rate,
        certificate.posterior,
        certificate.verify(runtime.public_key())
    );

    println!(
        "receipt chain: {} entries, verified {}",
        runtime.receipts().len(),
        runtime.verify_integrity()
    );
    Ok(())
}
