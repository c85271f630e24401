//! End-to-end governance flow across the runtime surface.

use std::sync::Arc;

use chrono::Duration;
use warden_kernel::{Action, AuthorityTier, RiskClass};
use warden_runtime::{ContinuityGuard, ResilienceProver, RuntimeConfig, WardenRuntime};

fn transfer_action() -> Action {
    Action::new()
        .with_field("intent", "transfer")
        .with_field("amount", 10)
}

#[test]
fn authorize_commit_and_audit() {
    let runtime = WardenRuntime::new();
    let action = transfer_action();
    let chain_len_before = runtime.receipts().len();

    let token = runtime
        .issue_token("agent-1", &action, RiskClass::Medium)
        .unwrap();
    assert_eq!(token.actor, "agent-1");
    assert_eq!(token.tier, AuthorityTier::T2);
    assert_eq!(token.nonce, 1);
    assert_eq!(token.expires_at - token.issued_at, Duration::seconds(300));
    assert!(token.verify(runtime.public_key()));

    let outcome = runtime.evaluate(&action, &token).unwrap();
    assert!(outcome.is_committed());
    assert_eq!(outcome.reason(), "execution committed");

    assert!(runtime.verify_integrity());
    assert_eq!(runtime.receipts().len(), chain_len_before + 1);

    let exported = runtime.export_receipts();
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].record["actor"], "agent-1");
    assert_eq!(exported[0].record["reason"], "execution committed");
}

#[test]
fn tokens_bind_one_specific_action() {
    let runtime = WardenRuntime::new();
    let token = runtime
        .issue_token("agent-1", &transfer_action(), RiskClass::Low)
        .unwrap();

    let drained = transfer_action().with_field("amount", 1_000_000);
    let outcome = runtime.evaluate(&drained, &token).unwrap();
    assert_eq!(outcome.reason(), "action mismatch");

    // The nonce survived for the genuine action.
    let outcome = runtime.evaluate(&transfer_action(), &token).unwrap();
    assert!(outcome.is_committed());
}

#[tokio::test]
async fn guard_and_prover_share_one_runtime() {
    let config = RuntimeConfig {
        license_key: Some("WARDEN-integration".to_string()),
        ..RuntimeConfig::default()
    };
    let runtime = Arc::new(WardenRuntime::with_config(config));

    let (_, outcome) = runtime
        .process_action("agent-1", &transfer_action(), RiskClass::High)
        .unwrap();
    assert!(outcome.is_committed());

    let guard = ContinuityGuard::new(runtime.clone());
    let report = guard.run_steps(25, 10).await.unwrap();
    assert_eq!(report.anomalies_detected, 0);
    assert!(report.integrity);

    let mut prover = ResilienceProver::new(runtime.clone());
    let certificate = prover.run_proof_suite(50, 0.33, 0.4).await.unwrap();
    assert_eq!(certificate.simulations, 50);
    assert!(certificate.verify(runtime.public_key()));
    assert!(certificate.success_rate >= 0.0 && certificate.success_rate <= 1.0);

    // Decision receipts, the guard report, and the certificate all landed
    // on one verifiable chain.
    assert!(runtime.verify_integrity());
    runtime.audit_integrity().unwrap();
    assert_eq!(runtime.receipts().len(), 1 + 1 + 50 + 1);
}

#[test]
fn certificate_round_trips_for_external_verifiers() {
    let runtime = Arc::new(WardenRuntime::new());
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    let certificate = rt
        .block_on(async {
            let mut prover = ResilienceProver::new(runtime.clone());
            prover.run_proof_suite(5, 0.0, 0.0).await
        })
        .unwrap();

    // An external verifier only needs the exported hex key and the
    // serialized certificate.
    let encoded = serde_json::to_string(&certificate).unwrap();
    let decoded: warden_runtime::ResilienceCertificate = serde_json::from_str(&encoded).unwrap();
    assert!(decoded.verify(runtime.public_key()));
    assert_eq!(runtime.public_key_hex().len(), 64);
}
