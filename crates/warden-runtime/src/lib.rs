//! Warden runtime: the coordinator layer above the governance kernel.
//!
//! The [`WardenRuntime`] is the trust root of an instance. It owns the
//! Ed25519 signing key pair for its entire lifetime, issues strictly
//! increasing nonces, and serializes every mutation of the replay registry
//! and the stability tracker behind a single lock, so concurrent callers
//! can share it freely through an `Arc`.
//!
//! Two long-running drivers sit on top:
//!
//! - the [`ContinuityGuard`], a supervisory heartbeat that keeps the
//!   Bayesian health posterior informed even absent real traffic, and
//! - the [`ResilienceProver`], which stresses the execution gate with
//!   adversarial and byzantine synthetic tokens and certifies the observed
//!   success rate in a signed [`ResilienceCertificate`].
//!
//! Both are cancellable, yield between steps, and report progress over a
//! broadcast channel rather than writing to the console.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod events;
pub mod guard;
pub mod license;
pub mod prover;
pub mod runtime;

pub use config::{GuardConfig, ProverConfig, RuntimeConfig, StabilityConfig};
pub use error::RuntimeError;
pub use events::{GuardEvent, EVENT_CHANNEL_CAPACITY};
pub use guard::{ContinuityGuard, GuardReport};
pub use license::{License, DEMO_SIMULATION_QUOTA, LICENSED_SIMULATION_QUOTA};
pub use prover::{AdversaryModel, RandomAdversary, ResilienceCertificate, ResilienceProver};
pub use runtime::WardenRuntime;
