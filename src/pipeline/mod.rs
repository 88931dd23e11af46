//! Verification pipeline: runner, arbiter, auto-fix, and the retry loop.

pub mod arbiter;
pub mod autofix;
pub mod fingerprint;
pub mod retry;
pub mod runner;

pub use autofix::{AutoFixEngine, FixOutcome};
pub use fingerprint::fingerprint;
pub use retry::{RetryOrchestrator, RetryOutcome, MAX_RETRIES};
pub use runner::VerificationRunner;
