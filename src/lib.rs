// Veridoc - Classification Verification Pipeline
// Multi-stage validation, arbitration, and auto-repair for document classifications

pub mod artifacts;
pub mod models;
pub mod oracle;
pub mod pipeline;
pub mod validator;

#[cfg(test)]
pub(crate) mod testkit;

pub use anyhow::{Context, Result};

// Re-export commonly used types
pub use models::{
    ArbiterDecision, ClassificationOutput, DecisionKind, DocumentBundle, Issue, Severity,
    VerificationReport, VeridocConfig,
};
pub use pipeline::{RetryOrchestrator, RetryOutcome, VerificationRunner};
