//! Retry orchestrator: the bounded verify/fix loop.
//!
//! The loop is a three-state machine. VERIFYING runs one pass and asks the
//! arbiter what to do; FIXING applies the typed repairs and loops back; DONE
//! returns. Termination is guaranteed by the attempt bound; fingerprint cycle
//! detection only exists to stop before spending oracle calls on a
//! classification the fixer could not change.

use super::autofix::AutoFixEngine;
use super::fingerprint::fingerprint;
use super::runner::VerificationRunner;
use crate::models::{
    ArbiterDecision, ClassificationOutput, DecisionKind, DocumentBundle, RetryAttemptRecord,
    VerificationReport,
};
use anyhow::Result;
use std::collections::HashSet;

/// Fix passes allowed after the first verification
pub const MAX_RETRIES: usize = 2;

enum RetryState {
    Verifying,
    Fixing {
        report: VerificationReport,
        decision: ArbiterDecision,
    },
    Done {
        report: VerificationReport,
        decision: ArbiterDecision,
    },
}

/// Everything the loop produced: the (possibly repaired) classification, the
/// last pass's report and decision, and the fix history.
pub struct RetryOutcome {
    pub classification: ClassificationOutput,
    pub report: VerificationReport,
    pub decision: ArbiterDecision,
    pub retry_log: Vec<RetryAttemptRecord>,
    /// Verification passes spent
    pub attempts: usize,
}

pub struct RetryOrchestrator {
    runner: VerificationRunner,
    fixer: AutoFixEngine,
    max_retries: usize,
}

impl RetryOrchestrator {
    pub fn new(runner: VerificationRunner, max_retries: usize) -> Self {
        Self {
            runner,
            fixer: AutoFixEngine::new(),
            max_retries,
        }
    }

    /// Run the full bounded loop. The returned decision is always terminal:
    /// AUTO_ACCEPT or ESCALATE_TO_SME, never AUTO_RETRY.
    pub async fn verify_with_retry(
        &self,
        classification: &ClassificationOutput,
        bundle: &DocumentBundle,
    ) -> Result<RetryOutcome> {
        let mut current = classification.clone();
        let mut retry_log = Vec::new();
        let mut seen = HashSet::new();
        let mut attempt = 1usize;
        let mut state = RetryState::Verifying;

        loop {
            state = match state {
                RetryState::Verifying => {
                    let (report, decision) = self.runner.run_all(&current, bundle, attempt).await;

                    let print = fingerprint(&current)?;
                    if !seen.insert(print) {
                        let decision = decision
                            .escalated("cycle detected: repairs did not change the classification");
                        RetryState::Done { report, decision }
                    } else if decision.decision != DecisionKind::AutoRetry {
                        RetryState::Done { report, decision }
                    } else if attempt > self.max_retries {
                        let decision = decision.escalated(format!(
                            "max retries ({}) reached without acceptance",
                            self.max_retries
                        ));
                        RetryState::Done { report, decision }
                    } else {
                        RetryState::Fixing { report, decision }
                    }
                }
                RetryState::Fixing { report, decision } => {
                    let fixable = report.fixable_issues();
                    let outcome = self.fixer.apply_fixes(&current, &fixable);

                    retry_log.push(RetryAttemptRecord {
                        attempt,
                        issues_before_fix: report.total_issues,
                        fixable_issues: fixable.len(),
                        fixes_applied: outcome.fixes_applied,
                        decision_before_retry: decision.decision,
                    });

                    if let Some(store) = self.runner.artifacts() {
                        store.save_classification(attempt, &outcome.classification);
                    }

                    current = outcome.classification;
                    attempt += 1;
                    RetryState::Verifying
                }
                RetryState::Done { report, decision } => {
                    // the per-pass decision is already snapshotted by the
                    // runner; this one may carry a loop override
                    if let Some(store) = self.runner.artifacts() {
                        store.save_final_decision(&decision);
                    }
                    return Ok(RetryOutcome {
                        classification: current,
                        report,
                        decision,
                        retry_log,
                        attempts: attempt,
                    });
                }
            };
        }
    }
}
