//! Verification runner: one pass through all four validators plus the arbiter.

use super::arbiter;
use crate::artifacts::ArtifactStore;
use crate::models::{
    ArbiterDecision, ClassificationOutput, DocumentBundle, Severity, VerificationReport,
};
use crate::oracle::Oracle;
use crate::validator::{ConsistencyChecker, EvidenceAssessor, SchemaValidator, TrapDetector};
use std::sync::Arc;

pub struct VerificationRunner {
    schema: SchemaValidator,
    consistency: ConsistencyChecker,
    trap: TrapDetector,
    evidence: EvidenceAssessor,
    artifacts: Option<ArtifactStore>,
}

impl VerificationRunner {
    pub fn new(oracle: Arc<dyn Oracle>, share_tolerance: f64) -> Self {
        Self {
            schema: SchemaValidator::new(),
            consistency: ConsistencyChecker::new(oracle.clone(), share_tolerance),
            trap: TrapDetector::new(oracle.clone()),
            evidence: EvidenceAssessor::new(oracle),
            artifacts: None,
        }
    }

    /// Persist per-validator, report, and decision snapshots to this store
    pub fn with_artifacts(mut self, store: ArtifactStore) -> Self {
        self.artifacts = Some(store);
        self
    }

    pub fn artifacts(&self) -> Option<&ArtifactStore> {
        self.artifacts.as_ref()
    }

    /// Run the validators in their fixed order, assemble the pass report, and
    /// hand it to the arbiter. `attempt` is 1-based and only used to name
    /// artifact snapshots.
    pub async fn run_all(
        &self,
        classification: &ClassificationOutput,
        bundle: &DocumentBundle,
        attempt: usize,
    ) -> (VerificationReport, ArbiterDecision) {
        let schema_issues = self.schema.validate(classification, bundle);
        let schema_passed = !schema_issues
            .iter()
            .any(|i| i.severity == Severity::Blocker);
        if let Some(store) = &self.artifacts {
            store.save_validator(attempt, "schema", &schema_issues, None);
        }

        let consistency = self.consistency.validate(classification, bundle).await;
        if let Some(store) = &self.artifacts {
            store.save_validator(
                attempt,
                "consistency",
                &consistency.issues,
                Some(consistency.score),
            );
        }

        let trap = self.trap.validate(classification, bundle).await;
        if let Some(store) = &self.artifacts {
            store.save_validator(attempt, "trap", &trap.issues, None);
        }

        let evidence = self.evidence.validate(classification, bundle).await;
        if let Some(store) = &self.artifacts {
            store.save_validator(attempt, "evidence", &evidence.issues, Some(evidence.score));
        }

        let oracle_calls = [
            consistency.oracle_called,
            trap.oracle_called,
            evidence.oracle_called,
        ]
        .iter()
        .filter(|&&called| called)
        .count();

        let mut issues = schema_issues;
        issues.extend(consistency.issues);
        issues.extend(trap.issues);
        issues.extend(evidence.issues);

        let has_blockers = issues.iter().any(|i| i.severity == Severity::Blocker);
        let total_issues = issues.len();

        let report = VerificationReport {
            issues,
            schema_passed,
            consistency_score: consistency.score,
            traps_triggered: trap.traps_triggered,
            evidence_score: evidence.score,
            has_blockers,
            total_issues,
            oracle_calls,
        };

        let decision = arbiter::decide(&report);

        if let Some(store) = &self.artifacts {
            store.save_report(attempt, &report);
            store.save_decision(attempt, &decision);
        }

        (report, decision)
    }
}
