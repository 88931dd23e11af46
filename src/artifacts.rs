//! Audit artifacts: per-validator, report, and decision snapshots on disk.
//!
//! Artifacts exist for debugging and review; a failed write warns and the
//! pipeline continues. Their on-disk layout is not a contract the decision
//! logic depends on.

use crate::models::{ArbiterDecision, ClassificationOutput, Issue, VerificationReport};
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub struct ArtifactStore {
    doc_id: String,
    run_id: String,
    run_dir: PathBuf,
}

#[derive(Serialize)]
struct ValidatorSnapshot<'a> {
    doc_id: &'a str,
    run_id: &'a str,
    timestamp: String,
    validator: &'a str,
    attempt: usize,
    issue_count: usize,
    issues: &'a [Issue],
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<f64>,
}

#[derive(Serialize)]
struct PassSnapshot<'a, T: Serialize> {
    doc_id: &'a str,
    run_id: &'a str,
    timestamp: String,
    attempt: usize,
    payload: &'a T,
}

impl ArtifactStore {
    /// Create the run directory under `<base>/<doc_id>/<run_id>`
    pub fn create(base: impl AsRef<Path>, doc_id: &str) -> Result<Self> {
        let run_id = Uuid::new_v4().to_string();
        let run_dir = base.as_ref().join(doc_id).join(&run_id);
        fs::create_dir_all(&run_dir)
            .with_context(|| format!("failed to create artifact dir {}", run_dir.display()))?;
        Ok(Self {
            doc_id: doc_id.to_string(),
            run_id,
            run_dir,
        })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Snapshot one validator's findings for one attempt
    pub fn save_validator(
        &self,
        attempt: usize,
        validator: &str,
        issues: &[Issue],
        score: Option<f64>,
    ) {
        let snapshot = ValidatorSnapshot {
            doc_id: &self.doc_id,
            run_id: &self.run_id,
            timestamp: Utc::now().to_rfc3339(),
            validator,
            attempt,
            issue_count: issues.len(),
            issues,
            score,
        };
        self.write_json(&format!("attempt-{}-{}.json", attempt, validator), &snapshot);
    }

    pub fn save_report(&self, attempt: usize, report: &VerificationReport) {
        self.save_pass(attempt, "report", report);
    }

    pub fn save_decision(&self, attempt: usize, decision: &ArbiterDecision) {
        self.save_pass(attempt, "decision", decision);
    }

    /// Snapshot the decision the retry loop actually returned, which may be a
    /// cycle or attempt-bound override of the last per-pass decision
    pub fn save_final_decision(&self, decision: &ArbiterDecision) {
        #[derive(Serialize)]
        struct FinalSnapshot<'a> {
            doc_id: &'a str,
            run_id: &'a str,
            timestamp: String,
            decision: &'a ArbiterDecision,
        }
        let snapshot = FinalSnapshot {
            doc_id: &self.doc_id,
            run_id: &self.run_id,
            timestamp: Utc::now().to_rfc3339(),
            decision,
        };
        self.write_json("final-decision.json", &snapshot);
    }

    pub fn save_classification(&self, attempt: usize, classification: &ClassificationOutput) {
        self.save_pass(attempt, "classification", classification);
    }

    fn save_pass<T: Serialize>(&self, attempt: usize, kind: &str, payload: &T) {
        let snapshot = PassSnapshot {
            doc_id: &self.doc_id,
            run_id: &self.run_id,
            timestamp: Utc::now().to_rfc3339(),
            attempt,
            payload,
        };
        self.write_json(&format!("attempt-{}-{}.json", attempt, kind), &snapshot);
    }

    fn write_json<T: Serialize>(&self, file_name: &str, payload: &T) {
        let path = self.run_dir.join(file_name);
        let result = serde_json::to_vec_pretty(payload)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| fs::write(&path, bytes).map_err(anyhow::Error::from));
        if let Err(e) = result {
            eprintln!("warning: failed to write artifact {}: {}", path.display(), e);
        }
    }
}
