//! Evidence assessor: oracle-only semantic verification of evidence snippets
//! and anchors against the source pages.

use crate::models::{
    ClassificationOutput, DocumentBundle, Issue, IssueCategory, IssueOrigin, Severity,
};
use crate::oracle::{parse_oracle_issues, prompts, Oracle};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Result of one evidence-quality pass
pub struct EvidenceOutcome {
    pub issues: Vec<Issue>,
    /// 1.0 = all evidence verified, 0.0 = findings with nothing to back them
    pub score: f64,
    pub oracle_called: bool,
}

pub struct EvidenceAssessor {
    oracle: Arc<dyn Oracle>,
}

impl EvidenceAssessor {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }

    /// Ask the oracle to verify that every snippet is literally present in
    /// the claimed pages, that anchors are attributable, and that evidence
    /// strength matches claimed confidence. Oracle failure is neutral: no
    /// issues, score 1.0.
    pub async fn validate(
        &self,
        classification: &ClassificationOutput,
        bundle: &DocumentBundle,
    ) -> EvidenceOutcome {
        let issues = match self.oracle_pass(classification, bundle).await {
            Ok(issues) => issues,
            Err(e) => {
                eprintln!("warning: evidence oracle pass failed, assuming neutral: {}", e);
                return EvidenceOutcome {
                    issues: Vec::new(),
                    score: 1.0,
                    oracle_called: true,
                };
            }
        };

        let score = compute_score(&issues, classification);
        EvidenceOutcome {
            issues,
            score,
            oracle_called: true,
        }
    }

    async fn oracle_pass(
        &self,
        classification: &ClassificationOutput,
        bundle: &DocumentBundle,
    ) -> anyhow::Result<Vec<Issue>> {
        let classification_json = serde_json::to_string_pretty(classification)?;

        // verbatim text for every page a segment claims
        let mut page_context: BTreeMap<u32, String> = BTreeMap::new();
        for segment in &classification.segments {
            for page_num in segment.start_page..=segment.end_page {
                if let Some(text) = bundle.page_text(page_num) {
                    page_context.insert(page_num, text.to_string());
                }
            }
        }
        let page_context_json = serde_json::to_string_pretty(&page_context)?;

        let prompt = prompts::evidence_prompt(&classification_json, &page_context_json);
        let response = self.oracle.evaluate(&prompt).await?;

        let issues = parse_oracle_issues(
            &response,
            IssueOrigin::Evidence,
            IssueCategory::EvidenceQuality,
            0,
        )?;
        Ok(issues)
    }
}

/// Evidence quality score. Findings against a classification that carries no
/// evidence at all mean there is nothing to verify: score 0.0.
fn compute_score(issues: &[Issue], classification: &ClassificationOutput) -> f64 {
    if issues.is_empty() {
        return 1.0;
    }
    if classification.total_evidence_items() == 0 {
        return 0.0;
    }
    let penalty: f64 = issues
        .iter()
        .map(|i| match i.severity {
            Severity::Blocker => 0.3,
            Severity::Major => 0.15,
            Severity::Minor => 0.05,
        })
        .sum();
    (1.0 - penalty).max(0.0)
}
