//! Trap detector: pattern-matched deceptive signals plus an optional oracle
//! contextual pass over a bounded text window.

use crate::models::{
    ClassificationOutput, DocumentBundle, DocumentLabel, Issue, IssueCategory, IssueLocation,
    IssueOrigin, PresenceLevel, Severity,
};
use crate::oracle::{parse_oracle_issues, prompts, Oracle};
use regex::Regex;
use std::sync::Arc;

/// Vendors whose presence means routine labs, not genomic reporting
const ROUTINE_LAB_VENDORS: [&str; 3] = ["quest", "labcorp", "lab corp"];

/// Boilerplate that marks administrative documents
const ADMIN_KEYWORDS: [&str; 5] = [
    "requisition",
    "authorization number",
    "fax cover",
    "test request",
    "specimen receipt",
];

/// Header/footer content that must not appear inside evidence snippets
const HEADER_FOOTER_PATTERNS: [&str; 4] = [
    r"page \d+ of \d+",
    r"fax.*?\d{3}[-.]?\d{3}[-.]?\d{4}",
    r"medical record number|mrn",
    r"date of birth.*?\d{2}/\d{2}/\d{4}",
];

/// Characters of document text handed to the oracle's contextual pass
const ORACLE_WINDOW_CHARS: usize = 4000;

/// Result of one trap-detection pass
pub struct TrapOutcome {
    pub issues: Vec<Issue>,
    pub traps_triggered: usize,
    pub oracle_called: bool,
}

pub struct TrapDetector {
    oracle: Arc<dyn Oracle>,
    header_footer: Vec<Regex>,
}

impl TrapDetector {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        let header_footer = HEADER_FOOTER_PATTERNS
            .iter()
            .map(|p| Regex::new(&format!("(?i){}", p)).unwrap())
            .collect();
        Self {
            oracle,
            header_footer,
        }
    }

    pub async fn validate(
        &self,
        classification: &ClassificationOutput,
        bundle: &DocumentBundle,
    ) -> TrapOutcome {
        let full_text = bundle.full_text();
        let mut issues = self.rule_traps(classification, &full_text);

        if issues.iter().any(|i| i.severity == Severity::Blocker) {
            let traps_triggered = issues.len();
            return TrapOutcome {
                issues,
                traps_triggered,
                oracle_called: false,
            };
        }

        let mut oracle_called = false;
        match self
            .oracle_pass(classification, &full_text, issues.len())
            .await
        {
            Ok(oracle_issues) => {
                oracle_called = true;
                issues.extend(oracle_issues);
            }
            Err(e) => {
                oracle_called = true;
                eprintln!("warning: trap oracle pass failed, keeping pattern results: {}", e);
            }
        }

        let traps_triggered = issues.len();
        TrapOutcome {
            issues,
            traps_triggered,
            oracle_called,
        }
    }

    /// Pattern-based trap detection
    fn rule_traps(&self, classification: &ClassificationOutput, full_text: &str) -> Vec<Issue> {
        let mut issues = Vec::new();
        let text_lower = full_text.to_lowercase();

        // Trap 1: routine lab vendor while Genomic Report claims PRIMARY
        let has_routine_vendor = classification.vendor_signals.iter().any(|signal| {
            let signal_lower = signal.to_lowercase();
            ROUTINE_LAB_VENDORS.iter().any(|v| signal_lower.contains(v))
        });
        if has_routine_vendor {
            for entry in &classification.document_mixture {
                if entry.label == DocumentLabel::GenomicReport
                    && entry.presence_level == PresenceLevel::Primary
                {
                    issues.push(
                        Issue::new(
                            issues.len(),
                            IssueOrigin::Trap,
                            IssueCategory::VendorTrap,
                            Severity::Blocker,
                            format!(
                                "Routine lab vendor detected ({}) but Genomic Report marked PRIMARY; likely routine labs",
                                classification.vendor_signals.join(", ")
                            ),
                        )
                        .with_location(
                            IssueLocation::document("presence_level")
                                .with_label(DocumentLabel::GenomicReport),
                        )
                        .with_suggested_fix("Reclassify as Other or downgrade to MENTION"),
                    );
                }
            }
        }

        // Trap 2: administrative boilerplate while a report label claims presence
        let has_admin = ADMIN_KEYWORDS.iter().any(|k| text_lower.contains(k));
        if has_admin {
            for entry in &classification.document_mixture {
                let is_report_label = matches!(
                    entry.label,
                    DocumentLabel::GenomicReport | DocumentLabel::PathologyReport
                );
                if is_report_label && entry.presence_level != PresenceLevel::NoEvidence {
                    issues.push(
                        Issue::new(
                            issues.len(),
                            IssueOrigin::Trap,
                            IssueCategory::AdminTrap,
                            Severity::Blocker,
                            format!(
                                "Administrative keywords found (requisition/authorization/fax) but {} marked as {:?}",
                                entry.label.name(),
                                entry.presence_level
                            ),
                        )
                        .with_location(IssueLocation::document("presence_level").with_label(entry.label))
                        .with_suggested_fix("Reclassify as Other (administrative document)"),
                    );
                }
            }
        }

        // Trap 3: header/footer content leaked into evidence snippets.
        // One issue per leaking evidence item, no matter how many patterns hit.
        for segment in &classification.segments {
            for comp in &segment.composition {
                for evidence in &comp.evidence {
                    let leaked = self
                        .header_footer
                        .iter()
                        .any(|re| re.is_match(&evidence.snippet));
                    if leaked {
                        let preview: String = evidence.snippet.chars().take(50).collect();
                        issues.push(
                            Issue::new(
                                issues.len(),
                                IssueOrigin::Trap,
                                IssueCategory::HeaderFooterLeak,
                                Severity::Minor,
                                format!(
                                    "Evidence snippet in Segment {} looks like header/footer content: '{}...'",
                                    segment.segment_index, preview
                                ),
                            )
                            .with_location(
                                IssueLocation::segment(segment.segment_index, "evidence")
                                    .with_label(comp.label),
                            )
                            .with_suggested_fix("Exclude header/footer content from evidence"),
                        );
                    }
                }
            }
        }

        issues
    }

    /// Contextual pass over a bounded window
    async fn oracle_pass(
        &self,
        classification: &ClassificationOutput,
        full_text: &str,
        seq_start: usize,
    ) -> anyhow::Result<Vec<Issue>> {
        let classification_json = serde_json::to_string_pretty(classification)?;
        let window: String = full_text.chars().take(ORACLE_WINDOW_CHARS).collect();

        let prompt = prompts::trap_prompt(&classification_json, &window);
        let response = self.oracle.evaluate(&prompt).await?;

        let issues = parse_oracle_issues(
            &response,
            IssueOrigin::Trap,
            IssueCategory::ContextualTrap,
            seq_start,
        )?;
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::OracleError;
    use crate::testkit::{clean_classification, small_bundle};
    use async_trait::async_trait;

    struct StaticOracle(String);

    #[async_trait]
    impl Oracle for StaticOracle {
        async fn evaluate(&self, _prompt: &str) -> Result<String, OracleError> {
            Ok(self.0.clone())
        }
    }

    fn detector(reply: &str) -> TrapDetector {
        TrapDetector::new(Arc::new(StaticOracle(reply.to_string())))
    }

    #[tokio::test]
    async fn test_clean_classification_trips_nothing() {
        let outcome = detector("[]")
            .validate(&clean_classification(), &small_bundle(10))
            .await;
        assert_eq!(outcome.traps_triggered, 0);
        assert!(outcome.oracle_called);
    }

    #[tokio::test]
    async fn test_routine_vendor_with_primary_genomic_is_blocker() {
        let mut classification = clean_classification();
        classification.vendor_signals = vec!["Quest Diagnostics".to_string()];
        for entry in &mut classification.document_mixture {
            if entry.label == DocumentLabel::GenomicReport {
                entry.presence_level = PresenceLevel::Primary;
            }
        }
        let outcome = detector("[]")
            .validate(&classification, &small_bundle(10))
            .await;
        assert!(outcome
            .issues
            .iter()
            .any(|i| i.category == IssueCategory::VendorTrap && i.severity == Severity::Blocker));
        // blocker in the pattern pass means no oracle spend
        assert!(!outcome.oracle_called);
    }

    #[tokio::test]
    async fn test_admin_keywords_conflict_with_report_labels() {
        let classification = clean_classification();
        let mut bundle = small_bundle(10);
        bundle.pages[0].text = "Fax cover sheet. Test request and specimen receipt.".to_string();
        let outcome = detector("[]").validate(&classification, &bundle).await;
        // PathologyReport is PRIMARY in the fixture mixture
        assert!(outcome
            .issues
            .iter()
            .any(|i| i.category == IssueCategory::AdminTrap && i.severity == Severity::Blocker));
    }

    #[tokio::test]
    async fn test_header_footer_leak_in_evidence_is_minor() {
        let mut classification = clean_classification();
        classification.segments[0].composition[0].evidence[0].snippet =
            "Page 2 of 14 - continued".to_string();
        let outcome = detector("[]")
            .validate(&classification, &small_bundle(10))
            .await;
        assert_eq!(outcome.traps_triggered, 1);
        assert_eq!(outcome.issues[0].category, IssueCategory::HeaderFooterLeak);
        assert_eq!(outcome.issues[0].severity, Severity::Minor);
        assert!(outcome.oracle_called);
    }

    #[tokio::test]
    async fn test_every_leaking_evidence_item_flagged() {
        let mut classification = clean_classification();
        let comp = &mut classification.segments[0].composition[0];
        comp.evidence[0].snippet = "Page 2 of 14 - continued".to_string();
        comp.evidence.push(crate::models::Evidence {
            page: 2,
            snippet: "MRN 00123456".to_string(),
            anchors: Vec::new(),
        });
        let outcome = detector("[]")
            .validate(&classification, &small_bundle(10))
            .await;
        let leaks = outcome
            .issues
            .iter()
            .filter(|i| i.category == IssueCategory::HeaderFooterLeak)
            .count();
        assert_eq!(leaks, 2);
        assert_eq!(outcome.traps_triggered, 2);
    }

    #[tokio::test]
    async fn test_oracle_contextual_findings_are_merged() {
        let reply = r#"[{"severity": "MAJOR",
                         "message": "gene names appear only in patient history",
                         "location": {"label": "Genomic Report"}}]"#;
        let outcome = detector(reply)
            .validate(&clean_classification(), &small_bundle(10))
            .await;
        assert_eq!(outcome.traps_triggered, 1);
        assert_eq!(outcome.issues[0].category, IssueCategory::ContextualTrap);
    }
}
