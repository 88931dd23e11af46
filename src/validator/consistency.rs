//! Internal consistency checker: deterministic pre-filter plus an optional
//! oracle semantic pass.
//!
//! The pre-filter catches arithmetic and structural problems (share sums,
//! page-range overlap) at zero cost. The oracle pass only runs when the
//! pre-filter found no blockers; it cross-checks each segment's rationale
//! against the segment's text.

use crate::models::{
    ClassificationOutput, DocumentBundle, FixKind, Issue, IssueCategory, IssueLocation,
    IssueOrigin, Severity,
};
use crate::oracle::{parse_oracle_issues, prompts, Oracle};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Result of one consistency pass
pub struct ConsistencyOutcome {
    pub issues: Vec<Issue>,
    /// 1.0 = perfectly consistent, 0.0 = pre-filter blocker
    pub score: f64,
    pub oracle_called: bool,
}

pub struct ConsistencyChecker {
    oracle: Arc<dyn Oracle>,
    share_tolerance: f64,
}

impl ConsistencyChecker {
    pub fn new(oracle: Arc<dyn Oracle>, share_tolerance: f64) -> Self {
        Self {
            oracle,
            share_tolerance,
        }
    }

    pub async fn validate(
        &self,
        classification: &ClassificationOutput,
        bundle: &DocumentBundle,
    ) -> ConsistencyOutcome {
        let mut issues = self.rule_checks(classification);

        // A blocker in the rules means the structure is too broken for the
        // semantic pass to say anything useful. Skip the oracle call.
        if issues.iter().any(|i| i.severity == Severity::Blocker) {
            return ConsistencyOutcome {
                issues,
                score: 0.0,
                oracle_called: false,
            };
        }

        match self.oracle_pass(classification, bundle, issues.len()).await {
            Ok(oracle_issues) => issues.extend(oracle_issues),
            Err(e) => {
                eprintln!("warning: consistency oracle pass failed, keeping rule results: {}", e);
            }
        }

        let score = compute_score(&issues);
        ConsistencyOutcome {
            issues,
            score,
            oracle_called: true,
        }
    }

    /// Deterministic pre-filter
    fn rule_checks(&self, classification: &ClassificationOutput) -> Vec<Issue> {
        let mut issues = Vec::new();

        // segment share sums
        for segment in &classification.segments {
            let total = segment.share_sum();
            if (total - 1.0).abs() > self.share_tolerance {
                issues.push(
                    Issue::new(
                        issues.len(),
                        IssueOrigin::Consistency,
                        IssueCategory::ShareSum,
                        Severity::Major,
                        format!(
                            "Segment {} shares sum to {:.3} instead of 1.0",
                            segment.segment_index, total
                        ),
                    )
                    .with_location(IssueLocation::segment(segment.segment_index, "share"))
                    .with_suggested_fix("Normalize shares to sum to 1.0")
                    .with_fix(FixKind::NormalizeSegmentShares {
                        segment_index: segment.segment_index,
                    }),
                );
            }
        }

        // document mixture share sum
        let total_overall = classification.mixture_share_sum();
        if (total_overall - 1.0).abs() > self.share_tolerance {
            issues.push(
                Issue::new(
                    issues.len(),
                    IssueOrigin::Consistency,
                    IssueCategory::ShareSum,
                    Severity::Major,
                    format!(
                        "Document mixture shares sum to {:.3} instead of 1.0",
                        total_overall
                    ),
                )
                .with_location(IssueLocation::document("document_mixture"))
                .with_suggested_fix("Normalize document-mixture shares")
                .with_fix(FixKind::NormalizeMixtureShares),
            );
        }

        // page ranges: ordered by start page, no overlap
        let mut ordered: Vec<_> = classification.segments.iter().collect();
        ordered.sort_by_key(|s| s.start_page);
        for window in ordered.windows(2) {
            let (current, next) = (window[0], window[1]);
            if current.end_page >= next.start_page {
                issues.push(
                    Issue::new(
                        issues.len(),
                        IssueOrigin::Consistency,
                        IssueCategory::RangeOverlap,
                        Severity::Blocker,
                        format!(
                            "Segment {} ends at page {}, overlapping Segment {} starting at page {}",
                            current.segment_index,
                            current.end_page,
                            next.segment_index,
                            next.start_page
                        ),
                    )
                    .with_location(IssueLocation::segment(current.segment_index, "page_range"))
                    .with_suggested_fix("Adjust page ranges to eliminate the overlap"),
                );
            }
        }
        for segment in &classification.segments {
            if segment.start_page > segment.end_page {
                issues.push(
                    Issue::new(
                        issues.len(),
                        IssueOrigin::Consistency,
                        IssueCategory::PageOrder,
                        Severity::Blocker,
                        format!(
                            "Segment {}: start_page ({}) > end_page ({})",
                            segment.segment_index, segment.start_page, segment.end_page
                        ),
                    )
                    .with_location(IssueLocation::segment(segment.segment_index, "page_range"))
                    .with_suggested_fix("Swap or adjust the page range"),
                );
            }
        }

        issues
    }

    /// Semantic pass: rationale vs segment text
    async fn oracle_pass(
        &self,
        classification: &ClassificationOutput,
        bundle: &DocumentBundle,
        seq_start: usize,
    ) -> anyhow::Result<Vec<Issue>> {
        let classification_json = serde_json::to_string_pretty(classification)?;

        // BTreeMap keeps the prompt stable across runs
        let mut segment_texts: BTreeMap<u32, String> = BTreeMap::new();
        for segment in &classification.segments {
            segment_texts.insert(
                segment.segment_index,
                bundle.range_text(segment.start_page, segment.end_page),
            );
        }
        let segment_texts_json = serde_json::to_string_pretty(&segment_texts)?;

        let prompt = prompts::consistency_prompt(&classification_json, &segment_texts_json);
        let response = self.oracle.evaluate(&prompt).await?;

        let issues = parse_oracle_issues(
            &response,
            IssueOrigin::Consistency,
            IssueCategory::RationaleMismatch,
            seq_start,
        )?;
        Ok(issues)
    }
}

/// Consistency score from issue severities
fn compute_score(issues: &[Issue]) -> f64 {
    let penalty: f64 = issues
        .iter()
        .map(|i| match i.severity {
            Severity::Blocker => 0.4,
            Severity::Major => 0.2,
            Severity::Minor => 0.05,
        })
        .sum();
    (1.0 - penalty).max(0.0)
}
