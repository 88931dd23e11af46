//! Auto-fix engine: applies typed repairs to a copy of the classification.
//!
//! Every repair operates on a deep copy; callers keep the original for the
//! retry history. A repair whose precondition fails (zero share sum, missing
//! segment) is skipped with a warning and the remaining repairs still apply.

use crate::models::{
    ClassificationOutput, DocumentLabel, FixKind, Issue, MixtureEntry, PresenceLevel,
    SegmentComposition,
};

/// Result of one fix pass
pub struct FixOutcome {
    pub classification: ClassificationOutput,
    /// Human-readable log of the repairs applied, in order
    pub fixes_applied: Vec<String>,
}

#[derive(Default)]
pub struct AutoFixEngine;

impl AutoFixEngine {
    pub fn new() -> Self {
        Self
    }

    /// Apply the repair tag of each issue to a fresh copy of the input.
    /// Issues without a tag are skipped silently (they were never fixable).
    pub fn apply_fixes(
        &self,
        classification: &ClassificationOutput,
        issues: &[&Issue],
    ) -> FixOutcome {
        let mut fixed = classification.clone();
        let mut fixes_applied = Vec::new();

        for issue in issues {
            let Some(fix) = &issue.fix else {
                continue;
            };
            match apply_one(&mut fixed, fix) {
                Ok(log) => fixes_applied.push(log),
                Err(reason) => {
                    eprintln!(
                        "warning: skipping repair {} for {}: {}",
                        fix.name(),
                        issue.id,
                        reason
                    );
                }
            }
        }

        FixOutcome {
            classification: fixed,
            fixes_applied,
        }
    }
}

fn apply_one(classification: &mut ClassificationOutput, fix: &FixKind) -> Result<String, String> {
    match fix {
        FixKind::NormalizeSegmentShares { segment_index } => {
            let segment = classification
                .segments
                .iter_mut()
                .find(|s| s.segment_index == *segment_index)
                .ok_or_else(|| format!("segment {} not found", segment_index))?;
            let total = normalize_composition(&mut segment.composition)?;
            Ok(format!(
                "normalized Segment {} shares (was {:.3})",
                segment_index, total
            ))
        }
        FixKind::NormalizeMixtureShares => {
            let total = normalize_mixture(&mut classification.document_mixture)?;
            Ok(format!(
                "normalized document-mixture shares (was {:.3})",
                total
            ))
        }
        FixKind::SyncSegmentCount => {
            let declared = classification.segment_count;
            let actual = classification.segments.len() as u32;
            classification.segment_count = actual;
            Ok(format!(
                "synced segment_count {} -> {}",
                declared, actual
            ))
        }
        FixKind::RecomputePageCount { segment_index } => {
            let segment = classification
                .segments
                .iter_mut()
                .find(|s| s.segment_index == *segment_index)
                .ok_or_else(|| format!("segment {} not found", segment_index))?;
            if segment.start_page > segment.end_page {
                return Err("page range is inverted, cannot derive a count".to_string());
            }
            let declared = segment.page_count;
            segment.page_count = segment.end_page - segment.start_page + 1;
            Ok(format!(
                "recomputed Segment {} page_count {} -> {}",
                segment_index, declared, segment.page_count
            ))
        }
        FixKind::InsertMissingLabels {
            segment_index,
            missing,
        } => {
            let inserted: Vec<&str> = missing.iter().map(|l| l.name()).collect();
            match segment_index {
                Some(idx) => {
                    let segment = classification
                        .segments
                        .iter_mut()
                        .find(|s| s.segment_index == *idx)
                        .ok_or_else(|| format!("segment {} not found", idx))?;
                    for label in missing {
                        segment.composition.push(placeholder_composition(*label));
                    }
                    // placeholders carry share 0.0, so this is usually a no-op
                    let _ = normalize_composition(&mut segment.composition);
                    Ok(format!(
                        "inserted NO_EVIDENCE placeholder(s) [{}] into Segment {}",
                        inserted.join(", "),
                        idx
                    ))
                }
                None => {
                    for label in missing {
                        classification
                            .document_mixture
                            .push(placeholder_mixture(*label));
                    }
                    let _ = normalize_mixture(&mut classification.document_mixture);
                    Ok(format!(
                        "inserted NO_EVIDENCE placeholder(s) [{}] into document mixture",
                        inserted.join(", ")
                    ))
                }
            }
        }
        FixKind::RemoveDuplicateLabels { segment_index } => {
            let removed = match segment_index {
                Some(idx) => {
                    let segment = classification
                        .segments
                        .iter_mut()
                        .find(|s| s.segment_index == *idx)
                        .ok_or_else(|| format!("segment {} not found", idx))?;
                    dedupe_by_label(&mut segment.composition, |c| c.label)
                }
                None => dedupe_by_label(&mut classification.document_mixture, |e| e.label),
            };
            if removed == 0 {
                return Err("no duplicate labels present".to_string());
            }
            let scope = match segment_index {
                Some(idx) => format!("Segment {}", idx),
                None => "document mixture".to_string(),
            };
            Ok(format!(
                "removed {} duplicate label entr(ies) from {}",
                removed, scope
            ))
        }
    }
}

/// Divide each share by the current sum. Errors on a zero sum.
fn normalize_composition(composition: &mut [SegmentComposition]) -> Result<f64, String> {
    let total: f64 = composition.iter().map(|c| c.share).sum();
    if total <= 0.0 {
        return Err("share sum is zero, nothing to normalize".to_string());
    }
    for comp in composition.iter_mut() {
        comp.share /= total;
    }
    Ok(total)
}

fn normalize_mixture(mixture: &mut [MixtureEntry]) -> Result<f64, String> {
    let total: f64 = mixture.iter().map(|e| e.share).sum();
    if total <= 0.0 {
        return Err("share sum is zero, nothing to normalize".to_string());
    }
    for entry in mixture.iter_mut() {
        entry.share /= total;
    }
    Ok(total)
}

/// Keep the first entry per label, dropping later duplicates.
/// Returns the number of entries removed.
fn dedupe_by_label<T>(entries: &mut Vec<T>, label_of: impl Fn(&T) -> DocumentLabel) -> usize {
    let mut seen = Vec::new();
    let before = entries.len();
    entries.retain(|entry| {
        let label = label_of(entry);
        if seen.contains(&label) {
            false
        } else {
            seen.push(label);
            true
        }
    });
    before - entries.len()
}

fn placeholder_composition(label: DocumentLabel) -> SegmentComposition {
    SegmentComposition {
        label,
        presence_level: PresenceLevel::NoEvidence,
        confidence: 0.0,
        share: 0.0,
        evidence: Vec::new(),
        rationale: "placeholder inserted to complete the taxonomy".to_string(),
    }
}

fn placeholder_mixture(label: DocumentLabel) -> MixtureEntry {
    MixtureEntry {
        label,
        presence_level: PresenceLevel::NoEvidence,
        confidence: 0.0,
        share: 0.0,
        evidence: Vec::new(),
        rationale: "placeholder inserted to complete the taxonomy".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IssueCategory, IssueOrigin, Severity};
    use crate::testkit::clean_classification;

    fn fixable_issue(fix: FixKind) -> Issue {
        Issue::new(
            0,
            IssueOrigin::Consistency,
            IssueCategory::ShareSum,
            Severity::Major,
            "synthetic",
        )
        .with_fix(fix)
    }

    #[test]
    fn test_segment_share_normalization() {
        let mut classification = clean_classification();
        for comp in &mut classification.segments[0].composition {
            comp.share *= 0.5;
        }
        let issue = fixable_issue(FixKind::NormalizeSegmentShares { segment_index: 1 });

        let outcome = AutoFixEngine::new().apply_fixes(&classification, &[&issue]);

        assert_eq!(outcome.fixes_applied.len(), 1);
        let fixed_sum = outcome.classification.segments[0].share_sum();
        assert!((fixed_sum - 1.0).abs() < 1e-9);
        // input untouched
        assert!((classification.segments[0].share_sum() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let mut classification = clean_classification();
        let shares = [0.10, 0.05, 0.05, 0.03, 0.02];
        for (comp, share) in classification.segments[0]
            .composition
            .iter_mut()
            .zip(shares)
        {
            comp.share = share;
        }
        let issue = fixable_issue(FixKind::NormalizeSegmentShares { segment_index: 1 });

        let engine = AutoFixEngine::new();
        let once = engine.apply_fixes(&classification, &[&issue]).classification;
        let twice = engine.apply_fixes(&once, &[&issue]).classification;

        assert!((once.segments[0].share_sum() - 1.0).abs() < 1e-9);
        for (a, b) in once.segments[0]
            .composition
            .iter()
            .zip(&twice.segments[0].composition)
        {
            assert!((a.share - b.share).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_share_sum_is_skipped_not_fatal() {
        let mut classification = clean_classification();
        for comp in &mut classification.segments[0].composition {
            comp.share = 0.0;
        }
        let skipped = fixable_issue(FixKind::NormalizeSegmentShares { segment_index: 1 });
        let applied = fixable_issue(FixKind::SyncSegmentCount);

        let outcome = AutoFixEngine::new().apply_fixes(&classification, &[&skipped, &applied]);

        assert_eq!(outcome.fixes_applied.len(), 1);
        assert!(outcome.fixes_applied[0].contains("segment_count"));
    }

    #[test]
    fn test_sync_segment_count() {
        let mut classification = clean_classification();
        classification.segment_count = 5;
        let issue = fixable_issue(FixKind::SyncSegmentCount);

        let outcome = AutoFixEngine::new().apply_fixes(&classification, &[&issue]);
        assert_eq!(outcome.classification.segment_count, 2);
    }

    #[test]
    fn test_recompute_page_count() {
        let mut classification = clean_classification();
        classification.segments[1].page_count = 99;
        let issue = fixable_issue(FixKind::RecomputePageCount { segment_index: 2 });

        let outcome = AutoFixEngine::new().apply_fixes(&classification, &[&issue]);
        assert_eq!(outcome.classification.segments[1].page_count, 7);
    }

    #[test]
    fn test_insert_missing_mixture_label_keeps_sum() {
        let mut classification = clean_classification();
        classification
            .document_mixture
            .retain(|e| e.label != DocumentLabel::Other);
        let removed_share = 0.03;
        for entry in &mut classification.document_mixture {
            entry.share /= 1.0 - removed_share;
        }
        let issue = fixable_issue(FixKind::InsertMissingLabels {
            segment_index: None,
            missing: vec![DocumentLabel::Other],
        });

        let outcome = AutoFixEngine::new().apply_fixes(&classification, &[&issue]);

        assert_eq!(outcome.classification.document_mixture.len(), 5);
        let inserted = outcome
            .classification
            .document_mixture
            .iter()
            .find(|e| e.label == DocumentLabel::Other)
            .unwrap();
        assert_eq!(inserted.presence_level, PresenceLevel::NoEvidence);
        assert!((outcome.classification.mixture_share_sum() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_remove_duplicate_labels() {
        let mut classification = clean_classification();
        let duplicate = classification.document_mixture[0].clone();
        classification.document_mixture.push(duplicate);
        let issue = fixable_issue(FixKind::RemoveDuplicateLabels { segment_index: None });

        let outcome = AutoFixEngine::new().apply_fixes(&classification, &[&issue]);
        assert_eq!(outcome.classification.document_mixture.len(), 5);
    }

    #[test]
    fn test_untagged_issue_is_ignored() {
        let classification = clean_classification();
        let issue = Issue::new(
            0,
            IssueOrigin::Schema,
            IssueCategory::PageBounds,
            Severity::Blocker,
            "not fixable",
        );
        let outcome = AutoFixEngine::new().apply_fixes(&classification, &[&issue]);
        assert!(outcome.fixes_applied.is_empty());
    }
}
