//! Deterministic schema and completeness validator.
//!
//! Zero oracle calls, fully reproducible: the same classification and bundle
//! always produce the same issues.

use crate::models::{
    ClassificationOutput, DocumentBundle, DocumentLabel, FixKind, Issue, IssueCategory,
    IssueLocation, IssueOrigin, PresenceLevel, Severity,
};
use std::collections::HashMap;

pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        Self
    }

    /// Run all deterministic checks
    pub fn validate(
        &self,
        classification: &ClassificationOutput,
        bundle: &DocumentBundle,
    ) -> Vec<Issue> {
        let mut issues = Vec::new();

        self.check_segment_count(classification, &mut issues);
        self.check_page_bounds(classification, bundle, &mut issues);
        self.check_confidence_ranges(classification, &mut issues);
        self.check_completeness(classification, &mut issues);
        self.check_evidence_presence(classification, &mut issues);

        issues
    }

    /// segment_count field must match the segments array length
    fn check_segment_count(&self, classification: &ClassificationOutput, issues: &mut Vec<Issue>) {
        let declared = classification.segment_count;
        let actual = classification.segments.len() as u32;

        if declared != actual {
            issues.push(
                Issue::new(
                    issues.len(),
                    IssueOrigin::Schema,
                    IssueCategory::SegmentCount,
                    Severity::Blocker,
                    format!(
                        "segment_count is {} but segments array has {} items",
                        declared, actual
                    ),
                )
                .with_location(IssueLocation::document("segment_count"))
                .with_suggested_fix(format!("Set segment_count = {}", actual))
                .with_fix(FixKind::SyncSegmentCount),
            );
        }
    }

    /// Page numbers within [1, total_pages], start <= end, derived page count
    fn check_page_bounds(
        &self,
        classification: &ClassificationOutput,
        bundle: &DocumentBundle,
        issues: &mut Vec<Issue>,
    ) {
        let max_page = bundle.total_pages;

        for segment in &classification.segments {
            if segment.start_page < 1 || segment.start_page > max_page {
                issues.push(
                    Issue::new(
                        issues.len(),
                        IssueOrigin::Schema,
                        IssueCategory::PageBounds,
                        Severity::Blocker,
                        format!(
                            "Segment {} start_page={} out of range [1, {}]",
                            segment.segment_index, segment.start_page, max_page
                        ),
                    )
                    .with_location(IssueLocation::segment(segment.segment_index, "start_page"))
                    .with_suggested_fix(format!("Adjust start_page to [1, {}]", max_page)),
                );
            }

            if segment.end_page < 1 || segment.end_page > max_page {
                issues.push(
                    Issue::new(
                        issues.len(),
                        IssueOrigin::Schema,
                        IssueCategory::PageBounds,
                        Severity::Blocker,
                        format!(
                            "Segment {} end_page={} out of range [1, {}]",
                            segment.segment_index, segment.end_page, max_page
                        ),
                    )
                    .with_location(IssueLocation::segment(segment.segment_index, "end_page"))
                    .with_suggested_fix(format!("Adjust end_page to [1, {}]", max_page)),
                );
            }

            if segment.start_page > segment.end_page {
                issues.push(
                    Issue::new(
                        issues.len(),
                        IssueOrigin::Schema,
                        IssueCategory::PageOrder,
                        Severity::Blocker,
                        format!(
                            "Segment {}: start_page ({}) > end_page ({})",
                            segment.segment_index, segment.start_page, segment.end_page
                        ),
                    )
                    .with_location(IssueLocation::segment(segment.segment_index, "page_range"))
                    .with_suggested_fix("Swap start_page and end_page or adjust the range"),
                );
            }

            let expected = segment.end_page as i64 - segment.start_page as i64 + 1;
            if segment.page_count as i64 != expected {
                issues.push(
                    Issue::new(
                        issues.len(),
                        IssueOrigin::Schema,
                        IssueCategory::PageCount,
                        Severity::Major,
                        format!(
                            "Segment {}: page_count={} but should be {} (end_page - start_page + 1)",
                            segment.segment_index, segment.page_count, expected
                        ),
                    )
                    .with_location(IssueLocation::segment(segment.segment_index, "page_count"))
                    .with_suggested_fix(format!("Set page_count = {}", expected))
                    .with_fix(FixKind::RecomputePageCount {
                        segment_index: segment.segment_index,
                    }),
                );
            }
        }
    }

    /// All confidence values within [0.0, 1.0]
    fn check_confidence_ranges(
        &self,
        classification: &ClassificationOutput,
        issues: &mut Vec<Issue>,
    ) {
        for segment in &classification.segments {
            for comp in &segment.composition {
                if !(0.0..=1.0).contains(&comp.confidence) {
                    issues.push(
                        Issue::new(
                            issues.len(),
                            IssueOrigin::Schema,
                            IssueCategory::ConfidenceRange,
                            Severity::Blocker,
                            format!(
                                "Segment {}, {}: confidence={} out of range [0.0, 1.0]",
                                segment.segment_index,
                                comp.label.name(),
                                comp.confidence
                            ),
                        )
                        .with_location(
                            IssueLocation::segment(segment.segment_index, "confidence")
                                .with_label(comp.label),
                        )
                        .with_suggested_fix("Adjust confidence to [0.0, 1.0]"),
                    );
                }
            }
        }

        for entry in &classification.document_mixture {
            if !(0.0..=1.0).contains(&entry.confidence) {
                issues.push(
                    Issue::new(
                        issues.len(),
                        IssueOrigin::Schema,
                        IssueCategory::ConfidenceRange,
                        Severity::Blocker,
                        format!(
                            "Document mixture {}: confidence={} out of range [0.0, 1.0]",
                            entry.label.name(),
                            entry.confidence
                        ),
                    )
                    .with_location(IssueLocation::document("confidence").with_label(entry.label))
                    .with_suggested_fix("Adjust confidence to [0.0, 1.0]"),
                );
            }
        }
    }

    /// Every taxonomy label exactly once per segment composition and mixture
    fn check_completeness(&self, classification: &ClassificationOutput, issues: &mut Vec<Issue>) {
        for segment in &classification.segments {
            let labels: Vec<DocumentLabel> = segment.composition.iter().map(|c| c.label).collect();
            self.check_label_set(&labels, Some(segment.segment_index), "composition", issues);
        }

        let mixture_labels: Vec<DocumentLabel> = classification
            .document_mixture
            .iter()
            .map(|m| m.label)
            .collect();
        self.check_label_set(&mixture_labels, None, "document_mixture", issues);
    }

    fn check_label_set(
        &self,
        labels: &[DocumentLabel],
        segment_index: Option<u32>,
        field: &str,
        issues: &mut Vec<Issue>,
    ) {
        let mut counts: HashMap<DocumentLabel, usize> = HashMap::new();
        for label in labels {
            *counts.entry(*label).or_insert(0) += 1;
        }

        let missing: Vec<DocumentLabel> = DocumentLabel::ALL
            .iter()
            .filter(|l| !counts.contains_key(l))
            .copied()
            .collect();
        let duplicated: Vec<DocumentLabel> = DocumentLabel::ALL
            .iter()
            .filter(|l| counts.get(l).copied().unwrap_or(0) > 1)
            .copied()
            .collect();

        let scope = match segment_index {
            Some(idx) => format!("Segment {}", idx),
            None => "document_mixture".to_string(),
        };
        let location = match segment_index {
            Some(idx) => IssueLocation::segment(idx, field),
            None => IssueLocation::document(field),
        };

        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|l| l.name()).collect();
            issues.push(
                Issue::new(
                    issues.len(),
                    IssueOrigin::Schema,
                    IssueCategory::TaxonomyCompleteness,
                    Severity::Blocker,
                    format!("{} missing labels: {}", scope, names.join(", ")),
                )
                .with_location(location.clone())
                .with_suggested_fix("Add missing labels with NO_EVIDENCE presence level")
                .with_fix(FixKind::InsertMissingLabels {
                    segment_index,
                    missing,
                }),
            );
        }

        if !duplicated.is_empty() {
            let names: Vec<&str> = duplicated.iter().map(|l| l.name()).collect();
            issues.push(
                Issue::new(
                    issues.len(),
                    IssueOrigin::Schema,
                    IssueCategory::TaxonomyCompleteness,
                    Severity::Blocker,
                    format!("{} has duplicate labels: {}", scope, names.join(", ")),
                )
                .with_location(location)
                .with_suggested_fix("Remove duplicate entries")
                .with_fix(FixKind::RemoveDuplicateLabels { segment_index }),
            );
        }
    }

    /// Non-NO_EVIDENCE entries should carry at least one evidence item
    fn check_evidence_presence(
        &self,
        classification: &ClassificationOutput,
        issues: &mut Vec<Issue>,
    ) {
        for segment in &classification.segments {
            for comp in &segment.composition {
                if comp.presence_level != PresenceLevel::NoEvidence && comp.evidence.is_empty() {
                    issues.push(
                        Issue::new(
                            issues.len(),
                            IssueOrigin::Schema,
                            IssueCategory::EvidencePresence,
                            Severity::Minor,
                            format!(
                                "Segment {}, {} claims presence but provides no evidence",
                                segment.segment_index,
                                comp.label.name()
                            ),
                        )
                        .with_location(
                            IssueLocation::segment(segment.segment_index, "evidence")
                                .with_label(comp.label),
                        )
                        .with_suggested_fix(
                            "Add at least one evidence snippet or change to NO_EVIDENCE",
                        ),
                    );
                }
            }
        }
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{clean_classification, small_bundle};

    #[test]
    fn test_clean_classification_has_no_issues() {
        let classification = clean_classification();
        let bundle = small_bundle(10);
        let issues = SchemaValidator::new().validate(&classification, &bundle);
        assert!(issues.is_empty(), "expected none, got: {:?}", issues);
    }

    #[test]
    fn test_segment_count_mismatch_is_fixable_blocker() {
        let mut classification = clean_classification();
        classification.segment_count = 7;
        let issues = SchemaValidator::new().validate(&classification, &small_bundle(10));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Blocker);
        assert_eq!(issues[0].fix, Some(FixKind::SyncSegmentCount));
    }

    #[test]
    fn test_page_out_of_bounds_not_fixable() {
        let mut classification = clean_classification();
        classification.segments[1].end_page = 40;
        classification.segments[1].page_count = 35;
        let issues = SchemaValidator::new().validate(&classification, &small_bundle(10));
        let bounds: Vec<_> = issues
            .iter()
            .filter(|i| i.category == IssueCategory::PageBounds)
            .collect();
        assert_eq!(bounds.len(), 1);
        assert_eq!(bounds[0].severity, Severity::Blocker);
        assert!(!bounds[0].is_auto_fixable());
    }

    #[test]
    fn test_inverted_range_is_blocker() {
        let mut classification = clean_classification();
        classification.segments[0].start_page = 3;
        classification.segments[0].end_page = 1;
        let issues = SchemaValidator::new().validate(&classification, &small_bundle(10));
        assert!(issues
            .iter()
            .any(|i| i.category == IssueCategory::PageOrder && i.severity == Severity::Blocker));
    }

    #[test]
    fn test_wrong_page_count_is_fixable_major() {
        let mut classification = clean_classification();
        classification.segments[0].page_count = 99;
        let issues = SchemaValidator::new().validate(&classification, &small_bundle(10));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Major);
        assert_eq!(
            issues[0].fix,
            Some(FixKind::RecomputePageCount { segment_index: 1 })
        );
    }

    #[test]
    fn test_confidence_out_of_domain() {
        let mut classification = clean_classification();
        classification.document_mixture[0].confidence = 1.7;
        let issues = SchemaValidator::new().validate(&classification, &small_bundle(10));
        assert!(issues.iter().any(|i| i.category == IssueCategory::ConfidenceRange
            && i.severity == Severity::Blocker
            && !i.is_auto_fixable()));
    }

    #[test]
    fn test_missing_mixture_label_tagged_for_insertion() {
        let mut classification = clean_classification();
        classification
            .document_mixture
            .retain(|m| m.label != DocumentLabel::Other);
        let issues = SchemaValidator::new().validate(&classification, &small_bundle(10));
        assert_eq!(issues.len(), 1);
        match &issues[0].fix {
            Some(FixKind::InsertMissingLabels {
                segment_index: None,
                missing,
            }) => {
                assert_eq!(missing, &vec![DocumentLabel::Other]);
            }
            other => panic!("unexpected fix tag: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_segment_label_detected() {
        let mut classification = clean_classification();
        let duplicate = classification.segments[0].composition[0].clone();
        classification.segments[0].composition.push(duplicate);
        let issues = SchemaValidator::new().validate(&classification, &small_bundle(10));
        assert!(issues.iter().any(|i| matches!(
            i.fix,
            Some(FixKind::RemoveDuplicateLabels {
                segment_index: Some(1)
            })
        )));
    }

    #[test]
    fn test_presence_without_evidence_is_minor() {
        let mut classification = clean_classification();
        classification.segments[0].composition[0].evidence.clear();
        let issues = SchemaValidator::new().validate(&classification, &small_bundle(10));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Minor);
        assert!(!issues[0].is_auto_fixable());
    }
}
