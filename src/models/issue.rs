use super::classification::DocumentLabel;
use serde::{Deserialize, Serialize};

/// Severity level of a verification issue.
///
/// Declared lowest-first so the derived ordering gives Blocker > Major > Minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Tolerable, does not affect classification validity
    Minor,
    /// Significant error, needs a fix before acceptance
    Major,
    /// Critical failure, always escalates
    Blocker,
}

impl Severity {
    /// Get display symbol for severity
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Blocker => "🔴",
            Severity::Major => "🟡",
            Severity::Minor => "🔵",
        }
    }

    /// Get display name for severity
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Blocker => "BLOCKER",
            Severity::Major => "MAJOR",
            Severity::Minor => "MINOR",
        }
    }
}

/// Which validator raised an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueOrigin {
    Schema,
    Consistency,
    Trap,
    Evidence,
}

impl IssueOrigin {
    /// Prefix used when building issue ids
    pub fn prefix(&self) -> &'static str {
        match self {
            IssueOrigin::Schema => "schema",
            IssueOrigin::Consistency => "consistency",
            IssueOrigin::Trap => "trap",
            IssueOrigin::Evidence => "evidence",
        }
    }
}

/// Category of verification issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    /// Declared segment count disagrees with the segments array
    SegmentCount,
    /// Page number outside [1, total_pages]
    PageBounds,
    /// start_page > end_page
    PageOrder,
    /// Derived page count disagrees with the range
    PageCount,
    /// Confidence outside [0, 1]
    ConfidenceRange,
    /// Taxonomy label missing or duplicated in a scope
    TaxonomyCompleteness,
    /// Non-NO_EVIDENCE entry without any evidence
    EvidencePresence,
    /// Shares within a scope do not sum to 1.0
    ShareSum,
    /// Segment page ranges overlap
    RangeOverlap,
    /// Vendor signal conflicts with a high-value label
    VendorTrap,
    /// Administrative boilerplate conflicts with a report label
    AdminTrap,
    /// Header/footer content leaked into evidence
    HeaderFooterLeak,
    /// Segment rationale contradicts the surrounding text (oracle finding)
    RationaleMismatch,
    /// Deceptive signal found by the oracle's contextual pass
    ContextualTrap,
    /// Evidence snippet/anchor/confidence problem (oracle finding)
    EvidenceQuality,
}

/// Typed repair tag, attached to an issue at creation time.
///
/// The auto-fix engine dispatches on these variants directly; the set of
/// repairs is this enum, nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FixKind {
    NormalizeSegmentShares {
        segment_index: u32,
    },
    NormalizeMixtureShares,
    /// Set the declared segment count to segments.len()
    SyncSegmentCount,
    RecomputePageCount {
        segment_index: u32,
    },
    /// Insert NO_EVIDENCE placeholders for missing labels.
    /// segment_index None means document-mixture scope.
    InsertMissingLabels {
        segment_index: Option<u32>,
        missing: Vec<DocumentLabel>,
    },
    /// Drop duplicate label entries, keeping the first occurrence
    RemoveDuplicateLabels {
        segment_index: Option<u32>,
    },
}

impl FixKind {
    pub fn name(&self) -> &'static str {
        match self {
            FixKind::NormalizeSegmentShares { .. } => "normalize_segment_shares",
            FixKind::NormalizeMixtureShares => "normalize_mixture_shares",
            FixKind::SyncSegmentCount => "sync_segment_count",
            FixKind::RecomputePageCount { .. } => "recompute_page_count",
            FixKind::InsertMissingLabels { .. } => "insert_missing_labels",
            FixKind::RemoveDuplicateLabels { .. } => "remove_duplicate_labels",
        }
    }
}

/// Structured location of an issue within a classification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<DocumentLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IssueLocation {
    /// Location scoped to a segment field
    pub fn segment(segment_index: u32, field: impl Into<String>) -> Self {
        Self {
            segment_index: Some(segment_index),
            label: None,
            field: Some(field.into()),
        }
    }

    /// Location scoped to a document-level field
    pub fn document(field: impl Into<String>) -> Self {
        Self {
            segment_index: None,
            label: None,
            field: Some(field.into()),
        }
    }

    /// Attach the label the issue concerns
    pub fn with_label(mut self, label: DocumentLabel) -> Self {
        self.label = Some(label);
        self
    }
}

/// A single validation finding. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Unique id with origin prefix (e.g. "schema-0002")
    pub id: String,
    pub origin: IssueOrigin,
    pub category: IssueCategory,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub location: IssueLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
    /// Typed repair tag; present only when the issue is auto-fixable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixKind>,
}

impl Issue {
    /// Create a new issue with a sequence-numbered id
    pub fn new(
        seq: usize,
        origin: IssueOrigin,
        category: IssueCategory,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("{}-{:04}", origin.prefix(), seq),
            origin,
            category,
            severity,
            message: message.into(),
            location: IssueLocation::default(),
            suggested_fix: None,
            fix: None,
        }
    }

    pub fn with_location(mut self, location: IssueLocation) -> Self {
        self.location = location;
        self
    }

    pub fn with_suggested_fix(mut self, suggested: impl Into<String>) -> Self {
        self.suggested_fix = Some(suggested.into());
        self
    }

    pub fn with_fix(mut self, fix: FixKind) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Whether the auto-fix engine has a repair for this issue
    pub fn is_auto_fixable(&self) -> bool {
        self.fix.is_some()
    }

    /// Format issue for display
    pub fn format(&self) -> String {
        let mut loc = String::new();
        if let Some(idx) = self.location.segment_index {
            loc.push_str(&format!(" segment {}", idx));
        }
        if let Some(field) = &self.location.field {
            loc.push_str(&format!(" [{}]", field));
        }
        format!(
            "{} [{}] {}{} - {}",
            self.severity.symbol(),
            self.severity.name(),
            self.id,
            loc,
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Blocker > Severity::Major);
        assert!(Severity::Major > Severity::Minor);
    }

    #[test]
    fn test_issue_id_prefix() {
        let issue = Issue::new(
            3,
            IssueOrigin::Consistency,
            IssueCategory::ShareSum,
            Severity::Major,
            "shares off",
        );
        assert_eq!(issue.id, "consistency-0003");
    }

    #[test]
    fn test_fixable_only_with_tag() {
        let bare = Issue::new(
            0,
            IssueOrigin::Schema,
            IssueCategory::PageBounds,
            Severity::Blocker,
            "out of range",
        );
        assert!(!bare.is_auto_fixable());

        let tagged = bare.clone().with_fix(FixKind::SyncSegmentCount);
        assert!(tagged.is_auto_fixable());
    }

    #[test]
    fn test_fix_kind_round_trips_as_tagged_json() {
        let fix = FixKind::NormalizeSegmentShares { segment_index: 2 };
        let json = serde_json::to_string(&fix).unwrap();
        assert!(json.contains("normalize_segment_shares"));
        let back: FixKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fix);
    }
}
