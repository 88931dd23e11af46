use serde::{Deserialize, Serialize};

/// Closed taxonomy of document labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentLabel {
    #[serde(rename = "Clinical Note")]
    ClinicalNote,
    #[serde(rename = "Pathology Report")]
    PathologyReport,
    #[serde(rename = "Genomic Report")]
    GenomicReport,
    #[serde(rename = "Radiology Report")]
    RadiologyReport,
    #[serde(rename = "Other")]
    Other,
}

impl DocumentLabel {
    /// Every label in the taxonomy. Completeness checks compare against this set.
    pub const ALL: [DocumentLabel; 5] = [
        DocumentLabel::ClinicalNote,
        DocumentLabel::PathologyReport,
        DocumentLabel::GenomicReport,
        DocumentLabel::RadiologyReport,
        DocumentLabel::Other,
    ];

    /// Get display name for label
    pub fn name(&self) -> &'static str {
        match self {
            DocumentLabel::ClinicalNote => "Clinical Note",
            DocumentLabel::PathologyReport => "Pathology Report",
            DocumentLabel::GenomicReport => "Genomic Report",
            DocumentLabel::RadiologyReport => "Radiology Report",
            DocumentLabel::Other => "Other",
        }
    }
}

/// Categorical evidence strength for a label within a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PresenceLevel {
    Primary,
    Embedded,
    Mention,
    NoEvidence,
}

/// Evidence snippet supporting a classification claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    /// 1-indexed page number the snippet was taken from
    pub page: u32,
    /// Verbatim text snippet
    pub snippet: String,
    /// Structural anchors identified near the snippet
    #[serde(default)]
    pub anchors: Vec<String>,
}

/// Classification of one taxonomy label within a segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentComposition {
    pub label: DocumentLabel,
    pub presence_level: PresenceLevel,
    pub confidence: f64,
    /// Fractional attribution of the segment to this label
    pub share: f64,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    pub rationale: String,
}

/// Contiguous page range with a dominant label and per-label composition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// 1-based segment index
    pub segment_index: u32,
    pub start_page: u32,
    pub end_page: u32,
    /// Derived field: end_page - start_page + 1
    pub page_count: u32,
    pub dominant_label: DocumentLabel,
    pub composition: Vec<SegmentComposition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Segment {
    /// Sum of composition shares for this segment
    pub fn share_sum(&self) -> f64 {
        self.composition.iter().map(|c| c.share).sum()
    }
}

/// Classification of one taxonomy label at document scope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixtureEntry {
    pub label: DocumentLabel,
    pub presence_level: PresenceLevel,
    pub confidence: f64,
    /// Fractional attribution of the whole document to this label
    pub share: f64,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    pub rationale: String,
}

/// Candidate structured classification of a multi-page document.
///
/// Produced externally by the primary classifier; the pipeline never mutates
/// it in place. The auto-fix engine works on full clones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationOutput {
    pub dominant_label: DocumentLabel,
    /// Declared segment count; checked against segments.len()
    pub segment_count: u32,
    pub segments: Vec<Segment>,
    pub document_mixture: Vec<MixtureEntry>,
    /// Vendor names detected in the document (letterheads, logos)
    #[serde(default)]
    pub vendor_signals: Vec<String>,
}

impl ClassificationOutput {
    /// Sum of document-mixture shares
    pub fn mixture_share_sum(&self) -> f64 {
        self.document_mixture.iter().map(|m| m.share).sum()
    }

    /// Total evidence items across all segment compositions
    pub fn total_evidence_items(&self) -> usize {
        self.segments
            .iter()
            .flat_map(|s| &s.composition)
            .map(|c| c.evidence.len())
            .sum()
    }
}

/// One extracted page of the source document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// 1-indexed page number
    pub page_num: u32,
    pub text: String,
}

/// Page-indexed source document, produced by the external extraction stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentBundle {
    pub doc_id: String,
    pub total_pages: u32,
    pub pages: Vec<Page>,
}

impl DocumentBundle {
    /// Text of a single page, if present in the bundle
    pub fn page_text(&self, page_num: u32) -> Option<&str> {
        self.pages
            .iter()
            .find(|p| p.page_num == page_num)
            .map(|p| p.text.as_str())
    }

    /// Concatenated text for an inclusive page range, with page markers
    pub fn range_text(&self, start_page: u32, end_page: u32) -> String {
        let mut out = String::new();
        for page_num in start_page..=end_page {
            if let Some(text) = self.page_text(page_num) {
                out.push_str(&format!("--- PAGE {} ---\n{}\n\n", page_num, text));
            }
        }
        out
    }

    /// All page texts joined in order
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle_with_pages(texts: &[&str]) -> DocumentBundle {
        DocumentBundle {
            doc_id: "doc-1".to_string(),
            total_pages: texts.len() as u32,
            pages: texts
                .iter()
                .enumerate()
                .map(|(i, t)| Page {
                    page_num: i as u32 + 1,
                    text: t.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_taxonomy_covers_five_labels() {
        assert_eq!(DocumentLabel::ALL.len(), 5);
        let names: Vec<_> = DocumentLabel::ALL.iter().map(|l| l.name()).collect();
        assert!(names.contains(&"Other"));
    }

    #[test]
    fn test_label_serializes_with_display_name() {
        let json = serde_json::to_string(&DocumentLabel::GenomicReport).unwrap();
        assert_eq!(json, "\"Genomic Report\"");
    }

    #[test]
    fn test_presence_level_screaming_snake() {
        let json = serde_json::to_string(&PresenceLevel::NoEvidence).unwrap();
        assert_eq!(json, "\"NO_EVIDENCE\"");
    }

    #[test]
    fn test_range_text_includes_page_markers() {
        let bundle = bundle_with_pages(&["alpha", "beta", "gamma"]);
        let text = bundle.range_text(2, 3);
        assert!(text.contains("--- PAGE 2 ---"));
        assert!(text.contains("beta"));
        assert!(text.contains("gamma"));
        assert!(!text.contains("alpha"));
    }

    #[test]
    fn test_page_text_missing_page() {
        let bundle = bundle_with_pages(&["alpha"]);
        assert!(bundle.page_text(9).is_none());
    }
}
