//! Shared fixtures for unit tests.

use crate::models::{
    ClassificationOutput, DocumentBundle, DocumentLabel, Evidence, MixtureEntry, Page,
    PresenceLevel, Segment, SegmentComposition,
};

fn composition_for(dominant: DocumentLabel, page: u32) -> Vec<SegmentComposition> {
    DocumentLabel::ALL
        .iter()
        .map(|&label| {
            if label == dominant {
                SegmentComposition {
                    label,
                    presence_level: PresenceLevel::Primary,
                    confidence: 0.9,
                    share: 0.8,
                    evidence: vec![Evidence {
                        page,
                        snippet: "Assessment and plan reviewed with the patient".to_string(),
                        anchors: vec!["Assessment".to_string()],
                    }],
                    rationale: format!("{} content dominates this range", label.name()),
                }
            } else {
                SegmentComposition {
                    label,
                    presence_level: PresenceLevel::NoEvidence,
                    confidence: 0.1,
                    share: 0.05,
                    evidence: Vec::new(),
                    rationale: "no supporting content found".to_string(),
                }
            }
        })
        .collect()
}

fn mixture_entry(label: DocumentLabel, presence: PresenceLevel, share: f64) -> MixtureEntry {
    let evidence = if presence == PresenceLevel::NoEvidence {
        Vec::new()
    } else {
        vec![Evidence {
            page: 1,
            snippet: "Assessment and plan reviewed with the patient".to_string(),
            anchors: vec!["Assessment".to_string()],
        }]
    };
    MixtureEntry {
        label,
        presence_level: presence,
        confidence: if presence == PresenceLevel::NoEvidence { 0.1 } else { 0.85 },
        share,
        evidence,
        rationale: format!("document-level share for {}", label.name()),
    }
}

/// A classification that satisfies every deterministic invariant:
/// complete taxonomy per scope, shares summing to 1.0, valid ordered ranges.
pub fn clean_classification() -> ClassificationOutput {
    ClassificationOutput {
        dominant_label: DocumentLabel::PathologyReport,
        segment_count: 2,
        segments: vec![
            Segment {
                segment_index: 1,
                start_page: 1,
                end_page: 3,
                page_count: 3,
                dominant_label: DocumentLabel::ClinicalNote,
                composition: composition_for(DocumentLabel::ClinicalNote, 1),
                notes: None,
            },
            Segment {
                segment_index: 2,
                start_page: 4,
                end_page: 10,
                page_count: 7,
                dominant_label: DocumentLabel::PathologyReport,
                composition: composition_for(DocumentLabel::PathologyReport, 5),
                notes: None,
            },
        ],
        document_mixture: vec![
            mixture_entry(DocumentLabel::ClinicalNote, PresenceLevel::Primary, 0.30),
            mixture_entry(DocumentLabel::PathologyReport, PresenceLevel::Primary, 0.60),
            mixture_entry(DocumentLabel::GenomicReport, PresenceLevel::NoEvidence, 0.04),
            mixture_entry(DocumentLabel::RadiologyReport, PresenceLevel::NoEvidence, 0.03),
            mixture_entry(DocumentLabel::Other, PresenceLevel::NoEvidence, 0.03),
        ],
        vendor_signals: Vec::new(),
    }
}

/// A bundle of benign pages that trips no trap pattern
pub fn small_bundle(total_pages: u32) -> DocumentBundle {
    DocumentBundle {
        doc_id: "doc-test".to_string(),
        total_pages,
        pages: (1..=total_pages)
            .map(|page_num| Page {
                page_num,
                text: format!(
                    "Progress note, visit {}. Assessment and plan reviewed with the patient.",
                    page_num
                ),
            })
            .collect(),
    }
}
