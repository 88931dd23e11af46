//! Stable fingerprints over the structurally relevant classification fields.
//!
//! Two classifications that differ only in rationale text, evidence snippets,
//! or share noise below 4 decimals produce the same fingerprint. The retry
//! loop uses this to notice when a fix pass changed nothing that matters.

use crate::models::ClassificationOutput;
use anyhow::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};

#[derive(Serialize)]
struct SegmentDigest {
    start_page: u32,
    end_page: u32,
    dominant: &'static str,
    shares: Vec<i64>,
}

#[derive(Serialize)]
struct FingerprintPayload {
    segment_count: usize,
    dominant: &'static str,
    segments: Vec<SegmentDigest>,
    mixture_shares: Vec<i64>,
}

/// Round a share to 4 decimals, as an integer so the encoding is exact
fn quantize(share: f64) -> i64 {
    (share * 10_000.0).round() as i64
}

/// SHA-256 hex digest of the structural shape of a classification
pub fn fingerprint(classification: &ClassificationOutput) -> Result<String> {
    let payload = FingerprintPayload {
        segment_count: classification.segments.len(),
        dominant: classification.dominant_label.name(),
        segments: classification
            .segments
            .iter()
            .map(|s| SegmentDigest {
                start_page: s.start_page,
                end_page: s.end_page,
                dominant: s.dominant_label.name(),
                shares: s.composition.iter().map(|c| quantize(c.share)).collect(),
            })
            .collect(),
        mixture_shares: classification
            .document_mixture
            .iter()
            .map(|e| quantize(e.share))
            .collect(),
    };

    let encoded = serde_json::to_vec(&payload)?;
    let mut hasher = Sha256::new();
    hasher.update(&encoded);
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::clean_classification;

    #[test]
    fn test_stable_across_cosmetic_edits() {
        let a = clean_classification();
        let mut b = clean_classification();
        b.segments[0].composition[0].rationale = "reworded rationale".to_string();
        b.segments[0].notes = Some("annotated".to_string());
        assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn test_share_noise_below_rounding_is_ignored() {
        let a = clean_classification();
        let mut b = clean_classification();
        b.document_mixture[0].share += 0.000_01;
        assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn test_structural_change_alters_fingerprint() {
        let a = clean_classification();
        let mut b = clean_classification();
        b.segments[1].end_page = 9;
        assert_ne!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn test_dominant_label_change_alters_fingerprint() {
        use crate::models::DocumentLabel;

        let a = clean_classification();
        let mut overall = clean_classification();
        overall.dominant_label = DocumentLabel::ClinicalNote;
        assert_ne!(fingerprint(&a).unwrap(), fingerprint(&overall).unwrap());

        let mut per_segment = clean_classification();
        per_segment.segments[0].dominant_label = DocumentLabel::Other;
        assert_ne!(fingerprint(&a).unwrap(), fingerprint(&per_segment).unwrap());
    }

    #[test]
    fn test_share_change_above_rounding_alters_fingerprint() {
        let a = clean_classification();
        let mut b = clean_classification();
        b.document_mixture[0].share += 0.01;
        assert_ne!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }
}
