//! Prompt builders for the three oracle passes.
//!
//! Each prompt is a role template plus an INPUT/OUTPUT contract demanding a
//! JSON array of issue objects, so all three responses parse through
//! [`super::parse_oracle_issues`].

const CONSISTENCY_TEMPLATE: &str = include_str!("../../templates/consistency_auditor.txt");
const TRAP_TEMPLATE: &str = include_str!("../../templates/trap_detector.txt");
const EVIDENCE_TEMPLATE: &str = include_str!("../../templates/evidence_assessor.txt");

const OUTPUT_CONTRACT: &str = r#"===== OUTPUT FORMAT =====

Return a JSON array of issue objects. Each issue must have:
{
  "severity": "BLOCKER" | "MAJOR" | "MINOR",
  "message": "clear description of the problem",
  "location": {"segment_index": 1, "label": "Genomic Report", "field": "rationale"},
  "suggested_fix": "how to resolve it"
}

If there are no issues: return []
"#;

/// Semantic consistency pass: classification JSON + full per-segment text
pub fn consistency_prompt(classification_json: &str, segment_texts_json: &str) -> String {
    format!(
        "{base}\n\n{contract}\n===== INPUT DATA =====\n\n\
         CLASSIFICATION OUTPUT:\n{classification}\n\n\
         SEGMENT TEXTS (full text per segment index):\n{texts}\n\n\
         ===== YOUR OUTPUT (JSON array only) =====\n",
        base = CONSISTENCY_TEMPLATE,
        contract = OUTPUT_CONTRACT,
        classification = classification_json,
        texts = segment_texts_json,
    )
}

/// Contextual trap pass: classification JSON + bounded document window
pub fn trap_prompt(classification_json: &str, text_window: &str) -> String {
    format!(
        "{base}\n\n{contract}\n===== INPUT DATA =====\n\n\
         CLASSIFICATION OUTPUT:\n{classification}\n\n\
         DOCUMENT TEXT (bounded window):\n{window}\n\n\
         ===== YOUR OUTPUT (JSON array only) =====\n",
        base = TRAP_TEMPLATE,
        contract = OUTPUT_CONTRACT,
        classification = classification_json,
        window = text_window,
    )
}

/// Evidence verification pass: classification JSON + verbatim claimed pages
pub fn evidence_prompt(classification_json: &str, page_context_json: &str) -> String {
    format!(
        "{base}\n\n{contract}\n===== INPUT DATA =====\n\n\
         CLASSIFICATION OUTPUT:\n{classification}\n\n\
         VERBATIM PAGE TEXT (for independent verification):\n{pages}\n\n\
         ===== YOUR OUTPUT (JSON array only) =====\n",
        base = EVIDENCE_TEMPLATE,
        contract = OUTPUT_CONTRACT,
        classification = classification_json,
        pages = page_context_json,
    )
}
