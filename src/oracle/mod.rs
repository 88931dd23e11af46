//! Narrow capability interface to the external reasoning oracle.
//!
//! Three validators share the same call shape: send a structured prompt,
//! receive text that should be a JSON array of issue objects. Failures are
//! recovered at the call site and never fail the pipeline, so the trait keeps
//! transport and malformed-response errors distinct but equally non-fatal.

pub mod gemini;
pub mod prompts;

pub use gemini::GeminiOracle;

use crate::models::{Issue, IssueCategory, IssueLocation, IssueOrigin, Severity};
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle transport failed: {0}")]
    Transport(String),
    #[error("oracle response malformed: {0}")]
    Malformed(String),
}

/// Capability interface for the reasoning oracle.
///
/// Tests substitute a deterministic fake; production uses [`GeminiOracle`].
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Submit a structured prompt and return the raw response text.
    /// The response is expected to be a JSON array of issue objects.
    async fn evaluate(&self, prompt: &str) -> Result<String, OracleError>;
}

/// Wire shape of one oracle-reported issue
#[derive(Debug, Deserialize)]
struct RawOracleIssue {
    severity: Option<String>,
    message: Option<String>,
    #[serde(default)]
    location: Option<RawLocation>,
    suggested_fix: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    segment_index: Option<u32>,
    label: Option<serde_json::Value>,
    field: Option<String>,
}

/// Parse an oracle response into issues.
///
/// The response must be a JSON array; entries that fail to deserialize are
/// skipped with a warning rather than discarding the whole response. Oracle
/// findings never carry a typed repair tag.
pub fn parse_oracle_issues(
    raw: &str,
    origin: IssueOrigin,
    category: IssueCategory,
    seq_start: usize,
) -> Result<Vec<Issue>, OracleError> {
    let values: Vec<serde_json::Value> = serde_json::from_str(raw)
        .map_err(|e| OracleError::Malformed(format!("expected JSON array: {}", e)))?;

    let mut issues = Vec::new();
    for value in values {
        let raw_issue: RawOracleIssue = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("warning: skipping malformed oracle issue entry: {}", e);
                continue;
            }
        };

        let severity = match raw_issue.severity.as_deref() {
            Some("BLOCKER") => Severity::Blocker,
            Some("MINOR") => Severity::Minor,
            // MAJOR and anything unrecognized
            _ => Severity::Major,
        };

        let mut issue = Issue::new(
            seq_start + issues.len(),
            origin,
            category,
            severity,
            raw_issue
                .message
                .unwrap_or_else(|| "unspecified oracle finding".to_string()),
        );

        if let Some(loc) = raw_issue.location {
            let label = loc
                .label
                .and_then(|v| serde_json::from_value(v).ok());
            issue = issue.with_location(IssueLocation {
                segment_index: loc.segment_index,
                label,
                field: loc.field,
            });
        }
        if let Some(suggested) = raw_issue.suggested_fix {
            issue = issue.with_suggested_fix(suggested);
        }

        issues.push(issue);
    }

    Ok(issues)
}
