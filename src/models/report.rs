use super::issue::{Issue, Severity};
use serde::{Deserialize, Serialize};

/// Unified report from one verification pass over all four validators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub issues: Vec<Issue>,

    /// Deterministic validator found no blockers
    pub schema_passed: bool,
    /// 1.0 = perfectly consistent; 0.0 when the pre-filter hit a blocker
    pub consistency_score: f64,
    /// Number of trap findings (pre-filter + oracle)
    pub traps_triggered: usize,
    /// 1.0 = all evidence verified; 0.0 when there is no evidence to assess
    pub evidence_score: f64,

    pub has_blockers: bool,
    pub total_issues: usize,
    /// Oracle calls spent on this pass
    pub oracle_calls: usize,
}

impl VerificationReport {
    pub fn blockers(&self) -> Vec<&Issue> {
        self.by_severity(Severity::Blocker)
    }

    pub fn majors(&self) -> Vec<&Issue> {
        self.by_severity(Severity::Major)
    }

    pub fn minors(&self) -> Vec<&Issue> {
        self.by_severity(Severity::Minor)
    }

    fn by_severity(&self, severity: Severity) -> Vec<&Issue> {
        self.issues.iter().filter(|i| i.severity == severity).collect()
    }

    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    /// Issues carrying a typed repair tag
    pub fn fixable_issues(&self) -> Vec<&Issue> {
        self.issues.iter().filter(|i| i.is_auto_fixable()).collect()
    }
}
