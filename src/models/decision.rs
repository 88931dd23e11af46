use serde::{Deserialize, Serialize};

/// Decision code produced by the arbiter.
///
/// AutoRetry is a transient value of the retry loop's state machine; it never
/// escapes `verify_with_retry`. External callers only ever observe AutoAccept
/// or EscalateToSme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionKind {
    #[serde(rename = "AUTO_ACCEPT")]
    AutoAccept,
    #[serde(rename = "AUTO_RETRY")]
    AutoRetry,
    #[serde(rename = "ESCALATE_TO_SME")]
    EscalateToSme,
}

impl DecisionKind {
    pub fn name(&self) -> &'static str {
        match self {
            DecisionKind::AutoAccept => "AUTO_ACCEPT",
            DecisionKind::AutoRetry => "AUTO_RETRY",
            DecisionKind::EscalateToSme => "ESCALATE_TO_SME",
        }
    }

    /// Terminal decisions end the retry loop
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DecisionKind::AutoRetry)
    }
}

/// Final decision from the arbiter, with the counts it was derived from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbiterDecision {
    pub decision: DecisionKind,
    pub reason: String,
    pub issues_analyzed: usize,
    pub blocker_count: usize,
    pub major_count: usize,
    pub minor_count: usize,
    /// Issues carrying a typed repair tag
    pub fixable_count: usize,
}

impl ArbiterDecision {
    /// Replace the decision with an escalation, keeping the analyzed counts.
    /// Used by the retry loop for cycle detection and the attempt bound.
    pub fn escalated(&self, reason: impl Into<String>) -> Self {
        Self {
            decision: DecisionKind::EscalateToSme,
            reason: reason.into(),
            ..self.clone()
        }
    }
}

/// One entry of the retry history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryAttemptRecord {
    /// 1-based verification attempt this record closes
    pub attempt: usize,
    pub issues_before_fix: usize,
    pub fixable_issues: usize,
    /// Human-readable log of repairs, in application order
    pub fixes_applied: Vec<String>,
    pub decision_before_retry: DecisionKind,
}
