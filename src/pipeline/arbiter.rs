//! Arbiter: a pure decision function over one verification report.

use crate::models::{ArbiterDecision, DecisionKind, Severity, VerificationReport};

/// Decide what happens to a classification after one verification pass.
///
/// The rules are evaluated in order; the first match wins.
pub fn decide(report: &VerificationReport) -> ArbiterDecision {
    let blocker_count = report.count_by_severity(Severity::Blocker);
    let major_count = report.count_by_severity(Severity::Major);
    let minor_count = report.count_by_severity(Severity::Minor);
    let fixable_count = report.fixable_issues().len();

    let fixable_majors = report
        .issues
        .iter()
        .filter(|i| i.severity == Severity::Major && i.is_auto_fixable())
        .count();
    let non_fixable_majors = major_count - fixable_majors;

    let (decision, reason) = if blocker_count > 0 {
        (
            DecisionKind::EscalateToSme,
            format!("{} blocker issue(s) require human review", blocker_count),
        )
    } else if major_count >= 3 {
        (
            DecisionKind::EscalateToSme,
            format!("{} major issues exceed the retry threshold", major_count),
        )
    } else if non_fixable_majors >= 2 {
        (
            DecisionKind::EscalateToSme,
            format!("{} major issues have no automated repair", non_fixable_majors),
        )
    } else if non_fixable_majors >= 1 {
        (
            DecisionKind::EscalateToSme,
            "a major issue has no automated repair".to_string(),
        )
    } else if (1..=2).contains(&fixable_majors) {
        (
            DecisionKind::AutoRetry,
            format!("{} major issue(s) are auto-fixable", fixable_majors),
        )
    } else if major_count == 0 {
        let reason = if minor_count == 0 {
            "no issues found".to_string()
        } else {
            format!("only {} minor issue(s), within tolerance", minor_count)
        };
        (DecisionKind::AutoAccept, reason)
    } else {
        // defensive default toward human review
        (
            DecisionKind::EscalateToSme,
            "ambiguous issue pattern".to_string(),
        )
    };

    ArbiterDecision {
        decision,
        reason,
        issues_analyzed: report.total_issues,
        blocker_count,
        major_count,
        minor_count,
        fixable_count,
    }
}
