pub mod classification;
pub mod config;
pub mod decision;
pub mod issue;
pub mod report;

pub use classification::{
    ClassificationOutput, DocumentBundle, DocumentLabel, Evidence, MixtureEntry, Page,
    PresenceLevel, Segment, SegmentComposition,
};
pub use config::{OracleConfig, VeridocConfig};
pub use decision::{ArbiterDecision, DecisionKind, RetryAttemptRecord};
pub use issue::{FixKind, Issue, IssueCategory, IssueLocation, IssueOrigin, Severity};
pub use report::VerificationReport;
