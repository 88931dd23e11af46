//! The four validators, in pipeline order.

pub mod consistency;
pub mod evidence;
pub mod schema;
pub mod trap;

pub use consistency::{ConsistencyChecker, ConsistencyOutcome};
pub use evidence::{EvidenceAssessor, EvidenceOutcome};
pub use schema::SchemaValidator;
pub use trap::{TrapDetector, TrapOutcome};
