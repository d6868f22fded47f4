//! Triage rule engine.
//!
//! Scores a [`PatientRecord`](triage_schema::PatientRecord) by summing the
//! points of every rule it triggers, then maps the total to a
//! [`TriageLevel`](triage_schema::TriageLevel) through a single descending
//! threshold ladder. Every rule is evaluated; none short-circuits another.
//!
//! ```
//! use triage_rules::score_and_classify;
//! use triage_schema::{PatientRecord, TriageLevel};
//!
//! let mut record = PatientRecord::nominal();
//! record.oxygen_saturation = 80;
//! assert_eq!(score_and_classify(&record), (4, TriageLevel::Emergent));
//! ```

pub mod engine;
pub mod rule;

pub use engine::{assess, level_for_score, score_and_classify, TriageAssessment};
pub use rule::{Rule, RULES};
