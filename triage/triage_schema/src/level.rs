use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SchemaError;

/// Number of classifier output classes (one per triage level)
pub const CLASS_COUNT: usize = 5;

const PRESENTATION_LABELS: [&str; CLASS_COUNT] = [
    "Level 1/2 (Emergent)",
    "Level 1/2 (Emergent)",
    "Level 3 (Urgent)",
    "Level 4 (Less Urgent)",
    "Level 5 (Non-urgent)",
];

/// Triage priority, 1 (most severe) to 5 (least severe).
///
/// Files and user-facing output use the raw 1-5 number; the classifier works
/// on the zero-based [`class_index`](TriageLevel::class_index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TriageLevel {
    Resuscitation = 1,
    Emergent = 2,
    Urgent = 3,
    LessUrgent = 4,
    NonUrgent = 5,
}

impl TriageLevel {
    pub const ALL: [TriageLevel; CLASS_COUNT] = [
        TriageLevel::Resuscitation,
        TriageLevel::Emergent,
        TriageLevel::Urgent,
        TriageLevel::LessUrgent,
        TriageLevel::NonUrgent,
    ];

    pub fn from_raw(raw: i64) -> Result<Self, SchemaError> {
        match raw {
            1 => Ok(TriageLevel::Resuscitation),
            2 => Ok(TriageLevel::Emergent),
            3 => Ok(TriageLevel::Urgent),
            4 => Ok(TriageLevel::LessUrgent),
            5 => Ok(TriageLevel::NonUrgent),
            other => Err(SchemaError::LabelOutOfRange(other)),
        }
    }

    pub fn raw(self) -> u8 {
        self as u8
    }

    /// Zero-based class used for training (`level - 1`)
    pub fn class_index(self) -> usize {
        self as usize - 1
    }

    pub fn from_class_index(index: usize) -> Result<Self, SchemaError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(SchemaError::LabelOutOfRange(index as i64 + 1))
    }

    pub fn name(self) -> &'static str {
        match self {
            TriageLevel::Resuscitation => "Resuscitation",
            TriageLevel::Emergent => "Emergent",
            TriageLevel::Urgent => "Urgent",
            TriageLevel::LessUrgent => "Less Urgent",
            TriageLevel::NonUrgent => "Non-urgent",
        }
    }

    pub fn presentation_label(self) -> &'static str {
        PRESENTATION_LABELS[self.class_index()]
    }
}

/// Label shown for a predicted class; levels 1 and 2 share one label.
pub fn presentation_label(class_index: usize) -> Option<&'static str> {
    PRESENTATION_LABELS.get(class_index).copied()
}

impl fmt::Display for TriageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Level {} ({})", self.raw(), self.name())
    }
}

impl TryFrom<u8> for TriageLevel {
    type Error = SchemaError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::from_raw(i64::from(raw))
    }
}

impl From<TriageLevel> for u8 {
    fn from(level: TriageLevel) -> u8 {
        level.raw()
    }
}
