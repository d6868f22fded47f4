use serde::{Deserialize, Serialize};
use std::fmt;

use triage_schema::{PatientRecord, TriageLevel};

use crate::rule::{Rule, RULES};

/// Score, level and the rules that produced them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageAssessment {
    pub score: u32,
    pub level: TriageLevel,
    /// Triggered rules in rule-table order
    pub triggered: Vec<Rule>,
}

impl fmt::Display for TriageAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "score {} -> {}", self.score, self.level)?;
        for rule in &self.triggered {
            write!(f, "\n  - {rule}")?;
        }
        Ok(())
    }
}

/// Maps a cumulative score to a level; thresholds checked from the top down.
pub fn level_for_score(score: u32) -> TriageLevel {
    if score >= 6 {
        TriageLevel::Resuscitation
    } else if score >= 4 {
        TriageLevel::Emergent
    } else if score >= 3 {
        TriageLevel::Urgent
    } else if score >= 1 {
        TriageLevel::LessUrgent
    } else {
        TriageLevel::NonUrgent
    }
}

pub fn score_and_classify(record: &PatientRecord) -> (u32, TriageLevel) {
    let score: u32 = RULES
        .iter()
        .filter(|rule| rule.applies(record))
        .map(|rule| rule.points())
        .sum();
    (score, level_for_score(score))
}

/// Like [`score_and_classify`] but also reports which rules fired.
pub fn assess(record: &PatientRecord) -> TriageAssessment {
    let triggered: Vec<Rule> = RULES.into_iter().filter(|r| r.applies(record)).collect();
    let score: u32 = triggered.iter().map(|r| r.points()).sum();
    TriageAssessment {
        score,
        level: level_for_score(score),
        triggered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use triage_schema::Symptom;

    #[test]
    fn ladder() {
        let expected = [
            (0, 5),
            (1, 4),
            (2, 4),
            (3, 3),
            (4, 2),
            (5, 2),
            (6, 1),
            (7, 1),
            (30, 1),
        ];
        for (score, level) in expected {
            assert_eq!(level_for_score(score).raw(), level, "score {score}");
        }
    }

    #[test]
    fn chest_pain_sample_patient() {
        let record = PatientRecord {
            age: 65,
            heart_rate: 120,
            systolic_bp: 160,
            temperature: 37.1,
            oxygen_saturation: 95,
            symptoms: Default::default(),
        }
        .with_symptom(Symptom::ChestPain);
        assert_eq!(score_and_classify(&record), (4, TriageLevel::Emergent));
    }

    #[test]
    fn fatigue_and_nausea_score_nothing() {
        let record = PatientRecord::nominal()
            .with_symptom(Symptom::Fatigue)
            .with_symptom(Symptom::Nausea);
        assert_eq!(score_and_classify(&record), (0, TriageLevel::NonUrgent));
    }

    #[test]
    fn low_oxygen_alone() {
        let mut record = PatientRecord::nominal();
        record.oxygen_saturation = 80;
        assert_eq!(score_and_classify(&record), (4, TriageLevel::Emergent));
    }

    #[test]
    fn all_nominal_is_non_urgent() {
        let record = PatientRecord::nominal();
        assert_eq!(score_and_classify(&record), (0, TriageLevel::NonUrgent));
    }

    #[test]
    fn rules_accumulate_without_early_exit() {
        let mut record = PatientRecord::nominal()
            .with_symptom(Symptom::ShortnessOfBreath)
            .with_symptom(Symptom::Cough);
        record.heart_rate = 150;
        // 4 + 3 + 1
        let a = assess(&record);
        assert_eq!(a.score, 8);
        assert_eq!(a.level, TriageLevel::Resuscitation);
        assert_eq!(
            a.triggered,
            vec![
                Rule::ShortnessOfBreath,
                Rule::AbnormalHeartRate,
                Rule::RespiratoryIrritation
            ]
        );
    }

    #[test]
    fn borderline_three_and_four_differ() {
        let mut three = PatientRecord::nominal();
        three.systolic_bp = 185;
        assert_eq!(score_and_classify(&three), (3, TriageLevel::Urgent));

        let four = three.with_symptom(Symptom::SoreThroat);
        assert_eq!(score_and_classify(&four), (4, TriageLevel::Emergent));
    }

    #[test]
    fn assessment_display_lists_rules() {
        let record = PatientRecord::nominal().with_symptom(Symptom::Cough);
        let text = assess(&record).to_string();
        assert!(text.starts_with("score 1 -> Level 4 (Less Urgent)"));
        assert!(text.contains("cough or sore throat (+1)"));
    }
}
