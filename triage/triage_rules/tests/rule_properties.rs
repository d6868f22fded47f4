use proptest::prelude::*;
use triage_rules::{assess, level_for_score, score_and_classify, RULES};
use triage_schema::{PatientRecord, Symptom, Symptoms};

fn arb_record() -> impl Strategy<Value = PatientRecord> {
    (
        1u32..=94,
        50u32..=179,
        80u32..=199,
        360u32..=405,
        85u32..=100,
        proptest::collection::vec(any::<bool>(), 10),
    )
        .prop_map(|(age, heart_rate, systolic_bp, temp_tenths, oxygen, flags)| {
            let mut symptoms = Symptoms::default();
            for (s, on) in Symptom::ALL.iter().zip(flags) {
                symptoms.set(*s, on);
            }
            PatientRecord {
                age,
                heart_rate,
                systolic_bp,
                temperature: f64::from(temp_tenths) / 10.0,
                oxygen_saturation: oxygen,
                symptoms,
            }
        })
}

proptest! {
    #[test]
    fn scoring_is_deterministic(record in arb_record()) {
        prop_assert_eq!(score_and_classify(&record), score_and_classify(&record));
    }

    #[test]
    fn assessment_agrees_with_score(record in arb_record()) {
        let (score, level) = score_and_classify(&record);
        let a = assess(&record);
        prop_assert_eq!(a.score, score);
        prop_assert_eq!(a.level, level);
        let from_rules: u32 = a.triggered.iter().map(|r| r.points()).sum();
        prop_assert_eq!(from_rules, score);
    }

    #[test]
    fn score_is_bounded_by_rule_table(record in arb_record()) {
        let max: u32 = RULES.iter().map(|r| r.points()).sum();
        prop_assert!(score_and_classify(&record).0 <= max);
    }

    #[test]
    fn level_never_increases_with_score(a in 0u32..30, b in 0u32..30) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(level_for_score(hi).raw() <= level_for_score(lo).raw());
    }

    #[test]
    fn adding_a_symptom_never_lowers_severity(record in arb_record(), idx in 0usize..10) {
        let worse = record.with_symptom(Symptom::ALL[idx]);
        prop_assert!(score_and_classify(&worse).0 >= score_and_classify(&record).0);
    }
}
