use serde::{Deserialize, Serialize};
use std::fmt;

use triage_schema::{PatientRecord, Symptom};

/// A single scoring condition of the triage rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    ChestPainOver40,
    ShortnessOfBreath,
    LowOxygen,
    AbnormalBloodPressure,
    AbnormalHeartRate,
    AbdominalPainWithFever,
    HighTemperature,
    HeadacheWithDizziness,
    RespiratoryIrritation,
}

/// Rule table in evaluation order
pub const RULES: [Rule; 9] = [
    Rule::ChestPainOver40,
    Rule::ShortnessOfBreath,
    Rule::LowOxygen,
    Rule::AbnormalBloodPressure,
    Rule::AbnormalHeartRate,
    Rule::AbdominalPainWithFever,
    Rule::HighTemperature,
    Rule::HeadacheWithDizziness,
    Rule::RespiratoryIrritation,
];

impl Rule {
    pub fn points(self) -> u32 {
        match self {
            Rule::ChestPainOver40 | Rule::ShortnessOfBreath | Rule::LowOxygen => 4,
            Rule::AbnormalBloodPressure | Rule::AbnormalHeartRate => 3,
            Rule::AbdominalPainWithFever | Rule::HighTemperature | Rule::HeadacheWithDizziness => {
                2
            }
            Rule::RespiratoryIrritation => 1,
        }
    }

    pub fn applies(self, r: &PatientRecord) -> bool {
        match self {
            Rule::ChestPainOver40 => r.has(Symptom::ChestPain) && r.age > 40,
            Rule::ShortnessOfBreath => r.has(Symptom::ShortnessOfBreath),
            Rule::LowOxygen => r.oxygen_saturation < 92,
            Rule::AbnormalBloodPressure => r.systolic_bp > 180 || r.systolic_bp < 90,
            Rule::AbnormalHeartRate => r.heart_rate > 140 || r.heart_rate < 55,
            Rule::AbdominalPainWithFever => {
                r.has(Symptom::AbdominalPain) && r.has(Symptom::Fever)
            }
            Rule::HighTemperature => r.temperature > 39.5,
            Rule::HeadacheWithDizziness => r.has(Symptom::Headache) && r.has(Symptom::Dizziness),
            Rule::RespiratoryIrritation => r.has(Symptom::Cough) || r.has(Symptom::SoreThroat),
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Rule::ChestPainOver40 => "chest pain in a patient over 40",
            Rule::ShortnessOfBreath => "shortness of breath",
            Rule::LowOxygen => "oxygen saturation below 92%",
            Rule::AbnormalBloodPressure => "systolic blood pressure above 180 or below 90",
            Rule::AbnormalHeartRate => "heart rate above 140 or below 55",
            Rule::AbdominalPainWithFever => "abdominal pain with fever",
            Rule::HighTemperature => "temperature above 39.5",
            Rule::HeadacheWithDizziness => "headache with dizziness",
            Rule::RespiratoryIrritation => "cough or sore throat",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (+{})", self.description(), self.points())
    }
}
