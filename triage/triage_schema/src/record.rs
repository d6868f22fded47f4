use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::schema::{
    ColumnDiff, FeatureSchema, Symptom, Vital, FEATURE_COLUMNS, FEATURE_COUNT, NUMERIC_FEATURES,
    SYMPTOM_FEATURES,
};

/// Present/absent symptom flags.
///
/// Serialized as `0`/`1`; deserialization also accepts JSON booleans.
/// Every flag must be present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Symptoms {
    #[serde(with = "flag")]
    pub fever: bool,
    #[serde(with = "flag")]
    pub cough: bool,
    #[serde(with = "flag")]
    pub shortness_of_breath: bool,
    #[serde(with = "flag")]
    pub chest_pain: bool,
    #[serde(with = "flag")]
    pub headache: bool,
    #[serde(with = "flag")]
    pub sore_throat: bool,
    #[serde(with = "flag")]
    pub fatigue: bool,
    #[serde(with = "flag")]
    pub nausea: bool,
    #[serde(with = "flag")]
    pub abdominal_pain: bool,
    #[serde(with = "flag")]
    pub dizziness: bool,
}

impl Symptoms {
    pub fn has(&self, symptom: Symptom) -> bool {
        *self.slot(symptom)
    }

    pub fn set(&mut self, symptom: Symptom, present: bool) {
        *self.slot_mut(symptom) = present;
    }

    /// Number of present symptoms
    pub fn count(&self) -> usize {
        Symptom::ALL.iter().filter(|s| self.has(**s)).count()
    }

    fn slot(&self, symptom: Symptom) -> &bool {
        match symptom {
            Symptom::Fever => &self.fever,
            Symptom::Cough => &self.cough,
            Symptom::ShortnessOfBreath => &self.shortness_of_breath,
            Symptom::ChestPain => &self.chest_pain,
            Symptom::Headache => &self.headache,
            Symptom::SoreThroat => &self.sore_throat,
            Symptom::Fatigue => &self.fatigue,
            Symptom::Nausea => &self.nausea,
            Symptom::AbdominalPain => &self.abdominal_pain,
            Symptom::Dizziness => &self.dizziness,
        }
    }

    fn slot_mut(&mut self, symptom: Symptom) -> &mut bool {
        match symptom {
            Symptom::Fever => &mut self.fever,
            Symptom::Cough => &mut self.cough,
            Symptom::ShortnessOfBreath => &mut self.shortness_of_breath,
            Symptom::ChestPain => &mut self.chest_pain,
            Symptom::Headache => &mut self.headache,
            Symptom::SoreThroat => &mut self.sore_throat,
            Symptom::Fatigue => &mut self.fatigue,
            Symptom::Nausea => &mut self.nausea,
            Symptom::AbdominalPain => &mut self.abdominal_pain,
            Symptom::Dizziness => &mut self.dizziness,
        }
    }
}

/// One patient observation: five vitals and ten symptom flags.
///
/// The serde form is one flat object keyed by the fifteen feature columns.
/// Missing and unknown keys are both rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "FlatRecord", into = "FlatRecord")]
pub struct PatientRecord {
    pub age: u32,
    pub heart_rate: u32,
    pub systolic_bp: u32,
    pub temperature: f64,
    pub oxygen_saturation: u32,
    pub symptoms: Symptoms,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct FlatRecord {
    age: u32,
    heart_rate: u32,
    systolic_bp: u32,
    temperature: f64,
    oxygen_saturation: u32,
    #[serde(with = "flag")]
    fever: bool,
    #[serde(with = "flag")]
    cough: bool,
    #[serde(with = "flag")]
    shortness_of_breath: bool,
    #[serde(with = "flag")]
    chest_pain: bool,
    #[serde(with = "flag")]
    headache: bool,
    #[serde(with = "flag")]
    sore_throat: bool,
    #[serde(with = "flag")]
    fatigue: bool,
    #[serde(with = "flag")]
    nausea: bool,
    #[serde(with = "flag")]
    abdominal_pain: bool,
    #[serde(with = "flag")]
    dizziness: bool,
}

impl From<FlatRecord> for PatientRecord {
    fn from(f: FlatRecord) -> Self {
        Self {
            age: f.age,
            heart_rate: f.heart_rate,
            systolic_bp: f.systolic_bp,
            temperature: f.temperature,
            oxygen_saturation: f.oxygen_saturation,
            symptoms: Symptoms {
                fever: f.fever,
                cough: f.cough,
                shortness_of_breath: f.shortness_of_breath,
                chest_pain: f.chest_pain,
                headache: f.headache,
                sore_throat: f.sore_throat,
                fatigue: f.fatigue,
                nausea: f.nausea,
                abdominal_pain: f.abdominal_pain,
                dizziness: f.dizziness,
            },
        }
    }
}

impl From<PatientRecord> for FlatRecord {
    fn from(r: PatientRecord) -> Self {
        let s = r.symptoms;
        Self {
            age: r.age,
            heart_rate: r.heart_rate,
            systolic_bp: r.systolic_bp,
            temperature: r.temperature,
            oxygen_saturation: r.oxygen_saturation,
            fever: s.fever,
            cough: s.cough,
            shortness_of_breath: s.shortness_of_breath,
            chest_pain: s.chest_pain,
            headache: s.headache,
            sore_throat: s.sore_throat,
            fatigue: s.fatigue,
            nausea: s.nausea,
            abdominal_pain: s.abdominal_pain,
            dizziness: s.dizziness,
        }
    }
}

impl PatientRecord {
    /// Adult with unremarkable vitals and no symptoms; scores 0 under the rule engine.
    pub fn nominal() -> Self {
        Self {
            age: 30,
            heart_rate: 80,
            systolic_bp: 120,
            temperature: 37.0,
            oxygen_saturation: 98,
            symptoms: Symptoms::default(),
        }
    }

    pub fn with_symptom(mut self, symptom: Symptom) -> Self {
        self.symptoms.set(symptom, true);
        self
    }

    pub fn has(&self, symptom: Symptom) -> bool {
        self.symptoms.has(symptom)
    }

    pub fn vital(&self, vital: Vital) -> f64 {
        match vital {
            Vital::Age => f64::from(self.age),
            Vital::HeartRate => f64::from(self.heart_rate),
            Vital::SystolicBp => f64::from(self.systolic_bp),
            Vital::Temperature => self.temperature,
            Vital::OxygenSaturation => f64::from(self.oxygen_saturation),
        }
    }

    /// Numeric vitals in schema order
    pub fn vitals(&self) -> [f64; 5] {
        Vital::ALL.map(|v| self.vital(v))
    }

    /// All fifteen inputs in schema order, flags as 0.0/1.0
    pub fn feature_vector(&self) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for (slot, v) in out.iter_mut().zip(Vital::ALL) {
            *slot = self.vital(v);
        }
        for (slot, s) in out[NUMERIC_FEATURES.len()..].iter_mut().zip(Symptom::ALL) {
            *slot = if self.has(s) { 1.0 } else { 0.0 };
        }
        out
    }

    /// Rebuilds a record from a named row, rejecting any column layout
    /// other than the standard schema.
    pub fn from_named<S: AsRef<str>>(columns: &[S], values: &[f64]) -> Result<Self, SchemaError> {
        FeatureSchema::standard().verify(columns)?;
        Self::from_features(values)
    }

    /// Rebuilds a record from values already known to be in schema order.
    pub fn from_features(values: &[f64]) -> Result<Self, SchemaError> {
        if values.len() != FEATURE_COUNT {
            let found = (0..values.len())
                .map(|i| match FEATURE_COLUMNS.get(i) {
                    Some(name) => name.to_string(),
                    None => format!("column_{i}"),
                })
                .collect();
            return Err(SchemaError::SchemaMismatch(ColumnDiff {
                expected: FeatureSchema::standard().columns().to_vec(),
                found,
            }));
        }
        let mut symptoms = Symptoms::default();
        for (i, s) in Symptom::ALL.iter().enumerate() {
            let value = values[NUMERIC_FEATURES.len() + i];
            symptoms.set(*s, parse_flag(SYMPTOM_FEATURES[i], value)?);
        }
        Ok(Self {
            age: whole(Vital::Age, values[0])?,
            heart_rate: whole(Vital::HeartRate, values[1])?,
            systolic_bp: whole(Vital::SystolicBp, values[2])?,
            temperature: finite(Vital::Temperature, values[3])?,
            oxygen_saturation: whole(Vital::OxygenSaturation, values[4])?,
            symptoms,
        })
    }

    /// Checks every vital against its documented domain.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for vital in Vital::ALL {
            let domain = vital.domain();
            let value = self.vital(vital);
            if !domain.contains(value) {
                return Err(SchemaError::ValueOutOfRange {
                    column: vital.column(),
                    value,
                    min: domain.min,
                    max: domain.max,
                });
            }
        }
        Ok(())
    }
}

fn parse_flag(column: &'static str, value: f64) -> Result<bool, SchemaError> {
    if value == 0.0 {
        Ok(false)
    } else if value == 1.0 {
        Ok(true)
    } else {
        Err(SchemaError::InvalidFlag { column, value })
    }
}

fn finite(vital: Vital, value: f64) -> Result<f64, SchemaError> {
    if value.is_finite() {
        Ok(value)
    } else {
        let domain = vital.domain();
        Err(SchemaError::ValueOutOfRange {
            column: vital.column(),
            value,
            min: domain.min,
            max: domain.max,
        })
    }
}

fn whole(vital: Vital, value: f64) -> Result<u32, SchemaError> {
    let value = finite(vital, value)?;
    if value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        let domain = vital.domain();
        return Err(SchemaError::ValueOutOfRange {
            column: vital.column(),
            value,
            min: domain.min,
            max: domain.max,
        });
    }
    Ok(value as u32)
}

mod flag {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Bool(b) => Ok(b),
            Raw::Int(0) => Ok(false),
            Raw::Int(1) => Ok(true),
            Raw::Int(other) => Err(de::Error::custom(format!(
                "symptom flag must be 0 or 1, found {other}"
            ))),
        }
    }
}
