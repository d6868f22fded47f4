use serde::{Deserialize, Serialize};
use std::fmt;

use triage_rules::score_and_classify;
use triage_schema::{PatientRecord, TriageLevel, Vital, CLASS_COUNT};

use crate::error::DataError;

/// A patient record paired with its ground-truth triage level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledRecord {
    pub record: PatientRecord,
    pub level: TriageLevel,
}

impl LabeledRecord {
    /// Labels a record with the rule engine.
    pub fn from_rules(record: PatientRecord) -> Self {
        let (_, level) = score_and_classify(&record);
        Self { record, level }
    }
}

/// Ordered collection of labeled records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<LabeledRecord>,
}

impl Dataset {
    pub fn new(rows: Vec<LabeledRecord>) -> Self {
        Self { rows }
    }

    /// Ground-truths every record through the rule engine.
    pub fn label_with_rules(records: impl IntoIterator<Item = PatientRecord>) -> Self {
        records.into_iter().map(LabeledRecord::from_rules).collect()
    }

    pub fn rows(&self) -> &[LabeledRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: LabeledRecord) {
        self.rows.push(row);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LabeledRecord> {
        self.rows.iter()
    }

    pub fn records(&self) -> impl Iterator<Item = &PatientRecord> {
        self.rows.iter().map(|r| &r.record)
    }

    pub fn levels(&self) -> Vec<TriageLevel> {
        self.rows.iter().map(|r| r.level).collect()
    }

    pub fn ensure_not_empty(&self) -> Result<(), DataError> {
        if self.rows.is_empty() {
            Err(DataError::EmptyDataset)
        } else {
            Ok(())
        }
    }

    /// Rows per triage level, indexed by class index
    pub fn level_counts(&self) -> [usize; CLASS_COUNT] {
        let mut counts = [0; CLASS_COUNT];
        for row in &self.rows {
            counts[row.level.class_index()] += 1;
        }
        counts
    }

    pub fn summary(&self) -> DatasetSummary {
        let vitals = Vital::ALL
            .iter()
            .map(|v| VitalStats::from_values(v.column(), self.records().map(|r| r.vital(*v))))
            .collect();
        DatasetSummary {
            records: self.len(),
            level_counts: self.level_counts(),
            vitals,
        }
    }
}

impl FromIterator<LabeledRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = LabeledRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a LabeledRecord;
    type IntoIter = std::slice::Iter<'a, LabeledRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl IntoIterator for Dataset {
    type Item = LabeledRecord;
    type IntoIter = std::vec::IntoIter<LabeledRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VitalStats {
    pub column: &'static str,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

impl VitalStats {
    fn from_values(column: &'static str, values: impl Iterator<Item = f64>) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut n = 0usize;
        for x in values {
            min = min.min(x);
            max = max.max(x);
            sum += x;
            n += 1;
        }
        if n == 0 {
            return Self {
                column,
                min: f64::NAN,
                mean: f64::NAN,
                max: f64::NAN,
            };
        }
        Self {
            column,
            min,
            mean: sum / n as f64,
            max,
        }
    }
}

/// Shape and label balance of a dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub records: usize,
    pub level_counts: [usize; CLASS_COUNT],
    pub vitals: Vec<VitalStats>,
}

impl DatasetSummary {
    pub fn proportion(&self, level: TriageLevel) -> f64 {
        if self.records == 0 {
            return 0.0;
        }
        self.level_counts[level.class_index()] as f64 / self.records as f64
    }
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "records: {}", self.records)?;
        writeln!(f, "triage levels:")?;
        for level in TriageLevel::ALL {
            writeln!(
                f,
                "  {:<26} {:>6}  ({:>5.1}%)",
                level.to_string(),
                self.level_counts[level.class_index()],
                self.proportion(level) * 100.0
            )?;
        }
        writeln!(f, "vitals:")?;
        for v in &self.vitals {
            writeln!(
                f,
                "  {:<18} min {:>6.1}  mean {:>6.1}  max {:>6.1}",
                v.column, v.min, v.mean, v.max
            )?;
        }
        Ok(())
    }
}
