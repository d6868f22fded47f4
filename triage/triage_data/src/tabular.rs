//! Comma-separated dataset files.
//!
//! One header row naming the fifteen feature columns plus `triage_level`,
//! then one row per record. Flags are written as `0`/`1` and the label as
//! its raw level (1..=5). Reading verifies the header against the schema
//! before any row is parsed.

use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use triage_schema::{
    dataset_header, ColumnDiff, PatientRecord, SchemaError, TriageLevel, Vital, FEATURE_COUNT,
};

use crate::dataset::{Dataset, LabeledRecord};
use crate::error::DataError;

/// Serialize a dataset to a CSV string buffer
pub fn to_csv(dataset: &Dataset) -> String {
    let mut out = String::new();
    out.push_str(&dataset_header().join(","));
    out.push('\n');
    for row in dataset {
        out.push_str(&format_row(row));
        out.push('\n');
    }
    out
}

/// Parse a dataset from CSV text
pub fn from_csv(s: &str) -> Result<Dataset, DataError> {
    read_dataset(s.as_bytes())
}

pub fn write_dataset<W: Write>(dataset: &Dataset, writer: W) -> Result<(), DataError> {
    let mut w = BufWriter::new(writer);
    let io_err = |e| DataError::io("writing dataset", e);
    writeln!(w, "{}", dataset_header().join(",")).map_err(io_err)?;
    for row in dataset {
        writeln!(w, "{}", format_row(row)).map_err(io_err)?;
    }
    w.flush().map_err(io_err)
}

pub fn read_dataset<R: BufRead>(reader: R) -> Result<Dataset, DataError> {
    let mut lines = reader.lines().enumerate();
    let header = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line.map_err(|e| DataError::io("reading dataset header", e))?;
                if !line.trim().is_empty() {
                    break line;
                }
            }
            None => return Err(DataError::EmptyDataset),
        }
    };
    verify_header(&header)?;

    let mut dataset = Dataset::default();
    for (idx, line) in lines {
        let line_no = idx + 1;
        let line = line.map_err(|e| DataError::io(format!("reading line {line_no}"), e))?;
        if line.trim().is_empty() {
            continue;
        }
        dataset.push(parse_row(line_no, &line)?);
    }
    log::debug!("read {} dataset rows", dataset.len());
    Ok(dataset)
}

pub fn save_dataset(dataset: &Dataset, path: impl AsRef<Path>) -> Result<(), DataError> {
    let path = path.as_ref();
    let file = fs::File::create(path)
        .map_err(|e| DataError::io(format!("creating {}", path.display()), e))?;
    write_dataset(dataset, file)?;
    log::info!("wrote {} records to {}", dataset.len(), path.display());
    Ok(())
}

pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset, DataError> {
    let path = path.as_ref();
    let file =
        fs::File::open(path).map_err(|e| DataError::io(format!("opening {}", path.display()), e))?;
    let dataset = read_dataset(BufReader::new(file))?;
    log::info!("loaded {} records from {}", dataset.len(), path.display());
    Ok(dataset)
}

fn verify_header(line: &str) -> Result<(), DataError> {
    let found: Vec<String> = line.split(',').map(|c| c.trim().to_string()).collect();
    let expected = dataset_header();
    let same = found.len() == expected.len() && found.iter().zip(&expected).all(|(f, e)| f == e);
    if same {
        Ok(())
    } else {
        Err(SchemaError::SchemaMismatch(ColumnDiff {
            expected: expected.iter().map(|c| c.to_string()).collect(),
            found,
        })
        .into())
    }
}

fn format_row(row: &LabeledRecord) -> String {
    let r = &row.record;
    let mut fields = Vec::with_capacity(FEATURE_COUNT + 1);
    fields.push(r.age.to_string());
    fields.push(r.heart_rate.to_string());
    fields.push(r.systolic_bp.to_string());
    fields.push(format_temperature(r.temperature));
    fields.push(r.oxygen_saturation.to_string());
    for x in &r.feature_vector()[Vital::ALL.len()..] {
        let flag = if *x == 1.0 { "1" } else { "0" };
        fields.push(flag.to_string());
    }
    fields.push(row.level.raw().to_string());
    fields.join(",")
}

// One decimal unless that would lose precision.
fn format_temperature(t: f64) -> String {
    let short = format!("{t:.1}");
    match short.parse::<f64>() {
        Ok(back) if back == t => short,
        _ => t.to_string(),
    }
}

fn parse_row(line: usize, text: &str) -> Result<LabeledRecord, DataError> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    if fields.len() != FEATURE_COUNT + 1 {
        return Err(DataError::Parse {
            line,
            message: format!("expected {} fields, found {}", FEATURE_COUNT + 1, fields.len()),
        });
    }
    let mut values = Vec::with_capacity(FEATURE_COUNT);
    for (i, field) in fields[..FEATURE_COUNT].iter().enumerate() {
        let v = field.parse::<f64>().map_err(|_| DataError::Parse {
            line,
            message: format!("column {}: `{field}` is not a number", i + 1),
        })?;
        values.push(v);
    }
    let label = parse_label(line, fields[FEATURE_COUNT])?;
    let level = TriageLevel::from_raw(label).map_err(|source| DataError::Row { line, source })?;
    let record =
        PatientRecord::from_features(&values).map_err(|source| DataError::Row { line, source })?;
    record
        .validate()
        .map_err(|source| DataError::Row { line, source })?;
    Ok(LabeledRecord { record, level })
}

fn parse_label(line: usize, field: &str) -> Result<i64, DataError> {
    if let Ok(v) = field.parse::<i64>() {
        return Ok(v);
    }
    match field.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 && v.is_finite() => Ok(v as i64),
        _ => Err(DataError::Parse {
            line,
            message: format!("label `{field}` is not an integer level"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use triage_schema::Symptom;

    fn sample() -> Dataset {
        let mut hot = PatientRecord::nominal().with_symptom(Symptom::Fever);
        hot.temperature = 39.9;
        let mut low_o2 = PatientRecord::nominal();
        low_o2.oxygen_saturation = 88;
        Dataset::label_with_rules([PatientRecord::nominal(), hot, low_o2])
    }

    #[test]
    fn header_then_rows() {
        let text = to_csv(&sample());
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), dataset_header().join(","));
        let first = lines.next().unwrap();
        assert!(first.starts_with("30,80,120,37.0,98,"));
        assert!(first.ends_with(",5"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn csv_text_reads_back() {
        let ds = sample();
        assert_eq!(from_csv(&to_csv(&ds)).unwrap(), ds);
    }

    #[test]
    fn reordered_header_is_schema_mismatch() {
        let mut header = dataset_header();
        header.swap(0, 1);
        let text = format!("{}\n", header.join(","));
        let err = from_csv(&text).unwrap_err();
        assert!(err.is_schema_mismatch(), "{err}");
    }

    #[test]
    fn bad_label_reports_line() {
        let mut text = to_csv(&sample());
        text.push_str("30,80,120,37.0,98,0,0,0,0,0,0,0,0,0,0,7\n");
        match from_csv(&text).unwrap_err() {
            DataError::Row {
                line: 5,
                source: SchemaError::LabelOutOfRange(7),
            } => {}
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn short_row_is_parse_error() {
        let text = format!("{}\n1,2,3\n", dataset_header().join(","));
        assert!(matches!(
            from_csv(&text),
            Err(DataError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn out_of_domain_vital_is_rejected() {
        let text = format!(
            "{}\n30,80,120,37.0,120,0,0,0,0,0,0,0,0,0,0,5\n",
            dataset_header().join(",")
        );
        assert!(matches!(
            from_csv(&text),
            Err(DataError::Row {
                source: SchemaError::ValueOutOfRange {
                    column: "oxygen_saturation",
                    ..
                },
                ..
            })
        ));
    }

    #[test]
    fn empty_input_is_empty_dataset() {
        assert!(matches!(from_csv(""), Err(DataError::EmptyDataset)));
        let header_only = format!("{}\n", dataset_header().join(","));
        assert!(from_csv(&header_only).unwrap().is_empty());
    }

    #[test]
    fn temperature_keeps_one_decimal() {
        assert_eq!(format_temperature(37.0), "37.0");
        assert_eq!(format_temperature(38.4), "38.4");
        assert_eq!(format_temperature(37.25), "37.25");
    }
}
