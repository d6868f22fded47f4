//! Classifier trait shared by training, evaluation and serving

use crate::error::ModelError;

/// A fitted multi-class probability model over fixed-width feature rows.
pub trait Classifier {
    /// Expected number of features per row
    fn input_width(&self) -> usize;

    fn class_count(&self) -> usize;

    /// Class probabilities for one row; non-negative and summing to 1.
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError>;

    /// Get backend name/identifier
    fn backend_name(&self) -> &str;

    /// Most probable class; ties go to the lowest index.
    fn predict_class(&self, features: &[f64]) -> Result<usize, ModelError> {
        Ok(argmax(&self.predict_proba(features)?))
    }

    fn predict_proba_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ModelError> {
        rows.iter().map(|r| self.predict_proba(r)).collect()
    }

    fn predict_classes(&self, rows: &[Vec<f64>]) -> Result<Vec<usize>, ModelError> {
        rows.iter().map(|r| self.predict_class(r)).collect()
    }
}

/// Index of the largest value, first one on ties; 0 for an empty slice.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

pub(crate) fn check_width(expected: usize, found: usize) -> Result<(), ModelError> {
    if expected == found {
        Ok(())
    } else {
        Err(ModelError::ShapeMismatch { expected, found })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<f64>);

    impl Classifier for Fixed {
        fn input_width(&self) -> usize {
            1
        }
        fn class_count(&self) -> usize {
            self.0.len()
        }
        fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
            check_width(1, features.len())?;
            Ok(self.0.clone())
        }
        fn backend_name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn ties_break_toward_lowest_index() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), 1);
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[]), 0);
        let m = Fixed(vec![0.1, 0.45, 0.45]);
        assert_eq!(m.predict_class(&[0.0]).unwrap(), 1);
    }

    #[test]
    fn default_batch_methods_propagate_errors() {
        let m = Fixed(vec![0.9, 0.1]);
        assert_eq!(m.predict_classes(&[vec![1.0], vec![2.0]]).unwrap(), vec![0, 0]);
        assert!(matches!(
            m.predict_proba_batch(&[vec![1.0, 2.0]]),
            Err(ModelError::ShapeMismatch {
                expected: 1,
                found: 2
            })
        ));
    }
}
