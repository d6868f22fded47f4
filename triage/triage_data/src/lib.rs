//! Data side of the triage pipeline.
//!
//! - [`generator`]: uniform synthetic patients labeled by the rule engine
//! - [`tabular`]: CSV storage with a schema-checked header
//! - [`split`]: seeded stratified train/test partition
//! - [`scaler`]: standardization of the numeric vitals
//! - [`pipeline`]: the above glued into model-ready matrices
//!
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use triage_data::{fit_pipeline, generate_dataset, SplitConfig};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let dataset = generate_dataset(200, &mut rng).unwrap();
//! let prepared = fit_pipeline(&dataset, &SplitConfig::default()).unwrap();
//! assert_eq!(prepared.train_len() + prepared.test_len(), 200);
//! assert!(prepared.scaler.is_fitted());
//! ```

pub mod dataset;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod scaler;
pub mod split;
pub mod tabular;

pub use dataset::{Dataset, DatasetSummary, LabeledRecord, VitalStats};
pub use error::DataError;
pub use generator::{
    generate_dataset, generate_record, generate_with_probability, GeneratorConfig,
    DEFAULT_RECORDS, DEFAULT_SYMPTOM_PROBABILITY,
};
pub use pipeline::{
    fit_pipeline, preprocess_record, reindex_labels, scale_features, FeatureMatrix, PreparedData,
};
pub use scaler::{ColumnStats, FeatureScaler};
pub use split::{stratified_split, SplitConfig, SplitIndices};
pub use tabular::{from_csv, load_dataset, read_dataset, save_dataset, to_csv, write_dataset};
