//! Catalog records and feature-matrix extraction.
//!
//! A dataset is an ordered collection of flat records (field name -> JSON
//! value). Only the recognized audio-feature columns take part in the
//! numeric pipeline; every other field is carried through opaquely.

use ndarray::Array2;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Numeric audio descriptors the pipeline knows how to use, in canonical
/// order. Feature columns are always consumed in this order regardless of
/// the order they appear in the input.
pub const AUDIO_FEATURES: [&str; 9] = [
    "danceability",
    "energy",
    "loudness",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "valence",
    "tempo",
];

/// Minimum number of tracks an embedding is meaningful for.
pub const MIN_TRACKS: usize = 5;

/// One catalog entry: a flat mapping from field name to value.
pub type Record = Map<String, Value>;

/// An ordered collection of records sharing the same columns, the unit of
/// one embedding computation.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Builds a dataset from raw records.
    ///
    /// Records missing an `id` field get a sequential one assigned by row
    /// order. Datasets with fewer than [`MIN_TRACKS`] records are rejected.
    pub fn from_records(mut records: Vec<Record>) -> Result<Self> {
        if records.len() < MIN_TRACKS {
            return Err(Error::DatasetTooSmall {
                found: records.len(),
                min: MIN_TRACKS,
            });
        }

        for (i, record) in records.iter_mut().enumerate() {
            record.entry("id").or_insert(Value::from(i as i64));
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Dense numeric matrix extracted from a dataset, one row per record and
/// one column per used feature.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    matrix: Array2<f64>,
    feature_names: Vec<String>,
}

impl FeatureMatrix {
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Used feature names, in canonical order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}

/// Selects the recognized feature columns present in `dataset` and packs
/// them into a dense matrix.
///
/// A feature counts as present when any record carries it; once used, every
/// record must supply a numeric value for it. Column order follows the
/// canonical order of `recognized`, not the order fields appear in the
/// input.
pub fn build_feature_matrix(dataset: &Dataset, recognized: &[&str]) -> Result<FeatureMatrix> {
    let records = dataset.records();

    let used: Vec<&str> = recognized
        .iter()
        .copied()
        .filter(|f| records.iter().any(|r| r.contains_key(*f)))
        .collect();

    if used.is_empty() {
        return Err(Error::NoFeatures);
    }

    let mut matrix = Array2::<f64>::zeros((records.len(), used.len()));
    for (i, record) in records.iter().enumerate() {
        for (j, feature) in used.iter().enumerate() {
            let value = record.get(*feature).and_then(Value::as_f64).ok_or_else(|| {
                Error::InvalidFeatureValue {
                    feature: (*feature).to_string(),
                    row: i,
                }
            })?;
            matrix[[i, j]] = value;
        }
    }

    Ok(FeatureMatrix {
        matrix,
        feature_names: used.into_iter().map(str::to_string).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn dataset_with_features(n: usize, features: &[(&str, f64)]) -> Dataset {
        let records = (0..n)
            .map(|i| {
                let mut pairs = vec![("name", json!(format!("Track {i}")))];
                for (f, base) in features.iter().copied() {
                    pairs.push((f, json!(base + i as f64 * 0.01)));
                }
                record(&pairs)
            })
            .collect();
        Dataset::from_records(records).unwrap()
    }

    #[test]
    fn test_sequential_id_assignment() {
        let dataset = dataset_with_features(5, &[("energy", 0.5)]);
        for (i, rec) in dataset.records().iter().enumerate() {
            assert_eq!(rec.get("id").and_then(Value::as_i64), Some(i as i64));
        }
    }

    #[test]
    fn test_existing_ids_kept() {
        let records: Vec<Record> = (0..5)
            .map(|i| record(&[("id", json!(100 + i)), ("tempo", json!(120.0))]))
            .collect();
        let dataset = Dataset::from_records(records).unwrap();
        assert_eq!(
            dataset.records()[0].get("id").and_then(Value::as_i64),
            Some(100)
        );
    }

    #[test]
    fn test_too_small_dataset_rejected() {
        let records: Vec<Record> = (0..4)
            .map(|_| record(&[("energy", json!(0.5))]))
            .collect();
        assert_eq!(
            Dataset::from_records(records).unwrap_err(),
            Error::DatasetTooSmall { found: 4, min: 5 }
        );
    }

    #[test]
    fn test_canonical_feature_order() {
        // Input fields deliberately ordered against the canonical list.
        let dataset = dataset_with_features(5, &[("tempo", 120.0), ("danceability", 0.4)]);
        let fm = build_feature_matrix(&dataset, &AUDIO_FEATURES).unwrap();
        assert_eq!(fm.feature_names(), ["danceability", "tempo"]);
        assert_eq!(fm.matrix().dim(), (5, 2));
        assert!(fm.matrix()[[0, 1]] > 100.0); // tempo in the second column
    }

    #[test]
    fn test_no_features_error() {
        let dataset = dataset_with_features(5, &[("popularity", 50.0)]);
        assert_eq!(
            build_feature_matrix(&dataset, &AUDIO_FEATURES).unwrap_err(),
            Error::NoFeatures
        );
    }

    #[test]
    fn test_non_numeric_value_rejected() {
        let mut records: Vec<Record> = (0..5)
            .map(|_| record(&[("energy", json!(0.5))]))
            .collect();
        records[2].insert("energy".to_string(), json!("loud"));
        let dataset = Dataset::from_records(records).unwrap();
        assert_eq!(
            build_feature_matrix(&dataset, &AUDIO_FEATURES).unwrap_err(),
            Error::InvalidFeatureValue {
                feature: "energy".to_string(),
                row: 2,
            }
        );
    }

    #[test]
    fn test_missing_value_in_used_column_rejected() {
        let mut records: Vec<Record> = (0..5)
            .map(|_| record(&[("valence", json!(0.3))]))
            .collect();
        records[4].remove("valence");
        let dataset = Dataset::from_records(records).unwrap();
        assert!(matches!(
            build_feature_matrix(&dataset, &AUDIO_FEATURES),
            Err(Error::InvalidFeatureValue { .. })
        ));
    }
}
