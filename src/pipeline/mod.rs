//! The embedding pipeline: feature selection, standardization, projection
//! and clustering composed into one `process` call.

use log::{debug, info};
use ndarray::Axis;
use serde::Serialize;
use serde_json::Value;

use crate::clustering::KMeansBuilder;
use crate::error::{Error, Result};
use crate::features::{build_feature_matrix, Dataset, Record, AUDIO_FEATURES};
use crate::projection::PcaBuilder;
use crate::scaling::StandardScaler;

/// Number of output axes of the embedding (x, y, z).
pub const OUTPUT_AXES: usize = 3;

/// One input feature's coefficient on each output axis.
#[derive(Debug, Clone, Serialize)]
pub struct AxisLoading {
    pub feature: String,
    pub pc1: f64,
    pub pc2: f64,
    pub pc3: f64,
}

/// Durable output of one pipeline run.
///
/// `data` carries every input record with `x`, `y`, `z` and `cluster`
/// appended, in the input's row order.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingResult {
    pub data: Vec<Record>,
    pub explained_variance: Vec<f64>,
    pub loadings: Vec<AxisLoading>,
    pub centroid: [f64; 3],
}

/// Composes the numerical stages into `process(dataset) -> EmbeddingResult`.
///
/// The standardization and projection models are fit fresh on every call
/// and discarded with it; nothing is shared across runs.
pub struct EmbeddingPipeline {
    n_clusters: usize,
    seed: u64,
    features: Vec<String>,
}

impl Default for EmbeddingPipeline {
    fn default() -> Self {
        EmbeddingPipelineBuilder::new().build()
    }
}

impl EmbeddingPipeline {
    /// Runs the full pipeline on `dataset`.
    ///
    /// Any sub-step failure propagates and no partial result is produced.
    pub fn process(&self, dataset: &Dataset) -> Result<EmbeddingResult> {
        let recognized: Vec<&str> = self.features.iter().map(String::as_str).collect();
        let feature_matrix = build_feature_matrix(dataset, &recognized)?;
        debug!(
            "embedding {} tracks over features {:?}",
            dataset.len(),
            feature_matrix.feature_names()
        );

        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(feature_matrix.matrix().view())?;

        let mut pca = PcaBuilder::new().n_components(OUTPUT_AXES).build();
        let coords = pca.fit_transform(scaled.view())?;
        let explained_variance = pca
            .explained_variance_ratio()
            .ok_or(Error::NotFitted { model: "Pca" })?
            .to_vec();
        let loading_matrix = pca.loadings().ok_or(Error::NotFitted { model: "Pca" })?;

        let kmeans = KMeansBuilder::new().k(self.n_clusters).seed(self.seed).build();
        let clusters = kmeans.fit_predict(coords.view())?;

        let mut data = dataset.records().to_vec();
        for (i, record) in data.iter_mut().enumerate() {
            record.insert("x".to_string(), Value::from(coords[[i, 0]]));
            record.insert("y".to_string(), Value::from(coords[[i, 1]]));
            record.insert("z".to_string(), Value::from(coords[[i, 2]]));
            record.insert("cluster".to_string(), Value::from(clusters[i] as i64));
        }

        let loadings = feature_matrix
            .feature_names()
            .iter()
            .enumerate()
            .map(|(j, feature)| AxisLoading {
                feature: feature.clone(),
                pc1: loading_matrix[[j, 0]],
                pc2: loading_matrix[[j, 1]],
                pc3: loading_matrix[[j, 2]],
            })
            .collect();

        let mean = coords.mean_axis(Axis(0)).ok_or(Error::EmptyInput)?;
        let centroid = [mean[0], mean[1], mean[2]];

        info!(
            "embedded {} tracks into {} clusters",
            dataset.len(),
            self.n_clusters
        );

        Ok(EmbeddingResult {
            data,
            explained_variance,
            loadings,
            centroid,
        })
    }
}

pub struct EmbeddingPipelineBuilder {
    n_clusters: usize,
    seed: u64,
    features: Vec<String>,
}

impl Default for EmbeddingPipelineBuilder {
    fn default() -> Self {
        Self {
            n_clusters: 5,
            seed: 42,
            features: AUDIO_FEATURES.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl EmbeddingPipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_clusters(mut self, n_clusters: usize) -> Self {
        self.n_clusters = n_clusters;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replaces the recognized feature list. Column selection keeps the
    /// order given here.
    pub fn features(mut self, features: Vec<String>) -> Self {
        self.features = features;
        self
    }

    pub fn build(self) -> EmbeddingPipeline {
        EmbeddingPipeline {
            n_clusters: self.n_clusters,
            seed: self.seed,
            features: self.features,
        }
    }
}
