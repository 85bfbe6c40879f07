//! Current-catalog state with atomic snapshot replacement.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;
use crate::features::Dataset;
use crate::pipeline::{EmbeddingPipeline, EmbeddingResult};

/// The (dataset, result) pair published by one successful pipeline run.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub dataset: Dataset,
    pub result: EmbeddingResult,
}

/// Holds the most recently published embedding.
///
/// Writers swap a whole `Arc` snapshot under the lock, so readers either
/// see the previous embedding or the new one, never a half-replaced pair.
#[derive(Debug, Default)]
pub struct MapStore {
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl MapStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a snapshot, replacing the current one.
    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        *self.current.write() = Some(snapshot.clone());
        snapshot
    }

    /// The most recently published snapshot, if any.
    pub fn read(&self) -> Option<Arc<Snapshot>> {
        self.current.read().clone()
    }

    /// Runs `pipeline` on `dataset` and publishes the outcome.
    ///
    /// A failed run returns the error and leaves the previously published
    /// snapshot untouched.
    pub fn replace(
        &self,
        pipeline: &EmbeddingPipeline,
        dataset: Dataset,
    ) -> Result<Arc<Snapshot>> {
        let result = pipeline.process(&dataset)?;
        Ok(self.publish(Snapshot { dataset, result }))
    }
}
