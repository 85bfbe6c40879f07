use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure kinds surfaced by the embedding core.
///
/// Every failure is typed so the caller can map it to a meaningful
/// response without parsing messages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The dataset carries none of the recognized audio-feature columns.
    #[error("no recognized audio features found in dataset")]
    NoFeatures,

    /// Too few rows or columns for the requested projection dimensionality.
    #[error(
        "cannot project {n_samples} samples x {n_features} features onto {n_components} components"
    )]
    InsufficientDimensionality {
        n_samples: usize,
        n_features: usize,
        n_components: usize,
    },

    /// Recommendation query id not present in the current embedding.
    #[error("track {id} not found in current embedding")]
    TrackNotFound { id: i64 },

    /// Dataset below the minimum size an embedding is meaningful for.
    #[error("dataset has {found} tracks, at least {min} required")]
    DatasetTooSmall { found: usize, min: usize },

    /// A used feature column holds a missing or non-numeric value.
    #[error("feature '{feature}' has a missing or non-numeric value at row {row}")]
    InvalidFeatureValue { feature: String, row: usize },

    /// Input matrix was empty.
    #[error("empty input provided")]
    EmptyInput,

    /// A model was asked to transform before being fitted.
    #[error("{model} has not been fitted yet")]
    NotFitted { model: &'static str },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        name: &'static str,
        message: &'static str,
    },
}
