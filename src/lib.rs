pub mod clustering;
pub mod error;
pub mod features;
pub mod pipeline;
pub mod projection;
pub mod recommend;
pub mod scaling;
pub mod store;

pub use error::Error;
pub use error::Result;
pub use features::{build_feature_matrix, Dataset, FeatureMatrix, Record, AUDIO_FEATURES};
pub use pipeline::{AxisLoading, EmbeddingPipeline, EmbeddingPipelineBuilder, EmbeddingResult};
pub use recommend::{recommend, Target, DEFAULT_TOP_K};
pub use store::{MapStore, Snapshot};
