use async_trait::async_trait;
use image::RgbImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("image cannot be shaped for the model: {0}")]
    Geometry(String),
    #[error("model execution failed: {0}")]
    Execution(String),
}

/// One ranked entry of the classifier output.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationEntry {
    pub label: String,
    pub score: f32,
}

/// Seam between the analysis pipeline and the model runtime.
///
/// Implementations return the top-ranked entries in descending score order,
/// ties broken by lower vocabulary index.
#[async_trait]
pub trait Classifier: Send + Sync + Clone + 'static {
    async fn classify(&self, image: &RgbImage) -> Result<Vec<ClassificationEntry>, InferenceError>;
}
