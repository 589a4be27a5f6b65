use crate::classifier::{Classifier, InferenceError};
use crate::decoder::{decode_image, DecodeError};
use crate::vehicle::detect_vehicle;
use crate::verdict::{generate_verdict, Verdict};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] DecodeError),
    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),
    #[error("unexpected analysis fault: {0}")]
    Unexpected(String),
}

/// Runs the full analysis pipeline for one uploaded image.
///
/// The classifier handle is shared across requests; everything else lives
/// for a single call.
#[derive(Debug, Clone)]
pub struct Analyzer<C: Classifier> {
    classifier: Arc<C>,
}

impl<C: Classifier> Analyzer<C> {
    pub fn new(classifier: C) -> Self {
        Self {
            classifier: Arc::new(classifier),
        }
    }

    #[instrument(skip(self, image_data))]
    pub async fn analyze(&self, image_data: &[u8]) -> Result<Verdict, AnalyzeError> {
        let image = decode_image(image_data)?;
        let entries = self.classifier.classify(&image).await?;
        let signal = detect_vehicle(&entries);

        tracing::debug!(
            primary_label = %signal.primary_label,
            is_vehicle = signal.is_vehicle,
            "Classified upload"
        );

        Ok(generate_verdict(&image, &signal, &entries))
    }
}
