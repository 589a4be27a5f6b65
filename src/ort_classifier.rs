use crate::classifier::{ClassificationEntry, Classifier, InferenceError};
use crate::config::ModelConfig;
use async_trait::async_trait;
use image::{imageops::FilterType, RgbImage};
use ndarray::{Array, Ix4};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::TensorRef,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

/// Spatial input size of the classification model.
const INPUT_SIZE: u32 = 224;

// Normalization constants published with the pretrained weights. A mismatch
// here degrades accuracy silently instead of erroring.
const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

const TOP_K: usize = 3;

/// ImageNet classifier backed by a pool of ONNX Runtime sessions.
///
/// A session runs one forward pass at a time; requests pick a session
/// round-robin, so concurrent uploads never share intermediate buffers.
#[derive(Clone)]
pub struct OrtClassifier {
    sessions: Arc<Vec<Arc<Mutex<Session>>>>,
    counter: Arc<AtomicUsize>,
    labels: Arc<Vec<String>>,
    output_name: String,
}

impl OrtClassifier {
    pub fn new(
        model_config: &ModelConfig,
        labels: Vec<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        if labels.is_empty() {
            return Err("label vocabulary is empty".into());
        }

        let num_instances = model_config.num_instances;
        let mut sessions = Vec::with_capacity(num_instances);
        let mut output_name = None;

        for _ in 0..num_instances {
            let session = Session::builder()?
                .with_optimization_level(GraphOptimizationLevel::Level3)?
                .commit_from_file(model_config.get_path())?;

            if output_name.is_none() {
                output_name = session.outputs().first().map(|output| output.name().to_string());
            }

            sessions.push(Arc::new(Mutex::new(session)));
        }

        let output_name = output_name.ok_or("model has no output tensor")?;

        tracing::info!("Loaded {} classifier sessions", num_instances);

        Ok(Self {
            sessions: Arc::new(sessions),
            counter: Arc::new(AtomicUsize::new(0)),
            labels: Arc::new(labels),
            output_name,
        })
    }

    fn run_inference(&self, input: &Array<f32, Ix4>) -> Result<Vec<f32>, InferenceError> {
        let index = self.counter.fetch_add(1, Ordering::SeqCst) % self.sessions.len();
        let session_arc = &self.sessions[index];
        let mut session = session_arc
            .lock()
            .map_err(|e| InferenceError::Execution(format!("session mutex poisoned: {}", e)))?;

        tracing::debug!("Running forward pass on session {}", index);
        let tensor_ref = TensorRef::from_array_view(input.view())
            .map_err(|e| InferenceError::Execution(format!("failed to build tensor: {}", e)))?;

        let outputs = session
            .run(ort::inputs![tensor_ref])
            .map_err(|e| InferenceError::Execution(format!("inference failed: {}", e)))?;

        let (_, logits) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Execution(format!("failed to extract tensor: {}", e)))?;

        Ok(logits.to_vec())
    }
}

#[async_trait]
impl Classifier for OrtClassifier {
    async fn classify(&self, image: &RgbImage) -> Result<Vec<ClassificationEntry>, InferenceError> {
        let input = preprocess(image)?;
        let logits = self.run_inference(&input)?;

        if logits.len() != self.labels.len() {
            return Err(InferenceError::Execution(format!(
                "model returned {} scores for a vocabulary of {}",
                logits.len(),
                self.labels.len()
            )));
        }

        let probabilities = softmax(&logits);

        Ok(top_k(&probabilities, &self.labels, TOP_K))
    }
}

/// Resizes and normalizes a decoded image into the model's NCHW input tensor.
fn preprocess(image: &RgbImage) -> Result<Array<f32, Ix4>, InferenceError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(InferenceError::Geometry(format!(
            "image has a zero dimension: {}x{}",
            image.width(),
            image.height()
        )));
    }

    let resized = image::imageops::resize(image, INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom);

    let mut input = Array::zeros((1, 3, INPUT_SIZE as usize, INPUT_SIZE as usize));
    for (x, y, pixel) in resized.enumerate_pixels() {
        let x = x as usize;
        let y = y as usize;
        let [r, g, b] = pixel.0;
        input[[0, 0, y, x]] = ((r as f32) / 255. - IMAGENET_MEAN[0]) / IMAGENET_STD[0];
        input[[0, 1, y, x]] = ((g as f32) / 255. - IMAGENET_MEAN[1]) / IMAGENET_STD[1];
        input[[0, 2, y, x]] = ((b as f32) / 255. - IMAGENET_MEAN[2]) / IMAGENET_STD[2];
    }

    Ok(input)
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();

    exps.into_iter().map(|v| v / sum).collect()
}

/// Extracts the k highest-scoring entries. The sort is stable, so equal
/// scores resolve to the lower vocabulary index.
fn top_k(probabilities: &[f32], labels: &[String], k: usize) -> Vec<ClassificationEntry> {
    let mut ranked: Vec<(usize, f32)> = probabilities.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .take(k)
        .map(|(index, score)| ClassificationEntry {
            label: labels[index].clone(),
            score,
        })
        .collect()
}
