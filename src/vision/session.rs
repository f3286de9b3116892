use crate::{Error, Result};
use ndarray::{Array4, ArrayD};
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// An ONNX Runtime session shared between requests.
#[derive(Clone)]
pub(crate) struct OnnxSession {
    session: Arc<Mutex<Session>>,
    input_name: String,
}

impl std::fmt::Debug for OnnxSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxSession")
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

fn inference_error<E: std::fmt::Display>(context: &str) -> impl FnOnce(E) -> Error + '_ {
    move |e| Error::inference(format!("{context}: {e}"))
}

/// Locks `mutex`, taking the guard back if a previous holder panicked.
fn lock_recovering<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!("Recovering poisoned session lock");
        PoisonError::into_inner(poisoned)
    })
}

impl OnnxSession {
    pub(crate) fn load(model_path: &Path, intra_threads: usize) -> Result<Self> {
        if !model_path.exists() {
            return Err(Error::config(format!(
                "model not found: {}",
                model_path.display()
            )));
        }

        info!("Loading ONNX model from {}", model_path.display());

        let session = Session::builder()
            .map_err(inference_error("Failed to create session builder"))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(inference_error("Failed to set optimization level"))?
            .with_intra_threads(intra_threads)
            .map_err(inference_error("Failed to set intra threads"))?
            .commit_from_file(model_path)
            .map_err(inference_error("Failed to load model"))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        if let Some(output) = session.outputs.first() {
            debug!(
                "Model {} - input: {}, output: {}",
                model_path.display(),
                input_name,
                output.name
            );
        }

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
        })
    }

    /// Runs the model on the blocking pool and returns its first output.
    pub(crate) async fn run(&self, input: Array4<f32>) -> Result<ArrayD<f32>> {
        let session = Arc::clone(&self.session);
        let input_name = self.input_name.clone();

        tokio::task::spawn_blocking(move || -> Result<ArrayD<f32>> {
            let input_value = Value::from_array(input)?;

            let mut session = lock_recovering(&session);

            let outputs = session
                .run(ort::inputs![input_name.as_str() => input_value])
                .map_err(inference_error("Model run failed"))?;

            let output = outputs[0].try_extract_array::<f32>()?.to_owned();

            Ok(output)
        })
        .await
        .map_err(|e| Error::internal(format!("Inference task failed: {e}")))?
    }
}
