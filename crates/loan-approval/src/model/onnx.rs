use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use tracing::info;

use super::{ApprovalLabel, Classifier, InvocationError};

#[derive(Debug, thiserror::Error)]
pub enum OnnxError {
    #[error("failed to load ONNX model {path}: {message}")]
    Session { path: PathBuf, message: String },
    #[error("ONNX model {path} declares no inputs")]
    NoInput { path: PathBuf },
    #[error("ONNX model {path} has no label output")]
    NoLabelOutput { path: PathBuf },
}

fn session_error<E: fmt::Display>(path: &Path) -> impl Fn(E) -> OnnxError + '_ {
    move |err| OnnxError::Session {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn runtime_error<E: fmt::Display>(err: E) -> InvocationError {
    InvocationError::Runtime(err.to_string())
}

/// Exported classifier executed through ONNX Runtime.
///
/// The graph takes one `[1, feature_count]` float tensor and emits an int64 label
/// tensor, which is how scikit-learn forests come out of `skl2onnx`.
pub struct OnnxClassifier {
    name: String,
    feature_count: usize,
    input_name: String,
    label_output: String,
    session: Mutex<Session>,
}

impl fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("name", &self.name)
            .field("feature_count", &self.feature_count)
            .field("input_name", &self.input_name)
            .field("label_output", &self.label_output)
            .finish_non_exhaustive()
    }
}

impl OnnxClassifier {
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        name: impl Into<String>,
        feature_count: usize,
    ) -> Result<Self, OnnxError> {
        let path = path.as_ref();
        let name = name.into();

        let session = Session::builder()
            .map_err(session_error(path))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(session_error(path))?
            .with_intra_threads(1)
            .map_err(session_error(path))?
            .commit_from_file(path)
            .map_err(session_error(path))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| OnnxError::NoInput {
                path: path.to_path_buf(),
            })?;

        let label_output = session
            .outputs
            .iter()
            .find(|output| output.name.contains("label"))
            .map(|output| output.name.clone())
            .ok_or_else(|| OnnxError::NoLabelOutput {
                path: path.to_path_buf(),
            })?;

        info!(
            model = %name,
            path = %path.display(),
            input = %input_name,
            output = %label_output,
            "ONNX model loaded"
        );

        Ok(Self {
            name,
            feature_count,
            input_name,
            label_output,
            session: Mutex::new(session),
        })
    }
}

impl Classifier for OnnxClassifier {
    fn feature_count(&self) -> usize {
        self.feature_count
    }

    fn predict(&self, features: &[f64]) -> Result<ApprovalLabel, InvocationError> {
        let sample: Vec<f32> = features.iter().map(|&value| value as f32).collect();
        let shape = vec![1_i64, sample.len() as i64];
        let input = Tensor::from_array((shape, sample)).map_err(runtime_error)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InvocationError::Runtime("model session lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![&self.input_name => input])
            .map_err(runtime_error)?;

        let labels = outputs.get(&self.label_output).ok_or_else(|| {
            InvocationError::Runtime(format!("model produced no '{}' output", self.label_output))
        })?;
        let (_, labels) = labels.try_extract_tensor::<i64>().map_err(runtime_error)?;
        let class = labels
            .first()
            .copied()
            .ok_or_else(|| InvocationError::Runtime("model produced no label".to_string()))?;

        ApprovalLabel::from_class(class).ok_or(InvocationError::UnknownClass(class))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
