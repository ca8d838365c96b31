//! Pre-trained classifier seam, the ONNX runtime behind it and the manifest it is
//! loaded from.

mod manifest;
mod onnx;

use serde::Serialize;

pub use manifest::{LoadedModel, ModelLoadError, ModelManifest, MANIFEST_FORMAT_VERSION};
pub use onnx::{OnnxClassifier, OnnxError};

/// Binary decision emitted by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalLabel {
    Reject,
    Approve,
}

impl ApprovalLabel {
    pub fn from_class(class: i64) -> Option<Self> {
        match class {
            0 => Some(Self::Reject),
            1 => Some(Self::Approve),
            _ => None,
        }
    }

    pub fn class(self) -> i64 {
        match self {
            Self::Reject => 0,
            Self::Approve => 1,
        }
    }
}

/// Failure while handing a feature vector to a loaded model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvocationError {
    #[error("model expects {expected} features but received {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("feature {index} is not a finite number")]
    NonFiniteFeature { index: usize },
    #[error("model produced unknown class {0}")]
    UnknownClass(i64),
    #[error("model runtime failed: {0}")]
    Runtime(String),
}

/// Single-sample prediction contract every model implementation honors.
pub trait Classifier: Send + Sync {
    /// Number of features a sample must carry.
    fn feature_count(&self) -> usize;

    fn predict(&self, features: &[f64]) -> Result<ApprovalLabel, InvocationError>;

    fn name(&self) -> &str {
        "classifier"
    }
}

/// Checks the sample against the model's input shape before predicting.
pub fn invoke(model: &dyn Classifier, features: &[f64]) -> Result<ApprovalLabel, InvocationError> {
    let expected = model.feature_count();
    if features.len() != expected {
        return Err(InvocationError::ShapeMismatch {
            expected,
            actual: features.len(),
        });
    }
    if let Some(index) = features.iter().position(|value| !value.is_finite()) {
        return Err(InvocationError::NonFiniteFeature { index });
    }
    model.predict(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingModel {
        calls: AtomicUsize,
    }

    impl Classifier for CountingModel {
        fn feature_count(&self) -> usize {
            3
        }

        fn predict(&self, _features: &[f64]) -> Result<ApprovalLabel, InvocationError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(ApprovalLabel::Approve)
        }
    }

    #[test]
    fn shape_mismatch_never_reaches_the_model() {
        let model = CountingModel {
            calls: AtomicUsize::new(0),
        };
        let error = invoke(&model, &[1.0, 2.0]).expect_err("two features is too few");
        assert_eq!(
            error,
            InvocationError::ShapeMismatch {
                expected: 3,
                actual: 2
            }
        );
        assert_eq!(model.calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn non_finite_features_are_rejected() {
        let model = CountingModel {
            calls: AtomicUsize::new(0),
        };
        let error = invoke(&model, &[1.0, f64::NAN, 3.0]).expect_err("nan rejected");
        assert_eq!(error, InvocationError::NonFiniteFeature { index: 1 });
        assert_eq!(invoke(&model, &[1.0, 2.0, 3.0]), Ok(ApprovalLabel::Approve));
        assert_eq!(model.calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn labels_map_to_binary_classes() {
        assert_eq!(ApprovalLabel::from_class(0), Some(ApprovalLabel::Reject));
        assert_eq!(ApprovalLabel::from_class(1), Some(ApprovalLabel::Approve));
        assert_eq!(ApprovalLabel::from_class(2), None);
        assert_eq!(ApprovalLabel::from_class(-1), None);
        assert_eq!(ApprovalLabel::Approve.class(), 1);
    }
}
