//! Immutable prediction context shared by every submission.
//!
//! The context is built once at startup from the model artifact (and optionally the
//! reference dataset) and then only read. [`PredictionContext::assess`] runs the full
//! per-submission path: validation, category resolution, vector assembly and a single
//! model invocation.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::application::{FeatureVector, LoanApplication, ValidationError};
use crate::categories::{CategoryCatalog, CategoryDrift, LookupError, ReferenceDatasetError};
use crate::config::ModelConfig;
use crate::model::{self, ApprovalLabel, Classifier, InvocationError, ModelLoadError, ModelManifest};

/// Guidance shown alongside a rejection.
pub const IMPROVEMENT_TIPS: [&str; 4] = [
    "Increase your income or reduce loan amount",
    "Improve your credit score",
    "Reduce existing debts",
    "Consider a co-applicant",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Approved,
    Rejected,
}

impl Verdict {
    pub fn headline(self) -> &'static str {
        match self {
            Verdict::Approved => "Congratulations! Your loan is likely to be approved.",
            Verdict::Rejected => "Sorry, your loan application may be rejected.",
        }
    }

    pub fn tips(self) -> &'static [&'static str] {
        match self {
            Verdict::Approved => &[],
            Verdict::Rejected => &IMPROVEMENT_TIPS,
        }
    }
}

impl From<ApprovalLabel> for Verdict {
    fn from(label: ApprovalLabel) -> Self {
        match label {
            ApprovalLabel::Approve => Verdict::Approved,
            ApprovalLabel::Reject => Verdict::Rejected,
        }
    }
}

/// Outcome of one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub verdict: Verdict,
    pub features: FeatureVector,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("model invocation failed: {0}")]
    Invocation(#[from] InvocationError),
}

/// Where the category orderings in use came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySource {
    /// Embedded in the artifact, no reference dataset configured.
    Embedded,
    /// Embedded in the artifact and matched against the reference dataset.
    EmbeddedVerified,
    /// Re-derived from the reference dataset at startup.
    ReferenceDataset,
}

impl fmt::Display for CategorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CategorySource::Embedded => "embedded",
            CategorySource::EmbeddedVerified => "embedded (verified against reference dataset)",
            CategorySource::ReferenceDataset => "reference dataset",
        };
        f.write_str(label)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Model(#[from] ModelLoadError),
    #[error(transparent)]
    Reference(#[from] ReferenceDatasetError),
    #[error("model artifact has no embedded categories and no reference dataset is configured")]
    MissingCategorySchema,
    #[error("reference dataset categories differ from the model's: {}", format_drift(.0))]
    SchemaDrift(Vec<CategoryDrift>),
}

fn format_drift(drift: &[CategoryDrift]) -> String {
    drift
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Read-only state every submission is evaluated against.
#[derive(Clone)]
pub struct PredictionContext {
    catalog: Arc<CategoryCatalog>,
    model: Arc<dyn Classifier>,
    category_source: CategorySource,
}

impl fmt::Debug for PredictionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictionContext")
            .field("model", &self.model.name())
            .field("category_source", &self.category_source)
            .finish_non_exhaustive()
    }
}

impl PredictionContext {
    pub fn new(catalog: CategoryCatalog, model: Arc<dyn Classifier>) -> Self {
        Self::with_source(catalog, model, CategorySource::Embedded)
    }

    fn with_source(
        catalog: CategoryCatalog,
        model: Arc<dyn Classifier>,
        category_source: CategorySource,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            model,
            category_source,
        }
    }

    /// Loads the artifact and settles which category orderings are authoritative.
    pub fn bootstrap(config: &ModelConfig) -> Result<Self, BootstrapError> {
        let loaded = ModelManifest::load(&config.artifact_path)?;
        let reference = config
            .reference_dataset
            .as_ref()
            .map(CategoryCatalog::from_reference_path)
            .transpose()?;

        let (catalog, source) = match (loaded.categories, reference) {
            (Some(embedded), Some(reference)) => {
                let drift = embedded.drift_from(&reference);
                if !drift.is_empty() {
                    return Err(BootstrapError::SchemaDrift(drift));
                }
                (embedded, CategorySource::EmbeddedVerified)
            }
            (Some(embedded), None) => (embedded, CategorySource::Embedded),
            (None, Some(reference)) => {
                warn!(
                    "model artifact carries no category schema; \
                     using orderings derived from the reference dataset"
                );
                (reference, CategorySource::ReferenceDataset)
            }
            (None, None) => return Err(BootstrapError::MissingCategorySchema),
        };

        info!(
            model = loaded.classifier.name(),
            features = loaded.classifier.feature_count(),
            categories = %source,
            "loan approval model loaded"
        );

        Ok(Self::with_source(catalog, Arc::new(loaded.classifier), source))
    }

    pub fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn category_source(&self) -> CategorySource {
        self.category_source
    }

    /// Runs one submission through validation, resolution and inference.
    pub fn assess(&self, application: &LoanApplication) -> Result<Assessment, AssessmentError> {
        application.validate()?;

        let features = FeatureVector::assemble(application, &self.catalog).inspect_err(|err| {
            warn!(field = %err.field, value = %err.value, "category lookup failed");
        })?;

        let label = model::invoke(self.model.as_ref(), features.as_slice())?;
        let verdict = Verdict::from(label);
        info!(model = self.model.name(), ?verdict, "loan application assessed");

        Ok(Assessment { verdict, features })
    }
}
