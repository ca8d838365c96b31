use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::onnx::{OnnxClassifier, OnnxError};
use crate::application::FEATURE_NAMES;
use crate::categories::{CatalogError, CategoryCatalog};

pub const MANIFEST_FORMAT_VERSION: u32 = 1;

/// JSON sidecar shipped next to the exported ONNX graph.
///
/// The graph itself carries no knowledge of how categorical inputs were encoded at
/// training time, so the manifest pins the feature order and, optionally, the sorted
/// category domains the encoder saw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub format_version: u32,
    #[serde(default = "default_model_name")]
    pub name: String,
    /// Path of the ONNX graph, relative to the manifest's directory.
    pub model_file: PathBuf,
    pub feature_names: Vec<String>,
    /// Category orderings used at training time, keyed by dataset column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<BTreeMap<String, Vec<String>>>,
}

fn default_model_name() -> String {
    "loan-classifier".to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("failed to read model manifest {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("model manifest is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported model manifest format version {found}")]
    UnsupportedVersion { found: u32 },
    #[error("model expects {found} features, the application provides {expected}")]
    FeatureCount { expected: usize, found: usize },
    #[error("model feature {position} is '{found}', expected '{expected}'")]
    FeatureName {
        position: usize,
        expected: &'static str,
        found: String,
    },
    #[error("invalid embedded categories: {0}")]
    Categories(#[from] CatalogError),
    #[error(transparent)]
    Runtime(#[from] OnnxError),
}

/// Runnable classifier plus the category schema shipped alongside it.
#[derive(Debug)]
pub struct LoadedModel {
    pub classifier: OnnxClassifier,
    pub categories: Option<CategoryCatalog>,
}

impl ModelManifest {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "reading model manifest");
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelLoadError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Checks the feature schema and returns the embedded category catalog, if any.
    pub fn validate(&self) -> Result<Option<CategoryCatalog>, ModelLoadError> {
        if self.format_version != MANIFEST_FORMAT_VERSION {
            return Err(ModelLoadError::UnsupportedVersion {
                found: self.format_version,
            });
        }

        if self.feature_names.len() != FEATURE_NAMES.len() {
            return Err(ModelLoadError::FeatureCount {
                expected: FEATURE_NAMES.len(),
                found: self.feature_names.len(),
            });
        }
        for (position, (expected, found)) in
            FEATURE_NAMES.iter().zip(&self.feature_names).enumerate()
        {
            if found.as_str() != *expected {
                return Err(ModelLoadError::FeatureName {
                    position,
                    expected: *expected,
                    found: found.clone(),
                });
            }
        }

        Ok(self
            .categories
            .as_ref()
            .map(CategoryCatalog::from_columns)
            .transpose()?)
    }

    /// Reads the manifest at `path`, validates it and opens the graph it points to.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<LoadedModel, ModelLoadError> {
        let path = path.as_ref();
        let manifest = Self::from_path(path)?;
        let categories = manifest.validate()?;

        let graph = path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&manifest.model_file);
        let classifier =
            OnnxClassifier::from_file(graph, manifest.name, manifest.feature_names.len())?;

        Ok(LoadedModel {
            classifier,
            categories,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::sample_columns;
    use crate::model::Classifier;
    use serde_json::json;

    fn manifest_json() -> serde_json::Value {
        json!({
            "format_version": 1,
            "name": "unit-forest",
            "model_file": "unit-forest.onnx",
            "feature_names": FEATURE_NAMES,
            "categories": sample_columns(),
        })
    }

    fn parse(value: serde_json::Value) -> ModelManifest {
        ModelManifest::from_reader(value.to_string().as_bytes()).expect("manifest parses")
    }

    #[test]
    fn validation_returns_embedded_categories() {
        let manifest = parse(manifest_json());
        assert_eq!(manifest.name, "unit-forest");
        assert_eq!(manifest.model_file, PathBuf::from("unit-forest.onnx"));
        let categories = manifest.validate().expect("valid");
        assert_eq!(
            categories,
            Some(CategoryCatalog::from_columns(&sample_columns()).expect("canonical"))
        );
    }

    #[test]
    fn categories_and_name_are_optional() {
        let mut value = manifest_json();
        value.as_object_mut().expect("object").remove("categories");
        value.as_object_mut().expect("object").remove("name");
        let manifest = parse(value);
        assert_eq!(manifest.name, "loan-classifier");
        assert_eq!(manifest.validate().expect("valid"), None);
    }

    #[test]
    fn rejects_unknown_format_versions() {
        let mut value = manifest_json();
        value["format_version"] = json!(2);
        assert!(matches!(
            parse(value).validate(),
            Err(ModelLoadError::UnsupportedVersion { found: 2 })
        ));
    }

    #[test]
    fn rejects_feature_schema_mismatches() {
        let mut value = manifest_json();
        value["feature_names"]
            .as_array_mut()
            .expect("array")
            .pop();
        assert!(matches!(
            parse(value).validate(),
            Err(ModelLoadError::FeatureCount {
                expected: 13,
                found: 12
            })
        ));

        let mut value = manifest_json();
        value["feature_names"][1] = json!("person_education");
        value["feature_names"][2] = json!("person_gender");
        match parse(value).validate() {
            Err(ModelLoadError::FeatureName {
                position, found, ..
            }) => {
                assert_eq!(position, 1);
                assert_eq!(found, "person_education");
            }
            other => panic!("expected feature name error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_json_and_categories() {
        assert!(matches!(
            ModelManifest::from_reader("{ not json".as_bytes()),
            Err(ModelLoadError::Parse(_))
        ));

        let mut value = manifest_json();
        value.as_object_mut().expect("object").remove("model_file");
        assert!(matches!(
            ModelManifest::from_reader(value.to_string().as_bytes()),
            Err(ModelLoadError::Parse(_))
        ));

        let mut value = manifest_json();
        value["categories"]["previous_loan_defaults_on_file"] = json!(["Yes", "No"]);
        assert!(matches!(
            parse(value).validate(),
            Err(ModelLoadError::Categories(CatalogError::Unsorted { .. }))
        ));
    }

    #[test]
    fn load_resolves_the_graph_next_to_the_manifest() {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets");
        let loaded = ModelManifest::load(dir.join("loan_model.json")).expect("bundled model loads");
        assert!(loaded.categories.is_some());
        assert_eq!(loaded.classifier.name(), "loan-approval-random-forest");
        assert_eq!(loaded.classifier.feature_count(), 13);
    }

    #[test]
    fn load_reports_missing_manifest_and_graph() {
        match ModelManifest::load("./missing-model.json") {
            Err(ModelLoadError::Io { path, .. }) => {
                assert_eq!(path, PathBuf::from("./missing-model.json"))
            }
            other => panic!("expected io error, got {other:?}"),
        }

        let dir = std::env::temp_dir().join(format!("loan-manifest-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let manifest = dir.join("model.json");
        std::fs::write(&manifest, manifest_json().to_string()).expect("write manifest");
        assert!(matches!(
            ModelManifest::load(&manifest),
            Err(ModelLoadError::Runtime(OnnxError::Session { .. }))
        ));
        std::fs::remove_dir_all(&dir).ok();
    }
}
