use super::{CategoricalField, CategoryCatalog, CategoryDomain};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ReferenceDatasetError {
    #[error("failed to read reference dataset {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid reference dataset CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("reference dataset is missing column '{0}'")]
    MissingColumn(&'static str),
    #[error("reference dataset column '{0}' has no values")]
    EmptyColumn(&'static str),
}

impl CategoryCatalog {
    pub fn from_reference_path<P: AsRef<Path>>(path: P) -> Result<Self, ReferenceDatasetError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| ReferenceDatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reference_reader(file)
    }

    /// Derives every domain from the distinct non-empty cells of its column.
    pub fn from_reference_reader<R: Read>(reader: R) -> Result<Self, ReferenceDatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let mut positions = Vec::with_capacity(CategoricalField::ALL.len());
        for field in CategoricalField::ALL {
            let position = headers
                .iter()
                .position(|header| header.trim_start_matches('\u{feff}') == field.column())
                .ok_or(ReferenceDatasetError::MissingColumn(field.column()))?;
            positions.push((field, position));
        }

        let mut observed: BTreeMap<CategoricalField, BTreeSet<String>> = BTreeMap::new();
        for record in csv_reader.records() {
            let record = record?;
            for (field, position) in &positions {
                match record.get(*position) {
                    Some(value) if !value.is_empty() => {
                        observed.entry(*field).or_default().insert(value.to_string());
                    }
                    _ => {}
                }
            }
        }

        for field in CategoricalField::ALL {
            if observed.get(&field).map_or(true, BTreeSet::is_empty) {
                return Err(ReferenceDatasetError::EmptyColumn(field.column()));
            }
        }

        Ok(CategoryCatalog::from_fn(|field| {
            CategoryDomain::from_observations(observed.remove(&field).unwrap_or_default())
        }))
    }
}
