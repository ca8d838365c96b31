//! Canonical category orderings and the string-to-index resolver.
//!
//! Every categorical input the classifier consumes is encoded as the position of the
//! selected value inside a lexicographically sorted sequence of distinct values. The
//! sequences are owned by a [`CategoryCatalog`], which is either embedded in the model
//! artifact or derived from a reference dataset (see [`reference`]).

mod reference;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

pub use reference::ReferenceDatasetError;

/// The five categorical attributes collected by the application form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    Gender,
    Education,
    HomeOwnership,
    LoanIntent,
    PreviousDefaults,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 5] = [
        CategoricalField::Gender,
        CategoricalField::Education,
        CategoricalField::HomeOwnership,
        CategoricalField::LoanIntent,
        CategoricalField::PreviousDefaults,
    ];

    /// Column name in the reference dataset and in the artifact's category map.
    pub fn column(self) -> &'static str {
        match self {
            CategoricalField::Gender => "person_gender",
            CategoricalField::Education => "person_education",
            CategoricalField::HomeOwnership => "person_home_ownership",
            CategoricalField::LoanIntent => "loan_intent",
            CategoricalField::PreviousDefaults => "previous_loan_defaults_on_file",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoricalField::Gender => "Gender",
            CategoricalField::Education => "Education Level",
            CategoricalField::HomeOwnership => "Home Ownership Status",
            CategoricalField::LoanIntent => "Loan Purpose",
            CategoricalField::PreviousDefaults => "Previous Loan Defaults",
        }
    }

    /// Exact, case-sensitive match on the column name.
    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.column() == column)
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Selected value that is not part of the field's canonical domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("value '{value}' is not a known {field} category")]
pub struct LookupError {
    pub field: CategoricalField,
    pub value: String,
}

/// Problems building a catalog from an explicit column map.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("category map is missing column '{0}'")]
    MissingColumn(&'static str),
    #[error("category column '{0}' has no values")]
    EmptyDomain(&'static str),
    #[error("category column '{column}' lists '{value}' more than once")]
    DuplicateValue { column: &'static str, value: String },
    #[error("category column '{column}' is not sorted: '{value}' is out of order")]
    Unsorted { column: &'static str, value: String },
    #[error("unknown category column '{0}'")]
    UnknownColumn(String),
}

/// Sorted, de-duplicated values of a single categorical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategoryDomain {
    values: Vec<String>,
}

impl CategoryDomain {
    /// Sorts and de-duplicates arbitrary observations, as done when reading a dataset.
    pub fn from_observations<I, S>(observations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = observations.into_iter().map(Into::into).collect();
        Self {
            values: values.into_iter().collect(),
        }
    }

    /// Accepts an already canonical sequence, rejecting duplicates or misordering.
    fn from_canonical(column: &'static str, values: Vec<String>) -> Result<Self, CatalogError> {
        if values.is_empty() {
            return Err(CatalogError::EmptyDomain(column));
        }
        for pair in values.windows(2) {
            if pair[0] == pair[1] {
                return Err(CatalogError::DuplicateValue {
                    column,
                    value: pair[1].clone(),
                });
            }
            if pair[0] > pair[1] {
                return Err(CatalogError::Unsorted {
                    column,
                    value: pair[1].clone(),
                });
            }
        }
        Ok(Self { values })
    }

    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.values
            .binary_search_by(|candidate| candidate.as_str().cmp(value))
            .ok()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Difference between two catalogs for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDrift {
    pub field: CategoricalField,
    pub expected: Vec<String>,
    pub found: Vec<String>,
}

impl fmt::Display for CategoryDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected [{}], found [{}]",
            self.field,
            self.expected.join(", "),
            self.found.join(", ")
        )
    }
}

/// Complete set of canonical domains, one per [`CategoricalField`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCatalog {
    gender: CategoryDomain,
    education: CategoryDomain,
    home_ownership: CategoryDomain,
    loan_intent: CategoryDomain,
    previous_defaults: CategoryDomain,
}

impl CategoryCatalog {
    /// Builds a catalog from a column-name keyed map whose sequences are already canonical.
    pub fn from_columns(columns: &BTreeMap<String, Vec<String>>) -> Result<Self, CatalogError> {
        if let Some(unknown) = columns
            .keys()
            .find(|column| CategoricalField::from_column(column).is_none())
        {
            return Err(CatalogError::UnknownColumn(unknown.clone()));
        }

        let domain = |field: CategoricalField| -> Result<CategoryDomain, CatalogError> {
            let values = columns
                .get(field.column())
                .ok_or(CatalogError::MissingColumn(field.column()))?;
            CategoryDomain::from_canonical(field.column(), values.clone())
        };

        Ok(Self {
            gender: domain(CategoricalField::Gender)?,
            education: domain(CategoricalField::Education)?,
            home_ownership: domain(CategoricalField::HomeOwnership)?,
            loan_intent: domain(CategoricalField::LoanIntent)?,
            previous_defaults: domain(CategoricalField::PreviousDefaults)?,
        })
    }

    pub(crate) fn from_fn<F>(mut domain: F) -> Self
    where
        F: FnMut(CategoricalField) -> CategoryDomain,
    {
        Self {
            gender: domain(CategoricalField::Gender),
            education: domain(CategoricalField::Education),
            home_ownership: domain(CategoricalField::HomeOwnership),
            loan_intent: domain(CategoricalField::LoanIntent),
            previous_defaults: domain(CategoricalField::PreviousDefaults),
        }
    }

    pub fn domain(&self, field: CategoricalField) -> &CategoryDomain {
        match field {
            CategoricalField::Gender => &self.gender,
            CategoricalField::Education => &self.education,
            CategoricalField::HomeOwnership => &self.home_ownership,
            CategoricalField::LoanIntent => &self.loan_intent,
            CategoricalField::PreviousDefaults => &self.previous_defaults,
        }
    }

    /// Returns the zero-based position of `value` in the field's canonical ordering.
    pub fn resolve(&self, field: CategoricalField, value: &str) -> Result<usize, LookupError> {
        self.domain(field)
            .index_of(value)
            .ok_or_else(|| LookupError {
                field,
                value: value.to_string(),
            })
    }

    /// Lists every field whose ordering differs from `other`.
    pub fn drift_from(&self, other: &CategoryCatalog) -> Vec<CategoryDrift> {
        CategoricalField::ALL
            .into_iter()
            .filter(|field| self.domain(*field) != other.domain(*field))
            .map(|field| CategoryDrift {
                field,
                expected: self.domain(field).values().to_vec(),
                found: other.domain(field).values().to_vec(),
            })
            .collect()
    }

    pub fn to_columns(&self) -> BTreeMap<String, Vec<String>> {
        CategoricalField::ALL
            .into_iter()
            .map(|field| (field.column().to_string(), self.domain(field).values().to_vec()))
            .collect()
    }
}

#[cfg(test)]
pub(crate) fn sample_columns() -> BTreeMap<String, Vec<String>> {
    let column = |values: &[&str]| values.iter().map(|v| v.to_string()).collect::<Vec<_>>();
    BTreeMap::from([
        ("person_gender".to_string(), column(&["female", "male"])),
        (
            "person_education".to_string(),
            column(&["Associate", "Bachelor", "Doctorate", "High School", "Master"]),
        ),
        (
            "person_home_ownership".to_string(),
            column(&["MORTGAGE", "OTHER", "OWN", "RENT"]),
        ),
        (
            "loan_intent".to_string(),
            column(&[
                "DEBTCONSOLIDATION",
                "EDUCATION",
                "HOMEIMPROVEMENT",
                "MEDICAL",
                "PERSONAL",
                "VENTURE",
            ]),
        ),
        (
            "previous_loan_defaults_on_file".to_string(),
            column(&["No", "Yes"]),
        ),
    ])
}
