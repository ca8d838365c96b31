use serde::Serialize;

use super::LoanApplication;
use crate::categories::{CategoricalField, CategoryCatalog, LookupError};

pub const FEATURE_COUNT: usize = 13;

/// Training-time column order of the classifier input.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "person_age",
    "person_gender",
    "person_education",
    "person_income",
    "person_emp_exp",
    "person_home_ownership",
    "loan_amnt",
    "loan_intent",
    "loan_int_rate",
    "loan_percent_income",
    "cb_person_cred_hist_length",
    "credit_score",
    "previous_loan_defaults_on_file",
];

impl CategoricalField {
    /// Slot of the encoded category inside a [`FeatureVector`].
    pub fn feature_position(self) -> usize {
        match self {
            CategoricalField::Gender => 1,
            CategoricalField::Education => 2,
            CategoricalField::HomeOwnership => 5,
            CategoricalField::LoanIntent => 7,
            CategoricalField::PreviousDefaults => 12,
        }
    }
}

/// Fixed-order numeric sample handed to the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Resolves the categorical selections and lays every input out in schema order.
    pub fn assemble(
        application: &LoanApplication,
        catalog: &CategoryCatalog,
    ) -> Result<Self, LookupError> {
        let index =
            |field: CategoricalField| catalog.resolve(field, application.category(field));

        Ok(Self([
            f64::from(application.age),
            index(CategoricalField::Gender)? as f64,
            index(CategoricalField::Education)? as f64,
            f64::from(application.income),
            f64::from(application.employment_experience),
            index(CategoricalField::HomeOwnership)? as f64,
            f64::from(application.loan_amount),
            index(CategoricalField::LoanIntent)? as f64,
            application.interest_rate,
            application.loan_percent_income,
            f64::from(application.credit_history_length),
            f64::from(application.credit_score),
            index(CategoricalField::PreviousDefaults)? as f64,
        ]))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }
}
