mod features;
mod form;
mod validation;

use serde::Serialize;

use crate::categories::{CategoricalField, CategoryCatalog};

pub use features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use form::{ApplicationForm, FieldError};
pub use validation::{Bounds, ValidationError};

/// Applicant attributes once the form's numeric inputs have been parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanApplication {
    pub age: u16,
    pub gender: String,
    pub education: String,
    pub income: u32,
    pub employment_experience: u16,
    pub home_ownership: String,
    pub loan_amount: u32,
    pub loan_intent: String,
    pub interest_rate: f64,
    pub loan_percent_income: f64,
    pub credit_history_length: u16,
    pub credit_score: u16,
    pub previous_defaults: String,
}

impl LoanApplication {
    /// Selected value for a categorical field.
    pub fn category(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::Gender => &self.gender,
            CategoricalField::Education => &self.education,
            CategoricalField::HomeOwnership => &self.home_ownership,
            CategoricalField::LoanIntent => &self.loan_intent,
            CategoricalField::PreviousDefaults => &self.previous_defaults,
        }
    }

    /// Fresh form contents: numeric defaults and the first value of every domain.
    pub fn prefilled(catalog: &CategoryCatalog) -> Self {
        let first = |field: CategoricalField| {
            catalog
                .domain(field)
                .values()
                .first()
                .cloned()
                .unwrap_or_default()
        };

        Self {
            age: FORM_DEFAULTS.age,
            gender: first(CategoricalField::Gender),
            education: first(CategoricalField::Education),
            income: FORM_DEFAULTS.income,
            employment_experience: FORM_DEFAULTS.employment_experience,
            home_ownership: first(CategoricalField::HomeOwnership),
            loan_amount: FORM_DEFAULTS.loan_amount,
            loan_intent: first(CategoricalField::LoanIntent),
            interest_rate: FORM_DEFAULTS.interest_rate,
            loan_percent_income: FORM_DEFAULTS.loan_percent_income,
            credit_history_length: FORM_DEFAULTS.credit_history_length,
            credit_score: FORM_DEFAULTS.credit_score,
            previous_defaults: first(CategoricalField::PreviousDefaults),
        }
    }

    pub fn category_mut(&mut self, field: CategoricalField) -> &mut String {
        match field {
            CategoricalField::Gender => &mut self.gender,
            CategoricalField::Education => &mut self.education,
            CategoricalField::HomeOwnership => &mut self.home_ownership,
            CategoricalField::LoanIntent => &mut self.loan_intent,
            CategoricalField::PreviousDefaults => &mut self.previous_defaults,
        }
    }
}

/// Numeric inputs pre-filled on a fresh form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericDefaults {
    pub age: u16,
    pub income: u32,
    pub employment_experience: u16,
    pub loan_amount: u32,
    pub interest_rate: f64,
    pub loan_percent_income: f64,
    pub credit_history_length: u16,
    pub credit_score: u16,
}

pub const FORM_DEFAULTS: NumericDefaults = NumericDefaults {
    age: 25,
    income: 50_000,
    employment_experience: 3,
    loan_amount: 15_000,
    interest_rate: 10.0,
    loan_percent_income: 0.25,
    credit_history_length: 5,
    credit_score: 650,
};

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_application() -> LoanApplication {
        LoanApplication {
            age: 25,
            gender: "female".to_string(),
            education: "Bachelor".to_string(),
            income: 50_000,
            employment_experience: 3,
            home_ownership: "RENT".to_string(),
            loan_amount: 15_000,
            loan_intent: "PERSONAL".to_string(),
            interest_rate: 10.0,
            loan_percent_income: 0.25,
            credit_history_length: 5,
            credit_score: 650,
            previous_defaults: "No".to_string(),
        }
    }

    #[test]
    fn category_accessors_cover_every_field() {
        let mut application = sample_application();
        *application.category_mut(CategoricalField::LoanIntent) = "VENTURE".to_string();
        assert_eq!(application.loan_intent, "VENTURE");
        assert_eq!(application.category(CategoricalField::Gender), "female");
        assert_eq!(application.category(CategoricalField::PreviousDefaults), "No");
    }

    #[test]
    fn prefilled_form_uses_defaults_and_first_categories() {
        let catalog = CategoryCatalog::from_columns(&crate::categories::sample_columns())
            .expect("canonical");
        let application = LoanApplication::prefilled(&catalog);
        assert_eq!(application.validate(), Ok(()));
        assert_eq!(application.gender, "female");
        assert_eq!(application.education, "Associate");
        assert_eq!(application.home_ownership, "MORTGAGE");
        assert_eq!(application.loan_intent, "DEBTCONSOLIDATION");
        assert_eq!(application.previous_defaults, "No");

        let numeric_only = LoanApplication {
            gender: application.gender.clone(),
            education: application.education.clone(),
            home_ownership: application.home_ownership.clone(),
            loan_intent: application.loan_intent.clone(),
            previous_defaults: application.previous_defaults.clone(),
            ..sample_application()
        };
        assert_eq!(application, numeric_only);
    }
}
