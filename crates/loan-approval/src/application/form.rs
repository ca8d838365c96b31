use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::LoanApplication;
use crate::categories::{CategoricalField, CategoryCatalog};

/// Form submission exactly as typed, before any numeric parsing.
///
/// Keeping the raw text lets a rejected submission be rendered back with the
/// applicant's own input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationForm {
    pub age: String,
    pub gender: String,
    pub education: String,
    pub income: String,
    pub employment_experience: String,
    pub home_ownership: String,
    pub loan_amount: String,
    pub loan_intent: String,
    pub interest_rate: String,
    pub loan_percent_income: String,
    pub credit_history_length: String,
    pub credit_score: String,
    pub previous_defaults: String,
}

/// Numeric input that does not parse as the expected kind of number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} must be {expectation}, got '{value}'")]
pub struct FieldError {
    pub field: &'static str,
    pub expectation: &'static str,
    pub value: String,
}

fn parse_field<T: FromStr>(
    field: &'static str,
    expectation: &'static str,
    raw: &str,
) -> Result<T, FieldError> {
    raw.trim().parse().map_err(|_| FieldError {
        field,
        expectation,
        value: raw.to_string(),
    })
}

fn whole<T: FromStr>(field: &'static str, raw: &str) -> Result<T, FieldError> {
    parse_field(field, "a non-negative whole number", raw)
}

fn decimal(field: &'static str, raw: &str) -> Result<f64, FieldError> {
    parse_field(field, "a number", raw)
}

impl ApplicationForm {
    /// A fresh form: numeric defaults and the first value of every domain.
    pub fn prefilled(catalog: &CategoryCatalog) -> Self {
        Self::from(&LoanApplication::prefilled(catalog))
    }

    pub fn category(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::Gender => &self.gender,
            CategoricalField::Education => &self.education,
            CategoricalField::HomeOwnership => &self.home_ownership,
            CategoricalField::LoanIntent => &self.loan_intent,
            CategoricalField::PreviousDefaults => &self.previous_defaults,
        }
    }

    /// Parses the numeric inputs. Categorical values are carried over untouched and
    /// checked later against the catalog.
    pub fn parse(&self) -> Result<LoanApplication, FieldError> {
        Ok(LoanApplication {
            age: whole("age", &self.age)?,
            gender: self.gender.clone(),
            education: self.education.clone(),
            income: whole("income", &self.income)?,
            employment_experience: whole("employment_experience", &self.employment_experience)?,
            home_ownership: self.home_ownership.clone(),
            loan_amount: whole("loan_amount", &self.loan_amount)?,
            loan_intent: self.loan_intent.clone(),
            interest_rate: decimal("interest_rate", &self.interest_rate)?,
            loan_percent_income: decimal("loan_percent_income", &self.loan_percent_income)?,
            credit_history_length: whole("credit_history_length", &self.credit_history_length)?,
            credit_score: whole("credit_score", &self.credit_score)?,
            previous_defaults: self.previous_defaults.clone(),
        })
    }
}

impl From<&LoanApplication> for ApplicationForm {
    fn from(application: &LoanApplication) -> Self {
        Self {
            age: application.age.to_string(),
            gender: application.gender.clone(),
            education: application.education.clone(),
            income: application.income.to_string(),
            employment_experience: application.employment_experience.to_string(),
            home_ownership: application.home_ownership.clone(),
            loan_amount: application.loan_amount.to_string(),
            loan_intent: application.loan_intent.clone(),
            interest_rate: application.interest_rate.to_string(),
            loan_percent_income: application.loan_percent_income.to_string(),
            credit_history_length: application.credit_history_length.to_string(),
            credit_score: application.credit_score.to_string(),
            previous_defaults: application.previous_defaults.clone(),
        }
    }
}
