use super::LoanApplication;

/// Inclusive range accepted for a numeric input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: Option<f64>,
}

impl Bounds {
    pub const AGE: Bounds = Bounds::closed(18.0, 90.0);
    pub const INTEREST_RATE: Bounds = Bounds::closed(0.0, 100.0);
    pub const LOAN_PERCENT_INCOME: Bounds = Bounds::closed(0.0, 1.0);
    pub const CREDIT_SCORE: Bounds = Bounds::closed(300.0, 850.0);

    const fn closed(min: f64, max: f64) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && self.max.map_or(true, |max| value <= max)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field} must be {expectation}, got {value}")]
pub struct ValidationError {
    pub field: &'static str,
    pub expectation: String,
    pub value: f64,
}

fn check(field: &'static str, value: f64, bounds: Bounds) -> Result<(), ValidationError> {
    if bounds.contains(value) {
        return Ok(());
    }
    let expectation = match bounds.max {
        Some(max) => format!("between {} and {}", bounds.min, max),
        None => format!("at least {}", bounds.min),
    };
    Err(ValidationError {
        field,
        expectation,
        value,
    })
}

impl LoanApplication {
    /// Applies the numeric range checks offered by the form widgets.
    ///
    /// Unsigned inputs (income, experience, loan amount, credit history) are
    /// non-negative by construction and need no further checks.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check("age", f64::from(self.age), Bounds::AGE)?;
        check("interest_rate", self.interest_rate, Bounds::INTEREST_RATE)?;
        check(
            "loan_percent_income",
            self.loan_percent_income,
            Bounds::LOAN_PERCENT_INCOME,
        )?;
        check(
            "credit_score",
            f64::from(self.credit_score),
            Bounds::CREDIT_SCORE,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::tests::sample_application;

    #[test]
    fn age_bounds_are_inclusive() {
        for age in [18, 90] {
            let application = LoanApplication {
                age,
                ..sample_application()
            };
            assert_eq!(application.validate(), Ok(()), "age {age} accepted");
        }
        for age in [17, 91] {
            let application = LoanApplication {
                age,
                ..sample_application()
            };
            let error = application.validate().expect_err("age rejected");
            assert_eq!(error.field, "age");
        }
    }

    #[test]
    fn loan_percent_income_accepts_both_ends() {
        for ratio in [0.0, 1.0] {
            let application = LoanApplication {
                loan_percent_income: ratio,
                ..sample_application()
            };
            assert_eq!(application.validate(), Ok(()));
        }

        let application = LoanApplication {
            loan_percent_income: 1.05,
            ..sample_application()
        };
        let error = application.validate().expect_err("ratio above one");
        assert_eq!(
            error.to_string(),
            "loan_percent_income must be between 0 and 1, got 1.05"
        );
    }

    #[test]
    fn interest_rate_must_be_finite_and_non_negative() {
        for rate in [-0.5, f64::NAN, f64::INFINITY] {
            let application = LoanApplication {
                interest_rate: rate,
                ..sample_application()
            };
            let error = application.validate().expect_err("rate rejected");
            assert_eq!(error.field, "interest_rate");
        }
    }

    #[test]
    fn credit_score_is_bounded() {
        let application = LoanApplication {
            credit_score: 299,
            ..sample_application()
        };
        assert_eq!(
            application.validate().expect_err("score too low").field,
            "credit_score"
        );
        let application = LoanApplication {
            credit_score: 850,
            ..sample_application()
        };
        assert_eq!(application.validate(), Ok(()));
    }
}
