use loan_approval::application::Bounds;
use loan_approval::categories::{CategoricalField, CategoryCatalog};
use loan_approval::{ApplicationForm, Verdict};
use maud::{html, Markup, PreEscaped, DOCTYPE};

/// Lower bound only, for amounts and durations.
const NON_NEGATIVE: Bounds = Bounds {
    min: 0.0,
    max: None,
};

const STYLESHEET: &str = "\
body { font-family: system-ui, sans-serif; margin: 0; background: #f5f7fa; color: #1f2933; }
main { max-width: 960px; margin: 0 auto; padding: 2rem 1rem; }
form { background: #fff; border: 1px solid #d9e2ec; border-radius: 8px; padding: 1.5rem; }
.columns { display: grid; grid-template-columns: repeat(auto-fit, minmax(320px, 1fr)); gap: 1.5rem; }
fieldset { border: none; padding: 0; margin: 0 0 1rem; }
label { display: block; margin: 0.75rem 0 0.25rem; font-weight: 600; }
input, select { width: 100%; padding: 0.4rem; box-sizing: border-box; }
button { margin-top: 1.5rem; width: 100%; padding: 0.75rem; font-size: 1rem; }
.outcome { margin-top: 1.5rem; padding: 1rem 1.5rem; border-radius: 8px; }
.approved { background: #e3f9e5; border: 1px solid #57ae5b; }
.rejected, .problem { background: #ffeeee; border: 1px solid #e66a6a; }
.disclaimer { margin-top: 2rem; font-size: 0.85rem; color: #52606d; }
";

/// Result block rendered below the form after a submission.
pub(crate) enum Outcome<'a> {
    Verdict(Verdict),
    Problem(&'a str),
}

pub(crate) fn application_page(
    catalog: &CategoryCatalog,
    values: &ApplicationForm,
    outcome: Option<Outcome<'_>>,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Loan Prediction" }
                style { (PreEscaped(STYLESHEET)) }
            }
            body {
                main {
                    h1 { "Smart Loan Prediction System" }
                    p { "Enter the applicant's details to get an approval prediction." }
                    form method="post" action="/assess" {
                        div.columns {
                            div {
                                fieldset {
                                    legend { "Personal Information" }
                                    (number_input("age", "Age", &values.age, Bounds::AGE, "1"))
                                    (category_select(catalog, CategoricalField::Gender, values))
                                    (category_select(catalog, CategoricalField::Education, values))
                                }
                                fieldset {
                                    legend { "Financial Information" }
                                    (number_input("income", "Annual Income ($)", &values.income, NON_NEGATIVE, "5000"))
                                    (number_input("employment_experience", "Employment Experience (years)", &values.employment_experience, NON_NEGATIVE, "1"))
                                    (category_select(catalog, CategoricalField::HomeOwnership, values))
                                }
                            }
                            div {
                                fieldset {
                                    legend { "Loan & Credit Information" }
                                    (number_input("loan_amount", "Loan Amount ($)", &values.loan_amount, NON_NEGATIVE, "1000"))
                                    (category_select(catalog, CategoricalField::LoanIntent, values))
                                    (number_input("interest_rate", "Interest Rate (%)", &values.interest_rate, Bounds::INTEREST_RATE, "0.01"))
                                    (number_input("loan_percent_income", "Loan as % of Income", &values.loan_percent_income, Bounds::LOAN_PERCENT_INCOME, "0.01"))
                                    (number_input("credit_history_length", "Credit History Length (years)", &values.credit_history_length, NON_NEGATIVE, "1"))
                                    (number_input("credit_score", "Credit Score", &values.credit_score, Bounds::CREDIT_SCORE, "1"))
                                    (category_select(catalog, CategoricalField::PreviousDefaults, values))
                                }
                            }
                        }
                        button type="submit" { "Predict Loan Status" }
                    }
                    @if let Some(outcome) = outcome {
                        (outcome_section(outcome))
                    }
                    p.disclaimer {
                        "This is a prediction tool. Final loan approval depends on bank policies and additional verification."
                    }
                }
            }
        }
    }
}

fn number_input(
    name: &str,
    label: &str,
    value: &str,
    bounds: Bounds,
    step: &str,
) -> Markup {
    html! {
        label for=(name) { (label) }
        input type="number" id=(name) name=(name) value=(value) min=(bounds.min) max=[bounds.max] step=(step) required;
    }
}

fn form_name(field: CategoricalField) -> &'static str {
    match field {
        CategoricalField::Gender => "gender",
        CategoricalField::Education => "education",
        CategoricalField::HomeOwnership => "home_ownership",
        CategoricalField::LoanIntent => "loan_intent",
        CategoricalField::PreviousDefaults => "previous_defaults",
    }
}

fn category_select(
    catalog: &CategoryCatalog,
    field: CategoricalField,
    values: &ApplicationForm,
) -> Markup {
    let name = form_name(field);
    let selected = values.category(field);
    html! {
        label for=(name) { (field.label()) }
        select id=(name) name=(name) {
            @for value in catalog.domain(field).values() {
                option value=(value) selected[value.as_str() == selected] { (value) }
            }
        }
    }
}

fn outcome_section(outcome: Outcome<'_>) -> Markup {
    match outcome {
        Outcome::Verdict(Verdict::Approved) => html! {
            section.outcome.approved {
                p { strong { (Verdict::Approved.headline()) } }
            }
        },
        Outcome::Verdict(Verdict::Rejected) => html! {
            section.outcome.rejected {
                p { strong { (Verdict::Rejected.headline()) } }
                h3 { "Tips to improve your chances" }
                ul {
                    @for tip in Verdict::Rejected.tips() {
                        li { (tip) }
                    }
                }
            }
        },
        Outcome::Problem(message) => html! {
            section.outcome.problem {
                p { strong { "We could not assess this application." } }
                p { (message) }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn catalog() -> CategoryCatalog {
        let column = |values: &[&str]| values.iter().map(|v| v.to_string()).collect::<Vec<_>>();
        let columns = BTreeMap::from([
            ("person_gender".to_string(), column(&["female", "male"])),
            ("person_education".to_string(), column(&["Bachelor", "High School"])),
            ("person_home_ownership".to_string(), column(&["OWN", "RENT"])),
            ("loan_intent".to_string(), column(&["EDUCATION", "PERSONAL"])),
            ("previous_loan_defaults_on_file".to_string(), column(&["No", "Yes"])),
        ]);
        CategoryCatalog::from_columns(&columns).expect("canonical")
    }

    #[test]
    fn fresh_form_preselects_first_values_and_defaults() {
        let catalog = catalog();
        let page = application_page(&catalog, &ApplicationForm::prefilled(&catalog), None)
            .into_string();

        assert!(page.contains(r#"name="age" value="25" min="18" max="90""#));
        assert!(page.contains(r#"name="loan_percent_income" value="0.25" min="0" max="1""#));
        assert!(page.contains(r#"<option value="OWN" selected>OWN</option>"#));
        assert!(page.contains(r#"<option value="RENT">RENT</option>"#));
        assert!(page.contains(r#"<option value="High School">High School</option>"#));
        assert!(!page.contains("<section"));
    }

    #[test]
    fn amounts_have_a_floor_but_no_ceiling() {
        let catalog = catalog();
        let page = application_page(&catalog, &ApplicationForm::prefilled(&catalog), None)
            .into_string();
        for field in ["income", "employment_experience", "loan_amount", "credit_history_length"] {
            let start = page
                .find(&format!(r#"name="{field}""#))
                .expect("input rendered");
            let input = &page[start..start + page[start..].find('>').expect("tag closes")];
            assert!(input.contains(r#"min="0""#), "{field} floor");
            assert!(!input.contains("max="), "{field} ceiling");
        }
    }

    #[test]
    fn submitted_text_is_echoed_verbatim() {
        let catalog = catalog();
        let values = ApplicationForm {
            income: "lots".to_string(),
            home_ownership: "RENT".to_string(),
            ..ApplicationForm::prefilled(&catalog)
        };
        let page = application_page(&catalog, &values, None).into_string();
        assert!(page.contains(r#"name="income" value="lots""#));
        assert!(page.contains(r#"<option value="RENT" selected>RENT</option>"#));
        assert!(page.contains(r#"<option value="OWN">OWN</option>"#));
    }

    #[test]
    fn rejection_lists_every_tip() {
        let catalog = catalog();
        let page = application_page(
            &catalog,
            &ApplicationForm::prefilled(&catalog),
            Some(Outcome::Verdict(Verdict::Rejected)),
        )
        .into_string();

        assert!(page.contains("may be rejected"));
        for tip in Verdict::Rejected.tips() {
            assert!(page.contains(&format!("<li>{tip}</li>")), "missing tip {tip}");
        }
    }

    #[test]
    fn problem_messages_are_escaped() {
        let catalog = catalog();
        let page = application_page(
            &catalog,
            &ApplicationForm::prefilled(&catalog),
            Some(Outcome::Problem("<script>alert(1)</script>")),
        )
        .into_string();
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>"));
    }
}
