pub mod advisor;
pub mod application;
pub mod categories;
pub mod config;
pub mod error;
pub mod model;
pub mod telemetry;

pub use advisor::{Assessment, AssessmentError, PredictionContext, Verdict, IMPROVEMENT_TIPS};
pub use application::{ApplicationForm, LoanApplication};
