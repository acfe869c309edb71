#![forbid(unsafe_code)]

pub mod controller;
pub mod error;
pub mod export;
pub mod plan;
pub mod report;

pub use survey_core::Clock;

pub use controller::{SubmitResult, SurveyController, SurveyState};
pub use error::{ReportError, SurveyError};
pub use export::responses_to_csv;
pub use plan::{TrialPlan, TrialPlanner};
pub use report::{ResultReporter, SessionReport};
