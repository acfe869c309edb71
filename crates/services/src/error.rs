//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use survey_core::model::RatingError;

/// Errors emitted by `SurveyController`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SurveyError {
    #[error("no participant is logged in")]
    NotLoggedIn,

    #[error("no active session")]
    NoSession,

    #[error("session already completed")]
    AlreadyComplete,

    #[error(transparent)]
    Rating(#[from] RatingError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ResultReporter`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    #[error("result reporting is not configured")]
    Disabled,

    #[error("result report failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
