use thiserror::Error;

use crate::model::{ParticipantError, RatingError, SessionStateError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Participant(#[from] ParticipantError),
    #[error(transparent)]
    Rating(#[from] RatingError),
    #[error(transparent)]
    SessionState(#[from] SessionStateError),
}
