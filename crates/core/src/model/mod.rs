mod config;
mod ids;
mod participant;
mod response;
mod session;
mod stats;
mod trial;

pub use config::SurveyConfig;
pub use ids::TrialId;
pub use participant::{ParticipantError, ParticipantId};
pub use response::{Rating, RatingDraft, RatingError, Response};
pub use session::{Session, SessionError, SessionStateError};
pub use stats::SessionStats;
pub use trial::{Category, CategoryParseError, Trial};
