use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::response::Response;
use crate::model::trial::Trial;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors raised by session mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session already completed")]
    Completed,
}

/// Errors raised when rehydrating a session from persisted state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("cursor {cursor} exceeds trial count {trials}")]
    CursorOutOfBounds { cursor: usize, trials: usize },

    #[error("response count {responses} does not match cursor {cursor}")]
    ResponseCountMismatch { responses: usize, cursor: usize },
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One participant's survey run: a fixed trial list stepped through
/// cursor-by-cursor, collecting one response per presented trial.
///
/// Invariants held at all times:
/// - `responses.len() == cursor`
/// - `cursor <= trials.len()`
/// - the session is complete iff `cursor == trials.len()`
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    started_at: DateTime<Utc>,
    trials: Vec<Trial>,
    cursor: usize,
    responses: Vec<Response>,
}

impl Session {
    /// Creates a fresh session over the given trial list.
    ///
    /// An empty trial list yields a session that is complete immediately.
    #[must_use]
    pub fn new(trials: Vec<Trial>, started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            trials,
            cursor: 0,
            responses: Vec::new(),
        }
    }

    /// Rehydrates a session from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError` if the cursor or response count do
    /// not satisfy the session invariants.
    pub fn from_persisted(
        started_at: DateTime<Utc>,
        trials: Vec<Trial>,
        cursor: usize,
        responses: Vec<Response>,
    ) -> Result<Self, SessionStateError> {
        if cursor > trials.len() {
            return Err(SessionStateError::CursorOutOfBounds {
                cursor,
                trials: trials.len(),
            });
        }
        if responses.len() != cursor {
            return Err(SessionStateError::ResponseCountMismatch {
                responses: responses.len(),
                cursor,
            });
        }
        Ok(Self {
            started_at,
            trials,
            cursor,
            responses,
        })
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    /// Total number of trials in this session.
    #[must_use]
    pub fn total_trials(&self) -> usize {
        self.trials.len()
    }

    /// Number of trials already answered.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.responses.len()
    }

    /// Number of trials still awaiting a response.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.trials.len().saturating_sub(self.cursor)
    }

    /// The trial awaiting a response, or `None` once complete.
    #[must_use]
    pub fn current_trial(&self) -> Option<&Trial> {
        self.trials.get(self.cursor)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cursor == self.trials.len()
    }

    /// Appends a response for the current trial and advances the cursor.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if every trial has already
    /// been answered.
    pub fn record_response(&mut self, response: Response) -> Result<(), SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        self.responses.push(response);
        self.cursor += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, ParticipantId, RatingDraft, TrialId};
    use crate::time::fixed_now;

    fn build_trial(id: u64) -> Trial {
        Trial::new(TrialId::new(id), format!("image_{id:03}.jpg"), Category::Noisy)
    }

    fn build_response(trial: &Trial) -> Response {
        let rating = RatingDraft {
            quality: Some(5),
            guessed_category: Some(Category::Noisy),
            comment: String::new(),
        }
        .validate()
        .unwrap();
        Response::new(ParticipantId::parse("abc").unwrap(), trial, rating, fixed_now())
    }

    #[test]
    fn fresh_session_starts_at_cursor_zero() {
        let session = Session::new(vec![build_trial(1), build_trial(2)], fixed_now());
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.answered_count(), 0);
        assert_eq!(session.remaining(), 2);
        assert!(!session.is_complete());
    }

    #[test]
    fn empty_session_is_complete_immediately() {
        let session = Session::new(Vec::new(), fixed_now());
        assert!(session.is_complete());
        assert!(session.current_trial().is_none());
    }

    #[test]
    fn recording_advances_and_completes() {
        let trials = vec![build_trial(1), build_trial(2)];
        let mut session = Session::new(trials.clone(), fixed_now());

        session.record_response(build_response(&trials[0])).unwrap();
        assert_eq!(session.cursor(), 1);
        assert_eq!(session.answered_count(), 1);
        assert!(!session.is_complete());

        session.record_response(build_response(&trials[1])).unwrap();
        assert!(session.is_complete());

        let err = session.record_response(build_response(&trials[1])).unwrap_err();
        assert_eq!(err, SessionError::Completed);
        assert_eq!(session.answered_count(), 2);
    }

    #[test]
    fn from_persisted_rejects_cursor_beyond_trials() {
        let err =
            Session::from_persisted(fixed_now(), vec![build_trial(1)], 2, Vec::new()).unwrap_err();
        assert!(matches!(err, SessionStateError::CursorOutOfBounds { .. }));
    }

    #[test]
    fn from_persisted_rejects_response_mismatch() {
        let trials = vec![build_trial(1), build_trial(2)];
        let err = Session::from_persisted(fixed_now(), trials, 1, Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            SessionStateError::ResponseCountMismatch { responses: 0, cursor: 1 }
        ));
    }

    #[test]
    fn from_persisted_accepts_consistent_state() {
        let trials = vec![build_trial(1), build_trial(2)];
        let responses = vec![build_response(&trials[0])];
        let session = Session::from_persisted(fixed_now(), trials, 1, responses).unwrap();
        assert_eq!(session.current_trial().unwrap().id, TrialId::new(2));
        assert!(!session.is_complete());
    }
}
