use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::TrialId;
use crate::model::participant::ParticipantId;
use crate::model::trial::{Category, Trial};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors raised when validating a rating submission.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RatingError {
    #[error("quality score is required")]
    MissingQuality,

    #[error("category guess is required")]
    MissingGuess,

    #[error("quality score must be between 1 and 10, got {0}")]
    QualityOutOfRange(u8),
}

//
// ─── RATING ────────────────────────────────────────────────────────────────────
//

/// Raw rating input as collected from the participant.
///
/// Quality and guess arrive independently and may still be unset when
/// the participant tries to submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingDraft {
    pub quality: Option<u8>,
    pub guessed_category: Option<Category>,
    pub comment: String,
}

impl RatingDraft {
    /// Validates the draft into a complete `Rating`.
    ///
    /// # Errors
    ///
    /// Returns `RatingError` if quality or guess is missing, or if the
    /// quality score falls outside 1..=10.
    pub fn validate(self) -> Result<Rating, RatingError> {
        let quality = self.quality.ok_or(RatingError::MissingQuality)?;
        let guessed_category = self.guessed_category.ok_or(RatingError::MissingGuess)?;
        if !(1..=10).contains(&quality) {
            return Err(RatingError::QualityOutOfRange(quality));
        }
        Ok(Rating {
            quality,
            guessed_category,
            comment: self.comment,
        })
    }
}

/// A validated rating, ready to be attached to a trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rating {
    quality: u8,
    guessed_category: Category,
    comment: String,
}

impl Rating {
    #[must_use]
    pub fn quality(&self) -> u8 {
        self.quality
    }

    #[must_use]
    pub fn guessed_category(&self) -> Category {
        self.guessed_category
    }

    #[must_use]
    pub fn comment(&self) -> &str {
        &self.comment
    }
}

//
// ─── RESPONSE ──────────────────────────────────────────────────────────────────
//

/// The participant's recorded judgment for one presented trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub rater: ParticipantId,
    pub rated_at: DateTime<Utc>,
    pub trial_id: TrialId,
    pub filename: String,
    pub true_category: Category,
    pub quality: u8,
    pub guessed_category: Category,
    pub comment: String,
    pub correct: bool,
}

impl Response {
    /// Builds a response from the presented trial and a validated rating.
    ///
    /// `correct` is derived from the guess against the trial's true category.
    #[must_use]
    pub fn new(
        rater: ParticipantId,
        trial: &Trial,
        rating: Rating,
        rated_at: DateTime<Utc>,
    ) -> Self {
        let correct = rating.guessed_category() == trial.category;
        Self {
            rater,
            rated_at,
            trial_id: trial.id,
            filename: trial.filename.clone(),
            true_category: trial.category,
            quality: rating.quality,
            guessed_category: rating.guessed_category,
            comment: rating.comment,
            correct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn draft(quality: Option<u8>, guess: Option<Category>) -> RatingDraft {
        RatingDraft {
            quality,
            guessed_category: guess,
            comment: String::new(),
        }
    }

    #[test]
    fn draft_requires_quality() {
        let err = draft(None, Some(Category::Noisy)).validate().unwrap_err();
        assert_eq!(err, RatingError::MissingQuality);
    }

    #[test]
    fn draft_requires_guess() {
        let err = draft(Some(5), None).validate().unwrap_err();
        assert_eq!(err, RatingError::MissingGuess);
    }

    #[test]
    fn draft_rejects_out_of_range_quality() {
        let err = draft(Some(0), Some(Category::Noisy)).validate().unwrap_err();
        assert_eq!(err, RatingError::QualityOutOfRange(0));
        let err = draft(Some(11), Some(Category::Noisy)).validate().unwrap_err();
        assert_eq!(err, RatingError::QualityOutOfRange(11));
    }

    #[test]
    fn response_derives_correctness() {
        let rater = ParticipantId::parse("abc").unwrap();
        let trial = Trial::new(TrialId::new(1), "image_001.jpg", Category::Denoised);

        let hit = draft(Some(7), Some(Category::Denoised)).validate().unwrap();
        let response = Response::new(rater.clone(), &trial, hit, fixed_now());
        assert!(response.correct);
        assert_eq!(response.quality, 7);
        assert_eq!(response.true_category, Category::Denoised);

        let miss = draft(Some(7), Some(Category::Noisy)).validate().unwrap();
        let response = Response::new(rater, &trial, miss, fixed_now());
        assert!(!response.correct);
    }
}
