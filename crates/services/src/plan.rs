use rand::Rng;
use rand::seq::index;

use survey_core::model::{Category, SurveyConfig, Trial, TrialId};

/// Generation result for a session build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialPlan {
    pub trials: Vec<Trial>,
    pub unique_count: usize,
    pub duplicate_count: usize,
}

impl TrialPlan {
    /// Total number of trials in this plan.
    #[must_use]
    pub fn total(&self) -> usize {
        self.trials.len()
    }

    /// Returns true when no trials were generated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }
}

/// Builds the ordered trial list for a new session: a unique image
/// pool followed by randomly drawn consistency-check duplicates.
///
/// Pure with respect to persisted state; all randomness comes from the
/// injected generator.
pub struct TrialPlanner<'a> {
    config: &'a SurveyConfig,
    filenames: Option<Vec<String>>,
}

impl<'a> TrialPlanner<'a> {
    #[must_use]
    pub fn new(config: &'a SurveyConfig) -> Self {
        Self {
            config,
            filenames: None,
        }
    }

    /// Supply an external filename pool instead of synthesized names.
    ///
    /// The pool is truncated to `unique_image_count`; an empty pool is
    /// ignored.
    #[must_use]
    pub fn with_filenames(mut self, filenames: Vec<String>) -> Self {
        if !filenames.is_empty() {
            self.filenames = Some(filenames);
        }
        self
    }

    /// Build the trial list.
    ///
    /// - Each unique image gets a sequential 1-based id and a category
    ///   drawn uniformly at random.
    /// - `duplicate_count = round(unique * percent / 100)`, with the
    ///   percentage clamped to 0..=100 and the count capped at the
    ///   unique pool size, so no image is duplicated twice.
    /// - Duplicates are exact copies appended after the unique block,
    ///   in the order their indices were drawn.
    /// - A zero unique count yields an empty plan; there are no error
    ///   paths.
    pub fn build(self, rng: &mut (impl Rng + ?Sized)) -> TrialPlan {
        let configured = self.config.unique_image_count() as usize;
        if configured == 0 {
            return TrialPlan {
                trials: Vec::new(),
                unique_count: 0,
                duplicate_count: 0,
            };
        }

        let filenames: Vec<String> = match self.filenames {
            Some(pool) => pool.into_iter().take(configured).collect(),
            None => (1..=configured)
                .map(|i| format!("image_{i:03}.jpg"))
                .collect(),
        };
        let unique_count = filenames.len();

        let mut trials: Vec<Trial> = filenames
            .into_iter()
            .enumerate()
            .map(|(i, filename)| {
                let category = Category::ALL[rng.random_range(0..Category::ALL.len())];
                Trial::new(TrialId::new(i as u64 + 1), filename, category)
            })
            .collect();

        let percent = f64::from(self.config.duplicate_percent().min(100));
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let duplicate_count =
            ((unique_count as f64 * percent / 100.0).round() as usize).min(unique_count);

        // Distinct indices, drawn without replacement; draw order is
        // the duplicates' presentation order.
        let duplicates: Vec<Trial> = index::sample(rng, unique_count, duplicate_count)
            .iter()
            .map(|i| trials[i].clone())
            .collect();
        trials.extend(duplicates);

        TrialPlan {
            trials,
            unique_count,
            duplicate_count,
        }
    }
}
