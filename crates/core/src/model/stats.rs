use crate::model::response::Response;
use crate::model::trial::Category;

/// Read-only aggregate statistics over a session's responses.
///
/// Computable for a completed session or mid-run for partial figures.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    total: usize,
    correct: usize,
    quality_sums: [u32; 3],
    quality_counts: [u32; 3],
}

impl SessionStats {
    /// Aggregates the given responses.
    #[must_use]
    pub fn from_responses(responses: &[Response]) -> Self {
        let mut correct = 0;
        let mut quality_sums = [0_u32; 3];
        let mut quality_counts = [0_u32; 3];

        for response in responses {
            if response.correct {
                correct += 1;
            }
            let slot = Self::slot(response.true_category);
            quality_sums[slot] += u32::from(response.quality);
            quality_counts[slot] += 1;
        }

        Self {
            total: responses.len(),
            correct,
            quality_sums,
            quality_counts,
        }
    }

    fn slot(category: Category) -> usize {
        match category {
            Category::Noisy => 0,
            Category::Original => 1,
            Category::Denoised => 2,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    /// Category-guess accuracy as a percentage, rounded to one decimal.
    ///
    /// Returns `NaN` when there are no responses; never panics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn accuracy_percent(&self) -> f64 {
        let raw = self.correct as f64 / self.total as f64 * 100.0;
        (raw * 10.0).round() / 10.0
    }

    /// Mean quality score over responses whose true category matches.
    ///
    /// A category with no responses yields 0.0; the denominator is
    /// floored at 1 so the computation cannot divide by zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_quality(&self, category: Category) -> f64 {
        let slot = Self::slot(category);
        let count = self.quality_counts[slot].max(1);
        f64::from(self.quality_sums[slot]) / f64::from(count)
    }

    /// Number of responses whose true category matches.
    #[must_use]
    pub fn category_count(&self, category: Category) -> usize {
        self.quality_counts[Self::slot(category)] as usize
    }
}
