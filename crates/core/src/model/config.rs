/// Configuration constants for survey list generation.
///
/// Mirrors the recognized options of the study setup: how many unique
/// images a session shows and what share of them is re-presented as
/// consistency-check duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyConfig {
    unique_image_count: u32,
    duplicate_percent: u32,
    duplicate_min_spacing: u32,
}

impl SurveyConfig {
    /// Creates a config with explicit values.
    ///
    /// `duplicate_percent` above 100 is clamped at use, not here.
    #[must_use]
    pub fn new(unique_image_count: u32, duplicate_percent: u32, duplicate_min_spacing: u32) -> Self {
        Self {
            unique_image_count,
            duplicate_percent,
            duplicate_min_spacing,
        }
    }

    #[must_use]
    pub fn unique_image_count(&self) -> u32 {
        self.unique_image_count
    }

    #[must_use]
    pub fn duplicate_percent(&self) -> u32 {
        self.duplicate_percent
    }

    /// Declared minimum spacing between the two presentations of a
    /// duplicated image. Recorded in configuration only; trial
    /// sampling does not apply it.
    #[must_use]
    pub fn duplicate_min_spacing(&self) -> u32 {
        self.duplicate_min_spacing
    }
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            unique_image_count: 120,
            duplicate_percent: 15,
            duplicate_min_spacing: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_study_setup() {
        let config = SurveyConfig::default();
        assert_eq!(config.unique_image_count(), 120);
        assert_eq!(config.duplicate_percent(), 15);
        assert_eq!(config.duplicate_min_spacing(), 5);
    }
}
