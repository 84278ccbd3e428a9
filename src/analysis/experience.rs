use regex::Regex;
use std::collections::BTreeSet;

/// Bucket used for postings that never state a number of years.
pub const NO_EXPERIENCE_BUCKET: u32 = 0;

pub struct ExperienceDetector {
    pattern: Regex,
}

impl ExperienceDetector {
    pub fn new() -> Self {
        let pattern = Regex::new(r"(?i)(?:^|\D)(\d{1,2})\s*\+?\s*(?:years?|yrs?)\b")
            .expect("Invalid experience regex");
        Self { pattern }
    }

    /// Distinct year counts mentioned in `text`, or `{0}` when there are none.
    pub fn detect(&self, text: &str) -> BTreeSet<u32> {
        let mut years: BTreeSet<u32> = self
            .pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .filter_map(|m| m.as_str().parse().ok())
            .collect();

        if years.is_empty() {
            years.insert(NO_EXPERIENCE_BUCKET);
        }
        years
    }
}

impl Default for ExperienceDetector {
    fn default() -> Self {
        Self::new()
    }
}
