use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::entity::SkillSet;
use super::job::JobPosting;

/// A single job description fed through the extraction pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(alias = "description")]
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

impl From<JobPosting> for Document {
    fn from(posting: JobPosting) -> Self {
        Self {
            id: posting.job_id,
            text: posting.description,
        }
    }
}

/// Per-document extraction outcome, merged into the aggregator by the pipeline.
#[derive(Debug, Clone, Default)]
pub struct DocumentResult {
    pub id: String,
    pub years: BTreeSet<u32>,
    pub skills: SkillSet,
    pub chunks_total: usize,
    pub chunks_failed: usize,
}
