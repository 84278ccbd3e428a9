use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A labelled span returned by the entity recognition service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub label: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Entity {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
            score: None,
        }
    }
}

/// Normalized skill names. Ordered so that frozen output is deterministic.
pub type SkillSet = BTreeSet<String>;
