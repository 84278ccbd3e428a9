use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A posting as returned by the `google_jobs` search engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub job_id: String,
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub via: Option<String>,
    pub share_link: Option<String>,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub detected_extensions: DetectedExtensions,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub job_highlights: Value,
    #[serde(default)]
    pub apply_options: Value,
    /// Full payload as received, kept for the raw store.
    #[serde(skip)]
    pub raw: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectedExtensions {
    pub posted_at: Option<String>,
    pub salary: Option<String>,
}

impl JobPosting {
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        let mut posting: JobPosting = serde_json::from_value(value.clone())?;
        posting.raw = value;
        Ok(posting)
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(untitled)")
    }

    pub fn display_company(&self) -> &str {
        self.company_name.as_deref().unwrap_or("(unknown company)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_keeps_raw_payload() {
        let value = json!({
            "job_id": "abc",
            "title": "Data Engineer",
            "company_name": "Acme",
            "via": "LinkedIn",
            "extensions": ["Full-time"],
            "detected_extensions": {"posted_at": "3 days ago"},
            "description": "Needs 2+ years of Spark."
        });

        let posting = JobPosting::from_value(value.clone()).unwrap();
        assert_eq!(posting.job_id, "abc");
        assert_eq!(posting.detected_extensions.posted_at.as_deref(), Some("3 days ago"));
        assert!(posting.detected_extensions.salary.is_none());
        assert!(posting.job_highlights.is_null());
        assert_eq!(posting.raw, value);
    }
}
