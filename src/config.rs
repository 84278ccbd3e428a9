use crate::analysis::segmenter::SegmentMode;
use crate::error::{Error, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_NER_MODEL: &str = "dslim/bert-base-NER";
pub const DEFAULT_SUMMARIZATION_MODEL: &str = "facebook/bart-large-cnn";
pub const DEFAULT_SKILL_LABELS: &[&str] = &["ORG", "MISC", "SKILL"];

#[derive(Debug, Clone)]
pub struct Config {
    pub serp_api_key: Option<String>,
    pub inference_api_url: String,
    pub inference_api_token: Option<String>,
    pub ner_model: String,
    pub summarization_model: String,
    pub database_path: String,
    pub max_chunk_length: usize,
    pub use_summarization: bool,
    pub skill_labels: Vec<String>,
    pub retry_count: u32,
    pub request_timeout_secs: u64,
    pub concurrency_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let serp_api_key = env::var("SERP_API_KEY").ok().filter(|v| !v.is_empty());

        let inference_api_url = env::var("INFERENCE_API_URL")
            .unwrap_or_else(|_| DEFAULT_INFERENCE_URL.to_string());

        let inference_api_token = env::var("INFERENCE_API_TOKEN")
            .or_else(|_| env::var("HF_TOKEN"))
            .ok()
            .filter(|v| !v.is_empty());

        let ner_model = env::var("NER_MODEL").unwrap_or_else(|_| DEFAULT_NER_MODEL.to_string());

        let summarization_model = env::var("SUMMARIZATION_MODEL")
            .unwrap_or_else(|_| DEFAULT_SUMMARIZATION_MODEL.to_string());

        let database_path = env::var("DATABASE_PATH")
            .unwrap_or_else(|_| "jobskills.db".to_string());

        let max_chunk_length = match env::var("MAX_CHUNK_LENGTH") {
            Ok(v) => v.parse().map_err(|_| {
                Error::Config(format!("MAX_CHUNK_LENGTH must be a positive integer, got '{}'", v))
            })?,
            Err(_) => 512,
        };

        let use_summarization = env::var("USE_SUMMARIZATION")
            .ok()
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        let skill_labels = env::var("SKILL_LABELS")
            .ok()
            .map(|v| parse_label_list(&v))
            .filter(|labels| !labels.is_empty())
            .unwrap_or_else(default_skill_labels);

        let retry_count = env::var("RETRY_COUNT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);

        let request_timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let concurrency_limit = env::var("CONCURRENCY_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(4);

        Ok(Self {
            serp_api_key,
            inference_api_url,
            inference_api_token,
            ner_model,
            summarization_model,
            database_path,
            max_chunk_length,
            use_summarization,
            skill_labels,
            retry_count,
            request_timeout_secs,
            concurrency_limit,
        })
    }

    pub fn require_serp_api_key(&self) -> Result<&str> {
        self.serp_api_key
            .as_deref()
            .ok_or_else(|| Error::Config("SERP_API_KEY environment variable not set".to_string()))
    }
}

pub fn parse_label_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty())
        .collect()
}

fn default_skill_labels() -> Vec<String> {
    DEFAULT_SKILL_LABELS.iter().map(|s| s.to_string()).collect()
}

/// Knobs consumed by [`crate::analysis::ExtractionPipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_chunk_length: usize,
    pub segment_mode: SegmentMode,
    pub use_summarization: bool,
    pub summary_min_length: u32,
    pub summary_max_length: u32,
    pub skill_label_allowlist: Vec<String>,
    pub grouped_entities: bool,
    pub retry_count: u32,
    pub timeout: Duration,
    pub concurrency_limit: usize,
    /// Stop picking up new documents once this much time has passed.
    pub run_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_chunk_length: 512,
            segment_mode: SegmentMode::WordBoundary,
            use_summarization: false,
            summary_min_length: 30,
            summary_max_length: 130,
            skill_label_allowlist: default_skill_labels(),
            grouped_entities: true,
            retry_count: 1,
            timeout: Duration::from_secs(30),
            concurrency_limit: 4,
            run_timeout: None,
        }
    }
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            max_chunk_length: config.max_chunk_length,
            use_summarization: config.use_summarization,
            skill_label_allowlist: config.skill_labels.clone(),
            retry_count: config.retry_count,
            timeout: Duration::from_secs(config.request_timeout_secs),
            concurrency_limit: config.concurrency_limit,
            ..Self::default()
        }
    }
}
