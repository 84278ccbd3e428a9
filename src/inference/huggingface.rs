use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::inference::parser::{parse_api_error, parse_entities, parse_summary};
use crate::inference::provider::{EntityRecognizer, Summarizer};
use crate::models::Entity;

/// Client for a Hugging Face Inference API compatible endpoint.
pub struct HuggingFaceClient {
    client: Client,
    base_url: String,
    ner_model: String,
    summarization_model: String,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: Value,
    options: InferenceOptions,
}

#[derive(Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

impl HuggingFaceClient {
    pub fn new(
        base_url: &str,
        api_token: Option<&str>,
        ner_model: &str,
        summarization_model: &str,
    ) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = api_token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("jobskills/0.1"),
        );

        // Per-call deadlines are enforced by the pipeline's retry policy.
        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            ner_model: ner_model.to_string(),
            summarization_model: summarization_model.to_string(),
        })
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url, model)
    }

    async fn post(&self, model: &str, inputs: &str, parameters: Value) -> Result<String> {
        let request = InferenceRequest {
            inputs,
            parameters,
            options: InferenceOptions {
                wait_for_model: false,
            },
        };

        let response = self
            .client
            .post(self.model_url(model))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        Err(status_error(model, status, retry_after, &body, inputs))
    }
}

/// Maps a failed response onto the error the retry policy understands.
fn status_error(
    model: &str,
    status: StatusCode,
    retry_after: Option<u64>,
    body: &str,
    inputs: &str,
) -> Error {
    match status {
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited(retry_after.unwrap_or(1)),
        StatusCode::PAYLOAD_TOO_LARGE => Error::InputTooLong(inputs.chars().count()),
        StatusCode::SERVICE_UNAVAILABLE => {
            let wait = parse_api_error(body).and_then(|err| err.estimated_time);
            Error::ModelUnavailable(wait.unwrap_or(1.0))
        }
        _ => match parse_api_error(body) {
            Some(err) => Error::Inference(format!("{} ({})", err.message(), status)),
            None => Error::Inference(format!("{} returned {}: {}", model, status, body)),
        },
    }
}

#[async_trait]
impl EntityRecognizer for HuggingFaceClient {
    async fn recognize(&self, text: &str, grouped: bool) -> Result<Vec<Entity>> {
        let strategy = if grouped { "simple" } else { "none" };
        tracing::debug!("Sending {} chars to {}", text.chars().count(), self.ner_model);

        let body = self
            .post(
                &self.ner_model,
                text,
                json!({ "aggregation_strategy": strategy }),
            )
            .await?;

        parse_entities(&body)
    }

    fn name(&self) -> &str {
        &self.ner_model
    }
}

#[async_trait]
impl Summarizer for HuggingFaceClient {
    async fn summarize(&self, text: &str, min_length: u32, max_length: u32) -> Result<String> {
        tracing::debug!(
            "Summarizing {} chars with {}",
            text.chars().count(),
            self.summarization_model
        );

        let body = self
            .post(
                &self.summarization_model,
                text,
                json!({
                    "min_length": min_length,
                    "max_length": max_length.max(min_length),
                    "do_sample": false,
                }),
            )
            .await?;

        parse_summary(&body).map(|s| s.trim().to_string())
    }

    fn name(&self) -> &str {
        &self.summarization_model
    }
}
