use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::JobPosting;
use crate::search::paginator::Paginator;

const SERPAPI_URL: &str = "https://serpapi.com/search.json";

#[derive(Debug, Clone)]
pub struct SearchParams {
    pub query: String,
    pub location: Option<String>,
    pub max_results: u32,
}

/// One page of `google_jobs` results.
#[derive(Debug, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub jobs_results: Vec<Value>,
    #[serde(default)]
    pub serpapi_pagination: Option<Pagination>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub next_page_token: Option<String>,
}

impl SearchPage {
    pub fn next_page_token(&self) -> Option<&str> {
        self.serpapi_pagination
            .as_ref()
            .and_then(|p| p.next_page_token.as_deref())
    }
}

pub struct SerpApiClient {
    client: Client,
    api_key: String,
}

impl SerpApiClient {
    pub fn new(api_key: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("jobskills/0.1"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
        })
    }

    pub async fn search_jobs(&self, params: &SearchParams) -> Result<Vec<JobPosting>> {
        tracing::info!(
            "Fetching jobs for '{}' in {}",
            params.query,
            params.location.as_deref().unwrap_or("any location")
        );

        let paginator = Paginator::new(self);
        let raw = paginator.fetch_limited(params, params.max_results).await?;

        let mut jobs = Vec::with_capacity(raw.len());
        for value in raw {
            match JobPosting::from_value(value) {
                Ok(job) => jobs.push(job),
                Err(e) => tracing::warn!("Skipping malformed job result: {}", e),
            }
        }

        tracing::info!("Fetched {} job(s)", jobs.len());
        Ok(jobs)
    }

    pub(crate) async fn fetch_page(
        &self,
        params: &SearchParams,
        page_token: Option<&str>,
    ) -> Result<SearchPage> {
        let mut query: Vec<(&str, &str)> = vec![
            ("engine", "google_jobs"),
            ("q", params.query.as_str()),
            ("api_key", self.api_key.as_str()),
        ];
        if let Some(location) = &params.location {
            query.push(("location", location.as_str()));
        }
        if let Some(token) = page_token {
            query.push(("next_page_token", token));
        }

        let response = self.client.get(SERPAPI_URL).query(&query).send().await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited(60));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::SearchApi(format!(
                "Search for '{}' failed: {} - {}",
                params.query, status, body
            )));
        }

        let page: SearchPage = response.json().await?;
        if let Some(error) = &page.error {
            // "hasn't returned any results" is how an exhausted query is reported.
            if !error.contains("hasn't returned any results") {
                return Err(Error::SearchApi(error.clone()));
            }
        }

        Ok(page)
    }
}
