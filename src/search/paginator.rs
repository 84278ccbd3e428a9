use serde_json::Value;

use crate::error::Result;
use crate::search::client::{SearchParams, SerpApiClient};

/// Follows `next_page_token` links until enough results are collected.
pub struct Paginator<'a> {
    client: &'a SerpApiClient,
}

impl<'a> Paginator<'a> {
    pub fn new(client: &'a SerpApiClient) -> Self {
        Self { client }
    }

    pub async fn fetch_limited(&self, params: &SearchParams, max_items: u32) -> Result<Vec<Value>> {
        let mut all_items = Vec::new();
        let mut token: Option<String> = None;

        loop {
            tracing::debug!("Fetching page (token: {:?})", token);
            let page = self.client.fetch_page(params, token.as_deref()).await?;
            let next = page.next_page_token().map(str::to_string);
            let items_count = page.jobs_results.len();
            all_items.extend(page.jobs_results);

            if all_items.len() >= max_items as usize || next.is_none() || items_count == 0 {
                break;
            }

            token = next;
        }

        all_items.truncate(max_items as usize);
        Ok(all_items)
    }
}
