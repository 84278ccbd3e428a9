use async_trait::async_trait;

use crate::error::Result;
use crate::models::Entity;

#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    /// Run named entity recognition over `text`. With `grouped`, adjacent
    /// word pieces are merged into a single labelled span.
    async fn recognize(&self, text: &str, grouped: bool) -> Result<Vec<Entity>>;
    fn name(&self) -> &str;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str, min_length: u32, max_length: u32) -> Result<String>;
    fn name(&self) -> &str;
}
