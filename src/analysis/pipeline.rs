use std::sync::Arc;
use std::time::Instant;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::analysis::aggregator::Aggregator;
use crate::analysis::experience::ExperienceDetector;
use crate::analysis::segmenter::Segmenter;
use crate::analysis::skill_filter::SkillFilter;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::inference::{EntityRecognizer, RetryPolicy, Summarizer};
use crate::models::{Document, DocumentResult, Entity, ExperienceSkillIndex};

pub struct ExtractionPipeline {
    recognizer: Arc<dyn EntityRecognizer>,
    summarizer: Option<Arc<dyn Summarizer>>,
    segmenter: Segmenter,
    detector: ExperienceDetector,
    filter: SkillFilter,
    retry: RetryPolicy,
    config: PipelineConfig,
    show_progress: bool,
}

/// Outcome of a run over a corpus.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub index: ExperienceSkillIndex,
    pub documents_processed: usize,
    pub chunks_total: usize,
    pub chunks_failed: usize,
    /// Set when the run timeout stopped processing early; the index is partial.
    pub timed_out: bool,
}

impl ExtractionPipeline {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>, config: PipelineConfig) -> Self {
        Self {
            recognizer,
            summarizer: None,
            segmenter: Segmenter::new(config.max_chunk_length, config.segment_mode),
            detector: ExperienceDetector::new(),
            filter: SkillFilter::new(&config.skill_label_allowlist),
            retry: RetryPolicy::new(config.retry_count, config.timeout),
            config,
            show_progress: true,
        }
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    fn summarizer(&self) -> Option<&Arc<dyn Summarizer>> {
        if self.config.use_summarization {
            self.summarizer.as_ref()
        } else {
            None
        }
    }

    pub async fn run<I>(&self, documents: I) -> RunReport
    where
        I: IntoIterator<Item = Document>,
    {
        let documents = documents.into_iter();
        let started = Instant::now();
        let mut aggregator = Aggregator::new();
        let mut chunks_total = 0;
        let mut chunks_failed = 0;
        let mut timed_out = false;

        if self.config.use_summarization && self.summarizer.is_none() {
            tracing::warn!("Summarization requested but no summarizer configured, using raw chunks");
        }
        tracing::info!(
            "Extracting with {} ({} mode, max {} chars per chunk)",
            self.recognizer.name(),
            self.segmenter.mode(),
            self.segmenter.max_chars()
        );

        let pb = self.progress_bar(documents.size_hint().0 as u64);

        for document in documents {
            let result = match self.config.run_timeout {
                Some(limit) => {
                    let remaining = limit.saturating_sub(started.elapsed());
                    match timeout(remaining, self.process_document(&document)).await {
                        Ok(result) => result,
                        Err(_) => {
                            tracing::warn!(
                                "Run timeout of {:?} reached at document {}, keeping partial results",
                                limit,
                                document.id
                            );
                            timed_out = true;
                            break;
                        }
                    }
                }
                None => self.process_document(&document).await,
            };

            chunks_total += result.chunks_total;
            chunks_failed += result.chunks_failed;
            aggregator.merge(Aggregator::from(&result));
            pb.inc(1);
        }

        pb.finish_with_message("Extraction complete");

        let documents_processed = aggregator.documents_seen();
        if documents_processed == 0 {
            tracing::warn!("No documents processed, index is empty");
        }
        tracing::info!(
            "Processed {} documents ({} chunks, {} failed)",
            documents_processed,
            chunks_total,
            chunks_failed
        );

        RunReport {
            index: aggregator.freeze(),
            documents_processed,
            chunks_total,
            chunks_failed,
            timed_out,
        }
    }

    /// Years and skills for one document. Chunk failures are counted, never raised.
    pub async fn process_document(&self, document: &Document) -> DocumentResult {
        let years = self.detector.detect(&document.text);
        let chunks: Vec<String> = self.segmenter.segments(&document.text).collect();

        let mut result = DocumentResult {
            id: document.id.clone(),
            years,
            chunks_total: chunks.len(),
            ..Default::default()
        };

        if chunks.is_empty() {
            tracing::debug!("Document {} has no text", document.id);
            return result;
        }

        let inputs = match self.summarizer() {
            Some(summarizer) => {
                let (inputs, failed) = self.summarize_chunks(summarizer, &document.id, chunks).await;
                result.chunks_failed += failed;
                inputs
            }
            None => chunks,
        };

        let mut entities = Vec::new();
        for (i, outcome) in self.extract_entities(&inputs).await.into_iter().enumerate() {
            match outcome {
                Ok(found) => entities.extend(found),
                Err(e) => {
                    tracing::warn!(
                        "Entity extraction failed for chunk {} of {}: {}",
                        i + 1,
                        document.id,
                        e
                    );
                    result.chunks_failed += 1;
                }
            }
        }

        result.skills = self.filter.filter(&entities);
        tracing::debug!(
            "Document {}: years {:?}, {} skills",
            document.id,
            result.years,
            result.skills.len()
        );
        result
    }

    /// Summaries of every chunk joined and re-segmented. Falls back to the raw
    /// chunks when no summary succeeded.
    async fn summarize_chunks(
        &self,
        summarizer: &Arc<dyn Summarizer>,
        document_id: &str,
        chunks: Vec<String>,
    ) -> (Vec<String>, usize) {
        let min = self.config.summary_min_length;
        let max = self.config.summary_max_length;

        let outcomes = self
            .bounded(chunks.iter().map(|chunk| {
                self.retry
                    .call("summarization", move || summarizer.summarize(chunk, min, max))
            }))
            .await;

        let mut failed = 0;
        let summaries: Vec<String> = outcomes
            .into_iter()
            .enumerate()
            .map(|(i, outcome)| match outcome {
                Ok(summary) => summary,
                Err(e) => {
                    tracing::warn!(
                        "Summarization failed for chunk {} of {}: {}",
                        i + 1,
                        document_id,
                        e
                    );
                    failed += 1;
                    String::new()
                }
            })
            .collect();

        let combined = summaries
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if combined.is_empty() {
            tracing::warn!("No summaries for {}, extracting from raw text", document_id);
            return (chunks, failed);
        }

        (self.segmenter.segments(&combined).collect(), failed)
    }

    async fn extract_entities(&self, inputs: &[String]) -> Vec<Result<Vec<Entity>>> {
        let grouped = self.config.grouped_entities;
        let recognizer = &self.recognizer;

        self.bounded(inputs.iter().map(|chunk| {
            self.retry
                .call("entity recognition", move || recognizer.recognize(chunk, grouped))
        }))
        .await
    }

    /// Runs the calls concurrently, at most `concurrency_limit` at a time,
    /// returning results in input order.
    async fn bounded<T, F>(&self, calls: impl Iterator<Item = F>) -> Vec<T>
    where
        F: std::future::Future<Output = T>,
    {
        let semaphore = Semaphore::new(self.config.concurrency_limit.max(1));
        let semaphore = &semaphore;

        join_all(calls.map(|call| async move {
            let _permit = semaphore.acquire().await.ok();
            call.await
        }))
        .await
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} postings")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);
        pb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::error::Error;

    struct KeywordRecognizer;

    #[async_trait]
    impl EntityRecognizer for KeywordRecognizer {
        async fn recognize(&self, text: &str, _grouped: bool) -> Result<Vec<Entity>> {
            if text.contains("BROKEN") {
                return Err(Error::ParseError("garbled".to_string()));
            }
            Ok(text
                .split_whitespace()
                .filter(|w| w.chars().next().map(char::is_uppercase).unwrap_or(false))
                .map(|w| Entity::new("MISC", w))
                .collect())
        }

        fn name(&self) -> &str {
            "keywords"
        }
    }

    fn pipeline(max_chunk_length: usize) -> ExtractionPipeline {
        let config = PipelineConfig {
            max_chunk_length,
            skill_label_allowlist: vec!["MISC".to_string()],
            ..Default::default()
        };
        ExtractionPipeline::new(Arc::new(KeywordRecognizer), config).without_progress()
    }

    #[tokio::test]
    async fn test_process_document_collects_years_and_skills() {
        let doc = Document::new("1", "needs 4 years Rust and Tokio");
        let result = pipeline(512).process_document(&doc).await;

        assert_eq!(result.years.into_iter().collect::<Vec<_>>(), vec![4]);
        assert_eq!(result.skills.into_iter().collect::<Vec<_>>(), vec!["Rust", "Tokio"]);
        assert_eq!(result.chunks_total, 1);
        assert_eq!(result.chunks_failed, 0);
    }

    #[tokio::test]
    async fn test_failed_chunk_is_skipped() {
        let doc = Document::new("2", "Kafka streams BROKEN chunk here Flink jobs");
        let result = pipeline(13).process_document(&doc).await;

        assert_eq!(result.chunks_failed, 1);
        assert!(result.skills.contains("Kafka"));
        assert!(result.skills.contains("Flink"));
    }

    #[tokio::test]
    async fn test_empty_document_lands_in_zero_bucket() {
        let report = pipeline(64).run(vec![Document::new("3", "")]).await;

        assert_eq!(report.documents_processed, 1);
        assert_eq!(report.chunks_total, 0);
        assert_eq!(report.index.get(0), Some(&[][..]));
    }
}
