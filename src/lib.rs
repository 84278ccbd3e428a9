pub mod config;
pub mod error;
pub mod models;
pub mod search;
pub mod inference;
pub mod analysis;
pub mod corpus;
pub mod report;
pub mod storage;

pub use config::{Config, PipelineConfig};
pub use error::{Error, Result};
pub use search::SerpApiClient;
pub use inference::{EntityRecognizer, HuggingFaceClient, Summarizer};
pub use analysis::{ExtractionPipeline, RunReport};
pub use storage::Storage;
