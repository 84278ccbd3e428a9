pub mod provider;
pub mod huggingface;
pub mod parser;
pub mod retry;

pub use provider::{EntityRecognizer, Summarizer};
pub use huggingface::HuggingFaceClient;
pub use retry::RetryPolicy;
