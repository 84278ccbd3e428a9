use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::{Document, JobPosting};

#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusFile {
    Documents(Vec<Document>),
    Postings(Vec<Value>),
    SearchResults { jobs_results: Vec<Value> },
}

/// Reads documents from a JSON file holding either `[{"id", "text"}]`, raw
/// job postings, or a saved search response with `jobs_results`.
pub async fn load_documents_from_file(path: &Path) -> Result<Vec<Document>> {
    if !path.exists() {
        return Err(Error::Config(format!("File does not exist: {}", path.display())));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let documents = parse_corpus(&content)?;
    tracing::info!("Loaded {} document(s) from {}", documents.len(), path.display());
    Ok(documents)
}

pub fn parse_corpus(content: &str) -> Result<Vec<Document>> {
    let corpus: CorpusFile = serde_json::from_str(content)
        .map_err(|e| Error::ParseError(format!("Unrecognized corpus file: {}", e)))?;

    let postings = match corpus {
        CorpusFile::Documents(documents) => return Ok(documents),
        CorpusFile::Postings(values) => values,
        CorpusFile::SearchResults { jobs_results } => jobs_results,
    };

    postings
        .into_iter()
        .map(|value| JobPosting::from_value(value).map(Document::from).map_err(Error::from))
        .collect()
}
