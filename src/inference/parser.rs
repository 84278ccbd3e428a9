use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::Entity;

#[derive(Debug, Deserialize)]
struct RawEntity {
    entity_group: Option<String>,
    entity: Option<String>,
    word: String,
    score: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub error: Value,
    pub estimated_time: Option<f64>,
}

impl ApiError {
    pub fn message(&self) -> String {
        match &self.error {
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        }
    }

    pub fn into_error(self) -> Error {
        match self.estimated_time {
            Some(wait) => Error::ModelUnavailable(wait),
            None => Error::Inference(self.message()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EntityPayload {
    Flat(Vec<RawEntity>),
    Batched(Vec<Vec<RawEntity>>),
    Failed(ApiError),
}

#[derive(Debug, Deserialize)]
struct RawSummary {
    summary_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SummaryPayload {
    List(Vec<RawSummary>),
    Single(RawSummary),
    Failed(ApiError),
}

pub fn parse_api_error(body: &str) -> Option<ApiError> {
    serde_json::from_str(body).ok()
}

pub fn parse_entities(body: &str) -> Result<Vec<Entity>> {
    let payload: EntityPayload = serde_json::from_str(body)
        .map_err(|e| Error::ParseError(format!("Unexpected entity response: {}", e)))?;

    let raw = match payload {
        EntityPayload::Flat(entities) => entities,
        EntityPayload::Batched(batches) => batches.into_iter().flatten().collect(),
        EntityPayload::Failed(err) => return Err(err.into_error()),
    };

    raw.into_iter()
        .map(|e| {
            let label = e
                .entity_group
                .or(e.entity)
                .ok_or_else(|| Error::ParseError(format!("Entity '{}' has no label", e.word)))?;
            Ok(Entity {
                label,
                text: e.word,
                score: e.score,
            })
        })
        .collect()
}

pub fn parse_summary(body: &str) -> Result<String> {
    let payload: SummaryPayload = serde_json::from_str(body)
        .map_err(|e| Error::ParseError(format!("Unexpected summary response: {}", e)))?;

    match payload {
        SummaryPayload::List(summaries) => summaries
            .into_iter()
            .next()
            .map(|s| s.summary_text)
            .ok_or_else(|| Error::ParseError("Empty summary list".to_string())),
        SummaryPayload::Single(summary) => Ok(summary.summary_text),
        SummaryPayload::Failed(err) => Err(err.into_error()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grouped_entities() {
        let body = r#"[
            {"entity_group": "MISC", "score": 0.98, "word": "Python", "start": 10, "end": 16},
            {"entity_group": "ORG", "score": 0.91, "word": "Acme Corp", "start": 30, "end": 39}
        ]"#;
        let entities = parse_entities(body).unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].label, "MISC");
        assert_eq!(entities[1].text, "Acme Corp");
        assert_eq!(entities[0].score, Some(0.98));
    }

    #[test]
    fn test_parse_ungrouped_and_batched_entities() {
        let body = r#"[[{"entity": "B-MISC", "word": "Spark", "index": 3}]]"#;
        let entities = parse_entities(body).unwrap();
        assert_eq!(entities, vec![Entity::new("B-MISC", "Spark")]);
    }

    #[test]
    fn test_parse_empty_entity_list() {
        assert!(parse_entities("[]").unwrap().is_empty());
    }

    #[test]
    fn test_loading_model_maps_to_unavailable() {
        let body = r#"{"error": "Model dslim/bert-base-NER is currently loading", "estimated_time": 20.0}"#;
        let err = parse_entities(body).unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable(t) if t == 20.0));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_malformed_entity_response() {
        assert!(matches!(parse_entities("<html>"), Err(Error::ParseError(_))));
        assert!(matches!(
            parse_entities(r#"[{"word": "orphan"}]"#),
            Err(Error::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_summary_shapes() {
        assert_eq!(
            parse_summary(r#"[{"summary_text": "Needs SQL."}]"#).unwrap(),
            "Needs SQL."
        );
        assert_eq!(parse_summary(r#"{"summary_text": "Go."}"#).unwrap(), "Go.");
        assert!(parse_summary("[]").is_err());
        assert!(matches!(
            parse_summary(r#"{"error": ["input too long"]}"#),
            Err(Error::Inference(msg)) if msg == "input too long"
        ));
    }
}
