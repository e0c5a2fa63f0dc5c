//! Grounding metadata normalization.
//!
//! Search and maps tools attach citation chunks to a candidate's
//! `groundingMetadata`. These helpers deep-copy each chunk into a plain JSON
//! record: every provider field is kept, nulls and empty strings, arrays and
//! objects are pruned, and a missing list degrades to an empty one.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One citation record, e.g. `{"web": {...}}`, `{"maps": {...}}` or
/// `{"retrievedContext": {...}}`. Always a non-empty JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroundingChunk(Value);

impl GroundingChunk {
    /// Deep-copy a raw chunk. Returns `None` for non-objects and for chunks
    /// that carry no data once pruned.
    pub fn from_value(raw: &Value) -> Option<Self> {
        if !raw.is_object() {
            return None;
        }
        prune(raw.clone()).map(GroundingChunk)
    }

    /// Source kind of the chunk (`web`, `maps`, `retrievedContext`, ...).
    pub fn kind(&self) -> Option<&str> {
        self.0.as_object()?.keys().next().map(String::as_str)
    }

    /// Look up a nested field by JSON pointer, e.g. `/maps/placeId`.
    pub fn get(&self, pointer: &str) -> Option<&Value> {
        self.0.pointer(pointer)
    }

    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.get(pointer).and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

fn prune(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(items) => {
            let items: Vec<Value> = items.into_iter().filter_map(prune).collect();
            (!items.is_empty()).then_some(Value::Array(items))
        }
        Value::Object(fields) => {
            let fields: Map<String, Value> = fields
                .into_iter()
                .filter_map(|(key, value)| prune(value).map(|value| (key, value)))
                .collect();
            (!fields.is_empty()).then_some(Value::Object(fields))
        }
        other => Some(other),
    }
}

/// Pull `groundingChunks` out of a candidate's `groundingMetadata` value.
pub fn extract(metadata: Option<&Value>) -> Vec<GroundingChunk> {
    match metadata
        .and_then(|m| m.get("groundingChunks"))
        .and_then(Value::as_array)
    {
        Some(chunks) => normalize(chunks),
        None => Vec::new(),
    }
}

/// Normalize raw chunk values. Non-object and empty chunks are skipped.
pub fn normalize(chunks: &[Value]) -> Vec<GroundingChunk> {
    chunks
        .iter()
        .filter_map(|raw| {
            let chunk = GroundingChunk::from_value(raw);
            if chunk.is_none() && !raw.is_object() {
                tracing::warn!("Skipping malformed grounding chunk: {}", raw);
            }
            chunk
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn provider_metadata() -> Value {
        json!({
            "webSearchQueries": ["weather lisbon"],
            "groundingChunks": [
                {
                    "web": {
                        "uri": "https://example.com/a",
                        "title": "Example A",
                        "domain": "example.com"
                    }
                },
                {
                    "maps": {
                        "uri": "https://maps.google.com/?cid=1",
                        "title": "Cafe",
                        "placeId": "places/abc",
                        "placeAnswerSources": {
                            "reviewSnippets": [
                                {
                                    "review": "Great pastries",
                                    "authorAttribution": { "displayName": "Ana" }
                                }
                            ]
                        }
                    }
                },
                { "web": {} },
                { "retrievedContext": { "text": "Opening hours 9-17", "title": "" } },
                { "image": { "uri": "https://img.example/1.png", "extra": null } },
                "not-an-object"
            ],
            "groundingSupports": []
        })
    }

    #[test]
    fn test_extract_copies_provider_fields() {
        let chunks = extract(Some(&provider_metadata()));

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].get_str("/web/domain"), Some("example.com"));
        assert_eq!(chunks[1].get_str("/maps/placeId"), Some("places/abc"));
        assert_eq!(
            chunks[1].get_str("/maps/placeAnswerSources/reviewSnippets/0/review"),
            Some("Great pastries")
        );
        assert_eq!(
            chunks[2].as_value(),
            &json!({ "retrievedContext": { "text": "Opening hours 9-17" } })
        );
        assert_eq!(chunks[3].kind(), Some("image"));
        assert_eq!(
            chunks[3].as_value(),
            &json!({ "image": { "uri": "https://img.example/1.png" } })
        );
    }

    #[test]
    fn test_empty_sources_are_dropped() {
        let chunks = normalize(&[
            json!({ "web": { "title": "" } }),
            json!({ "maps": { "reviews": [], "uri": null } }),
            json!({}),
        ]);
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_missing_metadata_yields_empty_list() {
        assert!(extract(None).is_empty());
        assert!(extract(Some(&json!({ "webSearchQueries": [] }))).is_empty());
        assert!(extract(Some(&json!({ "groundingChunks": null }))).is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = extract(Some(&provider_metadata()));
        let as_values = match serde_json::to_value(&once).unwrap() {
            Value::Array(values) => values,
            other => panic!("expected array, got {}", other),
        };
        let twice = normalize(&as_values);

        assert_eq!(once, twice);
    }
}
