//! Ollama wire types and the decoders for the bodies we buffer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct GenerationRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
}

/// One line of a `/api/generate` NDJSON reply.
#[derive(Debug, Deserialize)]
pub struct StreamFragment {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct ModelDetails {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    pub models: Vec<ModelDetails>,
}

/// Concatenate the `response` field of every line in a newline-delimited reply.
///
/// Empty lines are ignored. A line that does not parse is logged and skipped so
/// text accumulated from earlier and later lines survives.
pub fn decode_streaming_reply(body: &str) -> String {
    let mut text = String::new();
    for line in body.split('\n').filter(|line| !line.is_empty()) {
        match serde_json::from_str::<StreamFragment>(line) {
            Ok(fragment) => text.push_str(&fragment.response),
            Err(e) => log::debug!("skipping malformed stream line: {} ({})", line, e),
        }
    }
    text
}

/// Model names from a `/api/tags` body, in server order.
pub fn parse_model_catalog(body: &str) -> Result<Vec<String>, serde_json::Error> {
    let tags: TagsResponse = serde_json::from_str(body)?;
    Ok(tags.models.into_iter().map(|m| m.name).collect())
}
