//! Extraction of the tag list from free-form model output.

use super::tagger::TaggerError;

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

/// Parses a `{"tags": [...]}` object out of a model response.
///
/// An enclosing code fence is stripped first: a fence tagged `json` wins,
/// otherwise the first fenced section is used, otherwise the whole text.
/// A valid JSON object without a `tags` key yields an empty list.
///
/// # Errors
///
/// Returns `TaggerError::MalformedResponse` if the extracted span is not a JSON
/// object or `tags` is not an array.
///
/// # Examples
///
/// ```
/// use notion_tagger::autotagger::parse_tags;
///
/// let tags = parse_tags("```json\n{\"tags\": [\"Rust\", \"Tokio\"]}\n```").unwrap();
/// assert_eq!(tags, vec!["Rust", "Tokio"]);
/// ```
pub fn parse_tags(raw: &str) -> Result<Vec<String>, TaggerError> {
    let span = strip_fence(raw).trim();

    let value: serde_json::Value =
        serde_json::from_str(span).map_err(|e| TaggerError::MalformedResponse {
            message: format!("invalid JSON: {e}"),
        })?;

    let Some(object) = value.as_object() else {
        return Err(TaggerError::MalformedResponse {
            message: "expected a JSON object".to_string(),
        });
    };

    let Some(tags) = object.get("tags") else {
        return Ok(Vec::new());
    };

    let Some(tags) = tags.as_array() else {
        return Err(TaggerError::MalformedResponse {
            message: "\"tags\" is not an array".to_string(),
        });
    };

    // Non-string entries are dropped rather than failing the whole answer
    Ok(tags
        .iter()
        .filter_map(|tag| tag.as_str().map(str::to_string))
        .collect())
}

/// Returns the contents of the relevant code fence, or `text` unchanged.
fn strip_fence(text: &str) -> &str {
    if let Some((_, rest)) = text.split_once(JSON_FENCE) {
        return rest.split_once(FENCE).map_or(rest, |(inner, _)| inner);
    }
    if let Some((_, rest)) = text.split_once(FENCE) {
        return rest.split_once(FENCE).map_or(rest, |(inner, _)| inner);
    }
    text
}
