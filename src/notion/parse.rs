//! Mapping of Notion JSON payloads onto the crate's models.
//!
//! Parsing is lenient: unexpected shapes degrade to `Unsupported` or empty
//! values rather than failing the whole listing.

use serde_json::Value;

use crate::models::{Block, BlockKind, PropertyValue, Record, RecordBuilder};

use super::StoreError;

/// Notion's placeholder language for code blocks without one.
const PLAIN_TEXT_LANGUAGE: &str = "plain text";

/// Splits a paginated list response into its results and the next cursor.
pub(crate) fn results_page(body: &Value) -> Result<(Vec<Value>, Option<String>), StoreError> {
    let results = body
        .get("results")
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| StoreError::Api {
            message: "list response has no \"results\" array".to_string(),
        })?;

    let has_more = body.get("has_more").and_then(Value::as_bool).unwrap_or(false);
    let next_cursor = if has_more {
        body.get("next_cursor")
            .and_then(Value::as_str)
            .map(str::to_string)
    } else {
        None
    };

    Ok((results, next_cursor))
}

/// Converts a page object into a `Record`. Returns `None` without an `id`.
pub(crate) fn record_from_page(page: &Value) -> Option<Record> {
    let id = page.get("id")?.as_str()?;
    let mut builder = RecordBuilder::new(id);

    if let Some(edited) = page.get("last_edited_time").and_then(Value::as_str) {
        builder = builder.last_edited_time(edited);
    }

    if let Some(properties) = page.get("properties").and_then(Value::as_object) {
        for (name, property) in properties {
            builder = builder.property(name.as_str(), property_value(property));
        }
    }

    Some(builder.build())
}

fn property_value(property: &Value) -> PropertyValue {
    let kind = property.get("type").and_then(Value::as_str).unwrap_or_default();
    let payload = property.get(kind);

    match kind {
        "title" => PropertyValue::Title(plain_text_runs(payload)),
        "rich_text" => PropertyValue::RichText(plain_text_runs(payload)),
        "url" => PropertyValue::Url(payload.and_then(Value::as_str).map(str::to_string)),
        "select" => PropertyValue::Select(option_name(payload)),
        "multi_select" => PropertyValue::MultiSelect(
            payload
                .and_then(Value::as_array)
                .map(|options| options.iter().filter_map(|o| option_name(Some(o))).collect())
                .unwrap_or_default(),
        ),
        "date" => PropertyValue::Date(
            payload
                .and_then(|date| date.get("start"))
                .and_then(Value::as_str)
                .map(str::to_string),
        ),
        other => PropertyValue::Unsupported(other.to_string()),
    }
}

/// Converts a block object into a `Block`.
pub(crate) fn block_from_json(block: &Value) -> Block {
    let type_name = block.get("type").and_then(Value::as_str).unwrap_or_default();
    let kind = BlockKind::from_type_name(type_name);
    if !kind.is_supported() {
        return Block::new(kind, Vec::new());
    }

    let payload = block.get(type_name);
    let text = plain_text_runs(payload.and_then(|p| p.get("rich_text")));
    let language = match kind {
        BlockKind::Code => payload
            .and_then(|p| p.get("language"))
            .and_then(Value::as_str)
            .filter(|lang| !lang.is_empty() && *lang != PLAIN_TEXT_LANGUAGE)
            .map(str::to_string),
        _ => None,
    };

    Block {
        kind,
        text,
        language,
    }
}

/// Extracts the existing option names of a multi-select property from a
/// database object.
pub(crate) fn multi_select_options(database: &Value, property: &str) -> Vec<String> {
    database
        .get("properties")
        .and_then(|props| props.get(property))
        .and_then(|prop| prop.get("multi_select"))
        .and_then(|ms| ms.get("options"))
        .and_then(Value::as_array)
        .map(|options| options.iter().filter_map(|o| option_name(Some(o))).collect())
        .unwrap_or_default()
}

fn plain_text_runs(runs: Option<&Value>) -> Vec<String> {
    runs.and_then(Value::as_array)
        .map(|runs| {
            runs.iter()
                .filter_map(|run| run.get("plain_text").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn option_name(option: Option<&Value>) -> Option<String> {
    option?.get("name")?.as_str().map(str::to_string)
}
