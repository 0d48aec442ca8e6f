//! Plain-text extraction from record properties and body blocks.
//!
//! Both functions are pure: they never touch the record store and never
//! mutate the record they read.

use crate::models::{Block, BlockKind, Content, PropertyValue, Record};

/// Extracts the requested fields of a record as plain text.
///
/// # Mapping
///
/// - title / rich text: concatenation of the plain-text runs
/// - URL: the URL string (empty when unset)
/// - single select: the option name (omitted when nothing is selected)
/// - multi select: option names joined with `", "`
///
/// Fields absent from the record, or of a type not listed above, are omitted
/// rather than set to an empty string.
///
/// # Examples
///
/// ```
/// use notion_tagger::extractor::extract;
/// use notion_tagger::models::{PropertyValue, RecordBuilder};
///
/// let record = RecordBuilder::new("p1")
///     .property("Name", PropertyValue::Title(vec!["Async ".into(), "Rust".into()]))
///     .build();
///
/// let content = extract(&record, &["Name".to_string(), "Missing".to_string()]);
/// assert_eq!(content.get("Name"), Some("Async Rust"));
/// assert_eq!(content.get("Missing"), None);
/// ```
pub fn extract(record: &Record, fields: &[String]) -> Content {
    let mut content = Content::new();

    for field in fields {
        let Some(value) = record.property(field) else {
            continue;
        };

        let text = match value {
            PropertyValue::Title(runs) | PropertyValue::RichText(runs) => Some(runs.concat()),
            PropertyValue::Url(url) => Some(url.clone().unwrap_or_default()),
            PropertyValue::Select(option) => option.clone(),
            PropertyValue::MultiSelect(options) => Some(options.join(", ")),
            PropertyValue::Date(_) | PropertyValue::Unsupported(_) => None,
        };

        if let Some(text) = text {
            content.insert(field.as_str(), text);
        }
    }

    content
}

/// Flattens body blocks into a single string of at most `max_chars` characters.
///
/// Supported blocks contribute their concatenated text; code blocks are
/// prefixed with `[<language>] ` when a language is set. Unsupported blocks and
/// blocks without text are skipped. Blocks are joined with `'\n'`.
///
/// When appending a block would exceed the budget, the block (including its
/// separator) is truncated to exactly fill the remaining characters and
/// iteration stops. Lengths are counted in characters, not bytes.
///
/// # Examples
///
/// ```
/// use notion_tagger::extractor::extract_body;
/// use notion_tagger::models::Block;
///
/// let blocks = vec![Block::paragraph("A".repeat(50)), Block::paragraph("B".repeat(50))];
/// let body = extract_body(&blocks, 60);
///
/// assert!(body.starts_with(&"A".repeat(50)));
/// assert_eq!(body.chars().count(), 60);
/// ```
pub fn extract_body(blocks: &[Block], max_chars: usize) -> String {
    let mut body = String::new();
    let mut used = 0usize;

    for block in blocks {
        let text = block_text(block);
        if text.is_empty() {
            continue;
        }

        let separator = usize::from(used > 0);
        let needed = separator + text.chars().count();

        if used + needed <= max_chars {
            if separator == 1 {
                body.push('\n');
            }
            body.push_str(&text);
            used += needed;
            continue;
        }

        let remaining = max_chars - used;
        if remaining > separator {
            if separator == 1 {
                body.push('\n');
            }
            body.extend(text.chars().take(remaining - separator));
        }
        break;
    }

    body
}

/// Returns the plain text of one block, or an empty string for unsupported kinds.
fn block_text(block: &Block) -> String {
    if !block.kind.is_supported() {
        return String::new();
    }

    let text = block.text.concat();
    match (&block.kind, block.language.as_deref()) {
        (BlockKind::Code, Some(language)) if !language.is_empty() && !text.is_empty() => {
            format!("[{language}] {text}")
        }
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordBuilder;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn extract_title_and_rich_text() {
        let record = RecordBuilder::new("p1")
            .property("Name", PropertyValue::Title(vec!["Test ".into(), "article".into()]))
            .property("Notes", PropertyValue::RichText(vec!["Body text".into()]))
            .build();

        let content = extract(&record, &fields(&["Name", "Notes"]));

        assert_eq!(content.get("Name"), Some("Test article"));
        assert_eq!(content.get("Notes"), Some("Body text"));
    }

    #[test]
    fn extract_missing_property_is_omitted() {
        let record = RecordBuilder::new("p1").build();
        let content = extract(&record, &fields(&["Name"]));

        assert_eq!(content.len(), 0);
    }

    #[test]
    fn extract_url_property() {
        let record = RecordBuilder::new("p1")
            .property("URL", PropertyValue::Url(Some("https://example.com".into())))
            .build();

        let content = extract(&record, &fields(&["URL"]));
        assert_eq!(content.get("URL"), Some("https://example.com"));
    }

    #[test]
    fn extract_select_and_multi_select() {
        let record = RecordBuilder::new("p1")
            .property("Category", PropertyValue::Select(Some("Tech".into())))
            .property("Empty", PropertyValue::Select(None))
            .property(
                "Labels",
                PropertyValue::MultiSelect(vec!["Rust".into(), "Cli".into()]),
            )
            .build();

        let content = extract(&record, &fields(&["Category", "Empty", "Labels"]));

        assert_eq!(content.get("Category"), Some("Tech"));
        assert_eq!(content.get("Empty"), None);
        assert_eq!(content.get("Labels"), Some("Rust, Cli"));
    }

    #[test]
    fn extract_unrecognized_type_is_omitted() {
        let record = RecordBuilder::new("p1")
            .property("Created", PropertyValue::Unsupported("created_time".into()))
            .property("Tagged At", PropertyValue::Date(Some("2025-01-01".into())))
            .build();

        let content = extract(&record, &fields(&["Created", "Tagged At"]));
        assert_eq!(content.len(), 0);
    }

    #[test]
    fn extract_ignores_fields_not_requested() {
        let record = RecordBuilder::new("p1")
            .property("Name", PropertyValue::Title(vec!["x".into()]))
            .property("Other", PropertyValue::RichText(vec!["y".into()]))
            .build();

        let content = extract(&record, &fields(&["Name"]));
        assert_eq!(content.get("Other"), None);
    }

    #[test]
    fn body_of_no_blocks_is_empty() {
        assert_eq!(extract_body(&[], 100), "");
    }

    #[test]
    fn body_of_unsupported_blocks_is_empty() {
        let blocks = vec![Block::unsupported("image"), Block::unsupported("divider")];
        assert_eq!(extract_body(&blocks, 100), "");
    }

    #[test]
    fn body_joins_blocks_with_newline() {
        let blocks = vec![
            Block::new(BlockKind::Heading1, vec!["Intro".into()]),
            Block::unsupported("divider"),
            Block::new(BlockKind::BulletedListItem, vec!["first ".into(), "point".into()]),
        ];

        assert_eq!(extract_body(&blocks, 100), "Intro\nfirst point");
    }

    #[test]
    fn body_prefixes_code_language() {
        let blocks = vec![
            Block::code("fn main() {}", Some("rust")),
            Block::code("ls -la", None),
        ];

        assert_eq!(extract_body(&blocks, 100), "[rust] fn main() {}\nls -la");
    }

    #[test]
    fn body_truncates_block_that_overflows_budget() {
        let blocks = vec![
            Block::paragraph("A".repeat(50)),
            Block::paragraph("B".repeat(50)),
            Block::paragraph("C".repeat(5)),
        ];

        let body = extract_body(&blocks, 60);

        assert!(body.starts_with(&"A".repeat(50)));
        assert_eq!(body.chars().count(), 60);
        assert_eq!(body, format!("{}\n{}", "A".repeat(50), "B".repeat(9)));
    }

    #[test]
    fn body_truncates_first_block_to_budget() {
        let blocks = vec![Block::paragraph("abcdefghij")];
        assert_eq!(extract_body(&blocks, 4), "abcd");
    }

    #[test]
    fn body_stops_when_only_separator_fits() {
        let blocks = vec![Block::paragraph("12345"), Block::paragraph("67890")];
        assert_eq!(extract_body(&blocks, 6), "12345");
    }

    #[test]
    fn body_counts_characters_not_bytes() {
        let blocks = vec![Block::paragraph("日本語のテキスト")];
        let body = extract_body(&blocks, 3);

        assert_eq!(body, "日本語");
    }

    #[test]
    fn body_with_zero_budget_is_empty() {
        let blocks = vec![Block::paragraph("text")];
        assert_eq!(extract_body(&blocks, 0), "");
    }
}
