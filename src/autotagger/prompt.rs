//! Prompt construction for tag inference.
//!
//! The prompt is a pure function of its inputs: no clock, no randomness.

use std::fmt::Write;

use crate::models::Content;

use super::normalizer::Vocabulary;
use super::taxonomy::{CATCH_ALL, TAXONOMY};

const RULES: &str = r#"You are tagging entries in an engineering knowledge base.

RULES:
1. Emit between 1 and {max_tags} tags (inclusive). At least one tag is mandatory.
2. Every tag must be an English word or phrase written in PascalCase (e.g. "GitHubActions", "PostgreSql").
3. Choose tags that belong to the categories below.
4. If nothing fits, use a concrete topic label under the "{catch_all}" category. Never emit "{catch_all}" itself as a tag."#;

const RESPONSE_FORMAT: &str = r#"Respond with a single JSON object and nothing else:
{"tags": ["Tag1", "Tag2"]}"#;

/// Renders the tagging prompt for one record.
///
/// The existing-tags block lists `vocabulary` verbatim and is omitted entirely
/// when the vocabulary is empty.
///
/// # Examples
///
/// ```
/// use notion_tagger::autotagger::{build_prompt, Vocabulary};
/// use notion_tagger::models::Content;
///
/// let content: Content = [("Name", "Tokio runtime internals")].into_iter().collect();
/// let prompt = build_prompt(&content, 3, &Vocabulary::default());
///
/// assert!(prompt.contains("between 1 and 3 tags"));
/// assert!(prompt.contains("Tokio runtime internals"));
/// ```
#[must_use]
pub fn build_prompt(content: &Content, max_tags: usize, vocabulary: &Vocabulary) -> String {
    let mut prompt = RULES
        .replace("{max_tags}", &max_tags.to_string())
        .replace("{catch_all}", CATCH_ALL);

    prompt.push_str("\n\nCATEGORIES:\n");
    for category in TAXONOMY {
        // Writing to a String cannot fail.
        let _ = writeln!(
            prompt,
            "- {}: {} (e.g. {})",
            category.name,
            category.description,
            category.examples.join(", ")
        );
    }

    if !vocabulary.is_empty() {
        prompt.push_str("\nEXISTING TAGS (prefer these when they fit):\n");
        prompt.push_str(&vocabulary.tags().join(", "));
        prompt.push('\n');
    }

    prompt.push_str("\nCONTENT:\n");
    prompt.push_str(&content.to_json_pretty());
    prompt.push_str("\n\n");
    prompt.push_str(RESPONSE_FORMAT);

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> Content {
        [("Name", "Test article"), ("Notes", "Python basics")]
            .into_iter()
            .collect()
    }

    #[test]
    fn prompt_includes_limit_and_content() {
        let prompt = build_prompt(&content(), 3, &Vocabulary::default());

        assert!(prompt.contains("between 1 and 3 tags"));
        assert!(prompt.contains("Test article"));
        assert!(prompt.contains("Python basics"));
        assert!(prompt.contains(r#"{"tags": ["#));
    }

    #[test]
    fn prompt_lists_taxonomy_in_order() {
        let prompt = build_prompt(&content(), 5, &Vocabulary::default());

        let positions: Vec<usize> = TAXONOMY
            .iter()
            .map(|c| prompt.find(&format!("- {}:", c.name)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(prompt.contains("GitHubActions"));
    }

    #[test]
    fn prompt_omits_existing_tags_block_when_vocabulary_empty() {
        let prompt = build_prompt(&content(), 5, &Vocabulary::default());
        assert!(!prompt.contains("EXISTING TAGS"));
    }

    #[test]
    fn prompt_lists_existing_tags_verbatim() {
        let vocabulary = Vocabulary::from_tags(["Python", "JavaScript", "PostgreSql"]);
        let prompt = build_prompt(&content(), 5, &vocabulary);

        assert!(prompt.contains("EXISTING TAGS"));
        assert!(prompt.contains("Python, JavaScript, PostgreSql"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let vocabulary = Vocabulary::from_tags(["Rust"]);
        assert_eq!(
            build_prompt(&content(), 4, &vocabulary),
            build_prompt(&content(), 4, &vocabulary)
        );
    }
}
