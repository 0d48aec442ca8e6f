use std::collections::{HashMap, HashSet};

/// Snapshot of the tag spellings already registered in the record store.
///
/// Read once per run and never mutated. Lookups are case-insensitive; when
/// two registered spellings differ only by case, the first one wins.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    tags: Vec<String>,
    by_lowercase: HashMap<String, usize>,
}

impl Vocabulary {
    /// Builds a vocabulary from registered tag names, in store order.
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        let mut by_lowercase = HashMap::new();
        for (index, tag) in tags.iter().enumerate() {
            by_lowercase.entry(tag.to_lowercase()).or_insert(index);
        }
        Self { tags, by_lowercase }
    }

    /// Returns the registered spelling matching `tag` case-insensitively.
    pub fn canonical(&self, tag: &str) -> Option<&str> {
        self.by_lowercase
            .get(&tag.to_lowercase())
            .map(|&index| self.tags[index].as_str())
    }

    /// Registered tags, verbatim and in store order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Post-processing layer for tag normalization.
///
/// Ensures consistent PascalCase tags regardless of LLM output quality and
/// reconciles them against the existing vocabulary.
pub struct TagNormalizer;

impl TagNormalizer {
    /// Normalizes a single tag to PascalCase.
    ///
    /// # Normalization rules
    ///
    /// - A tag already matching `^[A-Z][A-Za-z0-9]*$` is returned unchanged
    /// - Otherwise the tag is split on whitespace, `-`, `_` and `.`
    /// - `+` and `#` inside a segment are spelled out as `Plus` and `Sharp`
    /// - Remaining non-alphanumeric ASCII characters are dropped
    /// - Each segment gets an uppercase first letter; the rest keeps its casing
    ///
    /// # Examples
    ///
    /// ```
    /// use notion_tagger::autotagger::TagNormalizer;
    ///
    /// assert_eq!(TagNormalizer::normalize_tag("GitHubActions"), "GitHubActions");
    /// assert_eq!(TagNormalizer::normalize_tag("machine learning"), "MachineLearning");
    /// assert_eq!(TagNormalizer::normalize_tag("node.js"), "NodeJs");
    /// assert_eq!(TagNormalizer::normalize_tag("ci_cd-pipeline"), "CiCdPipeline");
    /// assert_eq!(TagNormalizer::normalize_tag("C#"), "CSharp");
    /// assert_eq!(TagNormalizer::normalize_tag("   "), "");
    /// ```
    #[must_use]
    pub fn normalize_tag(tag: &str) -> String {
        let trimmed = tag.trim();
        if is_pascal_case(trimmed) {
            return trimmed.to_string();
        }

        trimmed
            .split(|c: char| c.is_whitespace() || matches!(c, '-' | '_' | '.'))
            .map(|segment| {
                segment
                    .replace('+', "Plus")
                    .replace('#', "Sharp")
                    .chars()
                    .filter(char::is_ascii_alphanumeric)
                    .collect::<String>()
            })
            .filter(|segment| !segment.is_empty())
            .map(|segment| capitalize(&segment))
            .collect()
    }

    /// Normalizes a list of tags against the existing vocabulary.
    ///
    /// # Normalization rules
    ///
    /// - A tag whose lowercase form is registered takes the registered spelling,
    ///   checked both before and after PascalCase conversion; registered
    ///   spellings that are not PascalCase (such as `Node.js`) are ignored
    /// - Other tags are converted with `normalize_tag`; results that still do
    ///   not match `^[A-Z][A-Za-z0-9]*$` (empty, leading digit) are dropped
    /// - Deduplicates case-insensitively, keeping the first occurrence
    /// - Preserves order of first occurrence
    ///
    /// # Examples
    ///
    /// ```
    /// use notion_tagger::autotagger::{TagNormalizer, Vocabulary};
    ///
    /// let tags = vec!["python".to_string(), "PYTHON".to_string(), "Python".to_string()];
    /// assert_eq!(TagNormalizer::normalize_tags(tags, &Vocabulary::default()), vec!["Python"]);
    ///
    /// let vocabulary = Vocabulary::from_tags(["PostgreSql"]);
    /// let tags = vec!["postgresql".to_string()];
    /// assert_eq!(TagNormalizer::normalize_tags(tags, &vocabulary), vec!["PostgreSql"]);
    /// ```
    #[must_use]
    pub fn normalize_tags(tags: Vec<String>, vocabulary: &Vocabulary) -> Vec<String> {
        let mut seen = HashSet::new();
        tags.into_iter()
            .filter_map(|tag| Self::canonicalize(&tag, vocabulary))
            .filter(|tag| seen.insert(tag.to_lowercase()))
            .collect()
    }

    fn canonicalize(tag: &str, vocabulary: &Vocabulary) -> Option<String> {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Some(registered) = Self::registered(trimmed, vocabulary) {
            return Some(registered);
        }

        let cased = Self::normalize_tag(trimmed);
        if let Some(registered) = Self::registered(&cased, vocabulary) {
            return Some(registered);
        }

        is_pascal_case(&cased).then_some(cased)
    }

    /// Registered spelling of `tag`, if that spelling is itself PascalCase.
    fn registered(tag: &str, vocabulary: &Vocabulary) -> Option<String> {
        vocabulary
            .canonical(tag)
            .filter(|registered| is_pascal_case(registered))
            .map(str::to_string)
    }
}

/// Checks `^[A-Z][A-Za-z0-9]*$`.
pub(crate) fn is_pascal_case(tag: &str) -> bool {
    let mut chars = tag.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
