//! LLM-based tag inference for record content.
//!
//! The pipeline is split into small pure steps so each can be tested without
//! a provider:
//!
//! 1. [`build_prompt`] renders rules, the fixed [`TAXONOMY`], the existing
//!    vocabulary and the record content into one prompt string
//! 2. the provider call turns the prompt into raw text ([`crate::llm`])
//! 3. [`parse_tags`] pulls the `{"tags": [...]}` object out of the reply
//! 4. [`TagNormalizer`] converts tags to PascalCase, applies registered
//!    spellings and removes case-insensitive duplicates
//!
//! [`AutoTagger`] composes these steps behind the [`Tagger`] trait.
//!
//! # Examples
//!
//! ```
//! use notion_tagger::autotagger::{TagNormalizer, Vocabulary, parse_tags};
//!
//! let raw = parse_tags("```json\n{\"tags\": [\"postgresql\", \"rust\", \"Rust\"]}\n```").unwrap();
//! let vocabulary = Vocabulary::from_tags(["PostgreSql"]);
//!
//! assert_eq!(TagNormalizer::normalize_tags(raw, &vocabulary), vec!["PostgreSql", "Rust"]);
//! ```

mod normalizer;
mod parser;
mod prompt;
mod tagger;
mod taxonomy;

pub use normalizer::{TagNormalizer, Vocabulary};
pub use parser::parse_tags;
pub use prompt::build_prompt;
pub use tagger::{AutoTagger, Tagger, TaggerError};
pub use taxonomy::{CATCH_ALL, Category, TAXONOMY};
