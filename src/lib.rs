pub mod autotagger;
pub mod config;
pub mod extractor;
pub mod llm;
pub mod models;
pub mod notion;
pub mod pipeline;

pub use autotagger::{AutoTagger, Tagger, TaggerError};
pub use config::{Config, ConfigError};
pub use llm::{LlmClient, LlmError, Provider};
pub use models::{Content, Record, RecordId};
pub use notion::{NotionClient, RecordStore, StoreError};
pub use pipeline::{Pipeline, PipelineOptions, RunMode, RunSummary};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn types_accessible_from_crate_root() {
        let id = RecordId::new("page-1");
        assert_eq!(id.as_str(), "page-1");

        let content: Content = [("Name", "test")].into_iter().collect();
        assert!(!content.is_empty());

        assert_eq!(Provider::default(), Provider::Gemini);
        assert_eq!(RunSummary::default().tagged, 0);
    }
}
