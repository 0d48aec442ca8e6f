//! Record-store access.
//!
//! The pipeline depends only on the [`RecordStore`] trait; [`NotionClient`] is
//! the production implementation backed by the Notion REST API.
mod client;
mod parse;

use thiserror::Error;
use time::OffsetDateTime;

use crate::models::{Block, Record, RecordId};

pub use client::{NotionClient, NotionClientBuilder};

/// Errors that can occur when reading from or writing to the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network-related errors (connection failures, timeouts, bad payloads)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// HTTP errors with status code and the start of the response body
    #[error("HTTP error: status {status}: {message}")]
    Http { status: u16, message: String },

    /// Response with an unexpected shape
    #[error("Record store API error: {message}")]
    Api { message: String },

    /// A timestamp could not be rendered for the request
    #[error("Timestamp formatting error: {0}")]
    Timestamp(#[source] time::error::Format),

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Operations the tagging pipeline needs from the record store.
///
/// Listing operations paginate internally and return complete lists.
pub trait RecordStore {
    /// Lists every record in the database.
    fn list_all_records(&self) -> Result<Vec<Record>, StoreError>;

    /// Lists records whose last edit is after `cutoff`.
    fn list_records_edited_since(&self, cutoff: OffsetDateTime) -> Result<Vec<Record>, StoreError>;

    /// Returns the option names currently registered on the tag property.
    fn list_existing_tag_options(&self, tag_property: &str) -> Result<Vec<String>, StoreError>;

    /// Returns the record's top-level body blocks.
    fn list_body_blocks(&self, record_id: &RecordId) -> Result<Vec<Block>, StoreError>;

    /// Replaces the record's tags and stamps the tagged-at property.
    fn write_tags(
        &self,
        record_id: &RecordId,
        tag_property: &str,
        tags: &[String],
        tagged_at_property: &str,
        tagged_at: OffsetDateTime,
    ) -> Result<(), StoreError>;
}
