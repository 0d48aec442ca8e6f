//! Notion REST client implementing [`RecordStore`].
//!
//! All list operations paginate with Notion's cursor protocol and return the
//! fully materialized result.
use std::time::Duration;

use serde_json::{Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, warn};

use crate::models::{Block, Record, RecordId};

use super::parse::{block_from_json, multi_select_options, record_from_page, results_page};
use super::{RecordStore, StoreError};

pub const DEFAULT_NOTION_URL: &str = "https://api.notion.com";
const NOTION_VERSION: &str = "2022-06-28";
const PAGE_SIZE: u32 = 100;

/// Builder for constructing `NotionClient` instances.
///
/// # Examples
///
/// ```
/// use notion_tagger::notion::NotionClientBuilder;
///
/// let client = NotionClientBuilder::new("secret", "database-id")
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.database_id(), "database-id");
/// ```
#[derive(Debug)]
pub struct NotionClientBuilder {
    api_key: String,
    database_id: String,
    base_url: Option<String>,
}

impl NotionClientBuilder {
    pub fn new(api_key: impl Into<String>, database_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            database_id: database_id.into(),
            base_url: None,
        }
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the `NotionClient`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidUrl` for an unparseable base URL, or
    /// `StoreError::Network` if the HTTP client cannot be created.
    pub fn build(self) -> Result<NotionClient, StoreError> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_NOTION_URL.to_string());
        reqwest::Url::parse(&base_url)
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(StoreError::Network)?;

        Ok(NotionClient {
            client,
            api_key: self.api_key,
            database_id: self.database_id,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Synchronous client for one Notion database.
pub struct NotionClient {
    client: reqwest::blocking::Client,
    api_key: String,
    database_id: String,
    base_url: String,
}

impl NotionClient {
    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn send(&self, request: reqwest::blocking::RequestBuilder) -> Result<Value, StoreError> {
        let response = request
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .map_err(StoreError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StoreError::Http {
                status: status.as_u16(),
                message: body.chars().take(300).collect(),
            });
        }

        response.json().map_err(StoreError::Network)
    }

    fn query_database(&self, filter: Option<Value>) -> Result<Vec<Record>, StoreError> {
        let url = format!("{}/v1/databases/{}/query", self.base_url, self.database_id);

        let pages = collect_pages(|cursor| {
            let mut body = json!({ "page_size": PAGE_SIZE });
            if let Some(filter) = &filter {
                body["filter"] = filter.clone();
            }
            if let Some(cursor) = cursor {
                body["start_cursor"] = json!(cursor);
            }
            let response = self.send(self.client.post(&url).json(&body))?;
            results_page(&response)
        })?;

        Ok(pages
            .iter()
            .filter_map(|page| {
                let record = record_from_page(page);
                if record.is_none() {
                    warn!("Skipping page object without id");
                }
                record
            })
            .collect())
    }
}

impl RecordStore for NotionClient {
    fn list_all_records(&self) -> Result<Vec<Record>, StoreError> {
        self.query_database(None)
    }

    fn list_records_edited_since(&self, cutoff: OffsetDateTime) -> Result<Vec<Record>, StoreError> {
        let cutoff = cutoff.format(&Rfc3339).map_err(StoreError::Timestamp)?;
        debug!(%cutoff, "Querying records edited since cutoff");

        self.query_database(Some(json!({
            "timestamp": "last_edited_time",
            "last_edited_time": { "after": cutoff }
        })))
    }

    fn list_existing_tag_options(&self, tag_property: &str) -> Result<Vec<String>, StoreError> {
        let url = format!("{}/v1/databases/{}", self.base_url, self.database_id);
        let database = self.send(self.client.get(&url))?;
        Ok(multi_select_options(&database, tag_property))
    }

    fn list_body_blocks(&self, record_id: &RecordId) -> Result<Vec<Block>, StoreError> {
        let url = format!("{}/v1/blocks/{}/children", self.base_url, record_id);

        let blocks = collect_pages(|cursor| {
            let mut query = vec![("page_size", PAGE_SIZE.to_string())];
            if let Some(cursor) = cursor {
                query.push(("start_cursor", cursor.to_string()));
            }
            let response = self.send(self.client.get(&url).query(&query))?;
            results_page(&response)
        })?;

        Ok(blocks.iter().map(block_from_json).collect())
    }

    fn write_tags(
        &self,
        record_id: &RecordId,
        tag_property: &str,
        tags: &[String],
        tagged_at_property: &str,
        tagged_at: OffsetDateTime,
    ) -> Result<(), StoreError> {
        let url = format!("{}/v1/pages/{}", self.base_url, record_id);
        let tagged_at = tagged_at.format(&Rfc3339).map_err(StoreError::Timestamp)?;
        let body = json!({
            "properties": {
                tag_property: {
                    "multi_select": tags.iter().map(|tag| json!({ "name": tag })).collect::<Vec<_>>()
                },
                tagged_at_property: {
                    "date": { "start": tagged_at }
                }
            }
        });

        self.send(self.client.patch(&url).json(&body))?;
        Ok(())
    }
}

/// Accumulates results across cursor pages until the store reports no more.
///
/// `fetch` receives the cursor of the page to load (`None` for the first one)
/// and returns that page's results with the next cursor, if any.
pub(crate) fn collect_pages<T, F>(mut fetch: F) -> Result<Vec<T>, StoreError>
where
    F: FnMut(Option<&str>) -> Result<(Vec<T>, Option<String>), StoreError>,
{
    let mut results = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let (items, next) = fetch(cursor.as_deref())?;
        results.extend(items);
        match next {
            Some(next) => cursor = Some(next),
            None => return Ok(results),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_pages_follows_cursors_until_exhausted() {
        let mut seen_cursors = Vec::new();

        let all = collect_pages(|cursor| {
            seen_cursors.push(cursor.map(str::to_string));
            Ok(match cursor {
                None => (vec![1, 2], Some("c1".to_string())),
                Some("c1") => (vec![3], Some("c2".to_string())),
                _ => (vec![4, 5], None),
            })
        })
        .unwrap();

        assert_eq!(all, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            seen_cursors,
            vec![None, Some("c1".to_string()), Some("c2".to_string())]
        );
    }

    #[test]
    fn collect_pages_stops_on_first_error() {
        let mut calls = 0;
        let result: Result<Vec<u8>, StoreError> = collect_pages(|_| {
            calls += 1;
            Err(StoreError::Http {
                status: 502,
                message: String::new(),
            })
        });

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn build_uses_default_url() {
        let client = NotionClientBuilder::new("key", "db").build().unwrap();
        assert_eq!(client.base_url(), DEFAULT_NOTION_URL);
    }

    #[test]
    fn build_trims_trailing_slash() {
        let client = NotionClientBuilder::new("key", "db")
            .base_url("http://localhost:9000/")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000");
    }

    #[test]
    fn build_returns_error_if_invalid_url_provided() {
        let result = NotionClientBuilder::new("key", "db")
            .base_url("not-a-valid-url")
            .build();
        assert!(matches!(result, Err(StoreError::InvalidUrl(_))));
    }
}
