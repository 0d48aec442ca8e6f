//! Sequential per-record tagging driver.

use std::thread;
use std::time::Duration;

use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

use crate::autotagger::{Tagger, TaggerError};
use crate::config::Config;
use crate::extractor::{extract, extract_body};
use crate::models::{BODY_FIELD, Content, Record};
use crate::notion::{RecordStore, StoreError};

use super::guard::already_tagged;

/// Delay around record-store body fetches (keeps under ~3 requests/second).
pub const DEFAULT_STORE_PACING: Duration = Duration::from_millis(350);

/// Fixed delays that keep the run inside both rate budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Pause after each body fetch.
    pub store: Duration,
    /// Pause after each record that reached the LLM.
    pub llm: Duration,
}

impl Pacing {
    /// No pauses at all; for tests and dry runs.
    pub const NONE: Pacing = Pacing {
        store: Duration::ZERO,
        llm: Duration::ZERO,
    };
}

/// Per-run settings of the driver.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub tag_property: String,
    pub tagged_at_property: String,
    pub content_fields: Vec<String>,
    pub fetch_body: bool,
    pub body_max_chars: usize,
    pub max_tags: usize,
    pub tagged_at_buffer: Duration,
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self {
            tag_property: config.tag_property.clone(),
            tagged_at_property: config.tagged_at_property.clone(),
            content_fields: config.content_properties.clone(),
            fetch_body: config.fetch_page_body,
            body_max_chars: config.body_max_chars,
            max_tags: config.max_tags,
            tagged_at_buffer: config.tagged_at_buffer,
        }
    }
}

/// Why a record was not sent to the tagger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Not edited since the last tagging.
    AlreadyTagged,
    /// No extracted field holds any text.
    EmptyContent,
}

/// Failure contained to a single record.
#[derive(Debug, Error)]
pub enum RecordFailure {
    #[error("tag inference failed: {0}")]
    Inference(#[source] TaggerError),

    #[error("writing tags failed: {0}")]
    WriteBack(#[source] StoreError),
}

/// Resolution of one record.
#[derive(Debug)]
pub enum RecordOutcome {
    Tagged(Vec<String>),
    Skipped(SkipReason),
    Failed(RecordFailure),
}

/// Aggregate counts of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub tagged: usize,
    /// Includes records left unprocessed by a rate-limit abort.
    pub failed: usize,
    /// Already-tagged and empty-content records combined.
    pub skipped: usize,
    /// `true` if the run stopped early because the provider throttled.
    pub aborted: bool,
}

/// Result of one inference call, classified for the retry decision.
enum Attempt {
    Tagged(Vec<String>),
    Retryable(TaggerError),
    RateLimited(TaggerError),
}

/// Drives records through guard, extraction, inference and write-back.
///
/// Processing is strictly sequential: one record is fully resolved before the
/// next starts.
pub struct Pipeline<'a> {
    store: &'a dyn RecordStore,
    tagger: &'a dyn Tagger,
    options: PipelineOptions,
    pacing: Pacing,
}

impl<'a> Pipeline<'a> {
    /// Creates a driver paced with the tagger's provider delay.
    pub fn new(store: &'a dyn RecordStore, tagger: &'a dyn Tagger, options: PipelineOptions) -> Self {
        let pacing = Pacing {
            store: DEFAULT_STORE_PACING,
            llm: tagger.pacing(),
        };
        Self {
            store,
            tagger,
            options,
            pacing,
        }
    }

    /// Overrides the pacing delays.
    #[must_use]
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Processes `records` in order and returns the aggregate counts.
    ///
    /// A rate-limit error stops the run: the throttled record and every record
    /// after it are counted as failed and no further calls are made.
    pub fn run(&self, records: &[Record]) -> RunSummary {
        let total = records.len();
        let mut summary = RunSummary::default();

        for (index, record) in records.iter().enumerate() {
            let position = index + 1;
            let record_id = record.id();

            match self.process_record(record) {
                Ok(RecordOutcome::Tagged(tags)) => {
                    info!(%record_id, tags = %tags.join(", "), "[{position}/{total}] Tagged");
                    summary.tagged += 1;
                    pause(self.pacing.llm);
                }
                Ok(RecordOutcome::Skipped(reason)) => {
                    info!(%record_id, ?reason, "[{position}/{total}] Skipped");
                    summary.skipped += 1;
                }
                Ok(RecordOutcome::Failed(failure)) => {
                    error!(%record_id, error = %failure, "[{position}/{total}] Failed");
                    summary.failed += 1;
                    pause(self.pacing.llm);
                }
                Err(rate_limit) => {
                    let remaining = total - index;
                    error!(
                        %record_id,
                        error = %rate_limit,
                        remaining,
                        "[{position}/{total}] Provider rate limit hit; aborting run"
                    );
                    summary.failed += remaining;
                    summary.aborted = true;
                    break;
                }
            }
        }

        summary
    }

    /// Resolves a single record.
    ///
    /// # Errors
    ///
    /// Returns the `TaggerError::RateLimited` that must abort the run. Every
    /// other failure is reported as `RecordOutcome::Failed`.
    pub fn process_record(&self, record: &Record) -> Result<RecordOutcome, TaggerError> {
        if already_tagged(
            record,
            &self.options.tagged_at_property,
            self.options.tagged_at_buffer,
        ) {
            return Ok(RecordOutcome::Skipped(SkipReason::AlreadyTagged));
        }

        let content = self.extract_content(record);
        if content.is_empty() {
            return Ok(RecordOutcome::Skipped(SkipReason::EmptyContent));
        }

        let tags = match self.infer_with_retry(&content) {
            Attempt::Tagged(tags) => tags,
            Attempt::Retryable(error) => {
                return Ok(RecordOutcome::Failed(RecordFailure::Inference(error)));
            }
            Attempt::RateLimited(error) => return Err(error),
        };

        let write = self.store.write_tags(
            record.id(),
            &self.options.tag_property,
            &tags,
            &self.options.tagged_at_property,
            OffsetDateTime::now_utc(),
        );

        Ok(match write {
            Ok(()) => RecordOutcome::Tagged(tags),
            Err(error) => RecordOutcome::Failed(RecordFailure::WriteBack(error)),
        })
    }

    fn extract_content(&self, record: &Record) -> Content {
        let mut content = extract(record, &self.options.content_fields);
        if !self.options.fetch_body {
            return content;
        }

        match self.store.list_body_blocks(record.id()) {
            Ok(blocks) => {
                let body = extract_body(&blocks, self.options.body_max_chars);
                debug!(record_id = %record.id(), blocks = blocks.len(), chars = body.chars().count(), "Fetched body");
                if !body.is_empty() {
                    content.insert(BODY_FIELD, body);
                }
            }
            Err(error) => {
                warn!(record_id = %record.id(), %error, "Failed to fetch body; using properties only");
            }
        }
        pause(self.pacing.store);

        content
    }

    /// Calls the tagger at most twice; throttling is never retried.
    fn infer_with_retry(&self, content: &Content) -> Attempt {
        let first_error = match self.attempt(content) {
            Attempt::Retryable(error) => error,
            settled => return settled,
        };

        warn!(error = %first_error, "Tag inference failed; retrying once");
        self.attempt(content)
    }

    fn attempt(&self, content: &Content) -> Attempt {
        match self.tagger.infer_tags(content, self.options.max_tags) {
            Ok(mut tags) => {
                tags.truncate(self.options.max_tags);
                if tags.is_empty() {
                    Attempt::Retryable(TaggerError::NoTags)
                } else {
                    Attempt::Tagged(tags)
                }
            }
            Err(error) if error.is_rate_limit() => Attempt::RateLimited(error),
            Err(error) => Attempt::Retryable(error),
        }
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}
