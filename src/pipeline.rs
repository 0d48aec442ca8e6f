//! Record selection and the tagging run.
//!
//! [`select_records`] picks the records for a run mode, [`load_vocabulary`]
//! reads the registered tag options once per run, and [`Pipeline`] drives each
//! record through the guard, extraction, inference and write-back.

mod driver;
mod guard;

use time::OffsetDateTime;
use tracing::{info, warn};

use crate::autotagger::Vocabulary;
use crate::models::Record;
use crate::notion::{RecordStore, StoreError};

pub use driver::{
    DEFAULT_STORE_PACING, Pacing, Pipeline, PipelineOptions, RecordFailure, RecordOutcome,
    RunSummary, SkipReason,
};
pub use guard::{already_tagged, parse_timestamp};

/// Which records a run considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Every record in the database.
    Full,
    /// Records edited within the last `hours` hours.
    Windowed { hours: u32 },
}

/// Lists the records to process for `mode`, relative to `now`.
///
/// A window longer than the representable time range covers every record.
///
/// # Errors
///
/// Returns the store error unchanged; nothing can be processed without the
/// listing.
pub fn select_records(
    store: &dyn RecordStore,
    mode: RunMode,
    now: OffsetDateTime,
) -> Result<Vec<Record>, StoreError> {
    match mode {
        RunMode::Full => store.list_all_records(),
        RunMode::Windowed { hours } => {
            let Some(cutoff) = now.checked_sub(time::Duration::hours(i64::from(hours))) else {
                warn!(hours, "Window reaches past the earliest representable time; listing all records");
                return store.list_all_records();
            };
            info!(%cutoff, hours, "Selecting recently edited records");
            store.list_records_edited_since(cutoff)
        }
    }
}

/// Reads the tag property's registered options.
///
/// A failure is logged and yields an empty vocabulary; tagging still works
/// without one.
pub fn load_vocabulary(store: &dyn RecordStore, tag_property: &str) -> Vocabulary {
    match store.list_existing_tag_options(tag_property) {
        Ok(options) => {
            let vocabulary = Vocabulary::from_tags(options);
            info!(count = vocabulary.len(), "Loaded existing tags");
            vocabulary
        }
        Err(error) => {
            warn!(%error, tag_property, "Could not load existing tags; continuing without them");
            Vocabulary::default()
        }
    }
}
