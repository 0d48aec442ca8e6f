//! Idempotence guard: skip records not edited since they were last tagged.

use std::time::Duration;

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::models::Record;

/// Parses a store timestamp.
///
/// Accepts RFC 3339 date-times and bare `YYYY-MM-DD` dates (taken as midnight
/// UTC). Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(timestamp) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(timestamp);
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}

/// Returns `true` if the record was tagged after its last substantive edit.
///
/// The record counts as already tagged unless its last-modified time is more
/// than `buffer` after the tagged-at time. The buffer absorbs the edit that the
/// tag write-back itself causes. A missing tagged-at property or any
/// unparseable timestamp means the record is not skipped.
pub fn already_tagged(record: &Record, tagged_at_property: &str, buffer: Duration) -> bool {
    let Some(tagged_at) = record.tagged_at(tagged_at_property).and_then(parse_timestamp) else {
        return false;
    };
    let Some(edited_at) = record.last_edited_time().and_then(parse_timestamp) else {
        return false;
    };

    match time::Duration::try_from(buffer)
        .ok()
        .and_then(|buffer| tagged_at.checked_add(buffer))
    {
        Some(limit) => edited_at <= limit,
        // Buffer too large to represent: every tagged record is within it
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PropertyValue, RecordBuilder};

    const PROPERTY: &str = "Tagged At";
    const BUFFER: Duration = Duration::from_secs(120);

    fn record(tagged_at: Option<&str>, edited: Option<&str>) -> Record {
        let mut builder = RecordBuilder::new("page");
        if let Some(tagged_at) = tagged_at {
            builder = builder.property(PROPERTY, PropertyValue::Date(Some(tagged_at.to_string())));
        }
        if let Some(edited) = edited {
            builder = builder.last_edited_time(edited);
        }
        builder.build()
    }

    #[test]
    fn edit_seconds_after_tagging_is_skipped() {
        let record = record(
            Some("2025-05-01T12:00:00.000+00:00"),
            Some("2025-05-01T12:00:05.000Z"),
        );
        assert!(already_tagged(&record, PROPERTY, BUFFER));
    }

    #[test]
    fn edit_hours_after_tagging_is_not_skipped() {
        let record = record(
            Some("2025-05-01T12:00:00.000+00:00"),
            Some("2025-05-01T18:00:00.000Z"),
        );
        assert!(!already_tagged(&record, PROPERTY, BUFFER));
    }

    #[test]
    fn edit_before_tagging_is_skipped() {
        let record = record(Some("2025-05-01T12:00:00Z"), Some("2025-04-30T08:00:00Z"));
        assert!(already_tagged(&record, PROPERTY, BUFFER));
    }

    #[test]
    fn edit_exactly_at_buffer_boundary_is_skipped() {
        let record = record(Some("2025-05-01T12:00:00Z"), Some("2025-05-01T12:02:00Z"));
        assert!(already_tagged(&record, PROPERTY, BUFFER));

        let record = self::record(Some("2025-05-01T12:00:00Z"), Some("2025-05-01T12:02:01Z"));
        assert!(!already_tagged(&record, PROPERTY, BUFFER));
    }

    #[test]
    fn offsets_are_compared_as_instants() {
        // 21:00 in Tokyo is 12:00 UTC
        let record = record(
            Some("2025-05-01T21:00:00.000+09:00"),
            Some("2025-05-01T12:00:30.000Z"),
        );
        assert!(already_tagged(&record, PROPERTY, BUFFER));
    }

    #[test]
    fn missing_tagged_at_is_never_skipped() {
        let record = record(None, Some("2025-05-01T12:00:00Z"));
        assert!(!already_tagged(&record, PROPERTY, BUFFER));
    }

    #[test]
    fn missing_or_unparseable_timestamps_are_not_skipped() {
        assert!(!already_tagged(
            &record(Some("2025-05-01T12:00:00Z"), None),
            PROPERTY,
            BUFFER
        ));
        assert!(!already_tagged(
            &record(Some("yesterday"), Some("2025-05-01T12:00:00Z")),
            PROPERTY,
            BUFFER
        ));
        assert!(!already_tagged(
            &record(Some("2025-05-01T12:00:00Z"), Some("soon")),
            PROPERTY,
            BUFFER
        ));
    }

    #[test]
    fn date_only_tagged_at_is_midnight_utc() {
        assert_eq!(
            parse_timestamp("2025-05-01"),
            Some(time::macros::datetime!(2025-05-01 00:00 UTC))
        );

        let record = record(Some("2025-05-01"), Some("2025-05-01T00:01:00Z"));
        assert!(already_tagged(&record, PROPERTY, BUFFER));
    }
}
