//! Common utilities for the connector adapters

pub mod consts;
pub mod crypto;
pub mod errors;
pub mod ext_traits;
pub mod field_path;
pub mod request;
pub mod transcript;
pub mod types;

// Re-export commonly used items
pub use errors::{CustomResult, ParsingError, ValidationError};
pub use field_path::FieldPath;
pub use hyperswitch_masking::{ExposeInterface, Mask, Maskable, PeekInterface, Secret};
pub use request::{Method, Request, RequestBuilder, RequestContent, SignableField};
pub use transcript::{ScrubRule, TranscriptScrubber};
pub use types::MinorUnit;

/// Generate a time-ordered (time-sortable) unique identifier using the current time
#[inline]
pub fn generate_time_ordered_id(prefix: &str) -> String {
    format!("{prefix}_{}", uuid::Uuid::now_v7().as_simple())
}

pub mod date_time {
    use time::{format_description::BorrowedFormatItem, OffsetDateTime};

    /// IMF-fixdate, the format HTTP uses for the `Date` header: `Tue, 07 Jun 2022 10:00:00 GMT`
    const HTTP_DATE_FORMAT: &[BorrowedFormatItem<'_>] = time::macros::format_description!(
        "[weekday repr:short], [day padding:zero] [month repr:short] [year repr:full] [hour padding:zero repr:24]:[minute padding:zero]:[second padding:zero] GMT"
    );

    /// Current date and time in UTC.
    pub fn now() -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    /// Return the UNIX timestamp of the current date and time in UTC
    pub fn now_unix_timestamp() -> i64 {
        OffsetDateTime::now_utc().unix_timestamp()
    }

    /// Format a timestamp for an HTTP `Date` header. The value is converted to UTC first.
    pub fn format_http_date(date: OffsetDateTime) -> Result<String, time::error::Format> {
        date.to_offset(time::UtcOffset::UTC).format(HTTP_DATE_FORMAT)
    }

    #[cfg(test)]
    mod tests {
        use time::macros::datetime;

        #[test]
        fn test_format_http_date() {
            let date = datetime!(2022-06-07 10:00:00 UTC);
            assert_eq!(
                super::format_http_date(date).ok().as_deref(),
                Some("Tue, 07 Jun 2022 10:00:00 GMT")
            );
        }

        #[test]
        fn test_format_http_date_normalizes_offset() {
            let date = datetime!(2022-06-07 12:30:05 +02:00);
            assert_eq!(
                super::format_http_date(date).ok().as_deref(),
                Some("Tue, 07 Jun 2022 10:30:05 GMT")
            );
        }
    }
}
