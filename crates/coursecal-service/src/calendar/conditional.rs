//! Weak validators and conditional GET evaluation for feeds.
//!
//! The validator is derived from the user's rows alone (latest
//! `last_modified` and row count), so a request can be answered with
//! `304 Not Modified` before any row is loaded or rendered.

use chrono::{DateTime, Utc};

use coursecal_db::model::calendar_event::{CalendarEvent, EventStamp};

/// Outcome of evaluating request preconditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// The client's copy is current; answer 304 without a body.
    NotModified,
    /// Render and send the feed.
    Modified,
}

/// Change validator of one user's feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedValidator {
    /// Weak entity tag, e.g. `W/"1735732800000000-3"`.
    pub etag: String,
    /// Latest row change, or the Unix epoch for a user without rows.
    pub last_modified: DateTime<Utc>,
}

impl FeedValidator {
    #[must_use]
    pub fn from_stamp(stamp: &EventStamp) -> Self {
        let last_modified = stamp.max_last_modified.unwrap_or(DateTime::UNIX_EPOCH);
        Self {
            etag: format!(
                "W/\"{}-{}\"",
                last_modified.timestamp_micros(),
                stamp.count
            ),
            last_modified,
        }
    }

    /// Validator over rows already loaded, equal to what `from_stamp` yields
    /// for the same rows.
    #[must_use]
    pub fn from_events(events: &[CalendarEvent]) -> Self {
        Self::from_stamp(&EventStamp {
            max_last_modified: events.iter().map(|event| event.last_modified).max(),
            count: i64::try_from(events.len()).unwrap_or(i64::MAX),
        })
    }

    /// `Last-Modified` header value (HTTP-date, second precision).
    #[must_use]
    pub fn last_modified_http_date(&self) -> String {
        self.last_modified
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string()
    }

    /// ## Summary
    /// Evaluates `If-None-Match` and `If-Modified-Since` header values.
    ///
    /// When `If-None-Match` is present it alone decides; `*` or any tag that
    /// weakly matches the current one means not modified. Otherwise
    /// `If-Modified-Since` is compared at second precision. An unparseable
    /// date is ignored.
    ///
    /// This is RFC 7232 §6 precedence, not "either header matches": an edit
    /// within the same second as the client's copy changes the tag but not
    /// the HTTP-date, so a stale tag must win over a current date.
    #[must_use]
    pub fn evaluate(
        &self,
        if_none_match: Option<&str>,
        if_modified_since: Option<&str>,
    ) -> Freshness {
        if let Some(tags) = if_none_match {
            return if tags
                .split(',')
                .map(str::trim)
                .any(|tag| tag == "*" || weak_eq(tag, &self.etag))
            {
                Freshness::NotModified
            } else {
                Freshness::Modified
            };
        }

        if let Some(since) = if_modified_since.and_then(parse_http_date)
            && self.last_modified.timestamp() <= since.timestamp()
        {
            return Freshness::NotModified;
        }

        Freshness::Modified
    }
}

fn opaque_tag(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

fn weak_eq(a: &str, b: &str) -> bool {
    !a.is_empty() && opaque_tag(a) == opaque_tag(b)
}

fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
