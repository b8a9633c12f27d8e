//! Answers feed requests for an already resolved user.
//!
//! The cheap validator query runs first; rows are only loaded and rendered
//! when the client's copy is stale.

use uuid::Uuid;

use coursecal_core::config::CalendarConfig;
use coursecal_db::db::connection::DbConnection;
use coursecal_db::db::query::calendar_event;

use super::conditional::{FeedValidator, Freshness};
use super::feed::build_feed;
use crate::error::ServiceResult;

/// Request preconditions, as raw header values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Preconditions<'a> {
    pub if_none_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
}

/// What to send back for a feed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    NotModified(FeedValidator),
    Feed { validator: FeedValidator, body: String },
}

/// ## Summary
/// Evaluates preconditions against the user's feed and renders it on a miss.
///
/// ## Errors
/// Returns an error if the configured zone is invalid or a query fails.
#[tracing::instrument(skip(conn, calendar, preconditions))]
pub async fn serve_feed(
    conn: &mut DbConnection<'_>,
    user_id: Uuid,
    calendar: &CalendarConfig,
    preconditions: Preconditions<'_>,
) -> ServiceResult<FeedOutcome> {
    let tz = calendar.timezone()?;

    let stamp = calendar_event::stamp_for_user(conn, user_id).await?;
    let validator = FeedValidator::from_stamp(&stamp);
    if validator.evaluate(preconditions.if_none_match, preconditions.if_modified_since)
        == Freshness::NotModified
    {
        tracing::debug!(etag = %validator.etag, "Feed not modified");
        return Ok(FeedOutcome::NotModified(validator));
    }

    let events = calendar_event::load_for_user(conn, user_id).await?;
    // The tag must describe the rows in `body`, not the earlier stamp.
    let validator = FeedValidator::from_events(&events);
    let body = build_feed(&events, tz, &calendar.product_id)?;

    tracing::debug!(etag = %validator.etag, rows = events.len(), "Feed rendered");
    Ok(FeedOutcome::Feed { validator, body })
}
