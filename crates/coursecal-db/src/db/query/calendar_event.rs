//! Query functions for `calendar_event`.
//!
//! Mutations that bump `revision` also stamp `last_modified`, so the feed
//! validator moves whenever a row visibly changes.

use chrono::{DateTime, Utc};
use diesel::dsl::{count_star, max};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::enums::EventKind;
use crate::db::schema::calendar_event;
use crate::model::calendar_event::{CalendarEvent, EventStamp, NewCalendarEvent};

/// ## Summary
/// Loads every row of a user, live and tombstoned, in feed order.
///
/// Rows with a deadline come first (ascending); `PostgreSQL` sorts nulls last
/// for ascending order.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn load_for_user(
    conn: &mut DbConnection<'_>,
    user_id: Uuid,
) -> QueryResult<Vec<CalendarEvent>> {
    calendar_event::table
        .filter(calendar_event::user_id.eq(user_id))
        .select(CalendarEvent::as_select())
        .order((
            calendar_event::deadline.asc(),
            calendar_event::kind.asc(),
            calendar_event::source_id.asc(),
        ))
        .load(conn)
        .await
}

/// ## Summary
/// Computes the change validator inputs for a user's feed.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn stamp_for_user(conn: &mut DbConnection<'_>, user_id: Uuid) -> QueryResult<EventStamp> {
    let (max_last_modified, count) = calendar_event::table
        .filter(calendar_event::user_id.eq(user_id))
        .select((max(calendar_event::last_modified), count_star()))
        .first::<(Option<DateTime<Utc>>, i64)>(conn)
        .await?;

    Ok(EventStamp {
        max_last_modified,
        count,
    })
}

/// ## Summary
/// Loads every row materialized from one content item.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn by_source(
    conn: &mut DbConnection<'_>,
    kind: EventKind,
    source_id: Uuid,
) -> QueryResult<Vec<CalendarEvent>> {
    calendar_event::table
        .filter(calendar_event::kind.eq(kind))
        .filter(calendar_event::source_id.eq(source_id))
        .select(CalendarEvent::as_select())
        .order(calendar_event::user_id.asc())
        .load(conn)
        .await
}

/// ## Summary
/// Reads a row by uid and locks it for the rest of the transaction.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn lock_by_uid(
    conn: &mut DbConnection<'_>,
    uid: &str,
) -> QueryResult<Option<CalendarEvent>> {
    calendar_event::table
        .find(uid)
        .select(CalendarEvent::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Inserts a row unless one with the same uid already exists.
///
/// Returns the number of rows inserted; 0 means another writer got there
/// first and the caller should fall back to an update.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert_if_absent(
    conn: &mut DbConnection<'_>,
    event: &NewCalendarEvent<'_>,
) -> QueryResult<usize> {
    diesel::insert_into(calendar_event::table)
        .values(event)
        .on_conflict_do_nothing()
        .execute(conn)
        .await
}

/// ## Summary
/// Refreshes summary and deadline of one row and clears its tombstone.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn revive(
    conn: &mut DbConnection<'_>,
    uid: &str,
    summary: &str,
    deadline: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> QueryResult<usize> {
    diesel::update(calendar_event::table.find(uid))
        .set((
            calendar_event::summary.eq(summary),
            calendar_event::deadline.eq(deadline),
            calendar_event::cancelled_at.eq(None::<DateTime<Utc>>),
            calendar_event::revision.eq(calendar_event::revision + 1),
            calendar_event::last_modified.eq(now),
        ))
        .execute(conn)
        .await
}

/// ## Summary
/// Refreshes summary and deadline of one row, leaving its tombstone alone.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn refresh(
    conn: &mut DbConnection<'_>,
    uid: &str,
    summary: &str,
    deadline: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> QueryResult<usize> {
    diesel::update(calendar_event::table.find(uid))
        .set((
            calendar_event::summary.eq(summary),
            calendar_event::deadline.eq(deadline),
            calendar_event::revision.eq(calendar_event::revision + 1),
            calendar_event::last_modified.eq(now),
        ))
        .execute(conn)
        .await
}

/// ## Summary
/// Tombstones the live rows of one user that were materialized from any of
/// `source_ids` of the given kind.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn tombstone_live_for_user(
    conn: &mut DbConnection<'_>,
    user_id: Uuid,
    kind: EventKind,
    source_ids: &[Uuid],
    now: DateTime<Utc>,
) -> QueryResult<usize> {
    if source_ids.is_empty() {
        return Ok(0);
    }

    diesel::update(
        calendar_event::table
            .filter(calendar_event::user_id.eq(user_id))
            .filter(calendar_event::kind.eq(kind))
            .filter(calendar_event::source_id.eq_any(source_ids))
            .filter(calendar_event::cancelled_at.is_null()),
    )
    .set((
        calendar_event::cancelled_at.eq(now),
        calendar_event::revision.eq(calendar_event::revision + 1),
        calendar_event::last_modified.eq(now),
    ))
    .execute(conn)
    .await
}

/// ## Summary
/// Tombstones every live row materialized from one content item.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn tombstone_live_by_source(
    conn: &mut DbConnection<'_>,
    kind: EventKind,
    source_id: Uuid,
    now: DateTime<Utc>,
) -> QueryResult<usize> {
    diesel::update(
        calendar_event::table
            .filter(calendar_event::kind.eq(kind))
            .filter(calendar_event::source_id.eq(source_id))
            .filter(calendar_event::cancelled_at.is_null()),
    )
    .set((
        calendar_event::cancelled_at.eq(now),
        calendar_event::revision.eq(calendar_event::revision + 1),
        calendar_event::last_modified.eq(now),
    ))
    .execute(conn)
    .await
}

/// ## Summary
/// Rewrites summary and deadline of every row, live or tombstoned,
/// materialized from one content item.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn refresh_by_source(
    conn: &mut DbConnection<'_>,
    kind: EventKind,
    source_id: Uuid,
    summary: &str,
    deadline: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> QueryResult<usize> {
    diesel::update(
        calendar_event::table
            .filter(calendar_event::kind.eq(kind))
            .filter(calendar_event::source_id.eq(source_id)),
    )
    .set((
        calendar_event::summary.eq(summary),
        calendar_event::deadline.eq(deadline),
        calendar_event::revision.eq(calendar_event::revision + 1),
        calendar_event::last_modified.eq(now),
    ))
    .execute(conn)
    .await
}

/// ## Summary
/// Rewrites the summary of every row materialized from one content item,
/// leaving deadlines alone.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn resummarize_by_source(
    conn: &mut DbConnection<'_>,
    kind: EventKind,
    source_id: Uuid,
    summary: &str,
    now: DateTime<Utc>,
) -> QueryResult<usize> {
    diesel::update(
        calendar_event::table
            .filter(calendar_event::kind.eq(kind))
            .filter(calendar_event::source_id.eq(source_id)),
    )
    .set((
        calendar_event::summary.eq(summary),
        calendar_event::revision.eq(calendar_event::revision + 1),
        calendar_event::last_modified.eq(now),
    ))
    .execute(conn)
    .await
}

/// ## Summary
/// Records a user's completion flag for one content item.
///
/// Completion is not rendered, so neither `revision` nor `last_modified`
/// moves.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn set_completed(
    conn: &mut DbConnection<'_>,
    user_id: Uuid,
    kind: EventKind,
    source_id: Uuid,
    completed: bool,
) -> QueryResult<usize> {
    diesel::update(
        calendar_event::table
            .filter(calendar_event::user_id.eq(user_id))
            .filter(calendar_event::kind.eq(kind))
            .filter(calendar_event::source_id.eq(source_id)),
    )
    .set(calendar_event::completed.eq(completed))
    .execute(conn)
    .await
}
