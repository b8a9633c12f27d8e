//! Keeps `calendar_event` consistent with enrollments and content.
//!
//! Every operation runs in its own transaction. Called inside the caller's
//! transaction this becomes a savepoint, so a failure anywhere in a fan-out
//! leaves no partial set behind and surfaces to the caller.
//!
//! Rows are never deleted: losing visibility tombstones a row through
//! `cancelled_at`, and regaining it clears the tombstone on the same uid.
//! Every in-place change bumps `revision` and stamps `last_modified`.

use chrono::{DateTime, Utc};
use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use coursecal_db::db::connection::DbConnection;
use coursecal_db::db::enums::EventKind;
use coursecal_db::db::query::{calendar_event, content, enrollment};
use coursecal_db::model::calendar_event::{CalendarEvent, NewCalendarEvent};
use coursecal_db::model::content::ContentItem;

use super::summary::compose_summary;
use super::uid::event_uid;
use crate::error::{ServiceError, ServiceResult};

/// Content field whose change may affect rendered events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentField {
    Title,
    ChapterNumber,
    Deadline,
}

impl ContentField {
    /// Whether a change to this field alters the events of `kind`.
    #[must_use]
    pub const fn affects(self, kind: EventKind) -> bool {
        match self {
            Self::Deadline => true,
            Self::Title => matches!(kind, EventKind::Assignment | EventKind::Article),
            Self::ChapterNumber => matches!(kind, EventKind::Chapter),
        }
    }
}

/// ## Summary
/// Materializes every item of `course_id` for a newly enrolled user.
///
/// Tombstoned rows are revived; identical live rows are left untouched.
///
/// ## Errors
/// Returns an error if any database operation fails; nothing is applied then.
#[tracing::instrument(skip(conn))]
pub async fn on_enroll(
    conn: &mut DbConnection<'_>,
    user_id: Uuid,
    course_id: Uuid,
) -> ServiceResult<usize> {
    let touched = conn
        .transaction::<_, ServiceError, _>(|tx| {
            async move {
                let now = Utc::now();
                let items = content::items_for_course(tx, course_id).await?;

                let mut touched = 0;
                for item in &items {
                    touched += upsert_event(tx, user_id, item, now).await?;
                }
                Ok(touched)
            }
            .scope_boxed()
        })
        .await?;

    tracing::debug!(touched, "Applied enrollment to calendar index");
    Ok(touched)
}

/// ## Summary
/// Tombstones the user's live events for every item of `course_id`.
///
/// Already tombstoned rows are skipped, so repeating the call is a no-op.
///
/// ## Errors
/// Returns an error if any database operation fails; nothing is applied then.
#[tracing::instrument(skip(conn))]
pub async fn on_unenroll(
    conn: &mut DbConnection<'_>,
    user_id: Uuid,
    course_id: Uuid,
) -> ServiceResult<usize> {
    let touched = conn
        .transaction::<_, ServiceError, _>(|tx| {
            async move {
                let now = Utc::now();
                let items = content::items_for_course(tx, course_id).await?;

                let mut touched = 0;
                for kind in [EventKind::Article, EventKind::Assignment, EventKind::Chapter] {
                    let ids: Vec<Uuid> = items
                        .iter()
                        .filter(|item| item.kind == kind)
                        .map(|item| item.id)
                        .collect();
                    touched +=
                        calendar_event::tombstone_live_for_user(tx, user_id, kind, &ids, now)
                            .await?;
                }
                Ok(touched)
            }
            .scope_boxed()
        })
        .await?;

    tracing::debug!(touched, "Applied unenrollment to calendar index");
    Ok(touched)
}

/// ## Summary
/// Materializes a new item for every user enrolled in its course.
///
/// ## Errors
/// Returns an error if any database operation fails; nothing is applied then.
#[tracing::instrument(skip(conn, item), fields(kind = %item.kind, source_id = %item.id))]
pub async fn on_content_created(
    conn: &mut DbConnection<'_>,
    item: &ContentItem,
) -> ServiceResult<usize> {
    let item = item.clone();
    let touched = conn
        .transaction::<_, ServiceError, _>(move |tx| {
            async move {
                let now = Utc::now();
                let user_ids = enrollment::user_ids_for_course(tx, item.course.id).await?;

                let mut touched = 0;
                for user_id in user_ids {
                    touched += upsert_event(tx, user_id, &item, now).await?;
                }
                Ok(touched)
            }
            .scope_boxed()
        })
        .await?;

    tracing::debug!(touched, "Applied new content to calendar index");
    Ok(touched)
}

/// ## Summary
/// Rewrites summary and deadline of every event of an edited item, live or
/// tombstoned. Tombstones stay as they are.
///
/// Does nothing unless `changed` names a field that affects this kind.
///
/// ## Errors
/// Returns an error if any database operation fails; nothing is applied then.
#[tracing::instrument(skip(conn, item), fields(kind = %item.kind, source_id = %item.id))]
pub async fn on_content_fields_changed(
    conn: &mut DbConnection<'_>,
    item: &ContentItem,
    changed: &[ContentField],
) -> ServiceResult<usize> {
    if !changed.iter().any(|field| field.affects(item.kind)) {
        tracing::debug!("No rendered field changed, calendar index untouched");
        return Ok(0);
    }

    let summary = compose_summary(item);
    let item = item.clone();
    let touched = conn
        .transaction::<_, ServiceError, _>(move |tx| {
            async move {
                let now = Utc::now();
                let touched = calendar_event::refresh_by_source(
                    tx,
                    item.kind,
                    item.id,
                    &summary,
                    item.deadline,
                    now,
                )
                .await?;
                Ok(touched)
            }
            .scope_boxed()
        })
        .await?;

    tracing::debug!(touched, "Applied content edit to calendar index");
    Ok(touched)
}

/// ## Summary
/// Tombstones every live event of a deleted item.
///
/// Deletion is terminal: nothing revives these rows afterwards because the
/// item no longer resolves.
///
/// ## Errors
/// Returns an error if any database operation fails; nothing is applied then.
#[tracing::instrument(skip(conn))]
pub async fn on_content_deleted(
    conn: &mut DbConnection<'_>,
    kind: EventKind,
    source_id: Uuid,
) -> ServiceResult<usize> {
    let touched = conn
        .transaction::<_, ServiceError, _>(|tx| {
            async move {
                let now = Utc::now();
                let touched =
                    calendar_event::tombstone_live_by_source(tx, kind, source_id, now).await?;
                Ok(touched)
            }
            .scope_boxed()
        })
        .await?;

    tracing::debug!(touched, "Applied content deletion to calendar index");
    Ok(touched)
}

/// ## Summary
/// Recomposes the summary of every event of every item in a renamed course.
/// Deadlines are left alone.
///
/// ## Errors
/// Returns an error if any database operation fails; nothing is applied then.
#[tracing::instrument(skip(conn))]
pub async fn on_course_renamed(conn: &mut DbConnection<'_>, course_id: Uuid) -> ServiceResult<usize> {
    let touched = conn
        .transaction::<_, ServiceError, _>(|tx| {
            async move {
                let items = content::items_for_course(tx, course_id).await?;
                resummarize(tx, &items, Utc::now()).await
            }
            .scope_boxed()
        })
        .await?;

    tracing::debug!(touched, "Applied course rename to calendar index");
    Ok(touched)
}

/// ## Summary
/// Recomposes the summary of every event of every chapter in a retitled book.
///
/// ## Errors
/// Returns an error if any database operation fails; nothing is applied then.
#[tracing::instrument(skip(conn))]
pub async fn on_book_retitled(conn: &mut DbConnection<'_>, book_id: Uuid) -> ServiceResult<usize> {
    let touched = conn
        .transaction::<_, ServiceError, _>(|tx| {
            async move {
                let chapters = content::chapters_for_book(tx, book_id).await?;
                resummarize(tx, &chapters, Utc::now()).await
            }
            .scope_boxed()
        })
        .await?;

    tracing::debug!(touched, "Applied book retitle to calendar index");
    Ok(touched)
}

async fn resummarize(
    tx: &mut DbConnection<'_>,
    items: &[ContentItem],
    now: DateTime<Utc>,
) -> ServiceResult<usize> {
    let mut touched = 0;
    for item in items {
        let summary = compose_summary(item);
        touched +=
            calendar_event::resummarize_by_source(tx, item.kind, item.id, &summary, now).await?;
    }
    Ok(touched)
}

/// Inserts the event of `item` for `user_id`, or brings an existing row up to
/// date. Returns the number of rows written (0 or 1).
///
/// An existing row is locked before it is inspected. A concurrent insert that
/// wins the race makes ours affect nothing; its row is then locked and
/// updated like any other existing row.
async fn upsert_event(
    tx: &mut DbConnection<'_>,
    user_id: Uuid,
    item: &ContentItem,
    now: DateTime<Utc>,
) -> ServiceResult<usize> {
    let uid = event_uid(item.kind, item.id, user_id);
    let summary = compose_summary(item);

    if let Some(existing) = calendar_event::lock_by_uid(tx, &uid).await? {
        return reconcile(tx, &existing, &summary, item.deadline, now).await;
    }

    let new_event = NewCalendarEvent {
        uid: &uid,
        user_id,
        kind: item.kind,
        source_id: item.id,
        summary: &summary,
        deadline: item.deadline,
        revision: 0,
        last_modified: now,
    };
    if calendar_event::insert_if_absent(tx, &new_event).await? > 0 {
        return Ok(1);
    }

    tracing::debug!(uid = %uid, "Lost insert race, updating the winning row");
    let existing = calendar_event::lock_by_uid(tx, &uid)
        .await?
        .ok_or(ServiceError::InvariantViolation(
            "calendar event missing after insert conflict",
        ))?;
    reconcile(tx, &existing, &summary, item.deadline, now).await
}

async fn reconcile(
    tx: &mut DbConnection<'_>,
    existing: &CalendarEvent,
    summary: &str,
    deadline: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ServiceResult<usize> {
    if existing.is_cancelled() {
        return Ok(calendar_event::revive(tx, &existing.uid, summary, deadline, now).await?);
    }

    if existing.summary == summary && existing.deadline == deadline {
        return Ok(0);
    }

    Ok(calendar_event::refresh(tx, &existing.uid, summary, deadline, now).await?)
}
