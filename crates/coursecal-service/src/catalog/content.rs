//! Write paths for assignments, articles, books and chapters.

use chrono::{DateTime, Utc};
use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use coursecal_db::db::connection::DbConnection;
use coursecal_db::db::enums::EventKind;
use coursecal_db::db::query::content;
use coursecal_db::model::content::{
    Book, ChapterChanges, ContentItem, ItemTitle, NewArticle, NewAssignment, NewBook, NewChapter,
    TitledChanges,
};

use super::course::lock_course;
use crate::calendar::maintainer::{self, ContentField};
use crate::error::{ServiceError, ServiceResult};

/// Kinds that carry their own title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitledKind {
    Assignment,
    Article,
}

impl From<TitledKind> for EventKind {
    fn from(kind: TitledKind) -> Self {
        match kind {
            TitledKind::Assignment => Self::Assignment,
            TitledKind::Article => Self::Article,
        }
    }
}

/// ## Summary
/// Lists the rendered fields that differ between two resolutions of the
/// same item.
#[must_use]
pub fn changed_fields(before: &ContentItem, after: &ContentItem) -> Vec<ContentField> {
    let mut changed = Vec::new();
    match (&before.title, &after.title) {
        (ItemTitle::Titled(old), ItemTitle::Titled(new)) if old != new => {
            changed.push(ContentField::Title);
        }
        (ItemTitle::Chapter { number: old, .. }, ItemTitle::Chapter { number: new, .. })
            if old != new =>
        {
            changed.push(ContentField::ChapterNumber);
        }
        _ => {}
    }
    if before.deadline != after.deadline {
        changed.push(ContentField::Deadline);
    }
    changed
}

async fn resolve_existing(
    tx: &mut DbConnection<'_>,
    kind: EventKind,
    id: Uuid,
) -> ServiceResult<ContentItem> {
    content::resolve_item(tx, kind, id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("{kind} {id}")))
}

/// Resolves an existing item with its course locked, so no enrollment change
/// can interleave with the maintainer step that follows.
async fn lock_existing(
    tx: &mut DbConnection<'_>,
    kind: EventKind,
    id: Uuid,
) -> ServiceResult<ContentItem> {
    let item = resolve_existing(tx, kind, id).await?;
    lock_course(tx, item.course.id).await?;
    resolve_existing(tx, kind, id).await
}

/// ## Summary
/// Creates an assignment or article and materializes it for every enrolled
/// user.
///
/// ## Errors
/// Returns `NotFound` if the course does not exist, or an error if any write
/// fails; nothing is applied then.
#[tracing::instrument(skip(conn))]
pub async fn create_titled(
    conn: &mut DbConnection<'_>,
    kind: TitledKind,
    course_id: Uuid,
    title: &str,
    deadline: Option<DateTime<Utc>>,
) -> ServiceResult<ContentItem> {
    let title = title.to_owned();
    conn.transaction::<_, ServiceError, _>(move |tx| {
        async move {
            let title = title.as_str();
            lock_course(tx, course_id).await?;

            let id = Uuid::now_v7();
            match kind {
                TitledKind::Assignment => {
                    let new_item = NewAssignment {
                        id,
                        course_id,
                        title,
                        deadline,
                    };
                    content::insert_assignment(tx, &new_item).await?;
                }
                TitledKind::Article => {
                    let new_item = NewArticle {
                        id,
                        course_id,
                        title,
                        deadline,
                    };
                    content::insert_article(tx, &new_item).await?;
                }
            }

            let item = resolve_existing(tx, kind.into(), id).await?;
            maintainer::on_content_created(tx, &item).await?;
            Ok(item)
        }
        .scope_boxed()
    })
    .await
}

/// ## Summary
/// Applies a partial update to an assignment or article and refreshes its
/// events if a rendered field changed.
///
/// Returns the number of events rewritten.
///
/// ## Errors
/// Returns `NotFound` if the item does not exist, or an error if any write
/// fails; nothing is applied then.
#[tracing::instrument(skip(conn, changes))]
pub async fn update_titled(
    conn: &mut DbConnection<'_>,
    kind: TitledKind,
    id: Uuid,
    changes: &TitledChanges<'_>,
) -> ServiceResult<usize> {
    let title = changes.title.map(str::to_owned);
    let deadline = changes.deadline;
    conn.transaction::<_, ServiceError, _>(move |tx| {
        async move {
            let changes = &TitledChanges {
                title: title.as_deref(),
                deadline,
            };
            let event_kind = EventKind::from(kind);
            let before = lock_existing(tx, event_kind, id).await?;

            let now = Utc::now();
            let _updated = match kind {
                TitledKind::Assignment => content::update_assignment(tx, id, changes, now).await?,
                TitledKind::Article => content::update_article(tx, id, changes, now).await?,
            };

            let after = resolve_existing(tx, event_kind, id).await?;
            let changed = changed_fields(&before, &after);
            maintainer::on_content_fields_changed(tx, &after, &changed).await
        }
        .scope_boxed()
    })
    .await
}

/// ## Summary
/// Deletes an item of any kind and tombstones its events.
///
/// ## Errors
/// Returns `NotFound` if the item does not exist, or an error if any write
/// fails; nothing is applied then.
#[tracing::instrument(skip(conn))]
pub async fn delete_item(conn: &mut DbConnection<'_>, kind: EventKind, id: Uuid) -> ServiceResult<usize> {
    conn.transaction::<_, ServiceError, _>(|tx| {
        async move {
            lock_existing(tx, kind, id).await?;

            let removed = match kind {
                EventKind::Assignment => content::delete_assignment(tx, id).await?,
                EventKind::Article => content::delete_article(tx, id).await?,
                EventKind::Chapter => content::delete_chapter(tx, id).await?,
            };
            if removed == 0 {
                return Err(ServiceError::NotFound(format!("{kind} {id}")));
            }

            maintainer::on_content_deleted(tx, kind, id).await
        }
        .scope_boxed()
    })
    .await
}

/// ## Summary
/// Creates a book. Books have no deadline of their own, so the calendar
/// index is untouched until chapters are added.
///
/// ## Errors
/// Returns an error if the course does not exist or the insert fails.
#[tracing::instrument(skip(conn))]
pub async fn create_book(conn: &mut DbConnection<'_>, course_id: Uuid, title: &str) -> ServiceResult<Book> {
    let new_book = NewBook {
        id: Uuid::now_v7(),
        course_id,
        title,
    };
    Ok(content::insert_book(conn, &new_book).await?)
}

/// ## Summary
/// Changes a book's title and rewrites the summaries of its chapters' events.
///
/// ## Errors
/// Returns `NotFound` if the book does not exist, or an error if any write
/// fails; nothing is applied then.
#[tracing::instrument(skip(conn))]
pub async fn retitle_book(conn: &mut DbConnection<'_>, book_id: Uuid, title: &str) -> ServiceResult<Book> {
    let title = title.to_owned();
    conn.transaction::<_, ServiceError, _>(move |tx| {
        async move {
            let course_id = content::course_of_book(tx, book_id)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("book {book_id}")))?;
            lock_course(tx, course_id).await?;

            let book = content::retitle_book(tx, book_id, &title, Utc::now())
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("book {book_id}")))?;
            maintainer::on_book_retitled(tx, book_id).await?;
            Ok(book)
        }
        .scope_boxed()
    })
    .await
}

/// ## Summary
/// Creates a chapter and materializes it for every user enrolled in the
/// book's course.
///
/// ## Errors
/// Returns `NotFound` if the book does not exist, or an error if any write
/// fails; nothing is applied then.
#[tracing::instrument(skip(conn))]
pub async fn create_chapter(
    conn: &mut DbConnection<'_>,
    book_id: Uuid,
    chapter_number: i32,
    deadline: Option<DateTime<Utc>>,
) -> ServiceResult<ContentItem> {
    conn.transaction::<_, ServiceError, _>(|tx| {
        async move {
            let course_id = content::course_of_book(tx, book_id)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("book {book_id}")))?;
            lock_course(tx, course_id).await?;

            let new_chapter = NewChapter {
                id: Uuid::now_v7(),
                book_id,
                chapter_number,
                deadline,
            };
            let chapter = content::insert_chapter(tx, &new_chapter).await?;

            let item = resolve_existing(tx, EventKind::Chapter, chapter.id).await?;
            maintainer::on_content_created(tx, &item).await?;
            Ok(item)
        }
        .scope_boxed()
    })
    .await
}

/// ## Summary
/// Applies a partial update to a chapter and refreshes its events if a
/// rendered field changed.
///
/// ## Errors
/// Returns `NotFound` if the chapter does not exist, or an error if any write
/// fails; nothing is applied then.
#[tracing::instrument(skip(conn))]
pub async fn update_chapter(
    conn: &mut DbConnection<'_>,
    id: Uuid,
    changes: ChapterChanges,
) -> ServiceResult<usize> {
    conn.transaction::<_, ServiceError, _>(|tx| {
        async move {
            let before = lock_existing(tx, EventKind::Chapter, id).await?;
            content::update_chapter(tx, id, &changes, Utc::now()).await?;
            let after = resolve_existing(tx, EventKind::Chapter, id).await?;

            let changed = changed_fields(&before, &after);
            maintainer::on_content_fields_changed(tx, &after, &changed).await
        }
        .scope_boxed()
    })
    .await
}
