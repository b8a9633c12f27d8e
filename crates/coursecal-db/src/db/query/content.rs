//! Query functions for assignments, articles, books and chapters.
//!
//! Besides plain writes this module resolves items into [`ContentItem`]s,
//! joining in the course (and book, for chapters) fields that event
//! summaries are composed from.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::enums::EventKind;
use crate::db::schema::{article, assignment, book, chapter, course};
use crate::model::content::{
    Article, Assignment, Book, Chapter, ChapterChanges, ContentItem, CourseRef, ItemTitle,
    NewArticle, NewAssignment, NewBook, NewChapter, TitledChanges,
};
use crate::model::course::Course;

fn course_ref(course: Course) -> CourseRef {
    CourseRef {
        id: course.id,
        code: course.code,
        name: course.name,
    }
}

fn assignment_item((item, course): (Assignment, Course)) -> ContentItem {
    ContentItem {
        kind: EventKind::Assignment,
        id: item.id,
        course: course_ref(course),
        title: ItemTitle::Titled(item.title),
        deadline: item.deadline,
    }
}

fn article_item((item, course): (Article, Course)) -> ContentItem {
    ContentItem {
        kind: EventKind::Article,
        id: item.id,
        course: course_ref(course),
        title: ItemTitle::Titled(item.title),
        deadline: item.deadline,
    }
}

fn chapter_item((item, book, course): (Chapter, Book, Course)) -> ContentItem {
    ContentItem {
        kind: EventKind::Chapter,
        id: item.id,
        course: course_ref(course),
        title: ItemTitle::Chapter {
            number: item.chapter_number,
            book_title: book.title,
        },
        deadline: item.deadline,
    }
}

// Writes

/// ## Summary
/// Inserts an assignment and returns the stored row.
///
/// ## Errors
/// Returns an error if the course does not exist or the database operation fails.
pub async fn insert_assignment(
    conn: &mut DbConnection<'_>,
    new_assignment: &NewAssignment<'_>,
) -> QueryResult<Assignment> {
    diesel::insert_into(assignment::table)
        .values(new_assignment)
        .returning(Assignment::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Applies a partial update to an assignment, returning the rows updated.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn update_assignment(
    conn: &mut DbConnection<'_>,
    id: Uuid,
    changes: &TitledChanges<'_>,
    now: DateTime<Utc>,
) -> QueryResult<usize> {
    diesel::update(assignment::table.find(id))
        .set((
            changes.title.map(|title| assignment::title.eq(title)),
            changes.deadline.map(|deadline| assignment::deadline.eq(deadline)),
            assignment::updated_at.eq(now),
        ))
        .execute(conn)
        .await
}

/// ## Summary
/// Deletes an assignment, returning the rows removed.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn delete_assignment(conn: &mut DbConnection<'_>, id: Uuid) -> QueryResult<usize> {
    diesel::delete(assignment::table.find(id)).execute(conn).await
}

/// ## Summary
/// Inserts an article and returns the stored row.
///
/// ## Errors
/// Returns an error if the course does not exist or the database operation fails.
pub async fn insert_article(
    conn: &mut DbConnection<'_>,
    new_article: &NewArticle<'_>,
) -> QueryResult<Article> {
    diesel::insert_into(article::table)
        .values(new_article)
        .returning(Article::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Applies a partial update to an article, returning the rows updated.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn update_article(
    conn: &mut DbConnection<'_>,
    id: Uuid,
    changes: &TitledChanges<'_>,
    now: DateTime<Utc>,
) -> QueryResult<usize> {
    diesel::update(article::table.find(id))
        .set((
            changes.title.map(|title| article::title.eq(title)),
            changes.deadline.map(|deadline| article::deadline.eq(deadline)),
            article::updated_at.eq(now),
        ))
        .execute(conn)
        .await
}

/// ## Summary
/// Deletes an article, returning the rows removed.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn delete_article(conn: &mut DbConnection<'_>, id: Uuid) -> QueryResult<usize> {
    diesel::delete(article::table.find(id)).execute(conn).await
}

/// ## Summary
/// Inserts a book and returns the stored row.
///
/// ## Errors
/// Returns an error if the course does not exist or the database operation fails.
pub async fn insert_book(conn: &mut DbConnection<'_>, new_book: &NewBook<'_>) -> QueryResult<Book> {
    diesel::insert_into(book::table)
        .values(new_book)
        .returning(Book::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Returns the course a book belongs to, if the book exists.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn course_of_book(conn: &mut DbConnection<'_>, book_id: Uuid) -> QueryResult<Option<Uuid>> {
    book::table
        .find(book_id)
        .select(book::course_id)
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Sets a book's title, returning the updated row if it exists.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn retitle_book(
    conn: &mut DbConnection<'_>,
    id: Uuid,
    title: &str,
    now: DateTime<Utc>,
) -> QueryResult<Option<Book>> {
    diesel::update(book::table.find(id))
        .set((book::title.eq(title), book::updated_at.eq(now)))
        .returning(Book::as_returning())
        .get_result(conn)
        .await
        .optional()
}

/// ## Summary
/// Inserts a chapter and returns the stored row.
///
/// ## Errors
/// Returns an error if the book does not exist or the database operation fails.
pub async fn insert_chapter(
    conn: &mut DbConnection<'_>,
    new_chapter: &NewChapter,
) -> QueryResult<Chapter> {
    diesel::insert_into(chapter::table)
        .values(new_chapter)
        .returning(Chapter::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Applies a partial update to a chapter, returning the rows updated.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn update_chapter(
    conn: &mut DbConnection<'_>,
    id: Uuid,
    changes: &ChapterChanges,
    now: DateTime<Utc>,
) -> QueryResult<usize> {
    diesel::update(chapter::table.find(id))
        .set((
            changes
                .chapter_number
                .map(|number| chapter::chapter_number.eq(number)),
            changes.deadline.map(|deadline| chapter::deadline.eq(deadline)),
            chapter::updated_at.eq(now),
        ))
        .execute(conn)
        .await
}

/// ## Summary
/// Deletes a chapter, returning the rows removed.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn delete_chapter(conn: &mut DbConnection<'_>, id: Uuid) -> QueryResult<usize> {
    diesel::delete(chapter::table.find(id)).execute(conn).await
}

// Resolution

/// ## Summary
/// Resolves one content item with its course and title fragments.
///
/// Returns `None` if no item of that kind has the id.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn resolve_item(
    conn: &mut DbConnection<'_>,
    kind: EventKind,
    id: Uuid,
) -> QueryResult<Option<ContentItem>> {
    let item = match kind {
        EventKind::Assignment => assignment::table
            .inner_join(course::table)
            .filter(assignment::id.eq(id))
            .select((Assignment::as_select(), Course::as_select()))
            .first(conn)
            .await
            .optional()?
            .map(assignment_item),
        EventKind::Article => article::table
            .inner_join(course::table)
            .filter(article::id.eq(id))
            .select((Article::as_select(), Course::as_select()))
            .first(conn)
            .await
            .optional()?
            .map(article_item),
        EventKind::Chapter => chapter::table
            .inner_join(book::table.inner_join(course::table))
            .filter(chapter::id.eq(id))
            .select((Chapter::as_select(), Book::as_select(), Course::as_select()))
            .first(conn)
            .await
            .optional()?
            .map(chapter_item),
    };
    Ok(item)
}

/// ## Summary
/// Resolves every content item currently owned by a course.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn items_for_course(
    conn: &mut DbConnection<'_>,
    course_id: Uuid,
) -> QueryResult<Vec<ContentItem>> {
    let assignments: Vec<(Assignment, Course)> = assignment::table
        .inner_join(course::table)
        .filter(assignment::course_id.eq(course_id))
        .select((Assignment::as_select(), Course::as_select()))
        .order(assignment::id.asc())
        .load(conn)
        .await?;

    let articles: Vec<(Article, Course)> = article::table
        .inner_join(course::table)
        .filter(article::course_id.eq(course_id))
        .select((Article::as_select(), Course::as_select()))
        .order(article::id.asc())
        .load(conn)
        .await?;

    let chapters: Vec<(Chapter, Book, Course)> = chapter::table
        .inner_join(book::table.inner_join(course::table))
        .filter(book::course_id.eq(course_id))
        .select((Chapter::as_select(), Book::as_select(), Course::as_select()))
        .order(chapter::id.asc())
        .load(conn)
        .await?;

    let mut items = Vec::with_capacity(assignments.len() + articles.len() + chapters.len());
    items.extend(assignments.into_iter().map(assignment_item));
    items.extend(articles.into_iter().map(article_item));
    items.extend(chapters.into_iter().map(chapter_item));
    Ok(items)
}

/// ## Summary
/// Resolves every chapter of a book.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn chapters_for_book(
    conn: &mut DbConnection<'_>,
    book_id: Uuid,
) -> QueryResult<Vec<ContentItem>> {
    let chapters: Vec<(Chapter, Book, Course)> = chapter::table
        .inner_join(book::table.inner_join(course::table))
        .filter(chapter::book_id.eq(book_id))
        .select((Chapter::as_select(), Book::as_select(), Course::as_select()))
        .order(chapter::id.asc())
        .load(conn)
        .await?;

    Ok(chapters.into_iter().map(chapter_item).collect())
}
