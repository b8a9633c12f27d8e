//! Deadline-bearing content owned by courses, and the resolved view of it
//! the calendar index works from.

use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::enums::EventKind;
use crate::{db::schema, model};

#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Identifiable,
    Queryable,
    Selectable,
    Associations,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = schema::assignment)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(model::course::Course, foreign_key = course_id))]
pub struct Assignment {
    pub id: uuid::Uuid,
    pub course_id: uuid::Uuid,
    pub title: String,
    pub deadline: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::assignment)]
pub struct NewAssignment<'a> {
    pub id: uuid::Uuid,
    pub course_id: uuid::Uuid,
    pub title: &'a str,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Identifiable,
    Queryable,
    Selectable,
    Associations,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = schema::article)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(model::course::Course, foreign_key = course_id))]
pub struct Article {
    pub id: uuid::Uuid,
    pub course_id: uuid::Uuid,
    pub title: String,
    pub deadline: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::article)]
pub struct NewArticle<'a> {
    pub id: uuid::Uuid,
    pub course_id: uuid::Uuid,
    pub title: &'a str,
    pub deadline: Option<DateTime<Utc>>,
}

/// Partial update for assignments and articles; `None` leaves a column alone.
///
/// `deadline: Some(None)` clears the deadline.
#[derive(Debug, Clone, Default)]
pub struct TitledChanges<'a> {
    pub title: Option<&'a str>,
    pub deadline: Option<Option<DateTime<Utc>>>,
}

#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Identifiable,
    Queryable,
    Selectable,
    Associations,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = schema::book)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(model::course::Course, foreign_key = course_id))]
pub struct Book {
    pub id: uuid::Uuid,
    pub course_id: uuid::Uuid,
    pub title: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::book)]
pub struct NewBook<'a> {
    pub id: uuid::Uuid,
    pub course_id: uuid::Uuid,
    pub title: &'a str,
}

#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Identifiable,
    Queryable,
    Selectable,
    Associations,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = schema::chapter)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(Book, foreign_key = book_id))]
pub struct Chapter {
    pub id: uuid::Uuid,
    pub book_id: uuid::Uuid,
    pub chapter_number: i32,
    pub deadline: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::chapter)]
pub struct NewChapter {
    pub id: uuid::Uuid,
    pub book_id: uuid::Uuid,
    pub chapter_number: i32,
    pub deadline: Option<DateTime<Utc>>,
}

/// Partial update for chapters; `None` leaves a column alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChapterChanges {
    pub chapter_number: Option<i32>,
    pub deadline: Option<Option<DateTime<Utc>>>,
}

/// Owning course fields that appear in event summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRef {
    pub id: uuid::Uuid,
    pub code: String,
    pub name: String,
}

/// Kind-specific title fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemTitle {
    /// Assignments and articles carry their own title.
    Titled(String),
    /// Chapters are named after their number and book.
    Chapter { number: i32, book_title: String },
}

/// A content item resolved together with everything its calendar rows
/// are derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    pub kind: EventKind,
    pub id: uuid::Uuid,
    pub course: CourseRef,
    pub title: ItemTitle,
    pub deadline: Option<DateTime<Utc>>,
}
