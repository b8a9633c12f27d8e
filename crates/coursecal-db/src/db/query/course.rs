//! Query functions for `course`.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::schema::course;
use crate::model::course::{Course, NewCourse};

/// ## Summary
/// Looks up a course by id.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn by_id(conn: &mut DbConnection<'_>, course_id: Uuid) -> QueryResult<Option<Course>> {
    course::table
        .find(course_id)
        .select(Course::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Inserts a course and returns the stored row.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert(conn: &mut DbConnection<'_>, new_course: &NewCourse<'_>) -> QueryResult<Course> {
    diesel::insert_into(course::table)
        .values(new_course)
        .returning(Course::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Sets a course's code and name, returning the updated row if it exists.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn rename(
    conn: &mut DbConnection<'_>,
    course_id: Uuid,
    code: &str,
    name: &str,
    now: DateTime<Utc>,
) -> QueryResult<Option<Course>> {
    diesel::update(course::table.find(course_id))
        .set((
            course::code.eq(code),
            course::name.eq(name),
            course::updated_at.eq(now),
        ))
        .returning(Course::as_returning())
        .get_result(conn)
        .await
        .optional()
}

/// ## Summary
/// Locks a course row against concurrent enrollment and content writes for
/// the rest of the transaction. Returns `None` if the course does not exist.
///
/// `FOR NO KEY UPDATE` conflicts with itself but not with the `KEY SHARE`
/// locks taken by foreign-key inserts.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn lock(conn: &mut DbConnection<'_>, course_id: Uuid) -> QueryResult<Option<Uuid>> {
    course::table
        .find(course_id)
        .select(course::id)
        .for_no_key_update()
        .first(conn)
        .await
        .optional()
}
