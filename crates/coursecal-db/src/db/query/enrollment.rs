//! Query functions for `enrollment`.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::schema::enrollment;
use crate::model::enrollment::NewEnrollment;

/// ## Summary
/// Inserts an enrollment unless it already exists.
///
/// Returns the number of rows inserted (0 or 1).
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert_if_absent(
    conn: &mut DbConnection<'_>,
    new_enrollment: &NewEnrollment,
) -> QueryResult<usize> {
    diesel::insert_into(enrollment::table)
        .values(new_enrollment)
        .on_conflict_do_nothing()
        .execute(conn)
        .await
}

/// ## Summary
/// Deletes an enrollment, returning the number of rows removed.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn delete(conn: &mut DbConnection<'_>, user_id: Uuid, course_id: Uuid) -> QueryResult<usize> {
    diesel::delete(enrollment::table.find((user_id, course_id)))
        .execute(conn)
        .await
}

/// ## Summary
/// Returns the ids of every user enrolled in a course.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn user_ids_for_course(
    conn: &mut DbConnection<'_>,
    course_id: Uuid,
) -> QueryResult<Vec<Uuid>> {
    enrollment::table
        .filter(enrollment::course_id.eq(course_id))
        .select(enrollment::user_id)
        .order(enrollment::user_id.asc())
        .load(conn)
        .await
}
