use chrono::Utc;
use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use coursecal_db::db::connection::DbConnection;
use coursecal_db::db::query::course;
use coursecal_db::model::course::{Course, NewCourse};

use crate::calendar::maintainer;
use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Creates a course.
///
/// ## Errors
/// Returns an error if the insert fails.
#[tracing::instrument(skip(conn))]
pub async fn create_course(conn: &mut DbConnection<'_>, code: &str, name: &str) -> ServiceResult<Course> {
    let new_course = NewCourse {
        id: Uuid::now_v7(),
        code,
        name,
    };
    Ok(course::insert(conn, &new_course).await?)
}

/// ## Summary
/// Changes a course's code and name and rewrites every event summary that
/// embeds them.
///
/// ## Side Effects
/// - Updates the course row
/// - Bumps the revision of every event of the course's items
///
/// ## Errors
/// Returns `NotFound` if the course does not exist, or an error if any write
/// fails; nothing is applied then.
#[tracing::instrument(skip(conn))]
pub async fn rename_course(
    conn: &mut DbConnection<'_>,
    course_id: Uuid,
    code: &str,
    name: &str,
) -> ServiceResult<Course> {
    let code = code.to_owned();
    let name = name.to_owned();
    conn.transaction::<_, ServiceError, _>(move |tx| {
        async move {
            lock_course(tx, course_id).await?;
            let renamed = course::rename(tx, course_id, &code, &name, Utc::now())
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("course {course_id}")))?;
            maintainer::on_course_renamed(tx, course_id).await?;
            Ok(renamed)
        }
        .scope_boxed()
    })
    .await
}

/// ## Summary
/// Locks a course for the rest of the caller's transaction.
///
/// Every write that changes which items or enrollments a course has takes
/// this lock first, so the maintainer step that follows sees every commit
/// that raced with it.
///
/// ## Errors
/// Returns `NotFound` if the course does not exist.
pub(crate) async fn lock_course(tx: &mut DbConnection<'_>, course_id: Uuid) -> ServiceResult<()> {
    course::lock(tx, course_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("course {course_id}")))?;
    Ok(())
}
