use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use coursecal_db::db::connection::DbConnection;
use coursecal_db::db::query::{course, enrollment, user};
use coursecal_db::model::enrollment::NewEnrollment;

use super::course::lock_course;
use crate::calendar::maintainer;
use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Enrolls a user in a course and materializes the course's items for them.
///
/// Enrolling twice is harmless: the second call finds every row current.
///
/// ## Side Effects
/// - Locks the course until commit
/// - Inserts the enrollment row if absent
/// - Inserts or revives the user's events for the course
///
/// ## Errors
/// Returns `NotFound` if the user or course does not exist, or an error if
/// any write fails; nothing is applied then.
#[tracing::instrument(skip(conn))]
pub async fn enroll(
    conn: &mut DbConnection<'_>,
    user_id: Uuid,
    course_id: Uuid,
) -> ServiceResult<usize> {
    conn.transaction::<_, ServiceError, _>(|tx| {
        async move {
            lock_course(tx, course_id).await?;
            if user::by_id(tx, user_id).await?.is_none() {
                return Err(ServiceError::NotFound(format!("user {user_id}")));
            }

            let inserted =
                enrollment::insert_if_absent(tx, &NewEnrollment { user_id, course_id }).await?;
            if inserted == 0 {
                tracing::debug!("Already enrolled");
            }

            maintainer::on_enroll(tx, user_id, course_id).await
        }
        .scope_boxed()
    })
    .await
}

/// ## Summary
/// Removes a user from a course and tombstones their events for it.
///
/// ## Side Effects
/// - Locks the course until commit
/// - Deletes the enrollment row
/// - Tombstones the user's live events for the course
///
/// ## Errors
/// Returns an error if any write fails; nothing is applied then.
#[tracing::instrument(skip(conn))]
pub async fn unenroll(
    conn: &mut DbConnection<'_>,
    user_id: Uuid,
    course_id: Uuid,
) -> ServiceResult<usize> {
    conn.transaction::<_, ServiceError, _>(|tx| {
        async move {
            if course::lock(tx, course_id).await?.is_none() {
                tracing::debug!("Course does not exist");
            }

            let removed = enrollment::delete(tx, user_id, course_id).await?;
            if removed == 0 {
                tracing::debug!("Was not enrolled");
            }

            maintainer::on_unenroll(tx, user_id, course_id).await
        }
        .scope_boxed()
    })
    .await
}
