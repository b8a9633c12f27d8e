use coursecal_db::db::connection::DbConnection;
use coursecal_db::db::query::user;
use coursecal_db::model::user::{NewUser, User};

use crate::error::ServiceResult;

/// ## Summary
/// Creates a user.
///
/// ## Errors
/// Returns an error if the email is taken or the insert fails.
#[tracing::instrument(skip(conn))]
pub async fn create_user(conn: &mut DbConnection<'_>, name: &str, email: &str) -> ServiceResult<User> {
    let new_user = NewUser {
        id: uuid::Uuid::now_v7(),
        name,
        email,
    };
    let created = user::insert(conn, &new_user).await?;
    tracing::debug!(user_id = %created.id, "User created");
    Ok(created)
}
