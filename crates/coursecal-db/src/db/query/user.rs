//! Query functions for `app_user`.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::schema::app_user;
use crate::model::user::{NewUser, User};

/// ## Summary
/// Looks up a user by id.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn by_id(conn: &mut DbConnection<'_>, user_id: Uuid) -> QueryResult<Option<User>> {
    app_user::table
        .find(user_id)
        .select(User::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Looks up a user by email address.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn by_email(conn: &mut DbConnection<'_>, email: &str) -> QueryResult<Option<User>> {
    app_user::table
        .filter(app_user::email.eq(email))
        .select(User::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Inserts a user and returns the stored row.
///
/// ## Errors
/// Returns an error if the email is taken or the database operation fails.
pub async fn insert(conn: &mut DbConnection<'_>, user: &NewUser<'_>) -> QueryResult<User> {
    diesel::insert_into(app_user::table)
        .values(user)
        .returning(User::as_returning())
        .get_result(conn)
        .await
}
