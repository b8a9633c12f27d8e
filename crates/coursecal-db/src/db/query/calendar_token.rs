//! Query functions for `calendar_token`.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::schema::calendar_token;
use crate::model::calendar_token::{CalendarToken, NewCalendarToken};

/// ## Summary
/// Looks up the token of a user.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn by_user(
    conn: &mut DbConnection<'_>,
    user_id: Uuid,
) -> QueryResult<Option<CalendarToken>> {
    calendar_token::table
        .filter(calendar_token::user_id.eq(user_id))
        .select(CalendarToken::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Looks up a token row by its token value.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn by_token(
    conn: &mut DbConnection<'_>,
    token: &str,
) -> QueryResult<Option<CalendarToken>> {
    calendar_token::table
        .find(token)
        .select(CalendarToken::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Inserts a token.
///
/// ## Errors
/// Returns a `UniqueViolation` if the user already has a token, or another
/// error if the database operation fails.
pub async fn insert(
    conn: &mut DbConnection<'_>,
    new_token: &NewCalendarToken<'_>,
) -> QueryResult<CalendarToken> {
    diesel::insert_into(calendar_token::table)
        .values(new_token)
        .returning(CalendarToken::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Stores `new_token` as the user's token, replacing any existing one in a
/// single statement.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn replace_for_user(
    conn: &mut DbConnection<'_>,
    new_token: &NewCalendarToken<'_>,
) -> QueryResult<CalendarToken> {
    diesel::insert_into(calendar_token::table)
        .values(new_token)
        .on_conflict(calendar_token::user_id)
        .do_update()
        .set((
            calendar_token::token.eq(excluded(calendar_token::token)),
            calendar_token::created_at.eq(excluded(calendar_token::created_at)),
            calendar_token::last_used_at.eq(None::<DateTime<Utc>>),
        ))
        .returning(CalendarToken::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Stamps `last_used_at` on a token.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn touch(conn: &mut DbConnection<'_>, token: &str, now: DateTime<Utc>) -> QueryResult<usize> {
    diesel::update(calendar_token::table.find(token))
        .set(calendar_token::last_used_at.eq(now))
        .execute(conn)
        .await
}
