//! Opaque calendar tokens for public feed access.
//!
//! A user has at most one token. It is created on first request and lives
//! until rotated; rotation replaces it in place, so the old value stops
//! resolving immediately.

use chrono::Utc;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;
use rand::RngCore;
use rand::rngs::OsRng;
use uuid::Uuid;

use coursecal_db::db::connection::DbConnection;
use coursecal_db::db::query::calendar_token;
use coursecal_db::model::calendar_token::NewCalendarToken;

use crate::error::{ServiceError, ServiceResult};

/// Random bytes per token; hex encoding doubles the length.
pub const TOKEN_BYTES: usize = 32;
pub const TOKEN_LEN: usize = TOKEN_BYTES * 2;

/// Generates a fresh token from the OS CSPRNG.
#[must_use]
pub fn mint_token() -> String {
    let mut bytes = [0_u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Whether `token` has the shape of a minted token (lowercase hex).
#[must_use]
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// ## Summary
/// Returns the user's token, creating one if none exists.
///
/// Concurrent callers for the same user converge on a single token: the
/// loser of the insert race reads back the winner's value.
///
/// ## Side Effects
/// - May insert a `calendar_token` row
///
/// ## Errors
/// Returns an error if the database operation fails.
#[tracing::instrument(skip(conn))]
pub async fn get_or_create(conn: &mut DbConnection<'_>, user_id: Uuid) -> ServiceResult<String> {
    if let Some(existing) = calendar_token::by_user(conn, user_id).await? {
        return Ok(existing.token);
    }

    let token = mint_token();
    let token_for_tx = token.clone();
    let inserted = conn
        .transaction::<_, DieselError, _>(move |tx| {
            async move {
                let new_token = NewCalendarToken {
                    token: &token_for_tx,
                    user_id,
                    created_at: Utc::now(),
                };
                calendar_token::insert(tx, &new_token).await
            }
            .scope_boxed()
        })
        .await;

    match inserted {
        Ok(row) => {
            tracing::info!(user_id = %user_id, "Calendar token created");
            Ok(row.token)
        }
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            tracing::debug!("Concurrent token creation, reading the stored token");
            calendar_token::by_user(conn, user_id)
                .await?
                .map(|row| row.token)
                .ok_or_else(|| {
                    ServiceError::Conflict("calendar token collided with another user".to_string())
                })
        }
        Err(e) => Err(e.into()),
    }
}

/// ## Summary
/// Replaces the user's token with a fresh one in a single statement.
///
/// ## Side Effects
/// - Inserts or overwrites the user's `calendar_token` row
///
/// ## Errors
/// Returns an error if the database operation fails.
#[tracing::instrument(skip(conn))]
pub async fn rotate(conn: &mut DbConnection<'_>, user_id: Uuid) -> ServiceResult<String> {
    let token = mint_token();
    let new_token = NewCalendarToken {
        token: &token,
        user_id,
        created_at: Utc::now(),
    };
    let row = calendar_token::replace_for_user(conn, &new_token).await?;

    tracing::info!(user_id = %user_id, "Calendar token rotated");
    Ok(row.token)
}

/// ## Summary
/// Resolves a token to its user.
///
/// Values that could never have been minted are rejected without a query.
///
/// ## Errors
/// Returns an error if the database operation fails.
#[tracing::instrument(skip_all)]
pub async fn resolve(conn: &mut DbConnection<'_>, token: &str) -> ServiceResult<Option<Uuid>> {
    if !is_well_formed(token) {
        tracing::debug!("Malformed calendar token");
        return Ok(None);
    }

    Ok(calendar_token::by_token(conn, token)
        .await?
        .map(|row| row.user_id))
}

/// ## Summary
/// Records that a token was used. Failures are logged and swallowed.
#[tracing::instrument(skip_all)]
pub async fn touch(conn: &mut DbConnection<'_>, token: &str) {
    if let Err(e) = calendar_token::touch(conn, token, Utc::now()).await {
        tracing::warn!(error = %e, "Failed to record calendar token use");
    }
}
