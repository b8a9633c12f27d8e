use coursecal_core::config::{AuthMethod, DEFAULT_PROXY_USER_HEADER, Settings};
use coursecal_db::db::connection::DbConnection;
use coursecal_db::db::query::user;
use coursecal_db::model::user::{NewUser, User};

use crate::error::{ServiceError, ServiceResult};

/// Get the user configured in settings for single user authentication.
///
/// If it doesn't exist, insert it into the database.
///
/// ## Errors
///
/// Returns an error if the user cannot be created or retrieved from the database.
#[tracing::instrument(skip(conn, config))]
async fn authenticate_single_user(
    conn: &mut DbConnection<'_>,
    config: &Settings,
) -> ServiceResult<User> {
    tracing::debug!("Authenticating single user");

    let single_user_config =
        config
            .auth
            .single_user
            .as_ref()
            .ok_or(ServiceError::InvalidConfiguration(
                "Single user config is missing".to_string(),
            ))?;

    if let Some(existing) = user::by_email(conn, &single_user_config.email).await? {
        tracing::trace!(user_email = %existing.email, "Single user already exists");
        return Ok(existing);
    }

    tracing::debug!(email = %single_user_config.email, "Creating single user");
    let new_user = NewUser {
        id: uuid::Uuid::now_v7(),
        name: &single_user_config.name,
        email: &single_user_config.email,
    };

    match user::insert(conn, &new_user).await {
        Ok(created) => {
            tracing::info!(user_id = %created.id, user_email = %created.email, "Single user created");
            Ok(created)
        }
        // Another request created it first.
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => user::by_email(conn, &single_user_config.email)
            .await?
            .ok_or(ServiceError::InvariantViolation(
                "single user missing after unique violation",
            )),
        Err(e) => Err(e.into()),
    }
}

/// Resolve the user id a trusted reverse proxy placed in the configured header.
///
/// ## Errors
///
/// Returns `NotAuthenticated` if the header is missing, is not a user id, or
/// names an unknown user.
#[tracing::instrument(skip(req, conn, config))]
async fn authenticate_proxy(
    req: &salvo::Request,
    conn: &mut DbConnection<'_>,
    config: &Settings,
) -> ServiceResult<User> {
    let header = config
        .auth
        .proxy
        .as_ref()
        .map_or(DEFAULT_PROXY_USER_HEADER, |proxy| proxy.user_header.as_str());

    let Some(value) = req.headers().get(header).and_then(|v| v.to_str().ok()) else {
        tracing::trace!(header, "Proxy identity header absent");
        return Err(ServiceError::NotAuthenticated);
    };

    let user_id = uuid::Uuid::parse_str(value.trim()).map_err(|_e| {
        tracing::debug!(header, "Proxy identity header is not a user id");
        ServiceError::NotAuthenticated
    })?;

    user::by_id(conn, user_id).await?.ok_or_else(|| {
        tracing::debug!(user_id = %user_id, "Proxy named an unknown user");
        ServiceError::NotAuthenticated
    })
}

/// ## Summary
/// Authenticate a user based on the configured authentication method.
///
/// ## Errors
/// Returns `NotAuthenticated` if the request carries no usable identity, or
/// another error if the lookup fails.
#[tracing::instrument(skip(req, conn, config))]
pub async fn authenticate(
    req: &salvo::Request,
    conn: &mut DbConnection<'_>,
    config: &Settings,
) -> ServiceResult<User> {
    tracing::trace!(auth_method = ?config.auth.method, "Authenticating request");

    match config.auth.method {
        AuthMethod::SingleUser => authenticate_single_user(conn, config).await,
        AuthMethod::Proxy => authenticate_proxy(req, conn, config).await,
    }
}
