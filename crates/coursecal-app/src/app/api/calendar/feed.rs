use salvo::http::header::{
    CONTENT_DISPOSITION, CONTENT_TYPE, ETAG, HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH,
    LAST_MODIFIED,
};
use salvo::http::{HeaderValue, StatusCode};
use salvo::writing::Json;
use salvo::{Depot, Request, Response, handler};
use tracing::error;
use uuid::Uuid;

use coursecal_core::constants::FEED_EXTENSION;
use coursecal_db::db::connection::DbConnection;
use coursecal_service::auth::get_user_from_depot;
use coursecal_service::calendar::{FeedOutcome, FeedValidator, Preconditions, serve_feed, token};

use super::ErrorResponse;
use crate::config::get_config_from_depot;
use crate::db_handler::get_db_from_depot;

const CALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";
const CALENDAR_DISPOSITION: &str = "inline; filename=calendar.ics";

/// ## Summary
/// `GET /api/calendar.ics`: the authenticated user's feed.
///
/// ## Errors
/// Returns HTTP 401 without an identity, 304 when the client's copy is
/// current, and 500 if the store fails.
#[handler]
pub async fn authenticated_feed(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Ok(user) = get_user_from_depot(depot) else {
        res.status_code(StatusCode::UNAUTHORIZED);
        res.render(Json(ErrorResponse {
            error: "Not authenticated".to_string(),
        }));
        return;
    };
    let user_id = user.id;

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };
    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to get database connection");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    respond_with_feed(req, depot, res, &mut conn, user_id).await;
}

/// ## Summary
/// `GET /api/calendar/{token}.ics`: public feed addressed by opaque token.
///
/// ## Side Effects
/// Records the token's last use, best effort.
///
/// ## Errors
/// Returns HTTP 404 for an unknown, rotated or malformed token, 304 when the
/// client's copy is current, and 500 if the store fails.
#[handler]
pub async fn public_feed(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(file) = req.param::<String>("file") else {
        res.status_code(StatusCode::NOT_FOUND);
        return;
    };
    let Some(calendar_token) = file
        .strip_suffix(FEED_EXTENSION)
        .filter(|t| token::is_well_formed(t))
    else {
        tracing::debug!("Public feed path is not a token");
        res.status_code(StatusCode::NOT_FOUND);
        return;
    };

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };
    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to get database connection");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    let user_id = match token::resolve(&mut conn, calendar_token).await {
        Ok(Some(user_id)) => user_id,
        Ok(None) => {
            tracing::debug!("Unknown calendar token");
            res.status_code(StatusCode::NOT_FOUND);
            return;
        }
        Err(e) => {
            error!(error = %e, "Failed to resolve calendar token");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    token::touch(&mut conn, calendar_token).await;

    respond_with_feed(req, depot, res, &mut conn, user_id).await;
}

/// Shared tail of both feed endpoints once the user is known.
async fn respond_with_feed(
    req: &Request,
    depot: &Depot,
    res: &mut Response,
    conn: &mut DbConnection<'_>,
    user_id: Uuid,
) {
    let config = match get_config_from_depot(depot) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "Failed to get config from depot");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    let preconditions = Preconditions {
        if_none_match: header_str(req, &IF_NONE_MATCH),
        if_modified_since: header_str(req, &IF_MODIFIED_SINCE),
    };

    match serve_feed(conn, user_id, &config.calendar, preconditions).await {
        Ok(FeedOutcome::NotModified(validator)) => {
            set_validator_headers(res, &validator);
            res.status_code(StatusCode::NOT_MODIFIED);
        }
        Ok(FeedOutcome::Feed { validator, body }) => {
            set_validator_headers(res, &validator);
            set_header(res, CONTENT_TYPE, CALENDAR_CONTENT_TYPE);
            set_header(res, CONTENT_DISPOSITION, CALENDAR_DISPOSITION);
            res.status_code(StatusCode::OK);
            if let Err(e) = res.write_body(body) {
                error!(error = %e, "Failed to write feed body");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
        Err(e) => {
            error!(error = %e, user_id = %user_id, "Failed to serve calendar feed");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

fn header_str<'r>(req: &'r Request, name: &HeaderName) -> Option<&'r str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

fn set_validator_headers(res: &mut Response, validator: &FeedValidator) {
    set_header(res, ETAG, &validator.etag);
    set_header(res, LAST_MODIFIED, &validator.last_modified_http_date());
}

fn set_header(res: &mut Response, name: HeaderName, value: &str) {
    if let Ok(header_value) = HeaderValue::from_str(value) {
        #[expect(
            clippy::let_underscore_must_use,
            reason = "Header addition failure is non-fatal"
        )]
        let _ = res.add_header(name, header_value, true);
    }
}
