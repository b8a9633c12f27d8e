//! Calendar feed and token endpoints.
//!
//! - `GET /api/calendar.ics`: the authenticated user's feed
//! - `GET /api/calendar/{token}.ics`: public feed by opaque token
//! - `GET /api/calendar/token`: the user's token, created on first request
//! - `POST /api/calendar/token/rotate`: replace the user's token

mod feed;
mod token;

use salvo::Router;
use serde::Serialize;

use coursecal_core::constants::{
    AUTHED_FEED_COMPONENT, CALENDAR_ROUTE_COMPONENT, TOKEN_ROTATE_ROUTE_COMPONENT,
    TOKEN_ROUTE_COMPONENT,
};

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[must_use]
pub fn routes() -> Router {
    Router::new()
        .push(Router::with_path(AUTHED_FEED_COMPONENT).get(feed::authenticated_feed))
        .push(
            Router::with_path(CALENDAR_ROUTE_COMPONENT)
                .push(
                    Router::with_path(TOKEN_ROUTE_COMPONENT)
                        .get(token::get_token)
                        .push(
                            Router::with_path(TOKEN_ROTATE_ROUTE_COMPONENT)
                                .post(token::rotate_token),
                        ),
                )
                .push(Router::with_path("{file}").get(feed::public_feed)),
        )
}
