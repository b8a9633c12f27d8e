/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

pub const APP_ROUTE_COMPONENT: &str = "app";

pub const CALENDAR_ROUTE_COMPONENT: &str = "calendar";
pub const CALENDAR_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", CALENDAR_ROUTE_COMPONENT);

/// File extension of every served feed.
pub const FEED_EXTENSION: &str = ".ics";

/// Authenticated feed, relative to the API root.
pub const AUTHED_FEED_COMPONENT: &str = const_str::concat!(CALENDAR_ROUTE_COMPONENT, FEED_EXTENSION);

pub const TOKEN_ROUTE_COMPONENT: &str = "token";
pub const TOKEN_ROTATE_ROUTE_COMPONENT: &str = "rotate";

/// Namespace prefix of every calendar event UID.
pub const EVENT_UID_PREFIX: &str = "coursecal";

/// ## Summary
/// Builds the public feed path for an opaque calendar token.
#[must_use]
pub fn public_feed_path(token: &str) -> String {
    format!("{CALENDAR_ROUTE_PREFIX}/{token}{FEED_EXTENSION}")
}
