//! Calendar index maintenance, feed rendering, feed tokens and request
//! authentication for course deadline feeds.

pub mod auth;
pub mod calendar;
pub mod catalog;
pub mod error;
