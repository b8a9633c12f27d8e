//! Per-user calendar index and its iCalendar rendering.
//!
//! ## Module Organization
//!
//! - `uid`: stable event identifiers
//! - `summary`: display strings for events
//! - `maintainer`: keeps `calendar_event` in step with enrollments and content
//! - `feed`: renders a user's rows as an iCalendar document
//! - `conditional`: weak validators and conditional GET evaluation
//! - `gateway`: answers feed requests for a resolved user
//! - `token`: opaque tokens for public feed access

pub mod conditional;
pub mod feed;
pub mod gateway;
pub mod maintainer;
pub mod summary;
pub mod token;
pub mod uid;

pub use conditional::{FeedValidator, Freshness};
pub use gateway::{FeedOutcome, Preconditions, serve_feed};
pub use feed::build_feed;
pub use maintainer::ContentField;
