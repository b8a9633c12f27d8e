//! RFC 5545 output support for calendar feeds.

pub mod error;
pub mod ical;
