//! iCalendar (RFC 5545) support.
//!
//! Only the output side is implemented: feeds are generated, never parsed.

pub mod build;
