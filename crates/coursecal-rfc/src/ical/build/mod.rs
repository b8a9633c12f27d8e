//! iCalendar serialization (RFC 5545).
//!
//! This module provides serializers for iCalendar content:
//! - Escape: TEXT value escaping
//! - Fold: Content line folding at 75 octets
//! - Writer: Component and property emission with CRLF line endings

mod escape;
mod fold;
mod writer;

pub use escape::escape_text;
pub use fold::fold_line;
pub use writer::{ContentWriter, format_utc_datetime};
