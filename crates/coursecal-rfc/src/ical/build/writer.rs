//! Content-line writer for iCalendar documents.

use chrono::{DateTime, Utc};

use super::escape::escape_text;
use super::fold::fold_line;
use crate::error::{RfcError, RfcResult};

/// Formats an instant in the UTC `DATE-TIME` form (`19970714T173000Z`).
#[must_use]
pub fn format_utc_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Accumulates folded, CRLF-terminated content lines.
///
/// Components are tracked on a stack so that an `END` without a matching
/// `BEGIN`, or a document finished with open components, is reported instead
/// of silently producing malformed output.
#[derive(Debug, Default)]
pub struct ContentWriter {
    buf: String,
    open: Vec<&'static str>,
}

impl ContentWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `BEGIN:{component}`.
    pub fn begin(&mut self, component: &'static str) {
        self.push_line(&format!("BEGIN:{component}"));
        self.open.push(component);
    }

    /// ## Summary
    /// Writes `END:{component}`, closing the innermost open component.
    ///
    /// ## Errors
    /// Returns `ValidationError` if `component` is not the innermost open one.
    pub fn end(&mut self, component: &'static str) -> RfcResult<()> {
        match self.open.pop() {
            Some(open) if open == component => {
                self.push_line(&format!("END:{component}"));
                Ok(())
            }
            Some(open) => Err(RfcError::ValidationError(format!(
                "cannot end {component} while {open} is open"
            ))),
            None => Err(RfcError::ValidationError(format!(
                "cannot end {component}: no open component"
            ))),
        }
    }

    /// ## Summary
    /// Writes a property whose value is already in its wire form.
    ///
    /// ## Errors
    /// Returns `ValidationError` if the name is not an iana-token or the value
    /// contains a raw line break.
    pub fn property(&mut self, name: &str, value: &str) -> RfcResult<()> {
        validate_name(name)?;
        if value.contains(['\r', '\n']) {
            return Err(RfcError::ValidationError(format!(
                "raw line break in value of {name}"
            )));
        }
        self.push_line(&format!("{name}:{value}"));
        Ok(())
    }

    /// ## Summary
    /// Writes a TEXT property, escaping the value.
    ///
    /// ## Errors
    /// Returns `ValidationError` if the name is not an iana-token.
    pub fn text_property(&mut self, name: &str, value: &str) -> RfcResult<()> {
        self.property(name, &escape_text(value))
    }

    /// ## Summary
    /// Writes a `DATE-TIME` property in UTC form.
    ///
    /// ## Errors
    /// Returns `ValidationError` if the name is not an iana-token.
    pub fn utc_datetime_property(&mut self, name: &str, value: &DateTime<Utc>) -> RfcResult<()> {
        self.property(name, &format_utc_datetime(value))
    }

    /// ## Summary
    /// Returns the document text.
    ///
    /// ## Errors
    /// Returns `ValidationError` if a component was left open.
    pub fn finish(self) -> RfcResult<String> {
        if let Some(open) = self.open.last() {
            return Err(RfcError::ValidationError(format!(
                "component {open} was never ended"
            )));
        }
        Ok(self.buf)
    }

    fn push_line(&mut self, line: &str) {
        self.buf.push_str(&fold_line(line));
    }
}

fn validate_name(name: &str) -> RfcResult<()> {
    let valid = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(RfcError::ValidationError(format!(
            "invalid property name '{name}'"
        )))
    }
}
