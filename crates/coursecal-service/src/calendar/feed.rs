//! Renders one user's calendar rows as an iCalendar document.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use coursecal_db::model::calendar_event::CalendarEvent;
use coursecal_rfc::ical::build::ContentWriter;

use crate::error::ServiceResult;

/// Fixed length of every rendered occurrence; the deadline is its end.
const OCCURRENCE_LENGTH: Duration = Duration::hours(1);

/// ## Summary
/// Builds the iCalendar text for a user's rows.
///
/// Rows without a deadline are skipped. Tombstoned rows that still have a
/// deadline are emitted as `STATUS:CANCELLED` so subscribed clients drop
/// them. Output order is by deadline, then kind, then source id, regardless
/// of the order of `events`.
///
/// ## Errors
/// Returns an error if the writer rejects a line, which only happens for
/// malformed property values.
pub fn build_feed(events: &[CalendarEvent], tz: Tz, product_id: &str) -> ServiceResult<String> {
    let mut dated: Vec<(&CalendarEvent, DateTime<Utc>)> = events
        .iter()
        .filter_map(|event| event.deadline.map(|deadline| (event, deadline)))
        .collect();
    dated.sort_by(|(a, a_deadline), (b, b_deadline)| {
        a_deadline
            .cmp(b_deadline)
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| a.source_id.cmp(&b.source_id))
    });

    tracing::trace!(
        total = events.len(),
        rendered = dated.len(),
        "Rendering calendar feed"
    );

    let mut w = ContentWriter::new();
    w.begin("VCALENDAR");
    w.property("PRODID", product_id)?;
    w.property("VERSION", "2.0")?;
    w.property("CALSCALE", "GREGORIAN")?;
    w.property("METHOD", "PUBLISH")?;

    for (event, deadline) in dated {
        write_event(&mut w, event, deadline, tz)?;
    }

    w.end("VCALENDAR")?;
    Ok(w.finish()?)
}

fn write_event(
    w: &mut ContentWriter,
    event: &CalendarEvent,
    deadline: DateTime<Utc>,
    tz: Tz,
) -> ServiceResult<()> {
    let end = deadline.with_timezone(&tz);
    let start = end - OCCURRENCE_LENGTH;
    let status = if event.is_cancelled() {
        "CANCELLED"
    } else {
        "CONFIRMED"
    };

    w.begin("VEVENT");
    w.property("UID", &event.uid)?;
    w.utc_datetime_property("DTSTAMP", &event.last_modified)?;
    w.utc_datetime_property("DTSTART", &start.with_timezone(&Utc))?;
    w.utc_datetime_property("DTEND", &end.with_timezone(&Utc))?;
    w.text_property("SUMMARY", &event.summary)?;
    w.property("SEQUENCE", &event.revision.to_string())?;
    w.property("STATUS", status)?;
    w.end("VEVENT")?;
    Ok(())
}
