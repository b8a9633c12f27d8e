use coursecal_core::constants::EVENT_UID_PREFIX;
use coursecal_db::db::enums::EventKind;
use uuid::Uuid;

/// ## Summary
/// Derives the UID of the calendar event for one content item and user.
///
/// The result depends only on its inputs, so re-materializing an item for the
/// same user always lands on the same row.
#[must_use]
pub fn event_uid(kind: EventKind, source_id: Uuid, user_id: Uuid) -> String {
    format!("{EVENT_UID_PREFIX}:{kind}:{source_id}:user:{user_id}")
}
