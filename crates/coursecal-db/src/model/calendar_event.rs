use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};

use crate::db::enums::EventKind;
use crate::db::schema;

/// Materialized calendar row for one (content item, user) pair.
///
/// A non-null `cancelled_at` marks a tombstone; such rows are kept so clients
/// that already imported the event see it cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Identifiable, Queryable, Selectable)]
#[diesel(table_name = schema::calendar_event)]
#[diesel(check_for_backend(Pg))]
#[diesel(primary_key(uid))]
pub struct CalendarEvent {
    pub uid: String,
    pub user_id: uuid::Uuid,
    pub kind: EventKind,
    pub source_id: uuid::Uuid,
    pub summary: String,
    pub deadline: Option<DateTime<Utc>>,
    pub completed: bool,
    pub revision: i32,
    pub last_modified: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl CalendarEvent {
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled_at.is_some()
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::calendar_event)]
pub struct NewCalendarEvent<'a> {
    pub uid: &'a str,
    pub user_id: uuid::Uuid,
    pub kind: EventKind,
    pub source_id: uuid::Uuid,
    pub summary: &'a str,
    pub deadline: Option<DateTime<Utc>>,
    pub revision: i32,
    pub last_modified: DateTime<Utc>,
}

/// Change validator inputs for one user's feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventStamp {
    /// Latest `last_modified` over the user's rows, `None` when there are none.
    pub max_last_modified: Option<DateTime<Utc>>,
    pub count: i64,
}
