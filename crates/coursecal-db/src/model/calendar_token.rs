use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

/// Opaque token granting read access to one user's public feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Identifiable, Queryable, Selectable)]
#[diesel(table_name = schema::calendar_token)]
#[diesel(check_for_backend(Pg))]
#[diesel(primary_key(token))]
pub struct CalendarToken {
    pub token: String,
    pub user_id: uuid::Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_used_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::calendar_token)]
pub struct NewCalendarToken<'a> {
    pub token: &'a str,
    pub user_id: uuid::Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
