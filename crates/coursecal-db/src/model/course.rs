use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::schema;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::course)]
#[diesel(check_for_backend(Pg))]
pub struct Course {
    pub id: uuid::Uuid,
    /// Short code shown in brackets, e.g. `CS1`.
    pub code: String,
    pub name: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::course)]
pub struct NewCourse<'a> {
    pub id: uuid::Uuid,
    pub code: &'a str,
    pub name: &'a str,
}
