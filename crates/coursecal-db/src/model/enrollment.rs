use crate::{db::schema, model};
use diesel::{pg::Pg, prelude::*};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = schema::enrollment)]
#[diesel(check_for_backend(Pg))]
#[diesel(primary_key(user_id, course_id))]
#[diesel(belongs_to(model::user::User, foreign_key = user_id))]
#[diesel(belongs_to(model::course::Course, foreign_key = course_id))]
pub struct Enrollment {
    pub user_id: uuid::Uuid,
    pub course_id: uuid::Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Insertable)]
#[diesel(table_name = schema::enrollment)]
pub struct NewEnrollment {
    pub user_id: uuid::Uuid,
    pub course_id: uuid::Uuid,
}
