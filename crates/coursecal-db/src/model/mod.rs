pub mod calendar_event;
pub mod calendar_token;
pub mod content;
pub mod course;
pub mod enrollment;
pub mod user;
