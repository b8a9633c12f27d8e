//! Query functions, one module per table family.
//!
//! Everything here takes a connection and returns `QueryResult`; transaction
//! boundaries belong to the callers.

pub mod calendar_event;
pub mod calendar_token;
pub mod content;
pub mod course;
pub mod enrollment;
pub mod user;
