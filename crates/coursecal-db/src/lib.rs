//! Persistence for course deadline feeds: schema, models, pool and queries.

pub mod db;
pub mod error;
pub mod model;
