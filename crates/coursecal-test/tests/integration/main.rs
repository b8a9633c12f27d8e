//! Integration tests against a real PostgreSQL database.
//!
//! Set `TEST_DATABASE_URL` to the server root (without a database name).

mod helpers;
mod token;
