//! Minimal write paths of the collaborators that feed the calendar index.
//!
//! Each function opens one transaction, performs its own row change and runs
//! the matching maintainer operation inside it, so the index can never
//! disagree with a committed write. These are not a general CRUD layer.

pub mod content;
pub mod course;
pub mod enrollment;
pub mod user;
