//! Request authentication.
//!
//! - `authenticate`: resolves a request to a user (single user, proxy)
//! - `depot`: depot keys and accessors for the resolved identity

pub mod authenticate;
pub mod depot;

pub use depot::{DepotUser, get_user_from_depot, is_authenticated};
