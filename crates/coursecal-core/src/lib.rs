//! Shared configuration, errors and route constants.

pub mod config;
pub mod constants;
pub mod error;
