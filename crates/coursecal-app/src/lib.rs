//! HTTP surface of the course deadline feed server.

pub mod app;
pub mod config;
pub mod db_handler;
pub mod error;
pub mod middleware;
