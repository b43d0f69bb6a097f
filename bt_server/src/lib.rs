//! Administrative HTTP server for beach-tennis group-stage scheduling.

pub mod api;
pub mod config;
pub mod logging;
