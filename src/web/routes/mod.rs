//! Route definitions for the CodeLoop web server.

pub mod api;
