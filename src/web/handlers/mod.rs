//! HTTP request handlers for the CodeLoop web API.

pub mod loops;
