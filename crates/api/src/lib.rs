//! HTTP API: CLI surface, routing, middleware and response mapping.

pub mod app;
pub mod cli;
pub mod middleware;
