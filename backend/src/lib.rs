//! Quote snapshot service: configuration, query path and HTTP surface.

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod query;
pub mod universe;
