//! librarian - a namespaced file and archive store
//!
//! Records are grouped into types (directories under one root). Each record is
//! a flat file or a tar archive of named entries, reached through a fixed
//! table of service methods.

pub mod cli;
pub mod config;
pub mod http_server;
pub mod observability;
pub mod params;
pub mod service;
pub mod store;
