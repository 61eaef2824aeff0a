//! # Librarian HTTP Server
//!
//! JSON-over-HTTP transport for the librarian service.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/librarian/{method}` - One POST endpoint per service method

pub mod config;
pub mod routes;
pub mod server;

pub use config::HttpServerConfig;
pub use server::LibrarianServer;
