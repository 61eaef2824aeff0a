//! # Librarian Service
//!
//! Translates named requests into library calls and marshals the outcome
//! into response messages. Transports only see `dispatch` and the JSON values
//! going through it.

mod encoding;
mod handlers;
pub mod protocol;

pub use handlers::{DispatchError, LibrarianService, METHODS};
pub use protocol::{Status, StatusResult};
