//! HTTP API module.
//!
//! This module provides the request handler, the surfaces hosting it
//! (local server, Lambda runtime) and the shared wire types.

pub mod handler;
pub mod lambda;
pub mod logs;
pub mod server;
pub mod types;

pub use handler::handle;
pub use lambda::run_lambda;
pub use logs::*;
pub use server::{router, start_server};
pub use types::*;
