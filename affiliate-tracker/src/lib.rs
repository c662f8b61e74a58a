//! affiliate-tracker library crate.
//!
//! REST backend for registering affiliate platforms and links and recording
//! their click and conversion metrics. The binary in `main.rs` only wires
//! configuration, logging and the server together; everything else lives here
//! so integration tests can drive the full router.

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod panic_hook;
pub mod rate_limiter;
pub mod utils;

pub use error::{Error, Result};
