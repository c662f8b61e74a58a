//! Database models for affiliate-tracker.
//!
//! These models map directly to the database schema and handle
//! serialization/deserialization of JSON list columns.

pub mod affiliate_link;
pub mod metric;
pub mod platform;
pub mod user;

pub use affiliate_link::*;
pub use metric::*;
pub use platform::*;
pub use user::*;
