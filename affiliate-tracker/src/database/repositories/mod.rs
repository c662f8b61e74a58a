//! Repository layer for database access.
//!
//! Each store is a trait with a sqlx-backed implementation so services can be
//! exercised against in-memory doubles.

pub mod affiliate_link;
pub mod metric;
pub mod platform;
pub mod user;

pub use affiliate_link::*;
pub use metric::*;
pub use platform::*;
pub use user::*;
