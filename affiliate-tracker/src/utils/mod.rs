//! Utility modules.

pub mod json;
