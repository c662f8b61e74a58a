//! API middleware.
//!
//! Bearer-token authentication for protected routes and global rate limiting.

pub mod jwt_auth;
pub mod rate_limit;

pub use jwt_auth::{JwtAuthLayer, extract_bearer_token};
pub use rate_limit::{RateLimitState, rate_limit_middleware};
