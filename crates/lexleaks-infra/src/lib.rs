//! # LexLeaks Infrastructure
//!
//! Concrete implementations of the ports defined in `lexleaks-core`:
//! relational persistence, an in-memory store, authentication, pub/sub and
//! rate limiting.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory store only
//! - `postgres` - PostgreSQL persistence via SeaORM
//! - `auth` - JWT + Argon2 authentication
//! - `rate-limit` - Per-key rate limiting via governor

pub mod database;
pub mod pubsub;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

pub use database::{DatabaseConfig, InMemoryStore};
#[cfg(feature = "postgres")]
pub use database::DatabaseConnections;
pub use pubsub::InMemoryPubSub;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService, PasswordHashConfig};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};
