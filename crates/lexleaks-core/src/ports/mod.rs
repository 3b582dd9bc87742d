//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod pubsub;
mod rate_limit;
mod repository;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use pubsub::{MessageHandler, PubSub, PubSubError, PubSubMessage};
pub use rate_limit::{RateLimitError, RateLimitResult, RateLimiter};
pub use repository::{
    BaseRepository, ImpactRepository, PostRepository, PushSubscriptionRepository, UserRepository,
};
