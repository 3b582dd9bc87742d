//! Persistence: SeaORM repositories over PostgreSQL and an in-memory store
//! with the same constraints.

mod connections;
mod memory;

#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
mod listing;
#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

pub use connections::DatabaseConfig;
#[cfg(feature = "postgres")]
pub use connections::DatabaseConnections;

pub use memory::{
    InMemoryImpactRepository, InMemoryPostRepository, InMemoryPushSubscriptionRepository,
    InMemoryStore, InMemoryUserRepository,
};

#[cfg(feature = "postgres")]
pub use postgres_repo::{
    PostgresImpactRepository, PostgresPostRepository, PostgresPushSubscriptionRepository,
    PostgresUserRepository,
};
