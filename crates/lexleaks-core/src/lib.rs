//! # LexLeaks Core
//!
//! The domain layer of the LexLeaks backend: entities, the post listing
//! query model, slug derivation, lifecycle services and the ports that
//! infrastructure implements. No database or HTTP dependencies.

#[macro_use]
pub mod domain;
pub mod error;
pub mod ports;
pub mod query;
pub mod services;
pub mod slug;

pub use error::{DomainError, RepoError};
