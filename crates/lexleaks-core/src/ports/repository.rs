use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Impact, ImpactFilter, NotificationTopic, Post, PushSubscription, User};
use crate::error::RepoError;
use crate::query::{Pagination, PostQuery, PostSummary};

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity. Unique-key collisions surface as `Constraint`.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. Missing rows surface as `NotFound`.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository, including the listing engine.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Every stored slug equal to `base` or starting with `base-`.
    async fn slugs_with_base(&self, base: &str) -> Result<Vec<String>, RepoError>;

    /// Filtered, sorted, paginated listing with author and impact counts.
    /// Deleting a post must also remove its impacts.
    async fn list_summaries(&self, query: &PostQuery) -> Result<Vec<PostSummary>, RepoError>;
}

/// Impact repository.
#[async_trait]
pub trait ImpactRepository: BaseRepository<Impact, Uuid> {
    /// Impacts matching the filter, most recent `date` first.
    async fn list(&self, filter: &ImpactFilter, page: Pagination) -> Result<Vec<Impact>, RepoError>;
}

/// Push subscription repository.
#[async_trait]
pub trait PushSubscriptionRepository: BaseRepository<PushSubscription, Uuid> {
    async fn find_by_endpoint(&self, endpoint: &str) -> Result<Option<PushSubscription>, RepoError>;

    /// Active subscriptions opted into the given topic.
    async fn list_active_for(
        &self,
        topic: NotificationTopic,
    ) -> Result<Vec<PushSubscription>, RepoError>;
}
