//! Post lifecycle: listing, lookup, create, partial update and delete.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Actor, Author, NewPost, Post, PostChanges, PostDetail, PostStatus};
use crate::error::{DomainError, RepoError};
use crate::ports::{PostRepository, UserRepository};
use crate::query::{PostQuery, PostSummary};
use crate::slug::{generate_slug, resolve_unique_slug};

use super::notifications::NewPostAnnouncer;

/// Insert attempts before a slug collision is reported as a conflict.
const MAX_SLUG_ATTEMPTS: usize = 3;

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    announcer: NewPostAnnouncer,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        announcer: NewPostAnnouncer,
    ) -> Self {
        Self {
            posts,
            users,
            announcer,
        }
    }

    pub async fn list(&self, query: &PostQuery) -> Result<Vec<PostSummary>, DomainError> {
        tracing::debug!(
            sort = %query.sort,
            skip = query.page.skip,
            limit = query.page.limit,
            "Listing posts"
        );
        Ok(self.posts.list_summaries(query).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<PostDetail, DomainError> {
        let post = self.require(id).await?;
        self.with_author(post).await
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<PostDetail, DomainError> {
        let post = self
            .posts
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", slug))?;
        self.with_author(post).await
    }

    /// Create a post authored by `actor`.
    pub async fn create(&self, actor: &Actor, input: NewPost) -> Result<Post, DomainError> {
        let input = input.validate()?;

        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let slug = resolve_unique_slug(self.posts.as_ref(), &input.title, None).await?;
            let post = Post::new(actor.user_id, slug, input.clone(), Utc::now());

            match self.posts.insert(post).await {
                Ok(saved) => {
                    tracing::info!(post_id = %saved.id, slug = %saved.slug, author = %actor.username, "Post created");
                    if saved.status == PostStatus::Published {
                        self.announcer.announce(&saved).await;
                    }
                    return Ok(saved);
                }
                Err(RepoError::Constraint(reason)) => {
                    tracing::warn!(attempt, %reason, "Slug taken concurrently, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DomainError::Conflict(format!(
            "could not allocate a unique slug for `{}`",
            input.title
        )))
    }

    /// Apply a partial update. Only the author or an admin may do this.
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: PostChanges,
    ) -> Result<Post, DomainError> {
        let existing = self.require(id).await?;
        if !actor.can_modify(existing.author_id) {
            tracing::warn!(post_id = %id, actor = %actor.username, "Rejected post update");
            return Err(DomainError::Forbidden);
        }
        let changes = changes.validate()?;

        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let mut post = existing.clone();
            let new_slug = match &changes.title {
                Some(title) if generate_slug(title) != post.slug => Some(
                    resolve_unique_slug(self.posts.as_ref(), title, Some(&post.slug)).await?,
                ),
                _ => None,
            };
            let became_published = post.apply(changes.clone(), new_slug, Utc::now());

            match self.posts.update(post).await {
                Ok(saved) => {
                    tracing::info!(post_id = %saved.id, slug = %saved.slug, "Post updated");
                    if became_published {
                        self.announcer.announce(&saved).await;
                    }
                    return Ok(saved);
                }
                Err(RepoError::Constraint(reason)) if changes.title.is_some() => {
                    tracing::warn!(attempt, %reason, "Slug taken concurrently, retrying");
                }
                Err(RepoError::NotFound) => return Err(DomainError::not_found("Post", id)),
                Err(e) => return Err(e.into()),
            }
        }

        Err(DomainError::Conflict(format!(
            "could not allocate a unique slug for post {id}"
        )))
    }

    /// Delete a post and, through the store, all of its impacts.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), DomainError> {
        let existing = self.require(id).await?;
        if !actor.can_modify(existing.author_id) {
            tracing::warn!(post_id = %id, actor = %actor.username, "Rejected post delete");
            return Err(DomainError::Forbidden);
        }
        match self.posts.delete(id).await {
            Ok(()) => {
                tracing::info!(post_id = %id, "Post deleted");
                Ok(())
            }
            Err(RepoError::NotFound) => Err(DomainError::not_found("Post", id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn require(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    async fn with_author(&self, post: Post) -> Result<PostDetail, DomainError> {
        let author = self
            .users
            .find_by_id(post.author_id)
            .await?
            .ok_or_else(|| DomainError::Internal(format!("post {} has no author", post.id)))?;
        Ok(PostDetail {
            author: Author::from(&author),
            post,
        })
    }
}
