use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Author, check_max_len, require_text};
use crate::DomainError;

pub const TITLE_MAX_LEN: usize = 200;
pub const EXCERPT_MAX_LEN: usize = 500;
pub const CATEGORY_MAX_LEN: usize = 50;
pub const DOCUMENT_URL_MAX_LEN: usize = 500;

string_enum! {
    /// Editorial lifecycle of a post.
    #[derive(Default)]
    pub enum PostStatus {
        #[default]
        Draft => "draft",
        Published => "published",
        Archived => "archived",
    }
}

string_enum! {
    /// Editorial confidence in a post's claims.
    #[derive(Default)]
    pub enum VerificationStatus {
        #[default]
        Unverified => "unverified",
        Verified => "verified",
        Disputed => "disputed",
    }
}

/// Post entity - an article or leak record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub status: PostStatus,
    pub verification_status: VerificationStatus,
    pub category: Option<String>,
    pub document_url: Option<String>,
    pub author_id: Uuid,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a post.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub status: PostStatus,
    pub verification_status: VerificationStatus,
    pub category: Option<String>,
    pub document_url: Option<String>,
}

impl NewPost {
    /// Trim and bound-check the fields, returning the normalized input.
    pub fn validate(mut self) -> Result<Self, DomainError> {
        self.title = require_text("title", self.title, Some(TITLE_MAX_LEN))?;
        if self.content.trim().is_empty() {
            return Err(DomainError::validation("content", "cannot be empty"));
        }
        check_max_len("excerpt", self.excerpt.as_deref(), EXCERPT_MAX_LEN)?;
        check_max_len("category", self.category.as_deref(), CATEGORY_MAX_LEN)?;
        check_max_len("document_url", self.document_url.as_deref(), DOCUMENT_URL_MAX_LEN)?;
        Ok(self)
    }
}

/// Partial update of a post. `None` leaves a field untouched; for nullable
/// columns `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<Option<String>>,
    pub status: Option<PostStatus>,
    pub verification_status: Option<VerificationStatus>,
    pub category: Option<Option<String>>,
    pub document_url: Option<Option<String>>,
    pub published_at: Option<Option<DateTime<Utc>>>,
}

impl PostChanges {
    pub fn validate(mut self) -> Result<Self, DomainError> {
        if let Some(title) = self.title.take() {
            self.title = Some(require_text("title", title, Some(TITLE_MAX_LEN))?);
        }
        if let Some(content) = &self.content {
            if content.trim().is_empty() {
                return Err(DomainError::validation("content", "cannot be empty"));
            }
        }
        check_max_len("excerpt", self.excerpt.as_ref().and_then(|e| e.as_deref()), EXCERPT_MAX_LEN)?;
        check_max_len("category", self.category.as_ref().and_then(|c| c.as_deref()), CATEGORY_MAX_LEN)?;
        check_max_len(
            "document_url",
            self.document_url.as_ref().and_then(|d| d.as_deref()),
            DOCUMENT_URL_MAX_LEN,
        )?;
        Ok(self)
    }
}

impl Post {
    /// Create a post from validated input. `published_at` is stamped only
    /// when the post starts out published.
    pub fn new(author_id: Uuid, slug: String, input: NewPost, now: DateTime<Utc>) -> Self {
        let published_at = (input.status == PostStatus::Published).then_some(now);
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            slug,
            content: input.content,
            excerpt: input.excerpt,
            status: input.status,
            verification_status: input.verification_status,
            category: input.category,
            document_url: input.document_url,
            author_id,
            published_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update. `new_slug` is the already-resolved slug when the
    /// title changed. Returns true when this update moved the post into
    /// the published state.
    ///
    /// `published_at` is present exactly when the resulting status is
    /// `Published`. An explicit timestamp is kept only for published posts;
    /// a published post left without one is stamped with `now`.
    pub fn apply(
        &mut self,
        changes: PostChanges,
        new_slug: Option<String>,
        now: DateTime<Utc>,
    ) -> bool {
        let was_published = self.status == PostStatus::Published;

        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(slug) = new_slug {
            self.slug = slug;
        }
        if let Some(content) = changes.content {
            self.content = content;
        }
        if let Some(excerpt) = changes.excerpt {
            self.excerpt = excerpt;
        }
        if let Some(verification_status) = changes.verification_status {
            self.verification_status = verification_status;
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(document_url) = changes.document_url {
            self.document_url = document_url;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }

        self.published_at = match self.status {
            PostStatus::Published => changes
                .published_at
                .flatten()
                .or(self.published_at)
                .or(Some(now)),
            PostStatus::Draft | PostStatus::Archived => None,
        };

        self.updated_at = now;
        !was_published && self.status == PostStatus::Published
    }
}

/// A post together with its author, as returned by single-post lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub author: Author,
}
