//! Demo data loader. Everything goes through the domain services, so seeded
//! rows follow the same slug, permission and timestamp rules as the API.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use lexleaks_core::domain::{
    Actor, ImpactFilter, NewImpact, NewPost, Post, PostChanges, PostStatus, User,
};
use lexleaks_core::ports::{AuthError, PasswordService, UserRepository};
use lexleaks_core::query::Pagination;
use lexleaks_core::services::{ImpactService, PostService};
use lexleaks_core::slug::generate_slug;
use lexleaks_core::{DomainError, RepoError};

use crate::demo::{DemoImpact, DemoPost, IMPACTS, POSTS};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("DATABASE_URL must be set")]
    MissingDatabase,

    #[error("ADMIN_USERNAME and ADMIN_PASSWORD must be set")]
    MissingAuthor,

    #[error("Database error: {0}")]
    Database(#[from] migration::DbErr),

    #[error(transparent)]
    Repository(#[from] RepoError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Account that authors the demo content.
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub posts_created: usize,
    pub posts_skipped: usize,
    pub impacts_created: usize,
}

pub struct Seeder {
    users: Arc<dyn UserRepository>,
    posts: PostService,
    impacts: ImpactService,
}

impl Seeder {
    pub fn new(users: Arc<dyn UserRepository>, posts: PostService, impacts: ImpactService) -> Self {
        Self {
            users,
            posts,
            impacts,
        }
    }

    /// Find or create the author account. Impacts need an admin, so an
    /// existing non-admin account is promoted.
    pub async fn ensure_author(
        &self,
        credentials: &Credentials,
        passwords: &dyn PasswordService,
    ) -> Result<Actor, SeedError> {
        let user = match self.users.find_by_username(&credentials.username).await? {
            Some(user) if user.is_admin => user,
            Some(mut user) => {
                user.is_admin = true;
                user.updated_at = Utc::now();
                tracing::info!(username = %user.username, "Promoting seed author to admin");
                self.users.update(user).await?
            }
            None => {
                User::validate_registration(&credentials.username, &credentials.password)?;
                let mut user = User::new(
                    credentials.username.clone(),
                    None,
                    passwords.hash(&credentials.password)?,
                );
                user.is_admin = true;
                tracing::info!(username = %user.username, "Creating seed author");
                self.users.insert(user).await?
            }
        };
        Ok(Actor::from(&user))
    }

    /// Load every demo post and impact that is not already present. Posts
    /// are matched by slug and impacts by title within their post, so the
    /// run can be repeated.
    pub async fn run(&self, author: &Actor, now: DateTime<Utc>) -> Result<SeedReport, SeedError> {
        let mut report = SeedReport::default();
        let mut seeded = Vec::with_capacity(POSTS.len());

        for demo in POSTS {
            let slug = generate_slug(demo.title);
            let post = match self.posts.get_by_slug(&slug).await {
                Ok(existing) => {
                    tracing::debug!(%slug, "Demo post already present");
                    report.posts_skipped += 1;
                    existing.post
                }
                Err(DomainError::NotFound { .. }) => {
                    report.posts_created += 1;
                    self.create_post(author, demo, now).await?
                }
                Err(e) => return Err(e.into()),
            };
            seeded.push((demo.title, post));
        }

        for demo in IMPACTS {
            let Some((_, post)) = seeded.iter().find(|(title, _)| *title == demo.post) else {
                tracing::warn!(post = demo.post, impact = demo.title, "Impact refers to no demo post");
                continue;
            };
            if self.create_impact(author, post, demo, now).await? {
                report.impacts_created += 1;
            }
        }

        Ok(report)
    }

    async fn create_post(
        &self,
        author: &Actor,
        demo: &DemoPost,
        now: DateTime<Utc>,
    ) -> Result<Post, SeedError> {
        let post = self
            .posts
            .create(
                author,
                NewPost {
                    title: demo.title.to_owned(),
                    content: demo.content.to_owned(),
                    excerpt: Some(demo.excerpt.to_owned()),
                    category: Some(demo.category.to_owned()),
                    status: demo.status,
                    ..Default::default()
                },
            )
            .await?;

        if post.status != PostStatus::Published {
            return Ok(post);
        }

        let backdated = PostChanges {
            published_at: Some(Some(now - TimeDelta::days(demo.published_days_ago))),
            ..Default::default()
        };
        Ok(self.posts.update(author, post.id, backdated).await?)
    }

    /// Returns `false` when the post already has an impact with this title.
    async fn create_impact(
        &self,
        author: &Actor,
        post: &Post,
        demo: &DemoImpact,
        now: DateTime<Utc>,
    ) -> Result<bool, SeedError> {
        let filter = ImpactFilter {
            post_id: Some(post.id),
            ..Default::default()
        };
        let existing = self.impacts.list(&filter, Pagination::default()).await?;
        if existing.iter().any(|impact| impact.title == demo.title) {
            return Ok(false);
        }

        self.impacts
            .create(
                author,
                NewImpact {
                    post_id: post.id,
                    title: demo.title.to_owned(),
                    description: demo.description.to_owned(),
                    date: now - TimeDelta::days(demo.days_ago),
                    kind: demo.kind,
                    status: demo.status,
                },
            )
            .await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use lexleaks_core::ports::BaseRepository;
    use lexleaks_core::query::{PostFilter, PostQuery};
    use lexleaks_core::services::NewPostAnnouncer;
    use lexleaks_infra::{Argon2PasswordService, InMemoryPubSub, InMemoryStore, PasswordHashConfig};

    use super::*;

    fn seeder(store: &InMemoryStore) -> Seeder {
        let posts = PostService::new(
            Arc::new(store.posts()),
            Arc::new(store.users()),
            NewPostAnnouncer::new(Arc::new(InMemoryPubSub::default())),
        );
        let impacts = ImpactService::new(Arc::new(store.impacts()), Arc::new(store.posts()));
        Seeder::new(Arc::new(store.users()), posts, impacts)
    }

    fn passwords() -> Argon2PasswordService {
        Argon2PasswordService::with_config(PasswordHashConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
    }

    fn credentials() -> Credentials {
        Credentials {
            username: "editor".to_owned(),
            password: "demo-password".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_seeding_twice_adds_nothing_the_second_time() {
        let store = InMemoryStore::new();
        let seeder = seeder(&store);
        let author = seeder.ensure_author(&credentials(), &passwords()).await.unwrap();
        let now = Utc::now();

        let first = seeder.run(&author, now).await.unwrap();
        assert_eq!(
            first,
            SeedReport {
                posts_created: POSTS.len(),
                posts_skipped: 0,
                impacts_created: IMPACTS.len(),
            }
        );

        let second = seeder.run(&author, now).await.unwrap();
        assert_eq!(
            second,
            SeedReport {
                posts_created: 0,
                posts_skipped: POSTS.len(),
                impacts_created: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_published_demo_posts_are_backdated() {
        let store = InMemoryStore::new();
        let seeder = seeder(&store);
        let author = seeder.ensure_author(&credentials(), &passwords()).await.unwrap();
        let now = Utc::now();
        seeder.run(&author, now).await.unwrap();

        let feed = seeder
            .posts
            .list(&PostQuery {
                filter: PostFilter::published(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(feed.len(), 4);
        assert_eq!(feed[0].published_at, Some(now - TimeDelta::days(3)));
        assert_eq!(feed[0].impact_count, 2);
        assert_eq!(feed[3].published_at, Some(now - TimeDelta::days(10)));

        let archived = seeder
            .posts
            .list(&PostQuery {
                filter: PostFilter {
                    status: Some(PostStatus::Archived),
                    ..Default::default()
                },
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(archived.len(), 2);
        assert!(archived.iter().all(|post| post.published_at.is_none()));
    }

    #[tokio::test]
    async fn test_existing_author_is_promoted() {
        let store = InMemoryStore::new();
        let seeder = seeder(&store);
        let existing = store
            .users()
            .insert(User::new("editor".to_owned(), None, "hash".to_owned()))
            .await
            .unwrap();

        let author = seeder.ensure_author(&credentials(), &passwords()).await.unwrap();

        assert_eq!(author.user_id, existing.id);
        assert!(author.is_admin);
        let stored = store.users().find_by_username("editor").await.unwrap().unwrap();
        assert!(stored.is_admin);
    }

    #[tokio::test]
    async fn test_short_password_is_rejected_for_new_author() {
        let store = InMemoryStore::new();
        let seeder = seeder(&store);
        let weak = Credentials {
            username: "editor".to_owned(),
            password: "short".to_owned(),
        };

        let result = seeder.ensure_author(&weak, &passwords()).await;
        assert!(matches!(
            result,
            Err(SeedError::Domain(DomainError::Validation { field: "password", .. }))
        ));
    }
}
