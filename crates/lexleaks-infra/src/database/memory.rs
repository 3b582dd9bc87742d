//! In-memory entity store.
//!
//! This is the fallback when no database is configured, and the fixture
//! store for tests. It enforces the same unique keys, foreign keys and
//! cascades as the migration schema. Works within a single process only.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use lexleaks_core::domain::{
    Author, Impact, ImpactFilter, NotificationTopic, Post, PushSubscription, User,
};
use lexleaks_core::error::RepoError;
use lexleaks_core::ports::{
    BaseRepository, ImpactRepository, PostRepository, PushSubscriptionRepository, UserRepository,
};
use lexleaks_core::query::{Pagination, PostQuery, PostSummary};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    impacts: HashMap<Uuid, Impact>,
    subscriptions: HashMap<Uuid, PushSubscription>,
}

impl Tables {
    fn remove_post(&mut self, id: Uuid) -> bool {
        if self.posts.remove(&id).is_none() {
            return false;
        }
        self.impacts.retain(|_, impact| impact.post_id != id);
        true
    }

    fn impact_counts(&self) -> HashMap<Uuid, u64> {
        let mut counts = HashMap::new();
        for impact in self.impacts.values() {
            *counts.entry(impact.post_id).or_insert(0) += 1;
        }
        counts
    }
}

/// Shared handle to the in-memory tables. Cloning shares the data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository {
            tables: self.tables.clone(),
        }
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryPostRepository {
            tables: self.tables.clone(),
        }
    }

    pub fn impacts(&self) -> InMemoryImpactRepository {
        InMemoryImpactRepository {
            tables: self.tables.clone(),
        }
    }

    pub fn subscriptions(&self) -> InMemoryPushSubscriptionRepository {
        InMemoryPushSubscriptionRepository {
            tables: self.tables.clone(),
        }
    }
}

fn duplicate(what: &str) -> RepoError {
    RepoError::Constraint(format!("duplicate {what}"))
}

fn missing_parent(what: &str) -> RepoError {
    RepoError::Constraint(format!("referenced {what} does not exist"))
}

pub struct InMemoryUserRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryUserRepository {
    fn check_unique(tables: &Tables, user: &User) -> Result<(), RepoError> {
        let clash = tables.users.values().any(|other| {
            other.id != user.id
                && (other.username == user.username
                    || (user.email.is_some() && other.email == user.email))
        });
        if clash {
            Err(duplicate("username or email"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.id) {
            return Err(duplicate("user id"));
        }
        Self::check_unique(&tables, &user)?;
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        Self::check_unique(&tables, &user)?;
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        let owned: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|post| post.author_id == id)
            .map(|post| post.id)
            .collect();
        for post_id in owned {
            tables.remove_post(post_id);
        }
        for sub in tables.subscriptions.values_mut() {
            if sub.user_id == Some(id) {
                sub.user_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }
}

pub struct InMemoryPostRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryPostRepository {
    fn check_constraints(tables: &Tables, post: &Post) -> Result<(), RepoError> {
        if !tables.users.contains_key(&post.author_id) {
            return Err(missing_parent("author"));
        }
        if tables
            .posts
            .values()
            .any(|other| other.id != post.id && other.slug == post.slug)
        {
            return Err(duplicate("slug"));
        }
        Ok(())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.posts.contains_key(&post.id) {
            return Err(duplicate("post id"));
        }
        Self::check_constraints(&tables, &post)?;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }
        Self::check_constraints(&tables, &post)?;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        if self.tables.write().await.remove_post(id) {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.values().find(|post| post.slug == slug).cloned())
    }

    async fn slugs_with_base(&self, base: &str) -> Result<Vec<String>, RepoError> {
        let tables = self.tables.read().await;
        let prefix = format!("{base}-");
        Ok(tables
            .posts
            .values()
            .filter(|post| post.slug == base || post.slug.starts_with(&prefix))
            .map(|post| post.slug.clone())
            .collect())
    }

    async fn list_summaries(&self, query: &PostQuery) -> Result<Vec<PostSummary>, RepoError> {
        let tables = self.tables.read().await;
        let counts = tables.impact_counts();

        let mut rows: Vec<PostSummary> = tables
            .posts
            .values()
            .filter_map(|post| {
                let author = Author::from(tables.users.get(&post.author_id)?);
                let count = counts.get(&post.id).copied().unwrap_or(0);
                query
                    .filter
                    .matches(post, &author, count)
                    .then(|| PostSummary::new(post, author, count))
            })
            .collect();

        rows.sort_by(|a, b| query.sort.compare(a, b));
        Ok(query.page.apply(rows))
    }
}

pub struct InMemoryImpactRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl BaseRepository<Impact, Uuid> for InMemoryImpactRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Impact>, RepoError> {
        Ok(self.tables.read().await.impacts.get(&id).cloned())
    }

    async fn insert(&self, impact: Impact) -> Result<Impact, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.impacts.contains_key(&impact.id) {
            return Err(duplicate("impact id"));
        }
        if !tables.posts.contains_key(&impact.post_id) {
            return Err(missing_parent("post"));
        }
        tables.impacts.insert(impact.id, impact.clone());
        Ok(impact)
    }

    async fn update(&self, impact: Impact) -> Result<Impact, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.impacts.contains_key(&impact.id) {
            return Err(RepoError::NotFound);
        }
        if !tables.posts.contains_key(&impact.post_id) {
            return Err(missing_parent("post"));
        }
        tables.impacts.insert(impact.id, impact.clone());
        Ok(impact)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.tables.write().await.impacts.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl ImpactRepository for InMemoryImpactRepository {
    async fn list(&self, filter: &ImpactFilter, page: Pagination) -> Result<Vec<Impact>, RepoError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Impact> = tables
            .impacts
            .values()
            .filter(|impact| filter.matches(impact))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(page.apply(rows))
    }
}

pub struct InMemoryPushSubscriptionRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryPushSubscriptionRepository {
    fn check_constraints(tables: &Tables, sub: &PushSubscription) -> Result<(), RepoError> {
        if sub.user_id.is_some_and(|id| !tables.users.contains_key(&id)) {
            return Err(missing_parent("user"));
        }
        if tables
            .subscriptions
            .values()
            .any(|other| other.id != sub.id && other.endpoint == sub.endpoint)
        {
            return Err(duplicate("endpoint"));
        }
        Ok(())
    }
}

#[async_trait]
impl BaseRepository<PushSubscription, Uuid> for InMemoryPushSubscriptionRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PushSubscription>, RepoError> {
        Ok(self.tables.read().await.subscriptions.get(&id).cloned())
    }

    async fn insert(&self, sub: PushSubscription) -> Result<PushSubscription, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.subscriptions.contains_key(&sub.id) {
            return Err(duplicate("subscription id"));
        }
        Self::check_constraints(&tables, &sub)?;
        tables.subscriptions.insert(sub.id, sub.clone());
        Ok(sub)
    }

    async fn update(&self, sub: PushSubscription) -> Result<PushSubscription, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.subscriptions.contains_key(&sub.id) {
            return Err(RepoError::NotFound);
        }
        Self::check_constraints(&tables, &sub)?;
        tables.subscriptions.insert(sub.id, sub.clone());
        Ok(sub)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.tables.write().await.subscriptions.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl PushSubscriptionRepository for InMemoryPushSubscriptionRepository {
    async fn find_by_endpoint(&self, endpoint: &str) -> Result<Option<PushSubscription>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .subscriptions
            .values()
            .find(|sub| sub.endpoint == endpoint)
            .cloned())
    }

    async fn list_active_for(
        &self,
        topic: NotificationTopic,
    ) -> Result<Vec<PushSubscription>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .subscriptions
            .values()
            .filter(|sub| sub.wants(topic))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use lexleaks_core::DomainError;
    use lexleaks_core::domain::{
        Actor, ImpactLevel, ImpactStatus, ImpactType, NewImpact, NewPost, NewPushSubscription,
        NotificationPreferences, PostChanges, PostStatus,
    };
    use lexleaks_core::ports::{MessageHandler, PubSub, PubSubError};
    use lexleaks_core::query::{PostFilter, PostSort};
    use lexleaks_core::services::{
        ImpactService, NEW_POST_CHANNEL, NewPostAnnouncer, NotificationDispatcher, PostService,
        SubscriptionService,
    };

    use super::*;

    #[derive(Default)]
    struct RecordingPubSub {
        published: Mutex<Vec<(String, String)>>,
    }

    impl RecordingPubSub {
        fn messages(&self) -> Vec<(String, String)> {
            self.published.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PubSub for RecordingPubSub {
        async fn publish(&self, channel: &str, message: &str) -> Result<(), PubSubError> {
            self.published
                .lock()
                .unwrap()
                .push((channel.to_owned(), message.to_owned()));
            Ok(())
        }

        async fn subscribe(&self, _channel: &str, _handler: MessageHandler) -> Result<(), PubSubError> {
            Ok(())
        }

        async fn unsubscribe(&self, _channel: &str) -> Result<(), PubSubError> {
            Ok(())
        }
    }

    struct Fixture {
        store: InMemoryStore,
        pubsub: Arc<RecordingPubSub>,
        posts: PostService,
        impacts: ImpactService,
    }

    impl Fixture {
        fn new() -> Self {
            let store = InMemoryStore::new();
            let pubsub = Arc::new(RecordingPubSub::default());
            let posts = PostService::new(
                Arc::new(store.posts()),
                Arc::new(store.users()),
                NewPostAnnouncer::new(pubsub.clone()),
            );
            let impacts = ImpactService::new(Arc::new(store.impacts()), Arc::new(store.posts()));
            Self {
                store,
                pubsub,
                posts,
                impacts,
            }
        }

        async fn user(&self, username: &str, is_admin: bool) -> Actor {
            let mut user = User::new(username.to_owned(), None, "hash".to_owned());
            user.is_admin = is_admin;
            let user = self.store.users().insert(user).await.unwrap();
            Actor::from(&user)
        }

        async fn post(&self, actor: &Actor, title: &str, status: PostStatus) -> Post {
            self.posts
                .create(
                    actor,
                    NewPost {
                        title: title.to_owned(),
                        content: format!("Body of {title}"),
                        status,
                        ..Default::default()
                    },
                )
                .await
                .unwrap()
        }

        async fn publish_at(&self, actor: &Actor, id: Uuid, at: Option<DateTime<Utc>>) {
            self.posts
                .update(
                    actor,
                    id,
                    PostChanges {
                        published_at: Some(at),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        async fn add_impacts(&self, admin: &Actor, post_id: Uuid, n: usize) {
            for i in 0..n {
                self.impacts
                    .create(admin, new_impact(post_id, &format!("Impact {i}")))
                    .await
                    .unwrap();
            }
        }

        async fn list(&self, query: PostQuery) -> Vec<PostSummary> {
            self.posts.list(&query).await.unwrap()
        }
    }

    fn new_impact(post_id: Uuid, title: &str) -> NewImpact {
        NewImpact {
            post_id,
            title: title.to_owned(),
            description: "Consequence".to_owned(),
            date: Utc::now(),
            kind: ImpactType::Investigation,
            status: ImpactStatus::Pending,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn slugs(rows: &[PostSummary]) -> Vec<&str> {
        rows.iter().map(|row| row.slug.as_str()).collect()
    }

    #[tokio::test]
    async fn test_identical_titles_get_suffixed_slugs() {
        let fx = Fixture::new();
        let alice = fx.user("alice", false).await;

        let first = fx.post(&alice, "Hello World", PostStatus::Draft).await;
        let second = fx.post(&alice, "Hello World", PostStatus::Draft).await;
        let third = fx.post(&alice, "Hello World", PostStatus::Draft).await;

        assert_eq!(first.slug, "hello-world");
        assert_eq!(second.slug, "hello-world-1");
        assert_eq!(third.slug, "hello-world-2");
    }

    #[tokio::test]
    async fn test_freed_suffix_is_reused() {
        let fx = Fixture::new();
        let alice = fx.user("alice", false).await;
        fx.post(&alice, "Hello World", PostStatus::Draft).await;
        let second = fx.post(&alice, "Hello World", PostStatus::Draft).await;
        fx.post(&alice, "Hello World Tour", PostStatus::Draft).await;
        fx.post(&alice, "Hello World", PostStatus::Draft).await;

        let mut family = fx.store.posts().slugs_with_base("hello-world").await.unwrap();
        family.sort();
        assert_eq!(
            family,
            vec!["hello-world", "hello-world-1", "hello-world-2", "hello-world-tour"]
        );

        fx.posts.delete(&alice, second.id).await.unwrap();
        let refill = fx.post(&alice, "Hello World", PostStatus::Draft).await;
        assert_eq!(refill.slug, "hello-world-1");
    }

    #[tokio::test]
    async fn test_rename_to_same_title_keeps_slug() {
        let fx = Fixture::new();
        let alice = fx.user("alice", false).await;
        fx.post(&alice, "Hello World", PostStatus::Draft).await;
        let second = fx.post(&alice, "Hello World", PostStatus::Draft).await;

        let renamed = fx
            .posts
            .update(
                &alice,
                second.id,
                PostChanges {
                    title: Some("Hello World".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.slug, "hello-world-1");

        let retitled = fx
            .posts
            .update(
                &alice,
                second.id,
                PostChanges {
                    title: Some("Brand New Title".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(retitled.slug, "brand-new-title");
    }

    #[tokio::test]
    async fn test_status_filter_is_exclusive() {
        let fx = Fixture::new();
        let alice = fx.user("alice", false).await;
        fx.post(&alice, "Draft One", PostStatus::Draft).await;
        fx.post(&alice, "Live One", PostStatus::Published).await;
        fx.post(&alice, "Old One", PostStatus::Archived).await;

        let rows = fx
            .list(PostQuery {
                filter: PostFilter {
                    status: Some(PostStatus::Published),
                    ..Default::default()
                },
                ..Default::default()
            })
            .await;

        assert_eq!(slugs(&rows), vec!["live-one"]);
        assert!(rows.iter().all(|row| row.status == PostStatus::Published));
    }

    #[tokio::test]
    async fn test_newest_and_oldest_put_unpublished_last() {
        let fx = Fixture::new();
        let alice = fx.user("alice", false).await;
        let a = fx.post(&alice, "First", PostStatus::Published).await;
        let b = fx.post(&alice, "Second", PostStatus::Published).await;
        fx.post(&alice, "Unpublished", PostStatus::Draft).await;
        fx.publish_at(&alice, a.id, Some(day(2024, 1, 1))).await;
        fx.publish_at(&alice, b.id, Some(day(2024, 2, 1))).await;

        let newest = fx.list(PostQuery::default()).await;
        assert_eq!(slugs(&newest), vec!["second", "first", "unpublished"]);

        let oldest = fx
            .list(PostQuery {
                sort: PostSort::Oldest,
                ..Default::default()
            })
            .await;
        assert_eq!(slugs(&oldest), vec!["first", "second", "unpublished"]);
    }

    #[tokio::test]
    async fn test_impact_level_high_returns_only_five_or_more() {
        let fx = Fixture::new();
        let admin = fx.user("editor", true).await;
        let busy = fx.post(&admin, "Busy", PostStatus::Published).await;
        let edge = fx.post(&admin, "Edge", PostStatus::Published).await;
        let quiet = fx.post(&admin, "Quiet", PostStatus::Published).await;
        fx.add_impacts(&admin, busy.id, 6).await;
        fx.add_impacts(&admin, edge.id, 4).await;
        fx.add_impacts(&admin, quiet.id, 1).await;

        let by_level = |level| PostQuery {
            filter: PostFilter {
                impact_level: Some(level),
                ..Default::default()
            },
            ..Default::default()
        };

        let high = fx.list(by_level(ImpactLevel::High)).await;
        assert_eq!(slugs(&high), vec!["busy"]);
        assert_eq!(high[0].impact_count, 6);

        let medium = fx.list(by_level(ImpactLevel::Medium)).await;
        assert_eq!(slugs(&medium), vec!["edge"]);

        let low = fx.list(by_level(ImpactLevel::Low)).await;
        assert_eq!(slugs(&low), vec!["quiet"]);
    }

    #[tokio::test]
    async fn test_impact_sort_and_zero_counts() {
        let fx = Fixture::new();
        let admin = fx.user("editor", true).await;
        let none = fx.post(&admin, "None", PostStatus::Published).await;
        let some = fx.post(&admin, "Some", PostStatus::Published).await;
        let many = fx.post(&admin, "Many", PostStatus::Published).await;
        fx.add_impacts(&admin, some.id, 2).await;
        fx.add_impacts(&admin, many.id, 5).await;

        let rows = fx
            .list(PostQuery {
                sort: PostSort::Impact,
                ..Default::default()
            })
            .await;

        assert_eq!(slugs(&rows), vec!["many", "some", "none"]);
        let counts: Vec<u64> = rows.iter().map(|row| row.impact_count).collect();
        assert_eq!(counts, vec![5, 2, 0]);
        assert_eq!(rows[2].id, none.id);
        assert_eq!(rows[2].impact_level(), ImpactLevel::Low);
    }

    #[tokio::test]
    async fn test_date_window_is_inclusive_of_whole_days() {
        let fx = Fixture::new();
        let alice = fx.user("alice", false).await;
        let before = fx.post(&alice, "Before", PostStatus::Published).await;
        let start = fx.post(&alice, "Start", PostStatus::Published).await;
        let end = fx.post(&alice, "End", PostStatus::Published).await;
        let after = fx.post(&alice, "After", PostStatus::Published).await;
        fx.post(&alice, "Unpublished", PostStatus::Draft).await;

        fx.publish_at(&alice, before.id, Some(Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap()))
            .await;
        fx.publish_at(&alice, start.id, Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()))
            .await;
        fx.publish_at(&alice, end.id, Some(Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap()))
            .await;
        fx.publish_at(&alice, after.id, Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()))
            .await;

        let rows = fx
            .list(PostQuery {
                filter: PostFilter {
                    date_from: NaiveDate::from_ymd_opt(2024, 1, 1),
                    date_to: NaiveDate::from_ymd_opt(2024, 1, 31),
                    ..Default::default()
                },
                ..Default::default()
            })
            .await;

        assert_eq!(slugs(&rows), vec!["end", "start"]);
    }

    #[tokio::test]
    async fn test_backdating_a_draft_keeps_it_out_of_date_filters() {
        let fx = Fixture::new();
        let alice = fx.user("alice", false).await;
        let live = fx.post(&alice, "Live Leak", PostStatus::Published).await;
        let draft = fx.post(&alice, "Draft Leak", PostStatus::Draft).await;
        fx.publish_at(&alice, live.id, Some(day(2024, 1, 10))).await;
        fx.publish_at(&alice, draft.id, Some(day(2024, 1, 10))).await;

        let stored = fx.posts.get(draft.id).await.unwrap();
        assert_eq!(stored.post.status, PostStatus::Draft);
        assert!(stored.post.published_at.is_none());

        let rows = fx
            .list(PostQuery {
                filter: PostFilter {
                    date_from: NaiveDate::from_ymd_opt(2024, 1, 1),
                    ..Default::default()
                },
                ..Default::default()
            })
            .await;
        assert_eq!(slugs(&rows), vec!["live-leak"]);

        fx.posts
            .update(
                &alice,
                live.id,
                PostChanges {
                    status: Some(PostStatus::Published),
                    published_at: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let stored = fx.posts.get(live.id).await.unwrap();
        assert_eq!(stored.post.status, PostStatus::Published);
        assert_eq!(stored.post.published_at, Some(day(2024, 1, 10)));
    }

    #[tokio::test]
    async fn test_search_author_and_pagination() {
        let fx = Fixture::new();
        let alice = fx.user("AliceReporter", false).await;
        let bob = fx.user("bob", false).await;
        fx.post(&alice, "Tax Memo", PostStatus::Published).await;
        fx.post(&alice, "100% Proof", PostStatus::Published).await;
        fx.post(&bob, "Another memo", PostStatus::Published).await;

        let search = |needle: &str| PostQuery {
            filter: PostFilter {
                search: Some(needle.to_owned()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(fx.list(search("MEMO")).await.len(), 2);
        assert_eq!(slugs(&fx.list(search("100%")).await), vec!["100-proof"]);
        assert!(fx.list(search("nothing like this")).await.is_empty());

        let by_author = fx
            .list(PostQuery {
                filter: PostFilter {
                    author: Some("alice".into()),
                    search: Some("memo".into()),
                    ..Default::default()
                },
                ..Default::default()
            })
            .await;
        assert_eq!(slugs(&by_author), vec!["tax-memo"]);
        assert_eq!(by_author[0].author.username, "AliceReporter");

        let page = fx
            .list(PostQuery {
                page: Pagination::new(1, 1),
                ..Default::default()
            })
            .await;
        assert_eq!(page.len(), 1);
        let beyond = fx
            .list(PostQuery {
                page: Pagination::new(10, 5),
                ..Default::default()
            })
            .await;
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn test_non_author_update_is_forbidden_and_leaves_post() {
        let fx = Fixture::new();
        let alice = fx.user("alice", false).await;
        let mallory = fx.user("mallory", false).await;
        let admin = fx.user("editor", true).await;
        let post = fx.post(&alice, "Original", PostStatus::Draft).await;

        let changes = PostChanges {
            title: Some("Hijacked".into()),
            ..Default::default()
        };
        let err = fx
            .posts
            .update(&mallory, post.id, changes.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));

        let stored = fx.posts.get(post.id).await.unwrap();
        assert_eq!(stored.post, post);

        let err = fx.posts.delete(&mallory, post.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));

        let updated = fx.posts.update(&admin, post.id, changes).await.unwrap();
        assert_eq!(updated.slug, "hijacked");
    }

    #[tokio::test]
    async fn test_missing_post_is_not_found_before_forbidden() {
        let fx = Fixture::new();
        let mallory = fx.user("mallory", false).await;

        let err = fx
            .posts
            .update(&mallory, Uuid::new_v4(), PostChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity_type: "Post", .. }));
    }

    #[tokio::test]
    async fn test_publish_transitions_and_notifications() {
        let fx = Fixture::new();
        let alice = fx.user("alice", false).await;
        let post = fx.post(&alice, "Leak", PostStatus::Draft).await;
        assert!(post.published_at.is_none());
        assert!(fx.pubsub.messages().is_empty());

        let published = fx
            .posts
            .update(
                &alice,
                post.id,
                PostChanges {
                    status: Some(PostStatus::Published),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(published.published_at.is_some());
        assert!(published.updated_at >= post.updated_at);

        let messages = fx.pubsub.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, NEW_POST_CHANNEL);
        assert!(messages[0].1.contains("\"slug\":\"leak\""));

        let archived = fx
            .posts
            .update(
                &alice,
                post.id,
                PostChanges {
                    status: Some(PostStatus::Archived),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(archived.published_at.is_none());
        assert_eq!(fx.pubsub.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_post_cascades_impacts() {
        let fx = Fixture::new();
        let admin = fx.user("editor", true).await;
        let post = fx.post(&admin, "Doomed", PostStatus::Published).await;
        fx.add_impacts(&admin, post.id, 3).await;

        fx.posts.delete(&admin, post.id).await.unwrap();

        let remaining = fx
            .impacts
            .list(&ImpactFilter::default(), Pagination::default())
            .await
            .unwrap();
        assert!(remaining.is_empty());
        assert!(matches!(
            fx.posts.get(post.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_impact_mutations_require_admin_and_existing_post() {
        let fx = Fixture::new();
        let alice = fx.user("alice", false).await;
        let admin = fx.user("editor", true).await;
        let post = fx.post(&alice, "Target", PostStatus::Published).await;

        let err = fx
            .impacts
            .create(&alice, new_impact(post.id, "Resigned"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));

        let err = fx
            .impacts
            .create(&admin, new_impact(Uuid::new_v4(), "Orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity_type: "Post", .. }));

        let impact = fx
            .impacts
            .create(&admin, new_impact(post.id, "Resigned"))
            .await
            .unwrap();
        assert_eq!(fx.impacts.get(impact.id).await.unwrap(), impact);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_a_constraint_error() {
        let store = InMemoryStore::new();
        store
            .users()
            .insert(User::new("alice".into(), None, "h".into()))
            .await
            .unwrap();

        let err = store
            .users()
            .insert(User::new("alice".into(), None, "h".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_subscriptions_upsert_and_fan_out() {
        let store = InMemoryStore::new();
        let service = SubscriptionService::new(Arc::new(store.subscriptions()));
        let dispatcher = NotificationDispatcher::new(Arc::new(store.subscriptions()));
        let input = |endpoint: &str| NewPushSubscription {
            endpoint: endpoint.to_owned(),
            p256dh: "key".to_owned(),
            auth: "secret".to_owned(),
            user_agent: None,
        };

        let first = service.subscribe(None, input("https://push/a")).await.unwrap();
        let again = service.subscribe(None, input("https://push/a")).await.unwrap();
        assert_eq!(first.id, again.id);

        let other = service.subscribe(None, input("https://push/b")).await.unwrap();
        service
            .update_preferences(
                None,
                other.id,
                NotificationPreferences {
                    notify_new_posts: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let payload = r#"{"post_id":"7f1c3f38-8b5e-4c35-9d4c-2a54e1f5d9a1","title":"T","slug":"t","excerpt":null}"#;
        let recipients = dispatcher.recipients(payload).await.unwrap();
        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0].endpoint, "https://push/a");

        service.unsubscribe("https://push/a").await.unwrap();
        assert!(dispatcher.recipients(payload).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_impact_list_orders_by_date_then_creation_and_pages() {
        let fx = Fixture::new();
        let admin = fx.user("editor", true).await;
        let post = fx.post(&admin, "Harbour Contracts", PostStatus::Published).await;
        let repo = fx.store.impacts();

        let dated = |title: &str, date: DateTime<Utc>, created: DateTime<Utc>| {
            Impact::new(
                NewImpact {
                    date,
                    ..new_impact(post.id, title)
                },
                created,
            )
        };
        for impact in [
            dated("oldest", day(2024, 1, 5), day(2024, 3, 1)),
            dated("tie-first", day(2024, 2, 1), day(2024, 3, 1)),
            dated("newest", day(2024, 2, 20), day(2024, 3, 1)),
            dated("tie-second", day(2024, 2, 1), day(2024, 3, 2)),
        ] {
            repo.insert(impact).await.unwrap();
        }

        let titles = |rows: Vec<Impact>| rows.into_iter().map(|i| i.title).collect::<Vec<_>>();

        let all = repo
            .list(&ImpactFilter::default(), Pagination::default())
            .await
            .unwrap();
        assert_eq!(titles(all), vec!["newest", "tie-second", "tie-first", "oldest"]);

        let filter = ImpactFilter {
            post_id: Some(post.id),
            ..Default::default()
        };
        let page = repo.list(&filter, Pagination::new(1, 2)).await.unwrap();
        assert_eq!(titles(page), vec!["tie-second", "tie-first"]);

        let past_end = repo.list(&filter, Pagination::new(4, 2)).await.unwrap();
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn test_public_feed_skips_published_rows_without_timestamp() {
        let fx = Fixture::new();
        let alice = fx.user("alice", false).await;
        fx.post(&alice, "Live Leak", PostStatus::Published).await;

        let mut legacy = Post::new(
            alice.user_id,
            "legacy-import".to_owned(),
            NewPost {
                title: "Legacy Import".to_owned(),
                content: "Imported without a publication date".to_owned(),
                ..Default::default()
            },
            Utc::now(),
        );
        legacy.status = PostStatus::Published;
        fx.store.posts().insert(legacy).await.unwrap();

        let feed = fx
            .list(PostQuery {
                filter: PostFilter::published(),
                ..Default::default()
            })
            .await;
        assert_eq!(slugs(&feed), vec!["live-leak"]);

        let by_status = fx
            .list(PostQuery {
                filter: PostFilter {
                    status: Some(PostStatus::Published),
                    ..Default::default()
                },
                ..Default::default()
            })
            .await;
        assert_eq!(by_status.len(), 2);
    }
}
