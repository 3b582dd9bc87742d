//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select};

use lexleaks_core::domain::{
    Impact, ImpactFilter, NotificationTopic, Post, PushSubscription, User,
};
use lexleaks_core::error::RepoError;
use lexleaks_core::ports::{
    ImpactRepository, PostRepository, PushSubscriptionRepository, UserRepository,
};
use lexleaks_core::query::{Pagination, PostQuery, PostSummary};

use super::entity::impact::{self, Entity as ImpactEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::push_subscription::{self, Entity as PushSubscriptionEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::listing::{SummaryRow, build_listing, escape_like};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL impact repository.
pub type PostgresImpactRepository = PostgresBaseRepository<ImpactEntity>;

/// PostgreSQL push subscription repository.
pub type PostgresPushSubscriptionRepository = PostgresBaseRepository<PushSubscriptionEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn slugs_with_base(&self, base: &str) -> Result<Vec<String>, RepoError> {
        slug_family(base)
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn list_summaries(&self, query: &PostQuery) -> Result<Vec<PostSummary>, RepoError> {
        let rows = build_listing(query)
            .into_model::<SummaryRow>()
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        tracing::debug!(rows = rows.len(), "Post listing fetched");
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl ImpactRepository for PostgresImpactRepository {
    async fn list(&self, filter: &ImpactFilter, page: Pagination) -> Result<Vec<Impact>, RepoError> {
        let result = impact_listing(filter, page)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// Slugs in the family of `base`, fetched in one round trip.
pub(super) fn slug_family(base: &str) -> Select<PostEntity> {
    let pattern = format!("{}-%", escape_like(base));
    PostEntity::find()
        .select_only()
        .column(post::Column::Slug)
        .filter(
            Condition::any()
                .add(post::Column::Slug.eq(base))
                .add(
                    Expr::col((PostEntity, post::Column::Slug))
                        .like(LikeExpr::new(pattern).escape('\\')),
                ),
        )
}

/// Filtered impacts, most recent `date` first with `created_at` breaking ties.
pub(super) fn impact_listing(filter: &ImpactFilter, page: Pagination) -> Select<ImpactEntity> {
    let mut select = ImpactEntity::find();

    if let Some(post_id) = filter.post_id {
        select = select.filter(impact::Column::PostId.eq(post_id));
    }
    if let Some(kind) = filter.kind {
        select = select.filter(impact::Column::Kind.eq(kind.as_str()));
    }
    if let Some(status) = filter.status {
        select = select.filter(impact::Column::Status.eq(status.as_str()));
    }

    select
        .order_by_desc(impact::Column::Date)
        .order_by_desc(impact::Column::CreatedAt)
        .offset(page.skip)
        .limit(page.limit)
}

#[async_trait]
impl PushSubscriptionRepository for PostgresPushSubscriptionRepository {
    async fn find_by_endpoint(&self, endpoint: &str) -> Result<Option<PushSubscription>, RepoError> {
        let result = PushSubscriptionEntity::find()
            .filter(push_subscription::Column::Endpoint.eq(endpoint))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_active_for(
        &self,
        topic: NotificationTopic,
    ) -> Result<Vec<PushSubscription>, RepoError> {
        let preference = match topic {
            NotificationTopic::NewPosts => push_subscription::Column::NotifyNewPosts,
            NotificationTopic::Updates => push_subscription::Column::NotifyUpdates,
            NotificationTopic::WeeklyDigest => push_subscription::Column::NotifyWeeklyDigest,
        };

        let result = PushSubscriptionEntity::find()
            .filter(push_subscription::Column::IsActive.eq(true))
            .filter(preference.eq(true))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}
