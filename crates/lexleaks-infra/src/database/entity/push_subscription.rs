//! Push subscription entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "push_subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(nullable)]
    pub user_id: Option<Uuid>,
    #[sea_orm(unique, column_type = "Text")]
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    #[sea_orm(nullable)]
    pub user_agent: Option<String>,
    pub is_active: bool,
    pub notify_new_posts: bool,
    pub notify_updates: bool,
    pub notify_weekly_digest: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for lexleaks_core::domain::PushSubscription {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            endpoint: model.endpoint,
            p256dh: model.p256dh,
            auth: model.auth,
            user_agent: model.user_agent,
            is_active: model.is_active,
            notify_new_posts: model.notify_new_posts,
            notify_updates: model.notify_updates,
            notify_weekly_digest: model.notify_weekly_digest,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<lexleaks_core::domain::PushSubscription> for ActiveModel {
    fn from(sub: lexleaks_core::domain::PushSubscription) -> Self {
        Self {
            id: Set(sub.id),
            user_id: Set(sub.user_id),
            endpoint: Set(sub.endpoint),
            p256dh: Set(sub.p256dh),
            auth: Set(sub.auth),
            user_agent: Set(sub.user_agent),
            is_active: Set(sub.is_active),
            notify_new_posts: Set(sub.notify_new_posts),
            notify_updates: Set(sub.notify_updates),
            notify_weekly_digest: Set(sub.notify_weekly_digest),
            created_at: Set(sub.created_at.into()),
            updated_at: Set(sub.updated_at.into()),
        }
    }
}
