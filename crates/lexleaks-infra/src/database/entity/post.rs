//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use lexleaks_core::domain::{PostStatus, VerificationStatus};

use super::parse_column;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(nullable)]
    pub excerpt: Option<String>,
    pub status: String,
    pub verification_status: String,
    #[sea_orm(nullable)]
    pub category: Option<String>,
    #[sea_orm(nullable)]
    pub document_url: Option<String>,
    pub author_id: Uuid,
    #[sea_orm(nullable)]
    pub published_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::impact::Entity")]
    Impact,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::impact::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Impact.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for lexleaks_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            slug: model.slug,
            content: model.content,
            excerpt: model.excerpt,
            status: parse_column("posts.status", &model.status, PostStatus::Draft),
            verification_status: parse_column(
                "posts.verification_status",
                &model.verification_status,
                VerificationStatus::Unverified,
            ),
            category: model.category,
            document_url: model.document_url,
            author_id: model.author_id,
            published_at: model.published_at.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<lexleaks_core::domain::Post> for ActiveModel {
    fn from(post: lexleaks_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            title: Set(post.title),
            slug: Set(post.slug),
            content: Set(post.content),
            excerpt: Set(post.excerpt),
            status: Set(post.status.as_str().to_string()),
            verification_status: Set(post.verification_status.as_str().to_string()),
            category: Set(post.category),
            document_url: Set(post.document_url),
            author_id: Set(post.author_id),
            published_at: Set(post.published_at.map(Into::into)),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
