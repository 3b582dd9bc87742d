//! Impact entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use lexleaks_core::domain::{ImpactStatus, ImpactType};

use super::parse_column;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "impacts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub date: DateTimeWithTimeZone,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub status: String,
    #[sea_orm(indexed)]
    pub post_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for lexleaks_core::domain::Impact {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            date: model.date.into(),
            kind: parse_column("impacts.type", &model.kind, ImpactType::Investigation),
            status: parse_column("impacts.status", &model.status, ImpactStatus::Pending),
            post_id: model.post_id,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<lexleaks_core::domain::Impact> for ActiveModel {
    fn from(impact: lexleaks_core::domain::Impact) -> Self {
        Self {
            id: Set(impact.id),
            title: Set(impact.title),
            description: Set(impact.description),
            date: Set(impact.date.into()),
            kind: Set(impact.kind.as_str().to_string()),
            status: Set(impact.status.as_str().to_string()),
            post_id: Set(impact.post_id),
            created_at: Set(impact.created_at.into()),
            updated_at: Set(impact.updated_at.into()),
        }
    }
}
