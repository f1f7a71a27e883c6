//! Post entity for SeaORM.

use sea_orm::entity::prelude::*;

use agora_core::domain::PostCounters;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub media_urls: Json,
    pub poll_id: Option<Uuid>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub reposts_count: i64,
    pub save_count: i64,
    pub view_count: i64,
    pub avg_view_time_seconds: f64,
    #[sea_orm(column_type = "JsonBinary")]
    pub categories: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Profile,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn counters(&self) -> PostCounters {
        PostCounters {
            likes: self.likes_count,
            comments: self.comments_count,
            reposts: self.reposts_count,
            saves: self.save_count,
            views: self.view_count,
            avg_view_time_seconds: self.avg_view_time_seconds,
        }
    }
}

/// Read a JSONB array of strings, skipping anything that is not a string.
pub(crate) fn json_strings(value: &Json) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
