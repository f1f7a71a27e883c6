//! PostgreSQL implementations of the feed ports.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sea_orm::prelude::{DateTimeWithTimeZone, Json};
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ColumnTrait, DbBackend, DbConn, DbErr, EntityTrait, FromQueryResult, QueryFilter, Statement,
};
use uuid::Uuid;

use agora_core::domain::{
    AuthorSummary, CounterField, CounterUpdate, Post, PostCounters, RankRequest,
};
use agora_core::error::RepoError;
use agora_core::ports::{CounterStore, ProfileStore, RankingSource};

use super::entity::post::{self, Entity as PostEntity, json_strings};
use super::entity::profile::{self, Entity as ProfileEntity};

fn query_err(e: DbErr) -> RepoError {
    match e {
        DbErr::Conn(err) => RepoError::Connection(err.to_string()),
        DbErr::ConnectionAcquire(err) => RepoError::Connection(err.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}

/// Row shape returned by `get_explore_feed`.
#[derive(Debug, FromQueryResult)]
struct ExploreRow {
    id: Uuid,
    user_id: Uuid,
    content: String,
    media_urls: Json,
    poll_id: Option<Uuid>,
    likes_count: i64,
    comments_count: i64,
    reposts_count: i64,
    save_count: i64,
    view_count: i64,
    avg_view_time_seconds: f64,
    categories: Json,
    created_at: DateTimeWithTimeZone,
    ranking_score: f64,
}

impl From<ExploreRow> for Post {
    fn from(row: ExploreRow) -> Self {
        Self {
            id: row.id,
            author_id: row.user_id,
            content: row.content,
            media_urls: json_strings(&row.media_urls),
            poll_id: row.poll_id,
            counters: PostCounters {
                likes: row.likes_count,
                comments: row.comments_count,
                reposts: row.reposts_count,
                saves: row.save_count,
                views: row.view_count,
                avg_view_time_seconds: row.avg_view_time_seconds,
            },
            ranking_score: row.ranking_score,
            categories: json_strings(&row.categories),
            created_at: row.created_at.into(),
        }
    }
}

/// Ranking source backed by the `get_explore_feed` SQL function.
///
/// The function owns the ranking formula; this adapter only forwards the
/// request and maps rows.
pub struct PostgresRankingSource {
    db: DbConn,
}

impl PostgresRankingSource {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RankingSource for PostgresRankingSource {
    async fn rank(&self, request: &RankRequest) -> Result<Vec<Post>, RepoError> {
        let offset = i64::try_from(request.offset)
            .map_err(|_| RepoError::Query(format!("offset {} out of range", request.offset)))?;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT * FROM get_explore_feed($1, $2, $3, $4, $5, $6)",
            [
                request.viewer.into(),
                (request.limit as i32).into(),
                offset.into(),
                request.filter.as_str().into(),
                request.category.clone().into(),
                request.timeframe.as_str().into(),
            ],
        );

        let rows = ExploreRow::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        tracing::debug!(
            filter = %request.filter,
            offset = request.offset,
            rows = rows.len(),
            "Explore feed ranked"
        );

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Profile store over the `profiles` table.
pub struct PostgresProfileStore {
    db: DbConn,
}

impl PostgresProfileStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    async fn get_profiles(
        &self,
        ids: &HashSet<Uuid>,
    ) -> Result<HashMap<Uuid, AuthorSummary>, RepoError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = ProfileEntity::find()
            .filter(profile::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(rows
            .into_iter()
            .map(|model| (model.id, AuthorSummary::from(model)))
            .collect())
    }
}

/// Counter store issuing single-statement updates against `posts`.
pub struct PostgresCounterStore {
    db: DbConn,
}

impl PostgresCounterStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

fn column_for(field: CounterField) -> post::Column {
    match field {
        CounterField::Views => post::Column::ViewCount,
        CounterField::Saves => post::Column::SaveCount,
        CounterField::AvgViewTime => post::Column::AvgViewTimeSeconds,
    }
}

#[async_trait]
impl CounterStore for PostgresCounterStore {
    async fn apply(&self, post_id: Uuid, update: CounterUpdate) -> Result<PostCounters, RepoError> {
        let column = column_for(update.field());

        // Increments reference the column itself so the database applies them atomically.
        let expr: SimpleExpr = match update {
            CounterUpdate::Increment { by, .. } => Expr::col(column).add(by),
            CounterUpdate::Set {
                field: CounterField::AvgViewTime,
                value,
            } => Expr::value(value),
            CounterUpdate::Set { value, .. } => Expr::value(value as i64),
        };

        // RETURNING reads the row as this statement left it.
        let updated = PostEntity::update_many()
            .col_expr(column, expr)
            .col_expr(post::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(post::Column::Id.eq(post_id))
            .exec_with_returning(&self.db)
            .await
            .map_err(query_err)?;

        updated
            .first()
            .map(post::Model::counters)
            .ok_or(RepoError::NotFound)
    }
}

#[cfg(test)]
impl PostgresCounterStore {
    pub(super) fn into_connection(self) -> DbConn {
        self.db
    }
}
