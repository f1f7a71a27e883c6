use std::collections::{BTreeMap, HashSet};

use sea_orm::{DatabaseBackend, MockDatabase, Value, Values};
use serde_json::json;
use uuid::Uuid;

use agora_core::domain::{CounterField, CounterUpdate, FeedQuery};
use agora_core::error::RepoError;
use agora_core::ports::{CounterStore, ProfileStore, RankingSource};

use super::entity::{post, profile};
use super::postgres_repo::{PostgresCounterStore, PostgresProfileStore, PostgresRankingSource};

fn post_model(id: Uuid, views: i64, saves: i64) -> post::Model {
    let now = chrono::Utc::now();
    post::Model {
        id,
        user_id: Uuid::new_v4(),
        content: "Content".to_owned(),
        media_urls: json!([]),
        poll_id: None,
        likes_count: 0,
        comments_count: 0,
        reposts_count: 0,
        save_count: saves,
        view_count: views,
        avg_view_time_seconds: 0.0,
        categories: json!(["Technology"]),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn explore_row(id: Uuid, user_id: Uuid, score: f64) -> BTreeMap<&'static str, Value> {
    let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
    BTreeMap::from([
        ("id", id.into()),
        ("user_id", user_id.into()),
        ("content", "ranked".into()),
        ("media_urls", json!(["https://cdn.example/1.png"]).into()),
        ("poll_id", Option::<Uuid>::None.into()),
        ("likes_count", 4i64.into()),
        ("comments_count", 1i64.into()),
        ("reposts_count", 0i64.into()),
        ("save_count", 0i64.into()),
        ("view_count", 10i64.into()),
        ("avg_view_time_seconds", 2.5f64.into()),
        ("categories", json!(["Art", 7]).into()),
        ("created_at", now.into()),
        ("ranking_score", score.into()),
    ])
}

#[tokio::test]
async fn test_ranking_maps_rows_in_order() {
    let (first, second) = (Uuid::new_v4(), Uuid::new_v4());
    let author = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            explore_row(first, author, 9.0),
            explore_row(second, author, 3.0),
        ]])
        .into_connection();

    let source = PostgresRankingSource::new(db);
    let request = FeedQuery::default().validate(100).unwrap();
    let posts = source.rank(&request).await.unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, first);
    assert_eq!(posts[1].id, second);
    assert_eq!(posts[0].author_id, author);
    assert_eq!(posts[0].ranking_score, 9.0);
    assert_eq!(posts[0].counters.views, 10);
    assert_eq!(posts[0].media_urls, vec!["https://cdn.example/1.png"]);
    // Non-string tags are skipped.
    assert_eq!(posts[0].categories, vec!["Art"]);
}

#[tokio::test]
async fn test_profiles_are_fetched_in_one_query() {
    let alice = profile::Model {
        id: Uuid::new_v4(),
        username: "alice".to_owned(),
        full_name: Some("Alice".to_owned()),
        avatar_url: None,
        created_at: chrono::Utc::now().into(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![alice.clone()]])
        .into_connection();

    let store = PostgresProfileStore::new(db);
    let ids = HashSet::from([alice.id, Uuid::new_v4()]);
    let found = store.get_profiles(&ids).await.unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[&alice.id].username, "alice");
}

#[tokio::test]
async fn test_counter_increment_is_one_in_place_update() {
    let id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(id, 8, 2)]])
        .into_connection();

    let store = PostgresCounterStore::new(db);
    let counters = store
        .apply(
            id,
            CounterUpdate::Increment {
                field: CounterField::Views,
                by: 1,
            },
        )
        .await
        .unwrap();

    assert_eq!(counters.views, 8);
    assert_eq!(counters.saves, 2);

    let log = store.into_connection().into_transaction_log();
    assert_eq!(log.len(), 1);
    let stmt = &log[0].statements()[0];
    assert!(
        stmt.sql.starts_with(
            r#"UPDATE "posts" SET "view_count" = "view_count" + $1, "updated_at" = CURRENT_TIMESTAMP WHERE "posts"."id" = $2 RETURNING"#
        ),
        "unexpected sql: {}",
        stmt.sql
    );
    assert_eq!(stmt.values, Some(Values(vec![1i64.into(), id.into()])));
}

#[tokio::test]
async fn test_save_overwrites_column_in_place() {
    let id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(id, 0, 3)]])
        .into_connection();

    let store = PostgresCounterStore::new(db);
    let counters = store
        .apply(
            id,
            CounterUpdate::Set {
                field: CounterField::Saves,
                value: 3.0,
            },
        )
        .await
        .unwrap();

    assert_eq!(counters.saves, 3);

    let log = store.into_connection().into_transaction_log();
    let stmt = &log[0].statements()[0];
    assert!(
        stmt.sql.starts_with(
            r#"UPDATE "posts" SET "save_count" = $1, "updated_at" = CURRENT_TIMESTAMP WHERE "posts"."id" = $2 RETURNING"#
        ),
        "unexpected sql: {}",
        stmt.sql
    );
    assert_eq!(stmt.values, Some(Values(vec![3i64.into(), id.into()])));
}

#[tokio::test]
async fn test_counter_update_on_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let store = PostgresCounterStore::new(db);
    let err = store
        .apply(
            Uuid::new_v4(),
            CounterUpdate::Set {
                field: CounterField::Saves,
                value: 3.0,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, RepoError::NotFound));
}
