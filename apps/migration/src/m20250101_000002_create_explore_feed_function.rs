use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const CREATE_FUNCTION: &str = r#"
CREATE OR REPLACE FUNCTION get_explore_feed(
    p_user_id uuid,
    p_limit integer,
    p_offset bigint,
    p_filter text,
    p_category text,
    p_timeframe text
)
RETURNS TABLE (
    id uuid,
    user_id uuid,
    content text,
    media_urls jsonb,
    poll_id uuid,
    likes_count bigint,
    comments_count bigint,
    reposts_count bigint,
    save_count bigint,
    view_count bigint,
    avg_view_time_seconds double precision,
    categories jsonb,
    created_at timestamptz,
    ranking_score double precision
)
LANGUAGE sql
STABLE
AS $$
    WITH windowed AS (
        SELECT p.*,
               EXTRACT(EPOCH FROM (now() - p.created_at)) / 3600.0 AS age_hours
        FROM posts p
        WHERE p.created_at >= now() - CASE p_timeframe
                WHEN '24h' THEN interval '24 hours'
                WHEN '30d' THEN interval '30 days'
                ELSE interval '7 days'
            END
          AND (p_filter <> 'media' OR jsonb_array_length(p.media_urls) > 0)
          AND (
              p_category IS NULL
              OR EXISTS (
                  SELECT 1 FROM jsonb_array_elements_text(p.categories) c
                  WHERE lower(c) = lower(p_category)
              )
          )
    ),
    scored AS (
        SELECT w.*,
               CASE p_filter
                   WHEN 'latest' THEN EXTRACT(EPOCH FROM w.created_at)::double precision
                   WHEN 'popular' THEN (w.likes_count + 2 * w.comments_count + w.reposts_count)::double precision
                   ELSE (1.0 / (1.0 + w.age_hours / 24.0))
                        * (1.0 + ln(1.0 + w.likes_count + 2 * w.comments_count))
               END AS score
        FROM windowed w
    )
    SELECT s.id, s.user_id, s.content, s.media_urls, s.poll_id,
           s.likes_count, s.comments_count, s.reposts_count,
           s.save_count, s.view_count, s.avg_view_time_seconds,
           s.categories, s.created_at, s.score
    FROM scored s
    ORDER BY s.score DESC, s.created_at DESC, s.id
    LIMIT p_limit OFFSET p_offset
$$;
"#;

const DROP_FUNCTION: &str =
    "DROP FUNCTION IF EXISTS get_explore_feed(uuid, integer, bigint, text, text, text);";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(CREATE_FUNCTION)
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(DROP_FUNCTION)
            .await?;
        Ok(())
    }
}
