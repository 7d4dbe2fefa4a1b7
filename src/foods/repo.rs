use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct RecentSearch {
    pub query: String,
    pub searched_at: OffsetDateTime,
}

pub async fn append_search(db: &PgPool, user_id: Uuid, query: &str) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO recent_searches (user_id, query)
        VALUES ($1, $2)
        "#,
    )
    .bind(user_id)
    .bind(query)
    .execute(db)
    .await?;
    Ok(())
}

/// Most recent distinct queries for the user, newest first.
pub async fn recent_searches(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> anyhow::Result<Vec<RecentSearch>> {
    let rows = sqlx::query_as::<_, RecentSearch>(
        r#"
        SELECT query, MAX(searched_at) AS searched_at
        FROM recent_searches
        WHERE user_id = $1
        GROUP BY query
        ORDER BY MAX(searched_at) DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
