//! Series repository

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use super::INSERT_BATCH_SIZE;
use crate::db::models::{NewEpisode, SeriesRow};

/// Delete every episode row
pub async fn delete_all(conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM series").execute(conn).await?;

    Ok(result.rows_affected())
}

/// Bulk upsert episodes
///
/// A row with an existing (serie_name, season, episode) replaces the stored
/// fields in place and keeps its id.
pub async fn upsert_many(
    conn: &mut SqliteConnection,
    episodes: &[NewEpisode],
) -> Result<usize, sqlx::Error> {
    for chunk in episodes.chunks(INSERT_BATCH_SIZE) {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT INTO series (serie_name, season, episode, name, group_title, artwork, media_url, original_json) ",
        );

        qb.push_values(chunk, |mut row, ep| {
            row.push_bind(ep.serie_name.as_str())
                .push_bind(ep.season.as_str())
                .push_bind(ep.episode.as_str())
                .push_bind(ep.name.as_str())
                .push_bind(ep.group_title.as_str())
                .push_bind(ep.artwork.as_str())
                .push_bind(ep.media_url.as_str())
                .push_bind(ep.original_json.as_str());
        });

        qb.push(
            r#"
            ON CONFLICT (serie_name, season, episode) DO UPDATE SET
                name = excluded.name,
                group_title = excluded.group_title,
                artwork = excluded.artwork,
                media_url = excluded.media_url,
                original_json = excluded.original_json
            "#,
        );

        qb.build().execute(&mut *conn).await?;
    }

    Ok(episodes.len())
}

/// Count distinct series names
pub async fn count_series(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(DISTINCT serie_name) FROM series")
        .fetch_one(pool)
        .await
}

/// Count episode rows
pub async fn count_episodes(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM series")
        .fetch_one(pool)
        .await
}

/// One representative row (first inserted) per series, in insertion order
pub async fn get_page(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<SeriesRow>, sqlx::Error> {
    sqlx::query_as::<_, SeriesRow>(
        r#"
        SELECT s.id, s.serie_name, s.artwork, s.original_json
        FROM series s
        JOIN (SELECT MIN(id) AS first_id FROM series GROUP BY serie_name) f
          ON s.id = f.first_id
        ORDER BY s.id ASC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// Episodes of one series (case-insensitive name), one per (season, episode),
/// ordered numerically by season then episode
pub async fn get_episodes(pool: &SqlitePool, serie_name: &str) -> Result<Vec<SeriesRow>, sqlx::Error> {
    sqlx::query_as::<_, SeriesRow>(
        r#"
        SELECT id, serie_name, artwork, original_json
        FROM series
        WHERE id IN (
            SELECT MIN(id)
            FROM series
            WHERE serie_name = ? COLLATE NOCASE
            GROUP BY season, episode
        )
        ORDER BY CAST(season AS INTEGER) ASC, CAST(episode AS INTEGER) ASC, id ASC
        "#,
    )
    .bind(serie_name)
    .fetch_all(pool)
    .await
}

/// Series whose name matches the LIKE pattern, one representative row each
pub async fn search(pool: &SqlitePool, pattern: &str, limit: i64) -> Result<Vec<SeriesRow>, sqlx::Error> {
    sqlx::query_as::<_, SeriesRow>(
        r#"
        SELECT s.id, s.serie_name, s.artwork, s.original_json
        FROM series s
        JOIN (
            SELECT MIN(id) AS first_id
            FROM series
            WHERE serie_name LIKE ? ESCAPE '\'
            GROUP BY serie_name
        ) f ON s.id = f.first_id
        ORDER BY s.id ASC
        LIMIT ?
        "#,
    )
    .bind(pattern)
    .bind(limit)
    .fetch_all(pool)
    .await
}
