//! Movies and channels repository

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use super::INSERT_BATCH_SIZE;
use crate::db::models::{ItemRow, NewItem};
use crate::models::MediaKind;

/// Flat item tables sharing one schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemTable {
    Movies,
    Channels,
}

impl ItemTable {
    pub fn name(&self) -> &'static str {
        match self {
            ItemTable::Movies => "movies",
            ItemTable::Channels => "channels",
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            ItemTable::Movies => MediaKind::Movie,
            ItemTable::Channels => MediaKind::Channel,
        }
    }
}

/// Delete every row of the table
pub async fn delete_all(conn: &mut SqliteConnection, table: ItemTable) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(&format!("DELETE FROM {}", table.name()))
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

/// Bulk insert in batches, preserving slice order in the id sequence
pub async fn insert_many(
    conn: &mut SqliteConnection,
    table: ItemTable,
    items: &[NewItem],
) -> Result<usize, sqlx::Error> {
    for chunk in items.chunks(INSERT_BATCH_SIZE) {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "INSERT INTO {} (name, group_title, artwork, media_url, original_json) ",
            table.name()
        ));

        qb.push_values(chunk, |mut row, item| {
            row.push_bind(item.name.as_str())
                .push_bind(item.group_title.as_str())
                .push_bind(item.artwork.as_str())
                .push_bind(item.media_url.as_str())
                .push_bind(item.original_json.as_str());
        });

        qb.build().execute(&mut *conn).await?;
    }

    Ok(items.len())
}

/// Count rows in the table
pub async fn count(pool: &SqlitePool, table: ItemTable) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table.name()))
        .fetch_one(pool)
        .await
}

/// Get a page of rows in insertion order
pub async fn get_page(
    pool: &SqlitePool,
    table: ItemTable,
    limit: i64,
    offset: i64,
) -> Result<Vec<ItemRow>, sqlx::Error> {
    sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT id, original_json FROM {} ORDER BY id ASC LIMIT ? OFFSET ?",
        table.name()
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// Case-insensitive substring search on name
pub async fn search(
    pool: &SqlitePool,
    table: ItemTable,
    pattern: &str,
    limit: i64,
) -> Result<Vec<ItemRow>, sqlx::Error> {
    sqlx::query_as::<_, ItemRow>(&format!(
        r#"SELECT id, original_json FROM {} WHERE name LIKE ? ESCAPE '\' ORDER BY id ASC LIMIT ?"#,
        table.name()
    ))
    .bind(pattern)
    .bind(limit)
    .fetch_all(pool)
    .await
}
