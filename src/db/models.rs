//! Database row types for SQLite
//!
//! These types map directly to database rows and convert to the tagged
//! ClassifiedItem shape in models/playlist.rs

use sqlx::FromRow;

use crate::models::{ClassifiedItem, EpisodeEntry, MediaKind, RawEntry, SeriesSummary};

// ============================================================================
// Database Row Types
// ============================================================================

/// Movie or channel row (only the columns reads need)
#[derive(Debug, Clone, FromRow)]
pub struct ItemRow {
    pub id: i64,
    pub original_json: String,
}

impl ItemRow {
    /// Decode the stored item, quarantining rows of the wrong shape
    pub fn decode(&self, table: &str, expected: MediaKind) -> Option<ClassifiedItem> {
        decode_item(table, self.id, &self.original_json, expected)
    }
}

/// Series row carrying the denormalized series name
#[derive(Debug, Clone, FromRow)]
pub struct SeriesRow {
    pub id: i64,
    pub serie_name: String,
    pub artwork: String,
    pub original_json: String,
}

impl SeriesRow {
    pub fn decode_episode(&self) -> Option<EpisodeEntry> {
        match decode_item("series", self.id, &self.original_json, MediaKind::Episode)? {
            ClassifiedItem::Episode(episode) => Some(episode),
            _ => None,
        }
    }

    /// Summary for listings (no episodes)
    pub fn into_summary(self) -> SeriesSummary {
        SeriesSummary {
            name: self.serie_name,
            artwork: self.artwork,
            episodes: Vec::new(),
        }
    }

    /// Summary carrying this row as the representative episode
    pub fn into_summary_with_episode(self) -> Option<SeriesSummary> {
        let episode = self.decode_episode()?;
        Some(SeriesSummary {
            name: self.serie_name,
            artwork: self.artwork,
            episodes: vec![episode],
        })
    }
}

fn decode_item(table: &str, id: i64, json: &str, expected: MediaKind) -> Option<ClassifiedItem> {
    match serde_json::from_str::<ClassifiedItem>(json) {
        Ok(item) if item.kind() == expected => Some(item),
        Ok(item) => {
            tracing::warn!(
                table = table,
                id = id,
                expected = %expected,
                found = %item.kind(),
                "Quarantined catalog row with mismatched kind"
            );
            None
        }
        Err(e) => {
            tracing::warn!(table = table, id = id, error = %e, "Quarantined undecodable catalog row");
            None
        }
    }
}

// ============================================================================
// Insert Types
// ============================================================================

/// Movie or channel to insert
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub group_title: String,
    pub artwork: String,
    pub media_url: String,
    pub original_json: String,
}

impl NewItem {
    pub fn from_entry(entry: &RawEntry, kind: MediaKind) -> Result<Self, serde_json::Error> {
        let item = match kind {
            MediaKind::Movie => ClassifiedItem::Movie(entry.clone()),
            _ => ClassifiedItem::Channel(entry.clone()),
        };

        Ok(Self {
            name: entry.name.clone(),
            group_title: entry.group.clone(),
            artwork: entry.artwork.clone(),
            media_url: entry.media_url.clone(),
            original_json: serde_json::to_string(&item)?,
        })
    }
}

/// Series episode to upsert
#[derive(Debug, Clone)]
pub struct NewEpisode {
    pub serie_name: String,
    pub season: String,
    pub episode: String,
    pub name: String,
    pub group_title: String,
    pub artwork: String,
    pub media_url: String,
    pub original_json: String,
}

impl NewEpisode {
    pub fn from_episode(episode: &EpisodeEntry) -> Result<Self, serde_json::Error> {
        let original_json = serde_json::to_string(&ClassifiedItem::Episode(episode.clone()))?;

        Ok(Self {
            serie_name: episode.series_name.clone(),
            season: episode.season.clone(),
            episode: episode.episode.clone(),
            name: episode.entry.name.clone(),
            group_title: episode.entry.group.clone(),
            artwork: episode.entry.artwork.clone(),
            media_url: episode.entry.media_url.clone(),
            original_json,
        })
    }
}
