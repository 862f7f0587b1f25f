use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Group assigned to entries whose metadata line carries no group-title
pub const UNGROUPED: &str = "Sem Grupo";

/// Classification tag of a catalog item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Channel,
    Episode,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "movie"),
            MediaKind::Channel => write!(f, "channel"),
            MediaKind::Episode => write!(f, "episode"),
        }
    }
}

/// Entry pulled out of a metadata line and its URL line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntry {
    #[serde(default)]
    pub group: String,
    pub name: String,
    #[serde(default)]
    pub artwork: String,
    #[serde(default)]
    pub external_id: String,
    /// Free text after the last comma of the metadata line
    #[serde(default)]
    pub label: String,
    pub media_url: String,
}

/// Entries sharing a group-title, in file order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryGroup {
    pub group: String,
    pub items: Vec<RawEntry>,
}

/// Series episode: the raw entry plus its parsed identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeEntry {
    #[serde(flatten)]
    pub entry: RawEntry,
    pub series_name: String,
    pub season: String,
    pub episode: String,
}

/// Unit of storage, tagged by kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ClassifiedItem {
    Movie(RawEntry),
    Channel(RawEntry),
    Episode(EpisodeEntry),
}

impl ClassifiedItem {
    pub fn kind(&self) -> MediaKind {
        match self {
            ClassifiedItem::Movie(_) => MediaKind::Movie,
            ClassifiedItem::Channel(_) => MediaKind::Channel,
            ClassifiedItem::Episode(_) => MediaKind::Episode,
        }
    }

    pub fn entry(&self) -> &RawEntry {
        match self {
            ClassifiedItem::Movie(entry) | ClassifiedItem::Channel(entry) => entry,
            ClassifiedItem::Episode(episode) => &episode.entry,
        }
    }
}

/// All episodes of one series, in storage order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesBucket {
    pub name: String,
    pub episodes: Vec<EpisodeEntry>,
}

/// Three-way partition of a playlist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedCatalog {
    pub movies: Vec<RawEntry>,
    pub channels: Vec<RawEntry>,
    /// Buckets in first-seen order of series name
    pub series: Vec<SeriesBucket>,
}

impl ClassifiedCatalog {
    pub fn episode_count(&self) -> usize {
        self.series.iter().map(|s| s.episodes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty() && self.channels.is_empty() && self.series.is_empty()
    }
}

/// Serialized classifier output consumed by import
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub generated_at: DateTime<Utc>,
    /// Playlist path the snapshot was built from
    pub source: String,
    #[serde(flatten)]
    pub catalog: ClassifiedCatalog,
}
